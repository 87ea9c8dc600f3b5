// Copyright 2026 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{quantizer::Cluster, Palette, PaletteEntry};

/// Converts clusters into a palette, keeping the cluster order.
///
/// Centroid channels are truncated towards zero, not rounded, and then clamped into `0..=255`.
pub fn encode(clusters: &[Cluster]) -> Palette {
    let entries = clusters
        .iter()
        .map(|cluster| {
            let (r, g, b) = cluster.centroid();
            PaletteEntry::new((channel(r), channel(g), channel(b)), cluster.population())
        })
        .collect();

    Palette::from_entries(entries)
}

fn channel(value: f64) -> u8 {
    value.trunc().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_instead_of_rounding() {
        let palette = encode(&[Cluster::new((254.999, 0.5, 127.9), 3)]);
        let entries = palette.entries();

        assert_eq!(entries[0].rgb(), (254, 0, 127));
        assert_eq!(entries[0].hex(), "#fe007f");
        assert_eq!(entries[0].population(), 3);
    }

    #[test]
    fn clamps_out_of_range_channels() {
        let palette = encode(&[Cluster::new((-3.7, 256.2, 1000.0), 0)]);
        assert_eq!(palette.entries()[0].rgb(), (0, 255, 255));
    }

    #[test]
    fn keeps_cluster_order_and_duplicates() {
        let clusters = [
            Cluster::new((10.2, 10.2, 10.2), 5),
            Cluster::new((200.0, 100.0, 0.0), 1),
            Cluster::new((10.9, 10.9, 10.9), 9),
        ];
        let palette = encode(&clusters);

        assert_eq!(palette.len(), 3);
        assert_eq!(palette.hex_codes(), ["#0a0a0a", "#c86400", "#0a0a0a"]);
        assert_eq!(palette.iter().map(|e| e.population()).collect::<Vec<_>>(), [5, 1, 9]);
    }

    #[test]
    fn hex_matches_rgb() {
        let clusters = (0..50)
            .map(|i| Cluster::new((i as f64 * 5.3, 255.0 - i as f64 * 4.1, (i * i) as f64 % 256.0), i))
            .collect::<Vec<_>>();

        for entry in encode(&clusters) {
            let (r, g, b) = entry.rgb();
            let hex = entry.hex();

            assert_eq!(u8::from_str_radix(&hex[1..3], 16).unwrap(), r);
            assert_eq!(u8::from_str_radix(&hex[3..5], 16).unwrap(), g);
            assert_eq!(u8::from_str_radix(&hex[5..7], 16).unwrap(), b);
        }
    }
}
