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

use crate::Error;
use std::{fmt, str::FromStr};

/// One color of a palette, along with the number of pixels it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteEntry {
    red: u8,
    green: u8,
    blue: u8,
    population: u32,
}

impl PaletteEntry {
    pub fn new((red, green, blue): (u8, u8, u8), population: u32) -> PaletteEntry {
        Self {
            red,
            green,
            blue,
            population,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// The color as `#rrggbb`, lowercase and zero-padded.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    pub fn hsl(self) -> (f32, f32, f32) {
        crate::rgb_to_hsl(self.rgb())
    }

    pub fn population(self) -> u32 {
        self.population
    }
}

impl fmt::Display for PaletteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Parses a `#rrggbb` hex code in either case, with or without the leading `#`. The parsed entry has a
/// population of zero.
impl FromStr for PaletteEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidHex(s.to_owned()));
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| Error::InvalidHex(s.to_owned()));
        Ok(Self::new((channel(0)?, channel(2)?, channel(4)?), 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(PaletteEntry::new((255, 0, 0), 1).hex(), "#ff0000");
        assert_eq!(PaletteEntry::new((1, 2, 3), 1).hex(), "#010203");
        assert_eq!(PaletteEntry::new((171, 205, 239), 1).hex(), "#abcdef");
        assert_eq!(PaletteEntry::new((0, 0, 0), 0).to_string(), "#000000");
    }

    #[test]
    fn hex_round_trip() {
        for value in (0..=0xff_ffffu32).step_by(0x1f3b) {
            let rgb = ((value >> 16) as u8, (value >> 8) as u8, value as u8);
            let entry = PaletteEntry::new(rgb, 42);

            assert_eq!(entry.hex().parse::<PaletteEntry>().unwrap().rgb(), rgb);
        }
    }

    #[test]
    fn parse_variants() {
        assert_eq!("#ABCDEF".parse::<PaletteEntry>().unwrap().rgb(), (171, 205, 239));
        assert_eq!("0a0b0c".parse::<PaletteEntry>().unwrap().rgb(), (10, 11, 12));
        assert_eq!("#ffffff".parse::<PaletteEntry>().unwrap().population(), 0);
    }

    #[test]
    fn parse_failures() {
        for input in ["", "#", "#fff", "#ff00000", "#gg0000", "##ff000", "#ff 000", "#ff00é"] {
            assert!(
                matches!(input.parse::<PaletteEntry>(), Err(Error::InvalidHex(ref s)) if s == input),
                "{input:?}"
            );
        }
    }

    #[test]
    fn hsl_of_primaries() {
        let (h, s, l) = PaletteEntry::new((0, 0, 255), 0).hsl();

        assert!((h - 240.0).abs() < 1e-3);
        assert!((s - 1.0).abs() < 1e-6);
        assert!((l - 0.5).abs() < 1e-6);
    }
}
