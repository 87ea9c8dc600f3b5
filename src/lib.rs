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

//! A library to extract a representative color palette from an image.
//!
//! The image is decoded and rescaled to a bounded display size, its pixels are clustered with Lloyd's k-means
//! algorithm, and the resulting centroids are turned into RGB triples and `#rrggbb` hex codes, in cluster order.
//!
//! ```no_run
//! let bytes = std::fs::read("cover.jpg")?;
//! let palette = swatchbook::Palette::from_bytes(bytes).colors(10).seed(0).generate()?;
//!
//! for (rgb, hex) in palette.rgb_triples().into_iter().zip(palette.hex_codes()) {
//!     println!("{hex} {rgb:?}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod encoder;
mod entry;
mod error;
pub mod normalizer;
pub mod quantizer;

pub const DEFAULT_CALCULATE_NUMBER_COLORS: usize = 10;
pub const DEFAULT_SEED: u64 = 0;

pub use crate::{
    encoder::encode,
    entry::PaletteEntry,
    error::{Error, Result},
    normalizer::{normalize, NormalizeOptions, NormalizedImage, RawImage},
    quantizer::{quantize, Cluster, Initialization, KmeansQuantizer, Quantization},
};
pub use image;
pub use palette;

use image::DynamicImage;
use log::debug;
use palette::IntoColor;

/// An ordered set of colors, one per cluster, in the order the quantizer produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

pub struct PaletteBuilder {
    source: Source,
    colors: usize,
    seed: u64,
    max_iterations: usize,
    tolerance: f64,
    initialization: Initialization,
    normalize_options: NormalizeOptions,
}

enum Source {
    Encoded(Vec<u8>),
    Decoded(RawImage),
}

impl Palette {
    /// Starts building a palette from encoded image bytes. The bytes are decoded when the palette is generated.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> PaletteBuilder {
        PaletteBuilder::from_bytes(bytes)
    }

    pub fn from_image(image: DynamicImage) -> PaletteBuilder {
        PaletteBuilder::from_image(image)
    }

    pub fn from_entries(entries: Vec<PaletteEntry>) -> Palette {
        Self { entries }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rgb_triples(&self) -> Vec<(u8, u8, u8)> {
        self.entries.iter().map(|entry| entry.rgb()).collect()
    }

    /// The hex codes of the entries, paired index by index with [`Palette::rgb_triples`].
    pub fn hex_codes(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.hex()).collect()
    }

    /// The color of the entry representing the most pixels. The earliest entry wins a tie.
    pub fn most_prominent_color(&self) -> Option<(u8, u8, u8)> {
        self.entries
            .iter()
            .rev()
            .max_by_key(|entry| entry.population())
            .map(|entry| entry.rgb())
    }
}

impl IntoIterator for Palette {
    type Item = PaletteEntry;
    type IntoIter = std::vec::IntoIter<PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl PaletteBuilder {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Source::Encoded(bytes.into()))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self::new(Source::Decoded(RawImage::from_image(image)))
    }

    fn new(source: Source) -> Self {
        Self {
            source,
            colors: DEFAULT_CALCULATE_NUMBER_COLORS,
            seed: DEFAULT_SEED,
            max_iterations: quantizer::DEFAULT_MAX_ITERATIONS,
            tolerance: quantizer::DEFAULT_TOLERANCE,
            initialization: Initialization::default(),
            normalize_options: NormalizeOptions::default(),
        }
    }

    /// Sets the number of colors, or clusters, in the palette.
    pub fn colors(self, colors: usize) -> Self {
        Self { colors, ..self }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    pub fn tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    pub fn initialization(self, initialization: Initialization) -> Self {
        Self { initialization, ..self }
    }

    /// Sets the width landscape images are rescaled to and the height every other image is rescaled to.
    pub fn target_size(self, landscape_width: u32, portrait_height: u32) -> Self {
        Self {
            normalize_options: NormalizeOptions {
                landscape_width,
                portrait_height,
            },
            ..self
        }
    }

    pub fn generate(self) -> Result<Palette> {
        self.generate_with_image().map(|(_, palette)| palette)
    }

    /// Generates the palette and also returns the rescaled image the colors were taken from.
    pub fn generate_with_image(self) -> Result<(NormalizedImage, Palette)> {
        let raw = match self.source {
            Source::Encoded(bytes) => RawImage::decode(&bytes)?,
            Source::Decoded(raw) => raw,
        };

        let normalized = raw.normalize(self.normalize_options);
        let fit = KmeansQuantizer::new(normalized.population(), self.colors, self.seed)
            .max_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .initialization(self.initialization)
            .fit()?;

        let palette = encode(fit.clusters());
        debug!("Generated palette {:?}", palette.hex_codes());

        Ok((normalized, palette))
    }
}

/// Extracts a palette of [`DEFAULT_CALCULATE_NUMBER_COLORS`] colors from encoded image bytes with the default seed.
pub fn extract_palette(bytes: &[u8]) -> Result<Palette> {
    PaletteBuilder::from_bytes(bytes).generate()
}

fn rgb_to_hsl(rgb: (u8, u8, u8)) -> (f32, f32, f32) {
    let raw = palette::Srgb::from_components(rgb);
    let raw_float: palette::Srgb<f32> = raw.into_format();
    let hsl: palette::Hsl = raw_float.into_color();
    let (h, s, l) = hsl.into_components();

    (h.into_positive_degrees(), s, l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn stripes(width: u32, height: u32) -> RgbImage {
        // four wide vertical bands of flat color
        let colors = [Rgb([200, 30, 30]), Rgb([30, 200, 30]), Rgb([30, 30, 200]), Rgb([240, 240, 240])];
        RgbImage::from_fn(width, height, |x, _| colors[(x * 4 / width) as usize])
    }

    #[test]
    fn solid_red_end_to_end() {
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::from_pixel(1000, 500, Rgb([255, 0, 0]))));
        let (image, palette) = Palette::from_bytes(bytes).colors(3).seed(0).generate_with_image().unwrap();

        assert_eq!(image.dimensions(), (600, 300));
        assert_eq!(palette.len(), 3);

        // every centroid is seeded from the single color in the image
        assert_eq!(palette.rgb_triples(), [(255, 0, 0); 3]);
        assert_eq!(palette.hex_codes(), ["#ff0000"; 3]);
        assert_eq!(palette.entries()[0].population(), 600 * 300);
        assert_eq!(palette.entries()[1].population(), 0);
        assert_eq!(palette.entries()[2].population(), 0);
    }

    #[test]
    fn default_palette_has_ten_colors() {
        let palette = extract_palette(&png_bytes(DynamicImage::ImageRgb8(stripes(320, 240)))).unwrap();

        assert_eq!(palette.len(), DEFAULT_CALCULATE_NUMBER_COLORS);
        assert_eq!(palette.iter().map(|e| e.population()).sum::<u32>(), 600 * 450);
    }

    #[test]
    fn generation_is_deterministic() {
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::from_fn(97, 61, |x, y| {
            Rgb([(x * 2) as u8, (y * 4) as u8, ((x * y) % 256) as u8])
        })));

        let first = Palette::from_bytes(bytes.clone()).seed(5).generate().unwrap();
        let second = Palette::from_bytes(bytes).seed(5).generate().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn stripes_are_found() {
        let palette = Palette::from_image(DynamicImage::ImageRgb8(stripes(400, 100)))
            .colors(4)
            .target_size(400, 100)
            .generate()
            .unwrap();

        let mut colors = palette.rgb_triples();
        colors.sort();

        assert_eq!(colors, [(30, 30, 200), (30, 200, 30), (200, 30, 30), (240, 240, 240)]);
        assert!(palette.iter().all(|e| e.population() == 100 * 100));
    }

    #[test]
    fn transparency_is_ignored() {
        let image = RgbaImage::from_fn(50, 50, |x, _| {
            if x < 25 {
                Rgba([0, 0, 255, 0])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });

        let palette = Palette::from_bytes(png_bytes(DynamicImage::ImageRgba8(image)))
            .colors(2)
            .generate()
            .unwrap();

        assert_eq!(palette.hex_codes(), ["#0000ff", "#0000ff"]);
    }

    #[test]
    fn errors_are_propagated() {
        assert!(matches!(
            Palette::from_bytes(b"GIF89a but not really".to_vec()).generate(),
            Err(Error::Decode(_))
        ));

        let tiny = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([1, 1, 1])));
        assert!(matches!(
            Palette::from_image(tiny).target_size(4, 2).colors(9).generate(),
            Err(Error::InvalidK { k: 9, population: 8 })
        ));

        let sliver = DynamicImage::ImageRgb8(RgbImage::from_pixel(5000, 1, Rgb([1, 1, 1])));
        assert!(matches!(
            Palette::from_image(sliver).generate(),
            Err(Error::EmptyPopulation)
        ));
    }

    #[test]
    fn most_prominent_color() {
        let palette = Palette::from_entries(vec![
            PaletteEntry::new((1, 1, 1), 3),
            PaletteEntry::new((2, 2, 2), 7),
            PaletteEntry::new((3, 3, 3), 7),
        ]);

        assert_eq!(palette.most_prominent_color(), Some((2, 2, 2)));
        assert_eq!(Palette::default().most_prominent_color(), None);
    }

    #[test]
    fn hex_codes_pair_with_triples() {
        let palette = extract_palette(&png_bytes(DynamicImage::ImageRgb8(stripes(123, 77)))).unwrap();

        for (rgb, hex) in palette.rgb_triples().into_iter().zip(palette.hex_codes()) {
            assert_eq!(hex.parse::<PaletteEntry>().unwrap().rgb(), rgb);
        }
    }
}
