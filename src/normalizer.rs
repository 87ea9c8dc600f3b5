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

use crate::Result;
use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbImage};
use log::debug;

pub const DEFAULT_LANDSCAPE_WIDTH: u32 = 600;
pub const DEFAULT_PORTRAIT_HEIGHT: u32 = 400;

/// The bounded display size images are rescaled to before their colors are clustered.
///
/// Landscape images (wider than tall) get their width set to `landscape_width`, every other image
/// gets its height set to `portrait_height`. The other side is scaled proportionally and rounded
/// down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub landscape_width: u32,
    pub portrait_height: u32,
}

/// A decoded source image, as the decoder produced it.
#[derive(Debug, Clone)]
pub struct RawImage {
    image: DynamicImage,
}

/// A rescaled image with exactly three 8-bit channels per pixel.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    image: RgbImage,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            landscape_width: DEFAULT_LANDSCAPE_WIDTH,
            portrait_height: DEFAULT_PORTRAIT_HEIGHT,
        }
    }
}

impl RawImage {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        debug!(
            "Decoded {}x{} image with {:?} pixels",
            image.width(),
            image.height(),
            image.color()
        );

        Ok(Self { image })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The number of channels in the decoded pixel format, alpha included.
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    pub fn normalize(self, options: NormalizeOptions) -> NormalizedImage {
        let (width, height) = self.image.dimensions();
        let (new_width, new_height) = target_dimensions(width, height, options);

        // alpha is dropped outright, not composited against anything
        let rgb = self.image.into_rgb8();

        let image = if width == 0 || height == 0 || new_width == 0 || new_height == 0 {
            RgbImage::new(new_width, new_height)
        } else {
            image::imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3)
        };

        debug!("Normalized {}x{} image to {}x{}", width, height, image.width(), image.height());
        NormalizedImage { image }
    }
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.image.width() as usize * self.image.height() as usize
    }

    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_rgb_image(self) -> RgbImage {
        self.image
    }

    /// The image's pixels as color points, in raster order.
    pub fn population(&self) -> Vec<(u8, u8, u8)> {
        self.image.pixels().map(|p| (p.0[0], p.0[1], p.0[2])).collect()
    }
}

/// Decodes the given bytes and rescales the result to the bounded display size.
pub fn normalize(bytes: &[u8], options: NormalizeOptions) -> Result<NormalizedImage> {
    Ok(RawImage::decode(bytes)?.normalize(options))
}

/// Computes the size an image of the given dimensions is normalized to.
pub fn target_dimensions(width: u32, height: u32, options: NormalizeOptions) -> (u32, u32) {
    if width > height {
        let new_height = height as u64 * options.landscape_width as u64 / width as u64;
        (options.landscape_width, new_height as u32)
    } else if height == 0 {
        (0, 0)
    } else {
        let new_width = width as u64 * options.portrait_height as u64 / height as u64;
        (new_width as u32, options.portrait_height)
    }
}
