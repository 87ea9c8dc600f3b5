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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned while extracting a palette.
#[derive(Debug, Error)]
pub enum Error {
    /// The input bytes are not an image in a supported raster format.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The normalized image has no pixels to cluster.
    #[error("the pixel population is empty")]
    EmptyPopulation,

    /// The requested cluster count is zero or larger than the pixel population.
    #[error("invalid cluster count {k} for a population of {population} pixels")]
    InvalidK { k: usize, population: usize },

    /// A hex color code couldn't be parsed.
    #[error("invalid hex color code {0:?}")]
    InvalidHex(String),
}
