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

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{fs, path::PathBuf};
use swatchbook::{normalizer, quantizer, Initialization, Palette};

/// Extract a representative color palette from an image.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path (PNG, JPEG or GIF)
    input: PathBuf,

    /// Number of colors in the palette
    #[arg(short = 'k', long, default_value_t = swatchbook::DEFAULT_CALCULATE_NUMBER_COLORS)]
    colors: usize,

    /// Seed for choosing the initial centroids
    #[arg(short, long, default_value_t = swatchbook::DEFAULT_SEED)]
    seed: u64,

    /// Maximum number of k-means iterations
    #[arg(long, default_value_t = quantizer::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Convergence tolerance, relative to the pixel variance
    #[arg(long, default_value_t = quantizer::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// How the initial centroids are chosen
    #[arg(long, value_enum, default_value_t = Init::PlusPlus)]
    init: Init,

    /// Width landscape images are rescaled to
    #[arg(long, default_value_t = normalizer::DEFAULT_LANDSCAPE_WIDTH)]
    width: u32,

    /// Height portrait and square images are rescaled to
    #[arg(long, default_value_t = normalizer::DEFAULT_PORTRAIT_HEIGHT)]
    height: u32,

    /// Save the rescaled image to this path
    #[arg(long)]
    save_normalized: Option<PathBuf>,

    /// Print the palette as JSON
    #[arg(long)]
    json: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Init {
    /// Greedy k-means++
    PlusPlus,
    /// Uniformly sampled pixels
    Random,
}

impl From<Init> for Initialization {
    fn from(init: Init) -> Self {
        match init {
            Init::PlusPlus => Initialization::KMeansPlusPlus,
            Init::Random => Initialization::Random,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let bytes = fs::read(&args.input).with_context(|| format!("failed to read {}", args.input.display()))?;
    let (image, palette) = Palette::from_bytes(bytes)
        .colors(args.colors)
        .seed(args.seed)
        .max_iterations(args.max_iterations)
        .tolerance(args.tolerance)
        .initialization(args.init.into())
        .target_size(args.width, args.height)
        .generate_with_image()
        .context("palette extraction failed")?;

    if let Some(path) = &args.save_normalized {
        image
            .as_rgb_image()
            .save(path)
            .with_context(|| format!("failed to save the rescaled image to {}", path.display()))?;
    }

    if args.json {
        let colors = palette
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "hex": entry.hex(),
                    "rgb": entry.rgb(),
                    "population": entry.population(),
                })
            })
            .collect::<Vec<_>>();

        let output = serde_json::json!({
            "width": image.width(),
            "height": image.height(),
            "colors": colors,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for entry in &palette {
            let (r, g, b) = entry.rgb();
            println!("{entry}  {r:>3} {g:>3} {b:>3}  {}", entry.population());
        }
    }

    Ok(())
}
