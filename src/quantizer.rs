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

use crate::{Error, Result};
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

type Point = [f64; 3];

/// How the initial centroids are picked from the pixel population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Initialization {
    /// Greedy k-means++: every centroid after the first is the best of a few candidates sampled with
    /// probability proportional to their squared distance from the closest already chosen centroid.
    #[default]
    KMeansPlusPlus,
    /// Distinct pixels sampled uniformly.
    Random,
}

/// A centroid in RGB space along with the number of pixels closest to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    centroid: Point,
    population: u32,
}

/// The outcome of fitting the centroids to a pixel population.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantization {
    clusters: Vec<Cluster>,
    iterations: usize,
    converged: bool,
    inertia: f64,
}

/// Partitions a pixel population into a fixed number of clusters with Lloyd's algorithm.
pub struct KmeansQuantizer {
    pixels: Vec<(u8, u8, u8)>,
    k: usize,
    seed: u64,
    max_iterations: usize,
    tolerance: f64,
    initialization: Initialization,
}

impl Cluster {
    pub fn new((red, green, blue): (f64, f64, f64), population: u32) -> Self {
        Self {
            centroid: [red, green, blue],
            population,
        }
    }

    pub fn centroid(self) -> (f64, f64, f64) {
        let [r, g, b] = self.centroid;
        (r, g, b)
    }

    pub fn population(self) -> u32 {
        self.population
    }
}

impl Quantization {
    /// The clusters in centroid index order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// The number of assignment passes run before stopping.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the fit stopped before hitting the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// The sum of squared distances from every pixel to its closest centroid.
    pub fn inertia(&self) -> f64 {
        self.inertia
    }
}

impl KmeansQuantizer {
    pub fn new(pixels: Vec<(u8, u8, u8)>, k: usize, seed: u64) -> Self {
        Self {
            pixels,
            k,
            seed,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            initialization: Initialization::default(),
        }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    /// Sets the convergence tolerance, relative to the mean per-channel variance of the population.
    pub fn tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    pub fn initialization(self, initialization: Initialization) -> Self {
        Self { initialization, ..self }
    }

    pub fn fit(self) -> Result<Quantization> {
        let population = self.pixels.len();

        if population == 0 {
            return Err(Error::EmptyPopulation);
        }

        if self.k == 0 || self.k > population {
            return Err(Error::InvalidK { k: self.k, population });
        }

        let points = self
            .pixels
            .iter()
            .map(|&(r, g, b)| [r as f64, g as f64, b as f64])
            .collect::<Vec<_>>();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = match self.initialization {
            Initialization::KMeansPlusPlus => init_plus_plus(&points, self.k, &mut rng),
            Initialization::Random => init_random(&points, self.k, &mut rng),
        };
        debug!(
            "Initialized {} centroids from {} pixels with {:?} (seed {})",
            self.k, population, self.initialization, self.seed
        );

        let tolerance = self.tolerance * mean_variance(&points);
        let mut assignments = vec![usize::MAX; population];
        let mut iterations = 0;
        let mut converged = false;
        // whether the centroids moved since the assignments were last computed
        let mut stale = true;

        while iterations < self.max_iterations {
            iterations += 1;

            let changed = assign(&points, &centroids, &mut assignments);
            stale = false;

            if changed == 0 {
                converged = true;
                break;
            }

            let shift = update(&points, &assignments, &mut centroids);
            stale = true;
            trace!("Iteration {}: {} reassigned, centroid shift {}", iterations, changed, shift);

            if shift <= tolerance {
                converged = true;
                break;
            }
        }

        if stale {
            assign(&points, &centroids, &mut assignments);
        }

        let mut counts = vec![0u32; self.k];
        let mut inertia = 0.0;
        for (point, &cluster) in points.iter().zip(&assignments) {
            counts[cluster] += 1;
            inertia += distance_squared(point, &centroids[cluster]);
        }

        debug!(
            "K-means stopped after {} iterations (converged: {}, inertia: {})",
            iterations, converged, inertia
        );

        let clusters = centroids
            .into_iter()
            .zip(counts)
            .map(|(centroid, population)| Cluster { centroid, population })
            .collect();

        Ok(Quantization {
            clusters,
            iterations,
            converged,
            inertia,
        })
    }
}

/// Clusters the pixels into `k` clusters with the default iteration cap, tolerance and initialization.
pub fn quantize(pixels: Vec<(u8, u8, u8)>, k: usize, seed: u64) -> Result<Vec<Cluster>> {
    KmeansQuantizer::new(pixels, k, seed)
        .fit()
        .map(Quantization::into_clusters)
}

fn distance_squared(a: &Point, b: &Point) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];

    dr * dr + dg * dg + db * db
}

/// Returns the index of the closest centroid. Ties go to the lowest index.
fn closest_centroid(point: &Point, centroids: &[Point]) -> usize {
    let mut closest = 0;
    let mut closest_distance = f64::INFINITY;

    for (i, centroid) in centroids.iter().enumerate() {
        let distance = distance_squared(point, centroid);

        if distance < closest_distance {
            closest = i;
            closest_distance = distance;
        }
    }

    closest
}

/// Assigns every point to its closest centroid, returning how many assignments changed.
fn assign(points: &[Point], centroids: &[Point], assignments: &mut [usize]) -> usize {
    let mut changed = 0;

    for (point, assignment) in points.iter().zip(assignments.iter_mut()) {
        let closest = closest_centroid(point, centroids);

        if *assignment != closest {
            *assignment = closest;
            changed += 1;
        }
    }

    changed
}

/// Moves every centroid to the mean of its assigned points, returning the total squared movement.
///
/// A centroid without any assigned points stays where it is.
fn update(points: &[Point], assignments: &[usize], centroids: &mut [Point]) -> f64 {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut counts = vec![0u64; centroids.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        let sum = &mut sums[cluster];
        sum[0] += point[0];
        sum[1] += point[1];
        sum[2] += point[2];
        counts[cluster] += 1;
    }

    let mut shift = 0.0;
    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count == 0 {
            continue;
        }

        let count = count as f64;
        let mean = [sum[0] / count, sum[1] / count, sum[2] / count];

        shift += distance_squared(centroid, &mean);
        *centroid = mean;
    }

    shift
}

fn mean_variance(points: &[Point]) -> f64 {
    let n = points.len() as f64;
    let mut mean = [0.0f64; 3];

    for point in points {
        mean[0] += point[0];
        mean[1] += point[1];
        mean[2] += point[2];
    }

    mean.iter_mut().for_each(|m| *m /= n);

    let variance = points.iter().map(|point| distance_squared(point, &mean)).sum::<f64>() / n;
    variance / 3.0
}

fn init_random(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    rand::seq::index::sample(rng, points.len(), k)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

fn init_plus_plus(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let local_trials = 2 + (k as f64).ln() as usize;

    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    // squared distance from every point to its closest chosen centroid
    let mut closest = points
        .iter()
        .map(|point| distance_squared(point, &centroids[0]))
        .collect::<Vec<_>>();

    while centroids.len() < k {
        let cumulative = closest
            .iter()
            .scan(0.0, |total, distance| {
                *total += distance;
                Some(*total)
            })
            .collect::<Vec<_>>();
        let potential = cumulative.last().copied().unwrap_or(0.0);

        let mut best: Option<(f64, usize)> = None;
        for _ in 0..local_trials {
            let candidate = if potential > 0.0 {
                let target = rng.gen::<f64>() * potential;
                cumulative.partition_point(|&total| total <= target).min(points.len() - 1)
            } else {
                // every point already sits on a centroid
                rng.gen_range(0..points.len())
            };

            let candidate_potential = closest
                .iter()
                .zip(points)
                .map(|(&distance, point)| distance.min(distance_squared(point, &points[candidate])))
                .sum::<f64>();

            if best.map_or(true, |(best_potential, _)| candidate_potential < best_potential) {
                best = Some((candidate_potential, candidate));
            }
        }

        if let Some((_, candidate)) = best {
            let centroid = points[candidate];

            for (distance, point) in closest.iter_mut().zip(points) {
                *distance = distance.min(distance_squared(point, &centroid));
            }

            centroids.push(centroid);
        }
    }

    centroids
}
