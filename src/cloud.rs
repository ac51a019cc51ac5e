//! Synthetic point data: positions scattered through the `[-1, 1]` cube, each
//! with a stress value in `[0, 1)`.

use lib_math::Vec3;
use lib_renderer::Point;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

pub const POINT_COUNT: usize = 10_000;

// Coordinates and stress are drawn from this many evenly spaced steps.
const STEPS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudConfig {
    pub point_count: usize,
    /// `None` seeds from OS entropy, giving a new cloud on every run.
    pub seed: Option<u64>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            point_count: POINT_COUNT,
            seed: None,
        }
    }
}

pub fn generate(config: &CloudConfig) -> Vec<Point> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let points = generate_with(&mut rng, config.point_count);

    info!(
        points = points.len(),
        seed = ?config.seed,
        "generated point cloud"
    );

    points
}

fn generate_with(rng: &mut impl Rng, count: usize) -> Vec<Point> {
    (0..count)
        .map(|_| {
            let x = coordinate(rng);
            let y = coordinate(rng);
            let z = coordinate(rng);

            Point {
                position: Vec3::new(x, y, z),
                stress: rng.gen_range(0..STEPS) as f32 / STEPS as f32,
            }
        })
        .collect()
}

fn coordinate(rng: &mut impl Rng) -> f32 {
    rng.gen_range(0..STEPS) as f32 / (STEPS / 2) as f32 - 1.0
}
