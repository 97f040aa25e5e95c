use crate::field::{ConcentrationField, Dims};
use noise::{NoiseFn, Perlin};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;

/// Initial distributions of inhibitor within a bath of activator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedPattern {
    /// No inhibitor anywhere; nothing will ever happen.
    Uniform,
    /// One sphere of inhibitor at the centre of the grid (a disc on planar grids).
    Sphere { radius: f32 },
    /// Spheres at random positions, reproducible through `rng_seed`.
    RandomSpheres {
        count: usize,
        radius: f32,
        rng_seed: u64,
    },
    /// Inhibitor wherever Perlin noise exceeds `threshold`.
    Noise {
        frequency: f64,
        threshold: f64,
        rng_seed: u32,
    },
}

impl SeedPattern {
    pub fn name(&self) -> &'static str {
        match self {
            SeedPattern::Uniform => "uniform",
            SeedPattern::Sphere { .. } => "sphere",
            SeedPattern::RandomSpheres { .. } => "spheres",
            SeedPattern::Noise { .. } => "noise",
        }
    }
}

impl Default for SeedPattern {
    fn default() -> Self {
        SeedPattern::Sphere { radius: 5.0 }
    }
}

/// The kind of pattern named in configuration; sizes are filled in separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedKind {
    Uniform,
    Sphere,
    RandomSpheres,
    Noise,
}

impl FromStr for SeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" | "none" => Ok(SeedKind::Uniform),
            "sphere" | "disc" => Ok(SeedKind::Sphere),
            "spheres" | "discs" | "random" => Ok(SeedKind::RandomSpheres),
            "noise" | "perlin" => Ok(SeedKind::Noise),
            other => Err(format!(
                "unknown seed pattern '{other}', expected sphere, spheres, noise or uniform"
            )),
        }
    }
}

/// Builds a fresh field for `pattern`. The same arguments always give the same field.
pub fn reset(dims: Dims, pattern: &SeedPattern) -> ConcentrationField {
    let mut field = ConcentrationField::new(dims);

    match *pattern {
        SeedPattern::Uniform => {}
        SeedPattern::Sphere { radius } => {
            let centre = [dims.width / 2, dims.height / 2, dims.depth / 2].map(|c| c as f32);
            fill_where(&mut field, |p| distance_squared(p, centre) <= radius * radius);
        }
        SeedPattern::RandomSpheres {
            count,
            radius,
            rng_seed,
        } => {
            let mut rng = SmallRng::seed_from_u64(rng_seed);
            let centres: Vec<[f32; 3]> = (0..count)
                .map(|_| {
                    [
                        rng.gen_range(0..dims.width) as f32,
                        rng.gen_range(0..dims.height) as f32,
                        rng.gen_range(0..dims.depth) as f32,
                    ]
                })
                .collect();
            fill_where(&mut field, |p| {
                centres
                    .iter()
                    .any(|&c| distance_squared(p, c) < radius * radius)
            });
        }
        SeedPattern::Noise {
            frequency,
            threshold,
            rng_seed,
        } => {
            let perlin = Perlin::new(rng_seed);
            fill_where(&mut field, |[x, y, z]| {
                let sample = [x as f64, y as f64, z as f64].map(|c| (c + 0.5) * frequency);
                perlin.get(sample) > threshold
            });
        }
    }

    field
}

fn fill_where(field: &mut ConcentrationField, predicate: impl Fn([f32; 3]) -> bool) {
    let dims = field.dims();
    for index in 0..dims.cell_count() {
        let (x, y, z) = dims.coords(index);
        if predicate([x as f32, y as f32, z as f32]) {
            field.set_cell(index, 0.0, 1.0);
        }
    }
}

fn distance_squared(p: [f32; 3], c: [f32; 3]) -> f32 {
    (0..3).map(|i| (p[i] - c[i]) * (p[i] - c[i])).sum()
}
