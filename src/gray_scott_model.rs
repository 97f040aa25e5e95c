use crate::double_buffer::DoubleBuffer;
use crate::field::{BoundaryMode, ConcentrationField, Dims};
use crate::seed::{self, SeedPattern};
use itertools::iproduct;
use log::{debug, warn};
use rayon::prelude::*;

/// The update is a forward Euler step with a unit time step.
pub const DELTA_T: f32 = 1.0;

/// Neighbour weights of the discrete Laplacian, grouped by how many offset
/// components are non-zero: one for a face, two for an edge, three for a corner.
/// The centre cell always has weight `-1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub face: f32,
    pub edge: f32,
    pub corner: f32,
}

impl Stencil {
    /// The full 3×3×3 kernel with every neighbour weighted `1/26`.
    pub fn moore_26() -> Self {
        let w = 1.0 / 26.0;
        Self::weighted(w, w, w)
    }

    /// The 3×3 planar kernel: `0.2` on the sides, `0.05` on the diagonals.
    pub fn planar_9() -> Self {
        Self::weighted(0.2, 0.05, 0.0)
    }

    pub fn weighted(face: f32, edge: f32, corner: f32) -> Self {
        Self { face, edge, corner }
    }

    /// The default kernel for a grid of the given dimensionality.
    pub fn for_grid(planar: bool) -> Self {
        if planar {
            Self::planar_9()
        } else {
            Self::moore_26()
        }
    }

    pub fn weight(&self, dx: isize, dy: isize, dz: isize) -> f32 {
        match [dx, dy, dz].iter().filter(|&&c| c != 0).count() {
            0 => -1.0,
            1 => self.face,
            2 => self.edge,
            _ => self.corner,
        }
    }

    /// Non-centre taps of the kernel. Planar grids have no z neighbours.
    pub fn taps(&self, planar: bool) -> Vec<Tap> {
        let dz_range = if planar { 0..=0 } else { -1..=1 };

        iproduct!(dz_range, -1isize..=1, -1isize..=1)
            .filter(|&(dz, dy, dx)| (dx, dy, dz) != (0, 0, 0))
            .map(|(dz, dy, dx)| Tap {
                dx,
                dy,
                dz,
                weight: self.weight(dx, dy, dz),
            })
            .filter(|tap| tap.weight != 0.0)
            .collect()
    }

    pub fn weight_sum(&self, planar: bool) -> f32 {
        self.taps(planar).iter().map(|tap| tap.weight).sum()
    }

    /// Whether uniform fields are fixed points of the Laplacian.
    pub fn is_normalized(&self, planar: bool) -> bool {
        (self.weight_sum(planar) - 1.0).abs() < 1e-4
    }
}

impl Default for Stencil {
    fn default() -> Self {
        Self::moore_26()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub dx: isize,
    pub dy: isize,
    pub dz: isize,
    pub weight: f32,
}

/// Everything a step reads besides the field itself. Values are never mutated
/// by the simulator; controls build a new set with the `with_*` methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub feed: f32,
    pub kill: f32,
    pub diffusion_a: f32,
    pub diffusion_b: f32,
    pub stencil: Stencil,
    pub boundary: BoundaryMode,
}

pub const FEED_RANGE: (f32, f32) = (0.0, 0.1);
pub const KILL_RANGE: (f32, f32) = (0.0, 0.4);
pub const DIFFUSION_A_RANGE: (f32, f32) = (0.0, 1.0);
pub const DIFFUSION_B_RANGE: (f32, f32) = (0.0, 1.0);

impl SimulationParams {
    pub fn new(feed: f32, kill: f32, diffusion_a: f32, diffusion_b: f32) -> Self {
        Self {
            feed,
            kill,
            diffusion_a,
            diffusion_b,
            stencil: Stencil::moore_26(),
            boundary: BoundaryMode::ClampToEdge,
        }
    }

    /// Defaults of the planar demo: strong diffusion with the 3×3 kernel.
    pub fn planar() -> Self {
        Self {
            stencil: Stencil::planar_9(),
            ..Self::new(0.055, 0.062, 1.0, 0.5)
        }
    }

    pub fn with_feed(self, feed: f32) -> Self {
        Self {
            feed: feed.clamp(FEED_RANGE.0, FEED_RANGE.1),
            ..self
        }
    }

    pub fn with_kill(self, kill: f32) -> Self {
        Self {
            kill: kill.clamp(KILL_RANGE.0, KILL_RANGE.1),
            ..self
        }
    }

    pub fn with_diffusion_a(self, diffusion_a: f32) -> Self {
        Self {
            diffusion_a: diffusion_a.clamp(DIFFUSION_A_RANGE.0, DIFFUSION_A_RANGE.1),
            ..self
        }
    }

    pub fn with_diffusion_b(self, diffusion_b: f32) -> Self {
        Self {
            diffusion_b: diffusion_b.clamp(DIFFUSION_B_RANGE.0, DIFFUSION_B_RANGE.1),
            ..self
        }
    }

    pub fn with_stencil(self, stencil: Stencil) -> Self {
        Self { stencil, ..self }
    }

    pub fn with_boundary(self, boundary: BoundaryMode) -> Self {
        Self { boundary, ..self }
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::new(0.0233, 0.07, 0.562, 0.111)
    }
}

/// Advances `current` by one step and returns the result.
pub fn step(current: &ConcentrationField, params: &SimulationParams) -> ConcentrationField {
    let mut next = current.clone();
    step_into(current, &mut next, params);
    next
}

/// Advances `current` by one step, overwriting every cell of `next`.
///
/// Rows are computed in parallel but each cell only reads `current`, so the
/// result is identical to a sequential pass.
pub fn step_into(
    current: &ConcentrationField,
    next: &mut ConcentrationField,
    params: &SimulationParams,
) {
    let dims = current.dims();
    assert_eq!(dims, next.dims(), "ping-pong buffers must share dims");

    let taps = params.stencil.taps(dims.is_planar());
    let (a_in, b_in) = (current.a(), current.b());
    let (a_out, b_out) = next.channels_mut();

    a_out
        .par_chunks_mut(dims.width)
        .zip(b_out.par_chunks_mut(dims.width))
        .enumerate()
        .for_each(|(row, (row_a, row_b))| {
            let y = (row % dims.height) as isize;
            let z = (row / dims.height) as isize;

            for x in 0..dims.width {
                let index = row * dims.width + x;
                let a = a_in[index];
                let b = b_in[index];

                let (mut lap_a, mut lap_b) = (-a, -b);
                for tap in &taps {
                    let n = params
                        .boundary
                        .index(dims, x as isize + tap.dx, y + tap.dy, z + tap.dz);
                    lap_a += tap.weight * a_in[n];
                    lap_b += tap.weight * b_in[n];
                }

                let reaction = a * b * b;
                let delta_a = params.diffusion_a * lap_a - reaction + params.feed * (1.0 - a);
                let delta_b =
                    params.diffusion_b * lap_b + reaction - (params.kill + params.feed) * b;

                row_a[x] = a + DELTA_T * delta_a;
                row_b[x] = b + DELTA_T * delta_b;
            }
        });
}

/// A Gray-Scott system: the ping-pong buffers, the seed they restart from and
/// the parameters of the next step.
pub struct ReactionDiffusionSystem {
    buffers: DoubleBuffer,
    params: SimulationParams,
    seed: SeedPattern,
    generation: u64,
}

impl ReactionDiffusionSystem {
    pub fn new(dims: Dims, seed: SeedPattern, params: SimulationParams) -> Self {
        check_stencil(&params, dims);
        Self {
            buffers: DoubleBuffer::new(seed::reset(dims, &seed)),
            params,
            seed,
            generation: 0,
        }
    }

    pub fn field(&self) -> &ConcentrationField {
        self.buffers.current()
    }

    pub fn dims(&self) -> Dims {
        self.field().dims()
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn seed(&self) -> &SeedPattern {
        &self.seed
    }

    /// Steps committed since construction or the last reload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Takes effect on the next call to [`update`](Self::update).
    pub fn set_params(&mut self, params: SimulationParams) {
        check_stencil(&params, self.dims());
        self.params = params;
    }

    /// Runs one step and commits it.
    pub fn update(&mut self) {
        let (current, next) = self.buffers.split();
        step_into(current, next, &self.params);
        self.buffers.commit();
        self.generation += 1;
    }

    pub fn reload(&mut self) {
        debug!("reloading seed after {} steps", self.generation);
        self.buffers.reload();
        self.generation = 0;
    }

    /// Rebuilds the buffers from a new pattern, which also becomes the reload target.
    pub fn reseed(&mut self, dims: Dims, seed: SeedPattern) {
        check_stencil(&self.params, dims);
        self.buffers.reseed(seed::reset(dims, &seed));
        self.seed = seed;
        self.generation = 0;
    }
}

fn check_stencil(params: &SimulationParams, dims: Dims) {
    let planar = dims.is_planar();
    if !params.stencil.is_normalized(planar) {
        warn!(
            "stencil weights sum to {} on a {} grid; uniform regions will drift",
            params.stencil.weight_sum(planar),
            dims
        );
    }
}
