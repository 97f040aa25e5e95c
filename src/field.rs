use crate::utils::{get_clamped_index, get_wrapping_index};
use glam::Vec3;
use std::fmt;
use std::str::FromStr;

/// Grid extent in cells. A depth of 1 makes the grid planar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Dims {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        assert!(
            width > 0 && height > 0 && depth > 0,
            "grid dimensions must be non-zero, got {width}x{height}x{depth}"
        );
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn cube(n: usize) -> Self {
        Self::new(n, n, n)
    }

    pub fn plane(width: usize, height: usize) -> Self {
        Self::new(width, height, 1)
    }

    /// Number of cells, never zero.
    pub fn cell_count(&self) -> usize {
        self.width * self.height * self.depth
    }

    pub fn is_planar(&self) -> bool {
        self.depth == 1
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let x = index % self.width;
        let y = (index / self.width) % self.height;
        let z = index / (self.width * self.height);
        (x, y, z)
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.width as f32, self.height as f32, self.depth as f32)
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    /// Activator, fed into the system.
    A,
    /// Inhibitor, consumes A and decays at `feed + kill`.
    B,
}

/// How neighbour lookups outside the grid are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// Out-of-range coordinates read the nearest edge cell.
    #[default]
    ClampToEdge,
    /// The grid is a torus.
    Wrap,
}

impl BoundaryMode {
    pub fn index(self, dims: Dims, x: isize, y: isize, z: isize) -> usize {
        match self {
            BoundaryMode::ClampToEdge => {
                get_clamped_index(x, y, z, dims.width, dims.height, dims.depth)
            }
            BoundaryMode::Wrap => get_wrapping_index(x, y, z, dims.width, dims.height, dims.depth),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoundaryMode::ClampToEdge => "clamp",
            BoundaryMode::Wrap => "wrap",
        }
    }
}

impl FromStr for BoundaryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" | "clamp-to-edge" | "clamp_to_edge" => Ok(BoundaryMode::ClampToEdge),
            "wrap" | "repeat" | "torus" => Ok(BoundaryMode::Wrap),
            other => Err(format!("unknown boundary mode '{other}', expected clamp or wrap")),
        }
    }
}

/// Concentrations of both species over a grid, one `f32` per cell per species.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationField {
    dims: Dims,
    a: Vec<f32>,
    b: Vec<f32>,
}

impl ConcentrationField {
    /// A bath of activator with no inhibitor.
    pub fn new(dims: Dims) -> Self {
        Self::filled(dims, 1.0, 0.0)
    }

    pub fn filled(dims: Dims, a: f32, b: f32) -> Self {
        Self {
            dims,
            a: vec![a; dims.cell_count()],
            b: vec![b; dims.cell_count()],
        }
    }

    /// Builds a field from 8-bit `(A, B)` pairs where 255 is a concentration of 1.
    pub fn from_rg8(dims: Dims, texels: &[[u8; 2]]) -> Self {
        assert_eq!(
            dims.cell_count(),
            texels.len(),
            "texel count does not match a {dims} grid"
        );
        let (a, b) = texels
            .iter()
            .map(|&[a, b]| (f32::from(a) / 255.0, f32::from(b) / 255.0))
            .unzip();

        Self { dims, a, b }
    }

    /// Quantizes the field back to 8-bit `(A, B)` pairs, saturating out-of-range values.
    pub fn to_rg8(&self) -> Vec<[u8; 2]> {
        self.a
            .iter()
            .zip(&self.b)
            .map(|(&a, &b)| [quantize(a), quantize(b)])
            .collect()
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn a(&self) -> &[f32] {
        &self.a
    }

    pub fn b(&self) -> &[f32] {
        &self.b
    }

    pub(crate) fn channels_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.a, &mut self.b)
    }

    pub fn get(&self, species: Species, x: usize, y: usize, z: usize) -> f32 {
        self.get_by_index(species, self.dims.index(x, y, z))
    }

    pub fn get_by_index(&self, species: Species, index: usize) -> f32 {
        match species {
            Species::A => self.a[index],
            Species::B => self.b[index],
        }
    }

    pub fn set(&mut self, species: Species, x: usize, y: usize, z: usize, value: f32) {
        let index = self.dims.index(x, y, z);
        match species {
            Species::A => self.a[index] = value,
            Species::B => self.b[index] = value,
        }
    }

    pub fn set_cell(&mut self, index: usize, a: f32, b: f32) {
        self.a[index] = a;
        self.b[index] = b;
    }

    /// Overwrites this field with `other`. Both must share the same dims.
    pub fn copy_from(&mut self, other: &ConcentrationField) {
        assert_eq!(self.dims, other.dims, "cannot copy between fields of different dims");
        self.a.copy_from_slice(&other.a);
        self.b.copy_from_slice(&other.b);
    }

    /// False once the simulation has diverged somewhere.
    pub fn is_finite(&self) -> bool {
        self.a.iter().chain(&self.b).all(|v| v.is_finite())
    }

    /// Nearest-cell lookup at normalized coordinates `p` in `[0, 1]³`, clamped to the edge.
    pub fn sample_nearest(&self, p: Vec3) -> [f32; 2] {
        let cell = |t: f32, extent: usize| {
            ((t * extent as f32).floor().max(0.0) as usize).min(extent - 1)
        };
        let index = self.dims.index(
            cell(p.x, self.dims.width),
            cell(p.y, self.dims.height),
            cell(p.z, self.dims.depth),
        );
        [self.a[index], self.b[index]]
    }

    /// Trilinear lookup at normalized coordinates `p` with clamp-to-edge addressing,
    /// matching linear filtering of a texture whose texel centres sit at `(i + 0.5) / n`.
    pub fn sample_linear(&self, p: Vec3) -> [f32; 2] {
        let (x0, x1, fx) = texel_span(p.x, self.dims.width);
        let (y0, y1, fy) = texel_span(p.y, self.dims.height);
        let (z0, z1, fz) = texel_span(p.z, self.dims.depth);

        let fetch = |x: usize, y: usize, z: usize| {
            let i = self.dims.index(x, y, z);
            [self.a[i], self.b[i]]
        };
        let lerp = |l: [f32; 2], r: [f32; 2], t: f32| {
            [l[0] + (r[0] - l[0]) * t, l[1] + (r[1] - l[1]) * t]
        };

        let c00 = lerp(fetch(x0, y0, z0), fetch(x1, y0, z0), fx);
        let c10 = lerp(fetch(x0, y1, z0), fetch(x1, y1, z0), fx);
        let c01 = lerp(fetch(x0, y0, z1), fetch(x1, y0, z1), fx);
        let c11 = lerp(fetch(x0, y1, z1), fetch(x1, y1, z1), fx);

        lerp(lerp(c00, c10, fy), lerp(c01, c11, fy), fz)
    }
}

fn quantize(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn texel_span(t: f32, extent: usize) -> (usize, usize, f32) {
    let c = (t * extent as f32 - 0.5).clamp(0.0, (extent - 1) as f32);
    let i0 = c.floor() as usize;
    let i1 = (i0 + 1).min(extent - 1);
    (i0, i1, c - i0 as f32)
}
