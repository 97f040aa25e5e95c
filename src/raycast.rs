//! Volume rendering of the inhibitor concentration by ray marching.

use crate::camera::CameraTransform;
use crate::field::ConcentrationField;
use crate::gradient::ColorGradient;
use crate::gradient_presets;
use crate::renderer::{BACKGROUND, Rgba, Viewport, VolumeRenderer, pixels_mut};
use glam::Vec3;
use rayon::prelude::*;
use std::str::FromStr;

/// How a sample that passes the threshold is coloured.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeColoring {
    /// The sample's position inside the cube, used directly as RGB.
    Position,
    /// A colour ramp over the inhibitor concentration.
    Gradient(ColorGradient),
}

impl VolumeColoring {
    fn color(&self, p: Vec3, b: f32) -> Vec3 {
        match self {
            VolumeColoring::Position => p.clamp(Vec3::ZERO, Vec3::ONE),
            VolumeColoring::Gradient(gradient) => Vec3::from_array(gradient.linear_at_t(b)),
        }
    }
}

/// `position`, or the name of a gradient preset.
impl FromStr for VolumeColoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("position") {
            return Ok(VolumeColoring::Position);
        }
        gradient_presets::by_name(s)
            .map(VolumeColoring::Gradient)
            .ok_or_else(|| {
                format!("unknown coloring '{s}', expected position, inferno, inhibitor or pink")
            })
    }
}

#[derive(Debug, Clone)]
pub struct RayCaster {
    /// Samples with `B` at or below this are transparent.
    pub sample_threshold: f32,
    /// Opacity of a sample is `B * opacity_scale`, clamped to 1.
    pub opacity_scale: f32,
    /// Marching stops once accumulated opacity reaches this.
    pub opacity_cutoff: f32,
    pub coloring: VolumeColoring,
    pub background: Rgba,
    /// Offset each ray's start by a per-pixel hash to hide banding.
    pub jitter: bool,
}

impl Default for RayCaster {
    fn default() -> Self {
        Self {
            sample_threshold: 0.3,
            opacity_scale: 1.0,
            opacity_cutoff: 0.95,
            coloring: VolumeColoring::Position,
            background: BACKGROUND,
            jitter: true,
        }
    }
}

/// Ray parameters `(t0, t1)` where the ray enters and leaves the unit cube.
/// The ray misses when `t0 > t1`.
pub fn intersect_unit_box(origin: Vec3, dir: Vec3) -> (f32, f32) {
    let inv_dir = dir.recip();
    let t_a = (Vec3::ZERO - origin) * inv_dir;
    let t_b = (Vec3::ONE - origin) * inv_dir;
    let t_min = t_a.min(t_b);
    let t_max = t_a.max(t_b);
    (t_min.max_element(), t_max.min_element())
}

/// Marching step that advances at most one voxel along any axis.
pub fn step_size(dims: Vec3, dir: Vec3) -> f32 {
    (dims * dir.abs()).recip().min_element()
}

pub fn linear_to_srgb(x: f32) -> f32 {
    if x <= 0.0031308 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// Wang's integer hash, scaled to `[0, 1]`.
pub fn wang_hash(seed: u32) -> f32 {
    let mut seed = (seed ^ 61) ^ (seed >> 16);
    seed = seed.wrapping_mul(9);
    seed ^= seed >> 4;
    seed = seed.wrapping_mul(0x27d4_eb2d);
    seed ^= seed >> 15;
    (seed % 2_147_483_647) as f32 / 2_147_483_647.0
}

impl RayCaster {
    /// Marches one ray through the volume, front to back.
    ///
    /// `origin` and `dir` are in volume space where the field fills the unit
    /// cube; `dir` must be normalized. Returns the premultiplied colour and the
    /// accumulated opacity, or `None` when the ray misses the cube.
    pub fn march(
        &self,
        field: &ConcentrationField,
        origin: Vec3,
        dir: Vec3,
        jitter: f32,
    ) -> Option<(Vec3, f32)> {
        let (t0, t1) = intersect_unit_box(origin, dir);
        let t0 = t0.max(0.0);
        // also rejects NaN from degenerate rays
        if !(t0 <= t1) {
            return None;
        }

        let dt = step_size(field.dims().as_vec3(), dir);
        let mut color = Vec3::ZERO;
        let mut opacity = 0.0;
        let mut t = t0 + jitter * dt;

        while t < t1 {
            let p = origin + dir * t;
            let [_, b] = field.sample_linear(p);

            if b > self.sample_threshold {
                let alpha = (b * self.opacity_scale).clamp(0.0, 1.0);
                let weight = (1.0 - opacity) * alpha;
                color += weight * self.coloring.color(p, b);
                opacity += weight;

                if opacity >= self.opacity_cutoff {
                    break;
                }
            }

            t += dt;
        }

        Some((color, opacity))
    }

    fn shade(
        &self,
        field: &ConcentrationField,
        camera: &CameraTransform,
        origin: Vec3,
        viewport: Viewport,
        x: u32,
        y: u32,
    ) -> Rgba {
        let (ndc_x, ndc_y) = viewport.pixel_to_ndc(x, y);
        let dir = camera.ray_direction(ndc_x, ndc_y);
        let jitter = if self.jitter {
            wang_hash(x + viewport.width * y)
        } else {
            0.0
        };

        let Some((color, opacity)) = self.march(field, origin, dir, jitter) else {
            return self.background;
        };

        let transparency = (1.0 - opacity).clamp(0.0, 1.0);
        let channel = |c: f32, bg: u8| {
            let v = linear_to_srgb(c.max(0.0)) + transparency * f32::from(bg) / 255.0;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        };

        [
            channel(color.x, self.background[0]),
            channel(color.y, self.background[1]),
            channel(color.z, self.background[2]),
            255,
        ]
    }
}

impl VolumeRenderer for RayCaster {
    fn render(
        &self,
        field: &ConcentrationField,
        camera: &CameraTransform,
        viewport: Viewport,
        frame: &mut [u8],
    ) {
        let origin = camera.eye_in_volume();

        pixels_mut(frame)
            .par_chunks_mut(viewport.width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = self.shade(field, camera, origin, viewport, x as u32, y as u32);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use crate::field::{ConcentrationField, Dims};
    use crate::seed::{self, SeedPattern};

    fn misses(origin: Vec3, dir: Vec3) -> bool {
        let (t0, t1) = intersect_unit_box(origin, dir.normalize());
        t0 > t1
    }

    #[test]
    fn test_slab_test_misses() {
        // axis aligned, passing beside the cube
        assert!(misses(Vec3::new(0.5, 2.0, 0.5), Vec3::X));
        assert!(misses(Vec3::new(-1.0, 0.5, 1.5), Vec3::X));
        assert!(misses(Vec3::new(0.5, 0.5, 3.0), Vec3::Y));
        // diagonal
        assert!(misses(Vec3::new(-1.0, -1.0, 2.0), Vec3::ONE));
        assert!(misses(Vec3::new(2.0, -0.5, 0.5), Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_slab_test_hits() {
        let (t0, t1) = intersect_unit_box(Vec3::new(0.5, 0.5, 2.0), Vec3::NEG_Z);
        assert!((t0 - 1.0).abs() < 1e-6);
        assert!((t1 - 2.0).abs() < 1e-6);

        let (t0, t1) = intersect_unit_box(Vec3::splat(-1.0), Vec3::ONE.normalize());
        assert!(t0 < t1);
        assert!((t1 - t0 - 3f32.sqrt()).abs() < 1e-5);

        // from inside, the entry point is behind the origin
        let (t0, t1) = intersect_unit_box(Vec3::splat(0.5), Vec3::X);
        assert!(t0 < 0.0 && t1 > 0.0);
    }

    #[test]
    fn test_srgb_is_continuous_at_breakpoint() {
        let knee = 0.0031308f32;
        let below = linear_to_srgb(knee - 1e-7);
        let above = linear_to_srgb(knee + 1e-7);
        assert!((below - above).abs() < 1e-4);
        assert_eq!(0.0, linear_to_srgb(0.0));
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-5);
        assert!(linear_to_srgb(0.5) > 0.5);
    }

    #[test]
    fn test_step_size() {
        assert!((step_size(Vec3::splat(64.0), Vec3::X) - 1.0 / 64.0).abs() < 1e-7);
        let diagonal = Vec3::ONE.normalize();
        let dt = step_size(Vec3::new(64.0, 32.0, 16.0), diagonal);
        assert!((dt - 1.0 / (64.0 * diagonal.x)).abs() < 1e-6);
    }

    #[test]
    fn test_wang_hash() {
        for seed in [0, 1, 640, 12_345, u32::MAX] {
            let h = wang_hash(seed);
            assert!((0.0..=1.0).contains(&h));
            assert_eq!(h, wang_hash(seed));
        }
        assert_ne!(wang_hash(1), wang_hash(2));
    }

    #[test]
    fn test_march_through_empty_volume() {
        let field = ConcentrationField::new(Dims::cube(8));
        let caster = RayCaster::default();

        let hit = caster.march(&field, Vec3::new(0.5, 0.5, 2.0), Vec3::NEG_Z, 0.0);
        assert_eq!(Some((Vec3::ZERO, 0.0)), hit);
        assert_eq!(None, caster.march(&field, Vec3::new(0.5, 3.0, 2.0), Vec3::NEG_Z, 0.0));
    }

    #[test]
    fn test_march_stops_at_cutoff() {
        let field = ConcentrationField::filled(Dims::cube(8), 0.0, 0.5);
        let caster = RayCaster::default();

        let (_, opacity) = caster
            .march(&field, Vec3::new(0.5, 0.5, 2.0), Vec3::NEG_Z, 0.0)
            .expect("ray aimed at the cube");
        assert!(opacity >= caster.opacity_cutoff);
        assert!(opacity <= 1.0);
    }

    #[test]
    fn test_render_sphere_seed() {
        let field = seed::reset(Dims::cube(32), &SeedPattern::Sphere { radius: 4.0 });
        let viewport = Viewport::new(33, 33);
        let camera = OrbitCamera::new(viewport.aspect()).transform();
        let mut frame = vec![0u8; viewport.pixel_count() * 4];

        RayCaster::default().render(&field, &camera, viewport, &mut frame);

        let pixels = pixels_mut(&mut frame);
        let centre = pixels[16 * 33 + 16];
        assert_ne!(BACKGROUND, centre);
        assert_eq!(BACKGROUND, pixels[0]);
        assert!(pixels.iter().all(|px| px[3] == 255));
    }

    #[test]
    fn test_parse_coloring() {
        assert_eq!(Ok(VolumeColoring::Position), " Position".parse());
        assert_eq!(
            Ok(VolumeColoring::Gradient(crate::gradient_presets::new_inferno())),
            "inferno".parse::<VolumeColoring>()
        );
        assert!("plaid".parse::<VolumeColoring>().is_err());
    }

    #[test]
    fn test_render_uniform_field_is_background() {
        let field = ConcentrationField::new(Dims::cube(8));
        let viewport = Viewport::new(16, 12);
        let camera = OrbitCamera::new(viewport.aspect()).transform();
        let mut frame = vec![0u8; viewport.pixel_count() * 4];

        let caster = RayCaster {
            coloring: VolumeColoring::Gradient(crate::gradient_presets::new_inferno()),
            ..RayCaster::default()
        };
        caster.render(&field, &camera, viewport, &mut frame);

        assert!(pixels_mut(&mut frame).iter().all(|&px| px == BACKGROUND));
    }
}
