//! Point-sprite rendering: one square splat per cell that passes a threshold.

use crate::camera::CameraTransform;
use crate::field::{ConcentrationField, Dims};
use crate::gradient::ColorGradient;
use crate::gradient_presets;
use crate::renderer::{BACKGROUND, Rgba, Viewport, VolumeRenderer, clear, pixels_mut};
use glam::Vec3;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Cell centre in the unit cube.
    pub position: Vec3,
    pub a: f32,
    pub b: f32,
}

#[derive(Debug, Clone)]
pub struct PointCloudRenderer {
    /// Cells are drawn only while their activator is below this.
    pub threshold: f32,
    /// Edge length of each splat in pixels.
    pub point_size: f32,
    /// Side of the point lattice. `None` places one point per field cell;
    /// a planar field sampled on a cubic lattice is extruded through depth.
    pub resolution: Option<usize>,
    pub gradient: ColorGradient,
    pub background: Rgba,
}

impl Default for PointCloudRenderer {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            point_size: 5.8,
            resolution: None,
            gradient: gradient_presets::new_inhibitor(),
            background: BACKGROUND,
        }
    }
}

impl PointCloudRenderer {
    /// The point lattice. A resolution of zero falls back to the field's own grid.
    pub fn lattice(&self, field: &ConcentrationField) -> Dims {
        match self.resolution {
            Some(n) if n > 0 => Dims::cube(n),
            _ => field.dims(),
        }
    }

    /// Every lattice point that survives the threshold test.
    pub fn points(&self, field: &ConcentrationField) -> Vec<Point> {
        let lattice = self.lattice(field);
        let extent = lattice.as_vec3();

        (0..lattice.cell_count())
            .into_par_iter()
            .filter_map(|index| {
                let (x, y, z) = lattice.coords(index);
                let position = (Vec3::new(x as f32, y as f32, z as f32) + 0.5) / extent;
                let [a, b] = field.sample_nearest(position);
                (a < self.threshold).then_some(Point { position, a, b })
            })
            .collect()
    }
}

impl VolumeRenderer for PointCloudRenderer {
    fn render(
        &self,
        field: &ConcentrationField,
        camera: &CameraTransform,
        viewport: Viewport,
        frame: &mut [u8],
    ) {
        clear(frame, self.background);
        let pixels = pixels_mut(frame);
        let mut depth = vec![f32::INFINITY; viewport.pixel_count()];
        let half = self.point_size * 0.5;

        for point in self.points(field) {
            let clip = camera.project(camera.volume_to_world(point.position));
            if clip.w <= 0.0 {
                continue;
            }
            let ndc = clip.truncate() / clip.w;
            if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
                continue;
            }

            let (px, py) = viewport.ndc_to_pixel(ndc.x, ndc.y);
            let x0 = (px - half).round().max(0.0) as u32;
            let y0 = (py - half).round().max(0.0) as u32;
            let x1 = ((px + half).round() as u32).min(viewport.width);
            let y1 = ((py + half).round() as u32).min(viewport.height);

            let [r, g, b] = self.gradient.color_at_t(point.b);
            for y in y0..y1 {
                for x in x0..x1 {
                    let i = (y * viewport.width + x) as usize;
                    if ndc.z < depth[i] {
                        depth[i] = ndc.z;
                        pixels[i] = [r, g, b, 255];
                    }
                }
            }
        }
    }
}
