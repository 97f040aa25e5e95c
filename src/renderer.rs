use crate::camera::CameraTransform;
use crate::field::ConcentrationField;
use crate::point_cloud::PointCloudRenderer;
use crate::raycast::RayCaster;
use std::str::FromStr;

pub type Rgba = [u8; 4];

/// Clear colour of the output, a very dark blue.
pub const BACKGROUND: Rgba = [0, 0, 38, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Normalized device coordinates of the centre of pixel `(x, y)`, y up.
    pub fn pixel_to_ndc(&self, x: u32, y: u32) -> (f32, f32) {
        let ndc_x = (x as f32 + 0.5) / self.width as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (y as f32 + 0.5) / self.height as f32 * 2.0;
        (ndc_x, ndc_y)
    }

    /// Pixel coordinates of normalized device coordinates, y down.
    pub fn ndc_to_pixel(&self, ndc_x: f32, ndc_y: f32) -> (f32, f32) {
        let x = (ndc_x * 0.5 + 0.5) * self.width as f32;
        let y = (0.5 - ndc_y * 0.5) * self.height as f32;
        (x, y)
    }
}

/// Draws a concentration field into an RGBA8 frame of `viewport` size.
///
/// Implementations only read the field.
pub trait VolumeRenderer {
    fn render(
        &self,
        field: &ConcentrationField,
        camera: &CameraTransform,
        viewport: Viewport,
        frame: &mut [u8],
    );
}

/// Reinterprets a raw RGBA8 frame as pixels.
pub fn pixels_mut(frame: &mut [u8]) -> &mut [Rgba] {
    bytemuck::cast_slice_mut(frame)
}

pub fn clear(frame: &mut [u8], color: Rgba) {
    pixels_mut(frame).fill(color);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    RayCast,
    PointCloud,
}

impl RenderMode {
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::RayCast => "ray cast",
            RenderMode::PointCloud => "point cloud",
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raycast" | "ray-cast" | "volume" => Ok(RenderMode::RayCast),
            "points" | "point-cloud" | "pointcloud" => Ok(RenderMode::PointCloud),
            other => Err(format!("unknown render mode '{other}', expected raycast or points")),
        }
    }
}

/// Both render strategies, with one of them active.
pub struct Renderer {
    mode: RenderMode,
    ray_caster: RayCaster,
    point_cloud: PointCloudRenderer,
}

impl Renderer {
    pub fn new(mode: RenderMode, ray_caster: RayCaster, point_cloud: PointCloudRenderer) -> Self {
        Self {
            mode,
            ray_caster,
            point_cloud,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn cycle_mode(&mut self) -> RenderMode {
        self.mode = match self.mode {
            RenderMode::RayCast => RenderMode::PointCloud,
            RenderMode::PointCloud => RenderMode::RayCast,
        };
        self.mode
    }

    fn active(&self) -> &dyn VolumeRenderer {
        match self.mode {
            RenderMode::RayCast => &self.ray_caster,
            RenderMode::PointCloud => &self.point_cloud,
        }
    }
}

impl VolumeRenderer for Renderer {
    fn render(
        &self,
        field: &ConcentrationField,
        camera: &CameraTransform,
        viewport: Viewport,
        frame: &mut [u8],
    ) {
        self.active().render(field, camera, viewport, frame);
    }
}
