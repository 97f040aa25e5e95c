pub mod camera;
pub mod config;
pub mod control;
pub mod double_buffer;
pub mod error;
pub mod field;
pub mod gradient;
pub mod gradient_presets;
pub mod gray_scott_model;
pub mod input;
pub mod model_presets;
pub mod point_cloud;
pub mod raycast;
pub mod renderer;
pub mod seed;
mod utils;

// Re-export commonly used items
pub use camera::{CameraTransform, OrbitCamera};
pub use config::Config;
pub use control::{App, ControlState};
pub use error::{AppError, ConfigError};
pub use field::{BoundaryMode, ConcentrationField, Dims, Species};
pub use gray_scott_model::{ReactionDiffusionSystem, SimulationParams, Stencil};
pub use input::InputEvent;
pub use renderer::{RenderMode, Renderer, Viewport, VolumeRenderer};
pub use seed::SeedPattern;
