//! Error types for configuration and the windowed viewer.

use std::fmt;

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The variable was set but could not be parsed.
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    /// A grid dimension of zero.
    EmptyDimensions(String),
    /// A preset name that is not in the preset table.
    UnknownPreset(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "Invalid value '{}' for {}: {}", value, key, reason)
            }
            ConfigError::EmptyDimensions(value) => {
                write!(f, "Grid dimensions must be non-zero, got '{}'", value)
            }
            ConfigError::UnknownPreset(name) => write!(f, "Unknown model preset '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Anything that can stop the viewer.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    /// The windowing event loop could not be created or failed while running.
    EventLoop(winit::error::EventLoopError),
    /// The window could not be created.
    Window(winit::error::OsError),
    /// Surface creation or presentation failed.
    Pixels(pixels::Error),
    /// The frame buffer could not be resized.
    Texture(pixels::TextureError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Pixels(e) => write!(f, "Failed to render frame: {}", e),
            AppError::Texture(e) => write!(f, "Failed to resize frame buffer: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Pixels(e) => Some(e),
            AppError::Texture(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<pixels::Error> for AppError {
    fn from(e: pixels::Error) -> Self {
        AppError::Pixels(e)
    }
}

impl From<pixels::TextureError> for AppError {
    fn from(e: pixels::TextureError) -> Self {
        AppError::Texture(e)
    }
}
