//! Runtime configuration read from `GS_*` environment variables.

use crate::error::ConfigError;
use crate::field::{BoundaryMode, Dims};
use crate::gray_scott_model::{
    DIFFUSION_A_RANGE, DIFFUSION_B_RANGE, FEED_RANGE, KILL_RANGE, SimulationParams, Stencil,
};
use crate::model_presets;
use crate::raycast::VolumeColoring;
use crate::renderer::RenderMode;
use crate::seed::{SeedKind, SeedPattern};
use std::fmt;
use std::str::FromStr;

const DEFAULT_GRID: usize = 64;
const NOISE_FREQUENCY: f64 = 0.1;
const NOISE_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub dims: Dims,
    pub seed: SeedPattern,
    pub params: SimulationParams,
    pub render_mode: RenderMode,
    /// Colour of ray-cast samples.
    pub coloring: VolumeColoring,
    pub window_width: u32,
    pub window_height: u32,
    /// Frame buffer size relative to the window.
    pub render_scale: f32,
    pub steps_per_frame: u32,
    pub point_threshold: f32,
    pub point_size: f32,
    pub point_resolution: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dims: Dims::cube(DEFAULT_GRID),
            seed: SeedPattern::default(),
            params: SimulationParams::default(),
            render_mode: RenderMode::RayCast,
            coloring: VolumeColoring::Position,
            window_width: 1280,
            window_height: 960,
            render_scale: 0.4,
            steps_per_frame: 1,
            point_threshold: 0.8,
            point_size: 5.8,
            point_resolution: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let dims = match lookup("GS_DIMENSIONS") {
            Some(value) => parse_dims(&value)?,
            None => defaults.dims,
        };

        let radius = parse(&lookup, "GS_SEED_RADIUS")?.unwrap_or(5.0f32);
        if !(radius > 0.0) {
            return Err(ConfigError::invalid(
                "GS_SEED_RADIUS",
                &radius.to_string(),
                "must be positive",
            ));
        }
        let rng_seed: u64 = parse(&lookup, "GS_RNG_SEED")?.unwrap_or(0);
        let seed = match parse(&lookup, "GS_SEED")?.unwrap_or(SeedKind::Sphere) {
            SeedKind::Uniform => SeedPattern::Uniform,
            SeedKind::Sphere => SeedPattern::Sphere { radius },
            SeedKind::RandomSpheres => SeedPattern::RandomSpheres {
                count: parse(&lookup, "GS_SEED_COUNT")?.unwrap_or(10),
                radius,
                rng_seed,
            },
            SeedKind::Noise => SeedPattern::Noise {
                frequency: NOISE_FREQUENCY,
                threshold: NOISE_THRESHOLD,
                rng_seed: rng_seed as u32,
            },
        };

        let mut params = if dims.is_planar() {
            SimulationParams::planar()
        } else {
            SimulationParams::default()
        };
        if let Some(name) = lookup("GS_PRESET") {
            let (feed, kill) =
                model_presets::by_name(&name).ok_or(ConfigError::UnknownPreset(name))?;
            params.feed = feed;
            params.kill = kill;
        }
        if let Some(feed) = parse_in_range(&lookup, "GS_FEED", FEED_RANGE)? {
            params.feed = feed;
        }
        if let Some(kill) = parse_in_range(&lookup, "GS_KILL", KILL_RANGE)? {
            params.kill = kill;
        }
        if let Some(d) = parse_in_range(&lookup, "GS_DIFFUSION_A", DIFFUSION_A_RANGE)? {
            params.diffusion_a = d;
        }
        if let Some(d) = parse_in_range(&lookup, "GS_DIFFUSION_B", DIFFUSION_B_RANGE)? {
            params.diffusion_b = d;
        }
        if let Some(value) = lookup("GS_STENCIL") {
            params.stencil = parse_stencil(&value)?;
        }
        if let Some(boundary) = parse::<BoundaryMode>(&lookup, "GS_BOUNDARY")? {
            params.boundary = boundary;
        }

        let render_scale = parse(&lookup, "GS_RENDER_SCALE")?.unwrap_or(defaults.render_scale);
        if !(render_scale > 0.0 && render_scale <= 1.0) {
            return Err(ConfigError::invalid(
                "GS_RENDER_SCALE",
                &render_scale.to_string(),
                "must be in (0, 1]",
            ));
        }

        let steps_per_frame =
            parse(&lookup, "GS_STEPS_PER_FRAME")?.unwrap_or(defaults.steps_per_frame);
        if steps_per_frame == 0 {
            return Err(ConfigError::invalid(
                "GS_STEPS_PER_FRAME",
                "0",
                "at least one step per frame",
            ));
        }

        let point_resolution = parse(&lookup, "GS_POINT_RESOLUTION")?;
        if point_resolution == Some(0) {
            return Err(ConfigError::invalid(
                "GS_POINT_RESOLUTION",
                "0",
                "must be positive",
            ));
        }

        Ok(Self {
            dims,
            seed,
            params,
            render_mode: parse(&lookup, "GS_RENDER_MODE")?.unwrap_or(defaults.render_mode),
            coloring: parse(&lookup, "GS_COLORING")?.unwrap_or(defaults.coloring),
            window_width: parse(&lookup, "GS_WINDOW_WIDTH")?.unwrap_or(defaults.window_width),
            window_height: parse(&lookup, "GS_WINDOW_HEIGHT")?.unwrap_or(defaults.window_height),
            render_scale,
            steps_per_frame,
            point_threshold: parse(&lookup, "GS_POINT_THRESHOLD")?
                .unwrap_or(defaults.point_threshold),
            point_size: parse(&lookup, "GS_POINT_SIZE")?.unwrap_or(defaults.point_size),
            point_resolution,
        })
    }

    /// Size of the frame buffer the renderers draw into.
    pub fn buffer_size(&self) -> (u32, u32) {
        scaled_size(self.window_width, self.window_height, self.render_scale)
    }
}

pub fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * scale).round() as u32).max(1);
    (scale(width), scale(height))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        write!(
            f,
            "grid {} seeded with {}, feed {} kill {} D_a {} D_b {}, {} boundary, \
             {} view, {} step(s) per frame",
            self.dims,
            self.seed.name(),
            p.feed,
            p.kill,
            p.diffusion_a,
            p.diffusion_b,
            p.boundary.name(),
            self.render_mode.name(),
            self.steps_per_frame,
        )
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(key, &value, e))
        })
        .transpose()
}

fn parse_in_range(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    (min, max): (f32, f32),
) -> Result<Option<f32>, ConfigError> {
    match parse::<f32>(lookup, key)? {
        Some(v) if !(min..=max).contains(&v) => Err(ConfigError::invalid(
            key,
            &v.to_string(),
            format!("must be between {} and {}", min, max),
        )),
        other => Ok(other),
    }
}

/// `N` for an N³ cube, `WxH` for a plane or `WxHxD`.
pub fn parse_dims(value: &str) -> Result<Dims, ConfigError> {
    let sides = value
        .split(['x', 'X'])
        .map(|s| s.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigError::invalid("GS_DIMENSIONS", value, e))?;

    if sides.contains(&0) {
        return Err(ConfigError::EmptyDimensions(value.to_owned()));
    }

    match sides[..] {
        [n] => Ok(Dims::cube(n)),
        [w, h] => Ok(Dims::plane(w, h)),
        [w, h, d] => Ok(Dims::new(w, h, d)),
        _ => Err(ConfigError::invalid(
            "GS_DIMENSIONS",
            value,
            "expected N, WxH or WxHxD",
        )),
    }
}

/// `moore26`, `planar9` or explicit `face,edge,corner` weights.
pub fn parse_stencil(value: &str) -> Result<Stencil, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "moore26" | "moore-26" => return Ok(Stencil::moore_26()),
        "planar9" | "planar-9" => return Ok(Stencil::planar_9()),
        _ => {}
    }

    let weights = value
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigError::invalid("GS_STENCIL", value, e))?;

    match weights[..] {
        [face, edge, corner] => Ok(Stencil::weighted(face, edge, corner)),
        _ => Err(ConfigError::invalid(
            "GS_STENCIL",
            value,
            "expected moore26, planar9 or three comma separated weights",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(Config::default(), config);
        assert_eq!(Dims::cube(64), config.dims);
        assert_eq!(SeedPattern::Sphere { radius: 5.0 }, config.seed);
        assert_eq!(0.0233, config.params.feed);
        assert_eq!(BoundaryMode::ClampToEdge, config.params.boundary);
        assert_eq!((512, 384), config.buffer_size());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GS_DIMENSIONS", "32x16x8"),
            ("GS_SEED", "spheres"),
            ("GS_SEED_COUNT", "3"),
            ("GS_SEED_RADIUS", "2.5"),
            ("GS_RNG_SEED", "7"),
            ("GS_BOUNDARY", "wrap"),
            ("GS_RENDER_MODE", "points"),
            ("GS_STENCIL", "0.1, 0.05, 0.02"),
            ("GS_POINT_RESOLUTION", "24"),
            ("GS_COLORING", "inferno"),
        ])
        .unwrap();

        assert_eq!(Dims::new(32, 16, 8), config.dims);
        assert_eq!(
            SeedPattern::RandomSpheres {
                count: 3,
                radius: 2.5,
                rng_seed: 7
            },
            config.seed
        );
        assert_eq!(BoundaryMode::Wrap, config.params.boundary);
        assert_eq!(RenderMode::PointCloud, config.render_mode);
        assert_eq!(Stencil::weighted(0.1, 0.05, 0.02), config.params.stencil);
        assert_eq!(Some(24), config.point_resolution);
        assert_ne!(VolumeColoring::Position, config.coloring);
    }

    #[test]
    fn test_explicit_feed_beats_preset() {
        let config = config_from(&[("GS_PRESET", "mitosis"), ("GS_FEED", "0.04")]).unwrap();
        assert_eq!(0.04, config.params.feed);
        assert_eq!(model_presets::MITOSIS.1, config.params.kill);
    }

    #[test]
    fn test_planar_defaults() {
        let config = config_from(&[("GS_DIMENSIONS", "128x96")]).unwrap();
        assert!(config.dims.is_planar());
        assert_eq!(1.0, config.params.diffusion_a);
        assert_eq!(0.5, config.params.diffusion_b);
        assert_eq!(Stencil::planar_9(), config.params.stencil);
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(matches!(
            config_from(&[("GS_FEED", "lots")]),
            Err(ConfigError::Invalid { key: "GS_FEED", .. })
        ));
        assert!(matches!(
            config_from(&[("GS_KILL", "0.9")]),
            Err(ConfigError::Invalid { key: "GS_KILL", .. })
        ));
        assert!(matches!(
            config_from(&[("GS_DIMENSIONS", "64x0x64")]),
            Err(ConfigError::EmptyDimensions(_))
        ));
        assert!(matches!(
            config_from(&[("GS_DIMENSIONS", "1x2x3x4")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config_from(&[("GS_PRESET", "sponge")]),
            Err(ConfigError::UnknownPreset(_))
        ));
        assert!(config_from(&[("GS_SEED", "blob")]).is_err());
        assert!(config_from(&[("GS_STENCIL", "1,2")]).is_err());
        assert!(config_from(&[("GS_RENDER_SCALE", "0")]).is_err());
        assert!(config_from(&[("GS_STEPS_PER_FRAME", "0")]).is_err());
        assert!(matches!(
            config_from(&[("GS_POINT_RESOLUTION", "0")]),
            Err(ConfigError::Invalid {
                key: "GS_POINT_RESOLUTION",
                ..
            })
        ));
        assert!(matches!(
            config_from(&[("GS_SEED_RADIUS", "NaN")]),
            Err(ConfigError::Invalid {
                key: "GS_SEED_RADIUS",
                ..
            })
        ));
        assert!(config_from(&[("GS_SEED_RADIUS", "-1")]).is_err());
    }
}
