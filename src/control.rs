//! The per-frame control loop: input, then simulation, then rendering.

use crate::camera::OrbitCamera;
use crate::config::Config;
use crate::gray_scott_model::{ReactionDiffusionSystem, SimulationParams};
use crate::input::{InputEvent, InputQueue};
use crate::point_cloud::PointCloudRenderer;
use crate::raycast::RayCaster;
use crate::renderer::{RenderMode, Renderer, Viewport, VolumeRenderer};
use circular_queue::CircularQueue;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

const FPS_REPORT_INTERVAL: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Running,
    Paused,
    /// The seed is restored on the next frame. Afterwards the loop runs again,
    /// or stays paused when `paused` is set.
    Reloading { paused: bool },
}

impl ControlState {
    pub fn toggle_pause(self) -> Self {
        match self {
            ControlState::Running => ControlState::Paused,
            ControlState::Paused => ControlState::Running,
            ControlState::Reloading { paused } => ControlState::Reloading { paused: !paused },
        }
    }

    pub fn reload(self) -> Self {
        match self {
            ControlState::Running => ControlState::Reloading { paused: false },
            ControlState::Paused => ControlState::Reloading { paused: true },
            reloading => reloading,
        }
    }

    /// The state to continue in once a reload has been carried out.
    pub fn resume(self) -> Self {
        match self {
            ControlState::Reloading { paused: true } => ControlState::Paused,
            ControlState::Reloading { paused: false } => ControlState::Running,
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControlState::Running => "running",
            ControlState::Paused => "paused",
            ControlState::Reloading { .. } => "reloading",
        }
    }
}

/// Frame times over a sliding window, reported every hundred frames.
pub struct FrameTimer {
    frames: u64,
    last: Option<Instant>,
    recent: CircularQueue<Duration>,
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        Self {
            frames: 0,
            last: None,
            recent: CircularQueue::with_capacity(window),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Records a frame finished at `now`. Returns the average frame rate over
    /// the window whenever a report is due.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        if let Some(last) = self.last.replace(now) {
            self.recent.push(now.saturating_duration_since(last));
        }
        self.frames += 1;

        if self.frames % FPS_REPORT_INTERVAL == 0 {
            self.average_fps()
        } else {
            None
        }
    }

    pub fn average_fps(&self) -> Option<f32> {
        if self.recent.is_empty() {
            return None;
        }
        let total: Duration = self.recent.iter().sum();
        let mean = total.as_secs_f32() / self.recent.len() as f32;
        (mean > 0.0).then(|| 1.0 / mean)
    }
}

/// Owns the simulation, camera and renderer and advances them one frame at a time.
pub struct App {
    system: ReactionDiffusionSystem,
    camera: OrbitCamera,
    renderer: Renderer,
    input: InputQueue,
    viewport: Viewport,
    state: ControlState,
    steps_per_frame: u32,
    timer: FrameTimer,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let (width, height) = config.buffer_size();
        let system = ReactionDiffusionSystem::new(config.dims, config.seed, config.params);
        let point_cloud = PointCloudRenderer {
            threshold: config.point_threshold,
            point_size: config.point_size,
            resolution: config.point_resolution,
            ..PointCloudRenderer::default()
        };
        let ray_caster = RayCaster {
            coloring: config.coloring.clone(),
            ..RayCaster::default()
        };
        let renderer = Renderer::new(config.render_mode, ray_caster, point_cloud);

        Self::from_parts(
            system,
            renderer,
            Viewport::new(width, height),
            config.steps_per_frame,
        )
    }

    pub fn from_parts(
        system: ReactionDiffusionSystem,
        renderer: Renderer,
        viewport: Viewport,
        steps_per_frame: u32,
    ) -> Self {
        Self {
            system,
            camera: OrbitCamera::new(viewport.aspect()),
            renderer,
            input: InputQueue::new(),
            viewport,
            state: ControlState::default(),
            steps_per_frame,
            timer: FrameTimer::new(FPS_REPORT_INTERVAL as usize),
        }
    }

    /// Queues an event for the start of the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn params(&self) -> &SimulationParams {
        self.system.params()
    }

    /// Parameters as they will be once queued events are applied. Changes
    /// built on top of these compose even when several land in one frame.
    pub fn pending_params(&self) -> SimulationParams {
        self.input
            .pending_params()
            .unwrap_or(*self.system.params())
    }

    pub fn system(&self) -> &ReactionDiffusionSystem {
        &self.system
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn render_mode(&self) -> RenderMode {
        self.renderer.mode()
    }

    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Orbit { dx, dy } => self.camera.orbit(dx, dy),
            InputEvent::Pan { dx, dy } => self.camera.pan(dx, dy),
            InputEvent::Zoom(steps) => self.camera.zoom(steps),
            InputEvent::Resize { width, height } => {
                self.viewport = Viewport::new(width, height);
                self.camera.set_viewport(width, height);
            }
            InputEvent::TogglePause => {
                self.state = self.state.toggle_pause();
                info!("Simulation {}", self.state.name());
            }
            InputEvent::Reload => {
                self.state = self.state.reload();
                info!("Reloading seed pattern '{}'", self.system.seed().name());
            }
            InputEvent::SetParams(params) => {
                info!(
                    "feed {:.4} kill {:.4} D_a {:.3} D_b {:.3}",
                    params.feed, params.kill, params.diffusion_a, params.diffusion_b
                );
                self.system.set_params(params);
            }
            InputEvent::CycleRenderMode => {
                let mode = self.renderer.cycle_mode();
                info!("Switched to {} view", mode.name());
            }
        }
    }

    /// Runs one frame and draws it into `frame`, an RGBA8 buffer of the current viewport.
    pub fn frame(&mut self, frame: &mut [u8]) {
        let events: Vec<InputEvent> = self.input.drain().collect();
        for event in events {
            self.apply(event);
        }

        match self.state {
            ControlState::Reloading { .. } => {
                self.system.reload();
                self.state = self.state.resume();
            }
            ControlState::Running => {
                for _ in 0..self.steps_per_frame {
                    self.system.update();
                }
            }
            ControlState::Paused => {}
        }

        if frame.len() == self.viewport.pixel_count() * 4 {
            self.renderer.render(
                self.system.field(),
                &self.camera.transform(),
                self.viewport,
                frame,
            );
        } else {
            warn!(
                "Skipping draw: frame holds {} bytes but the viewport is {}x{}",
                frame.len(),
                self.viewport.width,
                self.viewport.height
            );
        }

        if let Some(fps) = self.timer.tick(Instant::now()) {
            debug!(
                "frame {}: {:.1} fps, generation {}",
                self.timer.frames(),
                fps,
                self.system.generation()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Dims;
    use crate::seed::{self, SeedPattern};

    fn small_app() -> (App, Vec<u8>) {
        let system = ReactionDiffusionSystem::new(
            Dims::cube(8),
            SeedPattern::Sphere { radius: 2.0 },
            SimulationParams::default(),
        );
        let renderer = Renderer::new(
            RenderMode::PointCloud,
            RayCaster::default(),
            PointCloudRenderer::default(),
        );
        let viewport = Viewport::new(8, 6);
        let frame = vec![0u8; viewport.pixel_count() * 4];
        (App::from_parts(system, renderer, viewport, 1), frame)
    }

    #[test]
    fn test_state_transitions() {
        let running = ControlState::default();
        assert_eq!(ControlState::Running, running);
        assert_eq!(ControlState::Paused, running.toggle_pause());
        assert_eq!(running, running.toggle_pause().toggle_pause());

        let reloading = running.reload();
        assert_eq!(ControlState::Reloading { paused: false }, reloading);
        assert_eq!(
            ControlState::Reloading { paused: true },
            reloading.toggle_pause()
        );
        assert_eq!(reloading, reloading.reload());
        assert_eq!(ControlState::Running, reloading.resume());
        assert_eq!(ControlState::Paused, ControlState::Paused.reload().resume());
    }

    #[test]
    fn test_pause_stops_stepping() {
        let (mut app, mut frame) = small_app();
        app.frame(&mut frame);
        assert_eq!(1, app.system().generation());

        app.push_event(InputEvent::TogglePause);
        app.frame(&mut frame);
        app.frame(&mut frame);
        assert_eq!(ControlState::Paused, app.state());
        assert_eq!(1, app.system().generation());

        app.push_event(InputEvent::TogglePause);
        app.frame(&mut frame);
        assert_eq!(2, app.system().generation());
    }

    #[test]
    fn test_reload_restores_seed() {
        let (mut app, mut frame) = small_app();
        let seeded = seed::reset(Dims::cube(8), &SeedPattern::Sphere { radius: 2.0 });
        for _ in 0..3 {
            app.frame(&mut frame);
        }
        assert_ne!(&seeded, app.system().field());

        app.push_event(InputEvent::Reload);
        app.frame(&mut frame);
        assert_eq!(&seeded, app.system().field());
        assert_eq!(0, app.system().generation());
        assert_eq!(ControlState::Running, app.state());

        app.frame(&mut frame);
        assert_eq!(1, app.system().generation());
    }

    #[test]
    fn test_reload_while_paused_stays_paused() {
        let (mut app, mut frame) = small_app();
        app.frame(&mut frame);
        app.push_event(InputEvent::TogglePause);
        app.push_event(InputEvent::Reload);
        app.frame(&mut frame);
        assert_eq!(ControlState::Paused, app.state());
        assert_eq!(0, app.system().generation());
    }

    #[test]
    fn test_events_apply_before_the_step() {
        let (mut app, mut frame) = small_app();
        let params = app.params().with_feed(0.05);
        app.push_event(InputEvent::SetParams(params));
        app.push_event(InputEvent::CycleRenderMode);
        app.push_event(InputEvent::Zoom(2.0));
        app.frame(&mut frame);

        assert_eq!(0.05, app.params().feed);
        assert_eq!(RenderMode::RayCast, app.render_mode());
        assert!((app.camera().volume_scale - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_param_changes_within_one_frame_compose() {
        let (mut app, mut frame) = small_app();
        let start = app.params().feed;

        for _ in 0..2 {
            let params = app.pending_params();
            app.push_event(InputEvent::SetParams(params.with_feed(params.feed + 0.001)));
        }
        assert_eq!(start, app.params().feed);

        app.frame(&mut frame);
        assert!((app.params().feed - (start + 0.002)).abs() < 1e-6);
        assert_eq!(*app.params(), app.pending_params());
    }

    #[test]
    fn test_resize_with_stale_buffer_skips_draw() {
        let (mut app, mut frame) = small_app();
        app.push_event(InputEvent::Resize {
            width: 16,
            height: 16,
        });
        app.frame(&mut frame);
        assert_eq!(Viewport::new(16, 16), app.viewport());
        assert!((app.camera().aspect - 1.0).abs() < 1e-6);

        let mut resized = vec![0u8; 16 * 16 * 4];
        app.frame(&mut resized);
        assert!(resized.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_frame_timer_reports_every_hundred_frames() {
        let mut timer = FrameTimer::new(100);
        let start = Instant::now();
        let mut reports = Vec::new();
        for i in 0..200u32 {
            if let Some(fps) = timer.tick(start + Duration::from_millis(10) * i) {
                reports.push(fps);
            }
        }
        assert_eq!(2, reports.len());
        assert!(reports.iter().all(|fps| (fps - 100.0).abs() < 0.1));
    }
}
