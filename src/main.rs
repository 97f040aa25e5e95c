use gray_scott_volume::config::{Config, scaled_size};
use gray_scott_volume::{App, AppError, InputEvent, SimulationParams};
use log::{error, info};
use pixels::{Pixels, SurfaceTexture};
use std::f32::consts::PI;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::KeyCode;
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

/// Rotation per frame while an arrow key is held.
const KEY_ORBIT_STEP: f32 = PI / 100.0;
const FEED_STEP: f32 = 0.001;
const KILL_STEP: f32 = 0.001;
const DIFFUSION_STEP: f32 = 0.01;
/// Pixels of touchpad scroll that count as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 50.0;

const KEY_BINDINGS: &[(&str, &str)] = &[
    ("left drag / arrows / WASD", "orbit"),
    ("right drag", "pan"),
    ("wheel", "zoom"),
    ("space", "pause / resume"),
    ("R", "reload seed"),
    ("tab", "switch between ray cast and point cloud"),
    ("U / J", "feed + / -"),
    ("I / K", "kill + / -"),
    ("O / L", "D_a + / -"),
    ("P / ;", "D_b + / -"),
    ("esc", "quit"),
];

#[derive(Default)]
struct DragState {
    cursor: Option<PhysicalPosition<f64>>,
    orbiting: bool,
    panning: bool,
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    info!("Starting with {}", config);
    for (keys, action) in KEY_BINDINGS {
        info!("  {:<26} {}", keys, action);
    }

    let event_loop = EventLoop::new()?;
    let mut input = WinitInputHelper::new();
    let window = {
        let size = LogicalSize::new(config.window_width as f64, config.window_height as f64);
        WindowBuilder::new()
            .with_title("Gray-Scott Volume")
            .with_inner_size(size)
            .with_min_inner_size(LogicalSize::new(64.0, 64.0))
            .build(&event_loop)?
    };

    let window_size = window.inner_size();
    let (buffer_width, buffer_height) =
        scaled_size(window_size.width, window_size.height, config.render_scale);
    let mut pixels = {
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(buffer_width, buffer_height, surface_texture)?
    };

    let mut app = App::new(&config);
    app.push_event(InputEvent::Resize {
        width: buffer_width,
        height: buffer_height,
    });

    let mut drag = DragState::default();
    let mut result = Ok(());

    event_loop.run(|event, elwt| {
        if let Event::WindowEvent { event, .. } = &event {
            match event {
                WindowEvent::RedrawRequested => {
                    app.frame(pixels.frame_mut());
                    if let Err(e) = pixels.render() {
                        result = Err(e.into());
                        elwt.exit();
                        return;
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    let pressed = *state == ElementState::Pressed;
                    match button {
                        MouseButton::Left => drag.orbiting = pressed,
                        MouseButton::Right => drag.panning = pressed,
                        _ => {}
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    if let Some(last) = drag.cursor.replace(*position) {
                        let dx = (position.x - last.x) as f32;
                        let dy = (position.y - last.y) as f32;
                        if drag.orbiting {
                            app.push_event(InputEvent::Orbit { dx, dy });
                        } else if drag.panning {
                            app.push_event(InputEvent::Pan { dx, dy });
                        }
                    }
                }
                WindowEvent::CursorLeft { .. } => drag.cursor = None,
                WindowEvent::MouseWheel { delta, .. } => {
                    let notches = match delta {
                        MouseScrollDelta::LineDelta(_, y) => *y,
                        MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_NOTCH) as f32,
                    };
                    app.push_event(InputEvent::Zoom(notches));
                }
                _ => {}
            }
        }

        if input.update(&event) {
            if input.key_pressed(KeyCode::Escape) || input.close_requested() {
                info!("Exiting after {} steps", app.system().generation());
                elwt.exit();
                return;
            }

            if let Some(size) = input.window_resized() {
                let (width, height) = scaled_size(size.width, size.height, config.render_scale);
                if let Err(e) = pixels
                    .resize_surface(size.width, size.height)
                    .and_then(|_| pixels.resize_buffer(width, height))
                {
                    result = Err(e.into());
                    elwt.exit();
                    return;
                }
                app.push_event(InputEvent::Resize { width, height });
            }

            handle_keys(&input, &mut app);
            window.request_redraw();
        }
    })?;

    result
}

fn handle_keys(input: &WinitInputHelper, app: &mut App) {
    let held = |a: KeyCode, b: KeyCode| input.key_held(a) || input.key_held(b);
    let step = KEY_ORBIT_STEP / app.camera().rotate_speed;
    let mut dx = 0.0;
    let mut dy = 0.0;
    if held(KeyCode::ArrowLeft, KeyCode::KeyA) {
        dx -= step;
    }
    if held(KeyCode::ArrowRight, KeyCode::KeyD) {
        dx += step;
    }
    if held(KeyCode::ArrowUp, KeyCode::KeyW) {
        dy += step;
    }
    if held(KeyCode::ArrowDown, KeyCode::KeyS) {
        dy -= step;
    }
    if dx != 0.0 || dy != 0.0 {
        app.push_event(InputEvent::Orbit { dx, dy });
    }

    if input.key_pressed(KeyCode::Space) {
        app.push_event(InputEvent::TogglePause);
    }
    if input.key_pressed(KeyCode::KeyR) {
        app.push_event(InputEvent::Reload);
    }
    if input.key_pressed(KeyCode::Tab) {
        app.push_event(InputEvent::CycleRenderMode);
    }

    if let Some(params) = adjusted_params(input, &app.pending_params()) {
        app.push_event(InputEvent::SetParams(params));
    }
}

fn adjusted_params(input: &WinitInputHelper, params: &SimulationParams) -> Option<SimulationParams> {
    let p = *params;
    let next = if input.key_pressed(KeyCode::KeyU) {
        p.with_feed(p.feed + FEED_STEP)
    } else if input.key_pressed(KeyCode::KeyJ) {
        p.with_feed(p.feed - FEED_STEP)
    } else if input.key_pressed(KeyCode::KeyI) {
        p.with_kill(p.kill + KILL_STEP)
    } else if input.key_pressed(KeyCode::KeyK) {
        p.with_kill(p.kill - KILL_STEP)
    } else if input.key_pressed(KeyCode::KeyO) {
        p.with_diffusion_a(p.diffusion_a + DIFFUSION_STEP)
    } else if input.key_pressed(KeyCode::KeyL) {
        p.with_diffusion_a(p.diffusion_a - DIFFUSION_STEP)
    } else if input.key_pressed(KeyCode::KeyP) {
        p.with_diffusion_b(p.diffusion_b + DIFFUSION_STEP)
    } else if input.key_pressed(KeyCode::Semicolon) {
        p.with_diffusion_b(p.diffusion_b - DIFFUSION_STEP)
    } else {
        return None;
    };

    (next != p).then_some(next)
}
