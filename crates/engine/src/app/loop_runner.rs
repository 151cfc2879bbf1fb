use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::StartupError;

use super::metrics::MetricsAccumulator;
use super::{EntityEngine, InputLayout, InputSnapshot, Renderer, WheelDirection};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub surface_width: u32,
    pub surface_height: u32,
    pub input_layout: InputLayout,
    pub metrics_log_interval: Duration,
    pub show_outlines: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Tile Editor".to_string(),
            surface_width: 1120,
            surface_height: 768,
            input_layout: InputLayout::default(),
            metrics_log_interval: Duration::from_secs(5),
            show_outlines: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and ticks `engine` once per redraw until the engine is
/// stopped or the window closes. Blocks the calling (main) thread.
pub fn run_app<C: 'static>(
    config: LoopConfig,
    mut engine: EntityEngine<C>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.surface_width as f64,
                config.surface_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, config.surface_width, config.surface_height)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let mut input_collector = InputCollector::new(config.input_layout);
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_frame_instant = Instant::now();

    engine.set_show_outlines(config.show_outlines);
    engine.start();
    info!(
        surface_width = config.surface_width,
        surface_height = config.surface_height,
        tile_size = config.input_layout.tile_size,
        grid_pixel_width = config.input_layout.grid_pixel_width,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        engine.stop();
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let surface_position = renderer.window_to_surface(position.x, position.y);
                        input_collector.handle_cursor_moved(engine.input_mut(), surface_position);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(engine.input_mut(), button, state);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        input_collector.handle_mouse_wheel(engine.input_mut(), delta);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_key(event.physical_key, event.state);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            engine.stop();
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if input_collector.take_outline_toggle_pressed() {
                            let show_outlines = !engine.show_outlines();
                            engine.set_show_outlines(show_outlines);
                            info!(show_outlines, "outlines_toggled");
                        }

                        let now = Instant::now();
                        let frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        if let Err(error) = renderer.render_frame(|surface| engine.tick(surface)) {
                            warn!(error = %error, "renderer_draw_failed");
                            engine.stop();
                        }
                        metrics_accumulator.record_frame(frame_dt);

                        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                            info!(
                                fps = snapshot.fps,
                                frame_time_ms = snapshot.frame_time_ms,
                                peak_frame_time_ms = snapshot.peak_frame_time_ms,
                                entity_count = engine.entity_count(),
                                "loop_metrics"
                            );
                        }

                        if !engine.is_running() {
                            window_target.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!(tick_count = engine.tick_count(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    layout: InputLayout,
    last_surface_position: Option<(f32, f32)>,
    left_mouse_is_down: bool,
    outline_toggle_is_down: bool,
    outline_toggle_pressed_edge: bool,
    quit_requested: bool,
}

impl InputCollector {
    fn new(layout: InputLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    fn handle_cursor_moved(
        &mut self,
        input: &mut InputSnapshot,
        surface_position: Option<(f32, f32)>,
    ) {
        // Off-surface positions keep the last pointer but disarm clicks.
        self.last_surface_position = surface_position;
        let Some((x, y)) = surface_position else {
            return;
        };
        if let Some(point) = self.layout.translate(x, y) {
            input.record_pointer(point);
        }
    }

    fn handle_mouse_input(
        &mut self,
        input: &mut InputSnapshot,
        button: MouseButton,
        state: ElementState,
    ) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    let click = self
                        .last_surface_position
                        .and_then(|(x, y)| self.layout.translate(x, y));
                    if let Some(point) = click {
                        input.record_click(point);
                    }
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn handle_mouse_wheel(&mut self, input: &mut InputSnapshot, delta: MouseScrollDelta) {
        if let Some(direction) = wheel_direction_from_scroll_delta(delta) {
            input.record_wheel(direction);
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        match key {
            PhysicalKey::Code(KeyCode::Escape) => {
                if state == ElementState::Pressed {
                    self.quit_requested = true;
                }
            }
            PhysicalKey::Code(KeyCode::F3) => match state {
                ElementState::Pressed => {
                    if !self.outline_toggle_is_down {
                        self.outline_toggle_pressed_edge = true;
                    }
                    self.outline_toggle_is_down = true;
                }
                ElementState::Released => self.outline_toggle_is_down = false,
            },
            _ => {}
        }
    }

    fn take_outline_toggle_pressed(&mut self) -> bool {
        let was_pressed = self.outline_toggle_pressed_edge;
        self.outline_toggle_pressed_edge = false;
        was_pressed
    }
}

fn wheel_direction_from_scroll_delta(delta: MouseScrollDelta) -> Option<WheelDirection> {
    let y = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(position) => position.y,
    };
    if y > 0.0 {
        Some(WheelDirection::Up)
    } else if y < 0.0 {
        Some(WheelDirection::Down)
    } else {
        None
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
