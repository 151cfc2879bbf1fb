mod entity;
mod entity_engine;
mod input;
mod loop_runner;
mod metrics;
mod rendering;

pub use entity::{draw_debug_outline, DrawContext, Entity, FrameContext, RemovalFlag, Vec2};
pub use entity_engine::EntityEngine;
pub use input::{
    InputLayout, InputPoint, InputSnapshot, WheelDirection, DEFAULT_GRID_PIXEL_WIDTH,
    DEFAULT_TILE_SIZE_PX,
};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{FrameSurface, Renderer, Surface};
