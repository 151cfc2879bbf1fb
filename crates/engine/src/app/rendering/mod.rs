mod renderer;
mod surface;

pub use renderer::Renderer;
pub use surface::{FrameSurface, Surface};
