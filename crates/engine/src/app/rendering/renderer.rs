use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::{FrameSurface, Surface};

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    surface_width: u32,
    surface_height: u32,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            (surface_width, surface_height),
            (size.width, size.height),
        )?;
        Ok(Self {
            window,
            pixels,
            surface_width,
            surface_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            (self.surface_width, self.surface_height),
            (width, height),
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        (surface_width, surface_height): (u32, u32),
        (window_width, window_height): (u32, u32),
    ) -> Result<Pixels<'static>, Error> {
        let texture = SurfaceTexture::new(window_width, window_height, window);
        Pixels::new(surface_width, surface_height, texture)
    }

    pub fn window_to_surface(&self, x: f64, y: f64) -> Option<(f32, f32)> {
        self.pixels
            .window_pos_to_pixel((x as f32, y as f32))
            .ok()
            .map(|(px, py)| (px as f32, py as f32))
    }

    pub fn render_frame(&mut self, draw: impl FnOnce(&mut dyn Surface)) -> Result<(), Error> {
        if self.surface_width == 0 || self.surface_height == 0 {
            return Ok(());
        }
        {
            let frame = self.pixels.frame_mut();
            let mut surface = FrameSurface::new(frame, self.surface_width, self.surface_height);
            draw(&mut surface);
        }
        self.pixels.render()
    }
}

