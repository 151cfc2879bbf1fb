use crate::assets::Sprite;

pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn clear_region(&mut self, x: i32, y: i32, width: u32, height: u32, color: [u8; 4]);

    fn draw_image(&mut self, sprite: &Sprite, x: i32, y: i32);

    fn stroke_circle(&mut self, center_x: i32, center_y: i32, radius: i32, color: [u8; 4]);

    fn clear(&mut self, color: [u8; 4]) {
        let (width, height) = self.size();
        self.clear_region(0, 0, width, height, color);
    }
}

pub struct FrameSurface<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let offset = pixel_byte_offset(self.frame.len(), self.width, x as i32, y as i32)?;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(pixel)
    }

    fn write_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        if let Some(offset) = pixel_byte_offset(self.frame.len(), self.width, x, y) {
            self.frame[offset..offset + 4].copy_from_slice(&color);
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let alpha = color[3];
        if alpha == 0 {
            return;
        }
        if alpha == u8::MAX {
            self.write_pixel(x, y, color);
            return;
        }
        if x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let Some(offset) = pixel_byte_offset(self.frame.len(), self.width, x, y) else {
            return;
        };
        let dst = &mut self.frame[offset..offset + 4];
        let src_alpha = u16::from(alpha);
        let inv_alpha = 255 - src_alpha;
        for channel in 0..3 {
            let blended =
                (u16::from(color[channel]) * src_alpha + u16::from(dst[channel]) * inv_alpha) / 255;
            dst[channel] = blended as u8;
        }
        dst[3] = dst[3].max(alpha);
    }
}

impl Surface for FrameSurface<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_region(&mut self, x: i32, y: i32, width: u32, height: u32, color: [u8; 4]) {
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(width as i32).min(self.width as i32);
        let bottom = y.saturating_add(height as i32).min(self.height as i32);
        for row in top..bottom {
            for column in left..right {
                self.write_pixel(column, row, color);
            }
        }
    }

    fn draw_image(&mut self, sprite: &Sprite, x: i32, y: i32) {
        if sprite.width() == 0 || sprite.height() == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let draw_left = x.max(0);
        let draw_top = y.max(0);
        let draw_right = x.saturating_add(sprite.width() as i32).min(self.width as i32);
        let draw_bottom = y.saturating_add(sprite.height() as i32).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let rgba = sprite.rgba();
        let sprite_width = sprite.width() as usize;
        for out_y in draw_top..draw_bottom {
            let src_row_offset = (out_y - y) as usize * sprite_width * 4;
            for out_x in draw_left..draw_right {
                let src_offset = src_row_offset + (out_x - x) as usize * 4;
                let mut color = [0u8; 4];
                color.copy_from_slice(&rgba[src_offset..src_offset + 4]);
                self.blend_pixel(out_x, out_y, color);
            }
        }
    }

    fn stroke_circle(&mut self, center_x: i32, center_y: i32, radius: i32, color: [u8; 4]) {
        if radius <= 0 {
            return;
        }
        // Midpoint circle, one octant mirrored eight ways.
        let mut x = radius;
        let mut y = 0;
        let mut error = 1 - radius;
        while x >= y {
            for (dx, dy) in [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                self.write_pixel(center_x + dx, center_y + dy, color);
            }
            y += 1;
            if error < 0 {
                error += 2 * y + 1;
            } else {
                x -= 1;
                error += 2 * (y - x) + 1;
            }
        }
    }
}

fn pixel_byte_offset(frame_len: usize, width: u32, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x as u32 >= width {
        return None;
    }
    let pixel_offset = (y as usize)
        .checked_mul(width as usize)
        .and_then(|row| row.checked_add(x as usize))?;
    let byte_offset = pixel_offset.checked_mul(4)?;
    let end = byte_offset.checked_add(4)?;
    if end > frame_len {
        return None;
    }
    Some(byte_offset)
}
