pub const DEFAULT_TILE_SIZE_PX: u32 = 32;
pub const DEFAULT_GRID_PIXEL_WIDTH: u32 = 1024;

/// A pointer location as seen by entities. Points left of the grid boundary are
/// reported in grid cells; everything else stays in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputPoint {
    Cell { column: u32, row: u32 },
    Surface { x: f32, y: f32 },
}

impl InputPoint {
    pub fn cell(self) -> Option<(u32, u32)> {
        match self {
            InputPoint::Cell { column, row } => Some((column, row)),
            InputPoint::Surface { .. } => None,
        }
    }

    pub fn surface(self) -> Option<(f32, f32)> {
        match self {
            InputPoint::Surface { x, y } => Some((x, y)),
            InputPoint::Cell { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLayout {
    pub tile_size: u32,
    pub grid_pixel_width: u32,
}

impl Default for InputLayout {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE_PX,
            grid_pixel_width: DEFAULT_GRID_PIXEL_WIDTH,
        }
    }
}

impl InputLayout {
    pub fn translate(&self, x: f32, y: f32) -> Option<InputPoint> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        if x < self.grid_pixel_width as f32 {
            let tile_size = self.tile_size.max(1) as f32;
            return Some(InputPoint::Cell {
                column: (x / tile_size).floor() as u32,
                row: (y / tile_size).floor() as u32,
            });
        }
        Some(InputPoint::Surface { x, y })
    }
}

/// Input state visible to entities during a tick. `click` and `wheel` only
/// live for the tick in which they were recorded; `pointer` persists.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pointer: Option<InputPoint>,
    click: Option<InputPoint>,
    wheel: Option<WheelDirection>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_pointer(mut self, pointer: Option<InputPoint>) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_click(mut self, click: Option<InputPoint>) -> Self {
        self.click = click;
        self
    }

    pub fn with_wheel(mut self, wheel: Option<WheelDirection>) -> Self {
        self.wheel = wheel;
        self
    }

    pub fn pointer(&self) -> Option<InputPoint> {
        self.pointer
    }

    pub fn click(&self) -> Option<InputPoint> {
        self.click
    }

    pub fn wheel(&self) -> Option<WheelDirection> {
        self.wheel
    }

    pub fn record_pointer(&mut self, point: InputPoint) {
        self.pointer = Some(point);
    }

    pub fn record_click(&mut self, point: InputPoint) {
        self.click = Some(point);
    }

    pub fn record_wheel(&mut self, direction: WheelDirection) {
        self.wheel = Some(direction);
    }

    pub(crate) fn end_frame(&mut self) {
        self.click = None;
        self.wheel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_space_points_are_floored_to_cells() {
        let layout = InputLayout::default();
        assert_eq!(
            layout.translate(50.0, 50.0),
            Some(InputPoint::Cell { column: 1, row: 1 })
        );
        assert_eq!(
            layout.translate(1023.9, 767.0),
            Some(InputPoint::Cell {
                column: 31,
                row: 23
            })
        );
    }

    #[test]
    fn palette_space_points_stay_in_pixels() {
        let layout = InputLayout::default();
        assert_eq!(
            layout.translate(1024.0, 70.0),
            Some(InputPoint::Surface { x: 1024.0, y: 70.0 })
        );
        assert_eq!(
            layout.translate(2000.0, 50.0).and_then(InputPoint::cell),
            None
        );
    }

    #[test]
    fn negative_positions_are_dropped() {
        let layout = InputLayout::default();
        assert_eq!(layout.translate(-1.0, 10.0), None);
        assert_eq!(layout.translate(10.0, -0.5), None);
    }

    #[test]
    fn end_frame_clears_click_and_wheel_but_keeps_pointer() {
        let pointer = InputPoint::Cell { column: 3, row: 4 };
        let mut snapshot = InputSnapshot::empty()
            .with_pointer(Some(pointer))
            .with_click(Some(pointer))
            .with_wheel(Some(WheelDirection::Up));

        snapshot.end_frame();

        assert_eq!(snapshot.pointer(), Some(pointer));
        assert_eq!(snapshot.click(), None);
        assert_eq!(snapshot.wheel(), None);
    }

    #[test]
    fn later_events_in_a_frame_replace_earlier_ones() {
        let mut snapshot = InputSnapshot::empty();
        snapshot.record_wheel(WheelDirection::Up);
        snapshot.record_wheel(WheelDirection::Down);
        snapshot.record_click(InputPoint::Cell { column: 0, row: 0 });
        snapshot.record_click(InputPoint::Cell { column: 2, row: 1 });

        assert_eq!(snapshot.wheel(), Some(WheelDirection::Down));
        assert_eq!(
            snapshot.click(),
            Some(InputPoint::Cell { column: 2, row: 1 })
        );
    }
}
