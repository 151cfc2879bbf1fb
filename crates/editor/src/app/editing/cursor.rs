use engine::{draw_debug_outline, DrawContext, Entity, FrameContext, InputPoint, Surface, Vec2};

use super::{EditorContext, GRID_COLUMNS, TILE_SIZE_PX};

pub(crate) struct CursorPreview {
    cell: Option<(u32, u32)>,
}

impl CursorPreview {
    pub(crate) fn new() -> Self {
        Self { cell: None }
    }

    pub(crate) fn hovered_cell(&self) -> Option<(u32, u32)> {
        self.cell
    }
}

impl Entity<EditorContext> for CursorPreview {
    fn debug_name(&self) -> &'static str {
        "cursor_preview"
    }

    fn position(&self) -> Vec2 {
        let (column, row) = self.hovered_cell().unwrap_or((0, 0));
        Vec2::new(
            ((column * TILE_SIZE_PX) + TILE_SIZE_PX / 2) as f32,
            ((row * TILE_SIZE_PX) + TILE_SIZE_PX / 2) as f32,
        )
    }

    fn radius(&self) -> Option<f32> {
        self.cell.map(|_| (TILE_SIZE_PX / 2) as f32)
    }

    fn update(&mut self, frame: &mut FrameContext<'_, EditorContext>) {
        if let Some(direction) = frame.input().wheel() {
            frame.shared_mut().step_selection(direction);
        }
        self.cell = match frame.input().pointer() {
            Some(InputPoint::Cell { column, row }) if column < GRID_COLUMNS => Some((column, row)),
            Some(InputPoint::Cell { .. }) | Some(InputPoint::Surface { .. }) | None => None,
        };
    }

    fn draw(&self, surface: &mut dyn Surface, context: &DrawContext<'_, EditorContext>) {
        let Some((column, row)) = self.cell else {
            return;
        };
        if let Some(sprite) = context.shared.selection().sprite() {
            surface.draw_image(
                sprite,
                (column * TILE_SIZE_PX) as i32,
                (row * TILE_SIZE_PX) as i32,
            );
        }
        draw_debug_outline(surface, self.position(), self.radius(), context.show_outlines);
    }
}
