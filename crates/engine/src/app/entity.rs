use super::rendering::Surface;
use super::InputSnapshot;

const DEBUG_OUTLINE_COLOR: [u8; 4] = [0, 200, 0, 255];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalFlag(bool);

impl RemovalFlag {
    pub fn mark(&mut self) {
        self.0 = true;
    }

    pub fn is_marked(self) -> bool {
        self.0
    }
}

/// Everything an entity may touch while updating: the tick's input, the
/// shared context, and a queue for entities it wants to add.
pub struct FrameContext<'a, C> {
    input: &'a InputSnapshot,
    shared: &'a mut C,
    spawned: Vec<Box<dyn Entity<C>>>,
}

impl<'a, C> FrameContext<'a, C> {
    pub fn new(input: &'a InputSnapshot, shared: &'a mut C) -> Self {
        Self {
            input,
            shared,
            spawned: Vec::new(),
        }
    }

    pub fn input(&self) -> &InputSnapshot {
        self.input
    }

    pub fn shared(&self) -> &C {
        &*self.shared
    }

    pub fn shared_mut(&mut self) -> &mut C {
        &mut *self.shared
    }

    pub fn spawn(&mut self, entity: Box<dyn Entity<C>>) {
        self.spawned.push(entity);
    }

    pub(crate) fn into_spawned(self) -> Vec<Box<dyn Entity<C>>> {
        self.spawned
    }
}

pub struct DrawContext<'a, C> {
    pub shared: &'a C,
    pub show_outlines: bool,
}

/// A unit of simulation and rendering owned by the engine.
///
/// `C` is the context shared between all entities of one engine. The default
/// `update` does nothing and the default `draw` only renders the debug outline.
pub trait Entity<C> {
    fn debug_name(&self) -> &'static str;

    fn position(&self) -> Vec2;

    fn remove_from_world(&self) -> bool {
        false
    }

    fn radius(&self) -> Option<f32> {
        None
    }

    fn update(&mut self, _frame: &mut FrameContext<'_, C>) {}

    fn draw(&self, surface: &mut dyn Surface, context: &DrawContext<'_, C>) {
        draw_debug_outline(surface, self.position(), self.radius(), context.show_outlines);
    }
}

pub fn draw_debug_outline(
    surface: &mut dyn Surface,
    position: Vec2,
    radius: Option<f32>,
    show_outlines: bool,
) {
    if !show_outlines {
        return;
    }
    let Some(radius) = radius.filter(|radius| radius.is_finite() && *radius > 0.0) else {
        return;
    };
    surface.stroke_circle(
        position.x.round() as i32,
        position.y.round() as i32,
        radius.round() as i32,
        DEBUG_OUTLINE_COLOR,
    );
}
