use tracing::{debug, info};

use super::entity::{DrawContext, Entity, FrameContext};
use super::rendering::Surface;
use super::InputSnapshot;

const DEFAULT_CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

pub struct EntityEngine<C> {
    entities: Vec<Box<dyn Entity<C>>>,
    input: InputSnapshot,
    shared: C,
    running: bool,
    show_outlines: bool,
    tick_count: u64,
}

impl<C> EntityEngine<C> {
    pub fn new(shared: C) -> Self {
        Self {
            entities: Vec::new(),
            input: InputSnapshot::empty(),
            shared,
            running: false,
            show_outlines: false,
            tick_count: 0,
        }
    }

    pub fn add_entity(&mut self, entity: Box<dyn Entity<C>>) {
        debug!(
            entity = entity.debug_name(),
            index = self.entities.len(),
            "entity_added"
        );
        self.entities.push(entity);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSnapshot {
        &mut self.input
    }

    pub fn shared(&self) -> &C {
        &self.shared
    }

    pub fn shared_mut(&mut self) -> &mut C {
        &mut self.shared
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(entity_count = self.entities.len(), "engine_started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(tick_count = self.tick_count, "engine_stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn show_outlines(&self) -> bool {
        self.show_outlines
    }

    pub fn set_show_outlines(&mut self, show_outlines: bool) {
        self.show_outlines = show_outlines;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Runs one frame. Entities flagged for removal during this tick still get
    /// their last draw here and are gone before the next tick starts, which is
    /// one draw more than culling ahead of the draw pass would give them.
    pub fn tick(&mut self, surface: &mut dyn Surface) {
        self.update_entities();
        self.draw_entities(surface);
        self.remove_flagged();
        self.input.end_frame();
        self.tick_count = self.tick_count.saturating_add(1);
    }

    fn update_entities(&mut self) {
        // Entities spawned during this pass wait for the next tick.
        let entity_count = self.entities.len();
        for index in 0..entity_count {
            if self.entities[index].remove_from_world() {
                continue;
            }
            let mut frame = FrameContext::new(&self.input, &mut self.shared);
            self.entities[index].update(&mut frame);
            let spawned = frame.into_spawned();
            for entity in spawned {
                debug!(entity = entity.debug_name(), "entity_spawned");
                self.entities.push(entity);
            }
        }
    }

    fn draw_entities(&self, surface: &mut dyn Surface) {
        surface.clear(DEFAULT_CLEAR_COLOR);
        let context = DrawContext {
            shared: &self.shared,
            show_outlines: self.show_outlines,
        };
        for entity in &self.entities {
            entity.draw(surface, &context);
        }
    }

    fn remove_flagged(&mut self) -> usize {
        let mut removed = 0;
        for index in (0..self.entities.len()).rev() {
            if self.entities[index].remove_from_world() {
                let entity = self.entities.remove(index);
                debug!(entity = entity.debug_name(), "entity_removed");
                removed += 1;
            }
        }
        removed
    }
}
