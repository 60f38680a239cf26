//! The entity model and the registry that drives it.
//!
//! Everything that ticks, draws or can be clicked is an [`Entity`] living in
//! one flat [`Registry`]. The registry owns four passes:
//!
//! - **tick**: registration order, then newly spawned entities are appended
//!   and dead ones are compacted away (survivor order is preserved);
//! - **render**: a stable sort by z over the visible entities, storage order
//!   untouched;
//! - **click**: registration order, first hit wins, refused during a cooldown;
//! - **hover**: edge-triggered enter/exit on the first entity under the pointer.

use crate::clock::FrameInfo;
use crate::context::GameContext;
use crate::surface::Surface;

pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityFlags {
    /// Cleared to have the registry drop the entity after the current tick.
    pub alive: bool,
    pub visible: bool,
    pub updating: bool,
    /// Draw-order key; lower draws first.
    pub z: i32,
    /// Keeps ticking and accepting clicks while the session is paused.
    pub interactive_while_paused: bool,
}

impl EntityFlags {
    pub fn new(z: i32) -> Self {
        Self {
            alive: true,
            visible: true,
            updating: true,
            z,
            interactive_while_paused: false,
        }
    }

    pub fn interactive_while_paused(mut self) -> Self {
        self.interactive_while_paused = true;
        self
    }

    fn runs(&self, paused: bool) -> bool {
        self.alive && self.updating && (!paused || self.interactive_while_paused)
    }
}

pub trait Entity {
    fn name(&self) -> &'static str;
    fn flags(&self) -> &EntityFlags;
    fn flags_mut(&mut self) -> &mut EntityFlags;

    /// Advance by `dt` ms at host time `now`.
    fn tick(&mut self, _ctx: &mut GameContext, _dt: f64, _now: f64) {}

    /// Draw. Only cosmetic fields may change here.
    fn render(&mut self, ctx: &GameContext, surface: &mut dyn Surface, frame: &FrameInfo);

    /// Whether the point (x, y) should click this entity.
    fn hit_test(&self, _ctx: &GameContext, _x: f32, _y: f32) -> bool {
        false
    }

    fn on_click(&mut self, _ctx: &mut GameContext, _x: f32, _y: f32) {}

    fn on_hover_enter(&mut self, _ctx: &mut GameContext) {}

    fn on_hover_exit(&mut self, _ctx: &mut GameContext) {}

    fn is_alive(&self) -> bool {
        self.flags().alive
    }

    fn kill(&mut self) {
        self.flags_mut().alive = false;
    }
}

struct Slot {
    id: EntityId,
    entity: Box<dyn Entity>,
}

#[derive(Default)]
pub struct Registry {
    slots: Vec<Slot>,
    next_id: EntityId,
    hovered: Option<EntityId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push(Slot { id, entity });
        id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.slots.iter().map(|s| s.id).collect()
    }

    /// Entity names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.slots.iter().map(|s| s.entity.name()).collect()
    }

    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.entity.as_ref())
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.slots.iter().filter(|s| s.entity.name() == name).count()
    }

    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    fn flush_spawned(&mut self, ctx: &mut GameContext) {
        for entity in ctx.take_spawned() {
            self.register(entity);
        }
    }

    /// Drop dead entities, keeping survivors in registration order.
    pub fn compact(&mut self) {
        self.slots.retain(|s| s.entity.is_alive());
        if let Some(id) = self.hovered {
            if !self.slots.iter().any(|s| s.id == id) {
                self.hovered = None;
            }
        }
    }

    pub fn tick_all(&mut self, ctx: &mut GameContext, dt: f64, now: f64) {
        let paused = ctx.is_paused();
        for slot in &mut self.slots {
            if slot.entity.flags().runs(paused) {
                slot.entity.tick(ctx, dt, now);
            }
        }
        self.flush_spawned(ctx);
        self.compact();
    }

    pub fn render_all(&mut self, ctx: &GameContext, surface: &mut dyn Surface, frame: &FrameInfo) {
        let mut order: Vec<usize> = (0..self.slots.len())
            .filter(|&i| {
                let flags = self.slots[i].entity.flags();
                flags.visible && flags.alive
            })
            .collect();
        order.sort_by_key(|&i| self.slots[i].entity.flags().z);
        for i in order {
            self.slots[i].entity.render(ctx, surface, frame);
        }
    }

    fn hit(&self, ctx: &GameContext, x: f32, y: f32) -> Option<usize> {
        let paused = ctx.is_paused();
        self.slots.iter().position(|s| {
            s.entity.flags().runs(paused) && s.entity.hit_test(ctx, x, y)
        })
    }

    /// Click the first entity under (x, y). Returns whether anything was clicked.
    pub fn dispatch_click(&mut self, ctx: &mut GameContext, x: f32, y: f32) -> bool {
        if ctx.state.cooldown_ms > 0.0 {
            return false;
        }
        let Some(index) = self.hit(ctx, x, y) else {
            return false;
        };
        self.slots[index].entity.on_click(ctx, x, y);
        self.flush_spawned(ctx);
        true
    }

    pub fn dispatch_hover(&mut self, ctx: &mut GameContext, x: f32, y: f32) {
        let target = self.hit(ctx, x, y).map(|i| self.slots[i].id);
        if target == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            if let Some(slot) = self.slots.iter_mut().find(|s| s.id == old) {
                slot.entity.on_hover_exit(ctx);
            }
        }
        if let Some(new) = target {
            if let Some(slot) = self.slots.iter_mut().find(|s| s.id == new) {
                slot.entity.on_hover_enter(ctx);
            }
        }
        self.hovered = target;
        self.flush_spawned(ctx);
    }
}
