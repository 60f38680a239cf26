//! The title and game-over screens. Both cover the canvas and start a new
//! game on any click.

use crate::clock::FrameInfo;
use crate::constants::layers;
use crate::context::{GameContext, Transition};
use crate::entity::{Entity, EntityFlags};
use crate::surface::{Color, Surface, TextAlign};
use crate::vector::{Rect, Vec2};

fn screen_flags() -> EntityFlags {
    EntityFlags::new(layers::SCREEN).interactive_while_paused()
}

fn draw_message(surface: &mut dyn Surface, message: &str) {
    let size = surface.size();
    surface.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), Color::BLACK);
    surface.text(message, Vec2::new(100.0, 100.0), 24.0, Color::WHITE, TextAlign::Left);
}

pub struct TitleScreen {
    flags: EntityFlags,
}

impl TitleScreen {
    pub const MESSAGE: &'static str = "click anywhere to start";

    pub fn new() -> Self {
        Self {
            flags: screen_flags(),
        }
    }
}

impl Default for TitleScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for TitleScreen {
    fn name(&self) -> &'static str {
        "TitleScreen"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn render(&mut self, _ctx: &GameContext, surface: &mut dyn Surface, _frame: &FrameInfo) {
        draw_message(surface, Self::MESSAGE);
    }

    fn hit_test(&self, _ctx: &GameContext, _x: f32, _y: f32) -> bool {
        true
    }

    fn on_click(&mut self, ctx: &mut GameContext, _x: f32, _y: f32) {
        ctx.request_transition(Transition::StartGame);
    }
}

pub struct GameOverScreen {
    flags: EntityFlags,
    pub distance: f32,
    pub elapsed_ms: f64,
}

impl GameOverScreen {
    pub fn new(distance: f32, elapsed_ms: f64) -> Self {
        Self {
            flags: screen_flags(),
            distance,
            elapsed_ms,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "blub blub. you made it {} meters in {:.0} seconds. click to try again",
            self.distance.floor(),
            (self.elapsed_ms / 1000.0).floor()
        )
    }
}

impl Entity for GameOverScreen {
    fn name(&self) -> &'static str {
        "GameOverScreen"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn render(&mut self, _ctx: &GameContext, surface: &mut dyn Surface, _frame: &FrameInfo) {
        draw_message(surface, &self.message());
    }

    fn hit_test(&self, _ctx: &GameContext, _x: f32, _y: f32) -> bool {
        true
    }

    fn on_click(&mut self, ctx: &mut GameContext, _x: f32, _y: f32) {
        ctx.request_transition(Transition::StartGame);
    }
}
