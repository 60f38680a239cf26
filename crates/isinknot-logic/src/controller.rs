//! The game controller: first entity in every playing session.
//!
//! Each tick it checks the loss condition, runs the action cooldown, and
//! integrates draught, distance and elapsed time from the ship's stats.

use crate::actions;
use crate::clock::FrameInfo;
use crate::constants::layers;
use crate::context::{GameContext, Transition};
use crate::entity::{Entity, EntityFlags};
use crate::surface::Surface;

pub struct GameController {
    flags: EntityFlags,
}

impl GameController {
    pub fn new() -> Self {
        let mut flags = EntityFlags::new(layers::CONTROLLER);
        flags.visible = false;
        Self { flags }
    }
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for GameController {
    fn name(&self) -> &'static str {
        "GameController"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn tick(&mut self, ctx: &mut GameContext, dt: f64, _now: f64) {
        if ctx.state.is_sunk() {
            if ctx.state.running {
                ctx.state.running = false;
                log::info!(
                    "Ship sank after {:.0} m and {:.1} s",
                    ctx.state.distance,
                    ctx.state.elapsed_secs()
                );
                ctx.request_transition(Transition::GameOver {
                    distance: ctx.state.distance,
                    elapsed_ms: ctx.state.elapsed_ms,
                });
            }
            return;
        }

        if let Some(action) = ctx.state.advance_cooldown(dt) {
            actions::resolve(ctx, action);
        }

        let stats = ctx.state.ship.stats(ctx.state.draught);
        let tuning = &ctx.tuning;
        let state = &mut ctx.state;
        let dt_secs = (dt / 1000.0) as f32;

        state.speed = stats.speed;
        state.draught =
            (state.draught + (stats.weight - stats.buoyancy) * dt_secs * tuning.sink_rate).max(0.0);
        state.distance += (state.speed + state.speed_boost) * dt_secs * tuning.distance_rate;
        state.elapsed_ms += dt;
    }

    fn render(&mut self, _ctx: &GameContext, _surface: &mut dyn Surface, _frame: &FrameInfo) {}
}
