//! One game session: a context, the registry of its entities, and the two
//! timers that drive them.
//!
//! Title, playing and game-over each get their own session. Replacing the
//! session is the only way the entity set changes wholesale; the old one is
//! torn down first so its timers stop and a pending action never resolves.

use crate::audio::Sound;
use crate::clock::{RenderLoop, StopToken, TickTimer};
use crate::config::Tuning;
use crate::context::{GameContext, Transition};
use crate::controller::GameController;
use crate::entity::{Entity, Registry};
use crate::scenery::{Background, Water};
use crate::screens::{GameOverScreen, TitleScreen};
use crate::ship_entity::ShipEntity;
use crate::surface::Surface;
use crate::ui::{Button, ButtonKind, DebugDisplay, Hud};
use crate::vector::Vec2;

pub struct Session {
    ctx: GameContext,
    registry: Registry,
    timer: TickTimer,
    frames: RenderLoop,
    render_token: StopToken,
    /// Last host time seen by a tick.
    clock_now: f64,
}

impl Session {
    fn with_entities(ctx: GameContext, entities: Vec<Box<dyn Entity>>) -> Self {
        let timer = TickTimer::new(ctx.tuning.tick_interval_ms, ctx.tuning.max_tick_ms);
        let frames = RenderLoop::new();
        let render_token = frames.token();
        let mut registry = Registry::new();
        for entity in entities {
            registry.register(entity);
        }
        Self {
            ctx,
            registry,
            timer,
            frames,
            render_token,
            clock_now: 0.0,
        }
    }

    pub fn title(tuning: Tuning, seed: u64, canvas: Vec2) -> Self {
        let ctx = GameContext::new(tuning, seed, canvas);
        Self::with_entities(ctx, vec![Box::new(TitleScreen::new())])
    }

    /// A fresh game: one hull at the starting column, controller first.
    pub fn playing(tuning: Tuning, seed: u64, canvas: Vec2) -> Self {
        let ctx = GameContext::new(tuning, seed, canvas);
        log::info!(
            "Starting session (seed {}, draught {})",
            seed,
            ctx.state.draught
        );
        let mut entities: Vec<Box<dyn Entity>> = vec![
            Box::new(GameController::new()),
            Box::new(Background::new()),
            Box::new(DebugDisplay::new()),
        ];
        for (index, kind) in ButtonKind::all().iter().enumerate() {
            entities.push(Box::new(Button::new(*kind, index)));
        }
        entities.push(Box::new(ShipEntity::new()));
        entities.push(Box::new(Water::new()));
        entities.push(Box::new(Hud::new()));
        Self::with_entities(ctx, entities)
    }

    pub fn game_over(tuning: Tuning, seed: u64, canvas: Vec2, distance: f32, elapsed_ms: f64) -> Self {
        let ctx = GameContext::new(tuning, seed, canvas);
        Self::with_entities(ctx, vec![Box::new(GameOverScreen::new(distance, elapsed_ms))])
    }

    /// Poll the tick timer and run at most one simulation tick.
    /// Returns whether a tick ran.
    pub fn update(&mut self, now: f64) -> bool {
        let Some(dt) = self.timer.poll(now) else {
            return false;
        };
        self.clock_now = now;
        self.registry.tick_all(&mut self.ctx, dt, now);
        true
    }

    /// Run one tick of `dt` ms regardless of the timer.
    pub fn step(&mut self, dt: f64) {
        if self.timer.is_stopped() {
            return;
        }
        self.clock_now += dt;
        self.registry.tick_all(&mut self.ctx, dt, self.clock_now);
    }

    /// Draw one frame. Returns false once the render loop has been stopped.
    pub fn render(&mut self, now: f64, surface: &mut dyn Surface) -> bool {
        let Some(frame) = self.frames.frame(now) else {
            return false;
        };
        self.registry.render_all(&self.ctx, surface, &frame);
        true
    }

    /// Route a click. Canvas clicks are ignored while a build menu is open.
    pub fn click(&mut self, x: f32, y: f32) -> bool {
        if self.ctx.build_menu.is_some() {
            return false;
        }
        self.registry.dispatch_click(&mut self.ctx, x, y)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.registry.dispatch_hover(&mut self.ctx, x, y);
    }

    /// Stop both timers and drop any pending action unrun.
    pub fn teardown(&mut self) {
        self.timer.stop();
        self.render_token.stop();
        self.ctx.build_menu = None;
        if let Some(action) = self.ctx.state.cancel_pending() {
            log::info!("Discarded pending {:?} at teardown", action);
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.timer.is_stopped() && self.render_token.is_stopped()
    }

    pub fn set_canvas(&mut self, canvas: Vec2) {
        self.ctx.canvas = canvas;
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn take_transition(&mut self) -> Option<Transition> {
        self.ctx.take_transition()
    }

    pub fn drain_sounds(&mut self) -> Vec<Sound> {
        self.ctx.drain_sounds()
    }

    pub fn clock_now(&self) -> f64 {
        self.clock_now
    }
}
