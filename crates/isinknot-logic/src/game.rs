//! The host-facing facade.
//!
//! A [`Game`] owns the current [`Session`] and the [`Phase`] it belongs to.
//! Hosts feed it timestamps and input, hand it a surface to draw on, drain
//! its sound outbox, and show the build menu it reports.
//!
//! ```
//! use isinknot_logic::prelude::*;
//!
//! let mut game = Game::with_seed(Tuning::default(), 7);
//! assert_eq!(game.phase(), Phase::Title);
//! game.click(10.0, 10.0);
//! assert_eq!(game.phase(), Phase::Playing);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::actions;
use crate::audio::{Music, Sound};
use crate::config::Tuning;
use crate::constants::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::context::Transition;
use crate::input::{BuildMenu, Key};
use crate::modules::ModuleKind;
use crate::session::Session;
use crate::state::ActionError;
use crate::surface::Surface;
use crate::vector::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
}

pub struct Game {
    tuning: Tuning,
    phase: Phase,
    session: Session,
    seeder: StdRng,
    canvas: Vec2,
    /// Sounds queued by sessions that have since been replaced.
    sounds: Vec<Sound>,
}

impl Game {
    pub fn new(tuning: Tuning) -> Self {
        Self::with_seed(tuning, rand::random())
    }

    /// A game whose sessions draw their randomness from `seed`.
    pub fn with_seed(tuning: Tuning, seed: u64) -> Self {
        let mut seeder = StdRng::seed_from_u64(seed);
        let canvas = Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let session = Session::title(tuning.clone(), seeder.gen(), canvas);
        Self {
            tuning,
            phase: Phase::Title,
            session,
            seeder,
            canvas,
            sounds: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn set_canvas(&mut self, width: f32, height: f32) {
        self.canvas = Vec2::new(width, height);
        self.session.set_canvas(self.canvas);
    }

    fn replace_session(&mut self, phase: Phase, session: Session) {
        self.session.teardown();
        self.sounds.extend(self.session.drain_sounds());
        log::info!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.session = session;
    }

    /// Tear down whatever is running and start a fresh playing session.
    pub fn start_game(&mut self) {
        let seed = self.seeder.gen();
        let session = Session::playing(self.tuning.clone(), seed, self.canvas);
        self.replace_session(Phase::Playing, session);
    }

    fn apply_transition(&mut self) {
        match self.session.take_transition() {
            Some(Transition::StartGame) => self.start_game(),
            Some(Transition::GameOver {
                distance,
                elapsed_ms,
            }) => {
                let seed = self.seeder.gen();
                let session =
                    Session::game_over(self.tuning.clone(), seed, self.canvas, distance, elapsed_ms);
                self.replace_session(Phase::GameOver, session);
            }
            None => {}
        }
    }

    /// Advance the simulation to host time `now` (ms).
    pub fn update(&mut self, now: f64) -> bool {
        let ticked = self.session.update(now);
        self.apply_transition();
        ticked
    }

    /// Run one tick of `dt` ms without consulting the timer.
    pub fn step(&mut self, dt: f64) {
        self.session.step(dt);
        self.apply_transition();
    }

    pub fn render(&mut self, now: f64, surface: &mut dyn Surface) -> bool {
        self.session.render(now, surface)
    }

    pub fn click(&mut self, x: f32, y: f32) -> bool {
        let clicked = self.session.click(x, y);
        self.apply_transition();
        clicked
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.session.pointer_move(x, y);
    }

    pub fn key_down(&mut self, key: Key) {
        if self.phase != Phase::Playing {
            return;
        }
        let ctx = self.session.context_mut();
        match key {
            Key::Debug => ctx.state.debug = !ctx.state.debug,
            Key::Pause => {
                if ctx.state.debug && ctx.build_menu.is_none() {
                    ctx.state.paused = !ctx.state.paused;
                    log::info!("Paused: {}", ctx.state.paused);
                }
            }
        }
    }

    pub fn build_menu(&self) -> Option<&BuildMenu> {
        self.session.context().build_menu.as_ref()
    }

    /// Build `kind` at the open menu's slot and close the menu.
    pub fn confirm_build(&mut self, kind: ModuleKind) -> Result<(), ActionError> {
        let ctx = self.session.context_mut();
        let menu = ctx.build_menu.clone().ok_or(ActionError::NoMenu)?;
        if !menu.offers(kind) {
            return Err(ActionError::NotBuildable {
                x: menu.x,
                y: menu.y,
                kind,
            });
        }
        actions::begin_build(ctx, menu.x, menu.y, kind)?;
        ctx.build_menu = None;
        ctx.state.paused = false;
        Ok(())
    }

    /// Close the build menu without building.
    pub fn cancel_build(&mut self) {
        let ctx = self.session.context_mut();
        if ctx.build_menu.take().is_some() {
            ctx.play(Sound::Cancel);
            ctx.state.paused = false;
        }
    }

    pub fn drain_sounds(&mut self) -> Vec<Sound> {
        let mut sounds = std::mem::take(&mut self.sounds);
        sounds.extend(self.session.drain_sounds());
        sounds
    }

    /// The background track for the current phase.
    pub fn music(&self) -> Music {
        match self.phase {
            Phase::Playing => Music::Main,
            Phase::Title | Phase::GameOver => Music::Title,
        }
    }
}
