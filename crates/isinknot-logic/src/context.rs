//! The per-session context passed to every entity callback.
//!
//! Entities never hold references to each other or to the session. They
//! reach shared state through the [`GameContext`] and communicate outward by
//! queueing into its outboxes: sounds for the host, new entities for the
//! registry, and phase transitions for the [`crate::game::Game`].

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::Sound;
use crate::config::Tuning;
use crate::entity::Entity;
use crate::input::BuildMenu;
use crate::state::GameState;
use crate::vector::Vec2;

/// A phase change requested from inside the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    StartGame,
    GameOver { distance: f32, elapsed_ms: f64 },
}

pub struct GameContext {
    pub state: GameState,
    pub tuning: Tuning,
    pub rng: StdRng,
    /// Canvas size the session lays itself out against.
    pub canvas: Vec2,
    pub build_menu: Option<BuildMenu>,
    sounds: Vec<Sound>,
    spawned: Vec<Box<dyn Entity>>,
    transition: Option<Transition>,
}

impl GameContext {
    pub fn new(tuning: Tuning, seed: u64, canvas: Vec2) -> Self {
        Self {
            state: GameState::new(&tuning),
            tuning,
            rng: StdRng::seed_from_u64(seed),
            canvas,
            build_menu: None,
            sounds: Vec::new(),
            spawned: Vec::new(),
            transition: None,
        }
    }

    pub fn play(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }

    pub fn drain_sounds(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.sounds)
    }

    /// Queue an entity for registration after the current pass.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.spawned.push(entity);
    }

    pub(crate) fn take_spawned(&mut self) -> Vec<Box<dyn Entity>> {
        std::mem::take(&mut self.spawned)
    }

    /// Ask the game to change phase. The first request in a pass wins.
    pub fn request_transition(&mut self, transition: Transition) {
        if self.transition.is_none() {
            self.transition = Some(transition);
        }
    }

    pub fn take_transition(&mut self) -> Option<Transition> {
        self.transition.take()
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }
}
