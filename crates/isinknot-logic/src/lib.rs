//! Pure simulation logic for I Sink Not.
//!
//! This crate contains all game logic that is independent of any window,
//! renderer, asset loader or audio backend. The host (the Bevy viewer or the
//! headless simtest) feeds it wall-clock timestamps, pointer coordinates and
//! key presses, and hands it a [`surface::Surface`] to draw on.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actions`] | Starting and resolving the single timed player action |
//! | [`art`] | Sprite sheets, anchored regions, prioritised atlas lookup |
//! | [`audio`] | Sound effect and music cues with volumes and loop points |
//! | [`clock`] | Fixed-interval tick timer, render loop with stop token, water bob |
//! | [`config`] | Gameplay tuning values and their validation |
//! | [`constants`] | Layout constants (module size, columns, water line) |
//! | [`context`] | Per-session context handed to every entity |
//! | [`controller`] | The game controller entity: cooldowns, stats, draught, loss |
//! | [`entity`] | Entity trait, flags, and the registry (tick/render/click/hover) |
//! | [`game`] | Host-facing facade: phases, sessions, input routing |
//! | [`input`] | Keys and build-menu requests |
//! | [`modules`] | Module kinds, descriptor table, damage state machine |
//! | [`particles`] | Short-lived particle entities and effect presets |
//! | [`scenery`] | Sky, parallax background and water entities |
//! | [`screens`] | Title and game-over screens |
//! | [`session`] | One game session: context, registry, timers, teardown |
//! | [`ship`] | The ship grid: placement, build rules, aggregation |
//! | [`ship_entity`] | Drawing, hit testing and clicking the ship grid |
//! | [`state`] | Aggregate game state and the pending action |
//! | [`surface`] | Drawing surface trait and a recording implementation |
//! | [`ui`] | Buttons, HUD and debug overlay |
//! | [`vector`] | 2-D vector math and rectangles |

pub mod actions;
pub mod art;
pub mod audio;
pub mod clock;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod entity;
pub mod game;
pub mod input;
pub mod modules;
pub mod particles;
pub mod scenery;
pub mod screens;
pub mod session;
pub mod ship;
pub mod ship_entity;
pub mod state;
pub mod surface;
pub mod ui;
pub mod vector;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::Tuning;
    pub use crate::game::{Game, Phase};
    pub use crate::input::{BuildMenu, Key};
    pub use crate::modules::{Condition, ModuleKind};
    pub use crate::surface::{Color, RecordingSurface, Surface};
    pub use crate::vector::{Rect, Vec2};
}
