//! Layout constants for module size, grid width, water line and z layers.
//!
//! Gameplay numbers that a designer would tune live in [`crate::config::Tuning`];
//! these are the fixed geometry the art is drawn against.

/// Width of one ship module slot in pixels.
pub const MODULE_WIDTH: f32 = 128.0;
/// Height of one ship module slot in pixels.
pub const MODULE_HEIGHT: f32 = 128.0;
/// Fixed number of columns in the ship grid.
pub const SHIP_COLUMNS: usize = 5;
/// Distance from the bottom of the canvas to the resting water line.
pub const WATER_HEIGHT: f32 = 100.0;
/// Left edge of the ship grid on screen.
pub const SHIP_ORIGIN_X: f32 = MODULE_WIDTH;

/// Default canvas size used by the hosts.
pub const CANVAS_WIDTH: f32 = 1280.0;
pub const CANVAS_HEIGHT: f32 = 720.0;

pub const BUTTON_SIZE: f32 = 50.0;
pub const BUTTON_MARGIN: f32 = 20.0;

/// Draw-order keys. Lower values are drawn first.
pub mod layers {
    pub const CONTROLLER: i32 = -200;
    pub const BACKGROUND: i32 = -100;
    pub const SCREEN: i32 = 0;
    pub const SHIP: i32 = 10;
    pub const WATER: i32 = 20;
    pub const PARTICLES: i32 = 30;
    pub const HUD: i32 = 40;
    pub const BUTTONS: i32 = 50;
    pub const DEBUG: i32 = 60;
}

/// Water bob parameters: (phase offset in ms, magnitude in px).
pub mod bob {
    pub const WATER: (f64, f32) = (0.0, 5.0);
    pub const SHIP: (f64, f32) = (250.0, 3.0);
    /// Period divisor: offset = magnitude * sin((t + phase) / PERIOD).
    pub const PERIOD_MS: f64 = 250.0;
}
