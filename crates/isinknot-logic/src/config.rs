//! Gameplay tuning: every rate, cooldown and scale the simulation reads.
//!
//! A [`Tuning`] is fixed for the lifetime of a [`crate::game::Game`]. Hosts may
//! load one from JSON (see `data/tuning.json`) and should run
//! [`validate_tuning`] before starting.
//!
//! ```
//! use isinknot_logic::config::{validate_tuning, Tuning};
//!
//! let mut tuning = Tuning::default();
//! tuning.hull_flood_rate = 0.0;
//! assert!(validate_tuning(&tuning).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::SHIP_COLUMNS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Simulation tick interval in ms.
    pub tick_interval_ms: f64,
    /// Upper bound on one tick's elapsed time in ms.
    pub max_tick_ms: f64,
    /// Draught at session start.
    pub initial_draught: f32,
    /// Column of the starting hull on row 0.
    pub initial_hull_column: usize,
    /// Draught change per second per unit of net weight.
    pub sink_rate: f32,
    /// Distance per second per unit of speed.
    pub distance_rate: f32,
    /// Damage per second at fragility 1 and difficulty 1, scaled by a uniform roll.
    pub damage_rate: f32,
    /// Fraction of max health at which a module becomes damaged.
    pub damaged_fraction: f32,
    /// Fragility multiplier per adjacent support module.
    pub support_factor: f32,
    /// Flood per second in a broken, wet hull.
    pub hull_flood_rate: f32,
    /// Distance at which difficulty has grown by 1.
    pub difficulty_distance_scale: f32,
    /// Seconds afloat at which difficulty has grown by 1.
    pub difficulty_time_scale_secs: f32,
    /// Difficulty ceiling.
    pub max_difficulty: f32,
    pub repair_time_ms: f64,
    pub bail_time_ms: f64,
    /// Flood removed from every hull by one bail.
    pub bail_amount: f32,
    pub row_time_ms: f64,
    /// Speed added while rowing.
    pub row_boost: f32,
    /// Chance per tick that a working boiler puffs smoke.
    pub smoke_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100.0,
            max_tick_ms: 1000.0,
            initial_draught: 10.0,
            initial_hull_column: 2,
            sink_rate: 1.0,
            distance_rate: 10.0,
            damage_rate: 3.0,
            damaged_fraction: 0.5,
            support_factor: 0.5,
            hull_flood_rate: 4.0,
            difficulty_distance_scale: 1000.0,
            difficulty_time_scale_secs: 300.0,
            max_difficulty: 4.0,
            repair_time_ms: 1000.0,
            bail_time_ms: 1000.0,
            bail_amount: 16.0,
            row_time_ms: 1000.0,
            row_boost: 1.0,
            smoke_chance: 0.3,
        }
    }
}

/// Tuning validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive is not.
    NotPositive { field: &'static str, value: f64 },
    /// A value that must be zero or more is negative.
    Negative { field: &'static str, value: f64 },
    /// A value outside its allowed closed range.
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// The tick cap is shorter than the tick itself.
    TickCapBelowInterval { interval: f64, cap: f64 },
    /// The starting hull would sit on an edge column or off the grid.
    InvalidHullColumn(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{} must not be negative, got {}", field, value)
            }
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{} must be within {}..={}, got {}", field, min, max, value),
            ConfigError::TickCapBelowInterval { interval, cap } => write!(
                f,
                "max_tick_ms ({}) must be at least tick_interval_ms ({})",
                cap, interval
            ),
            ConfigError::InvalidHullColumn(column) => write!(
                f,
                "initial_hull_column {} must be between 1 and {}",
                column,
                SHIP_COLUMNS - 2
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate tuning values, returning all errors found.
pub fn validate_tuning(tuning: &Tuning) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let positive = [
        ("tick_interval_ms", tuning.tick_interval_ms),
        (
            "difficulty_distance_scale",
            tuning.difficulty_distance_scale as f64,
        ),
        (
            "difficulty_time_scale_secs",
            tuning.difficulty_time_scale_secs as f64,
        ),
    ];
    for (field, value) in positive {
        if value.is_nan() || value <= 0.0 {
            errors.push(ConfigError::NotPositive { field, value });
        }
    }

    let non_negative = [
        ("initial_draught", tuning.initial_draught as f64),
        ("sink_rate", tuning.sink_rate as f64),
        ("distance_rate", tuning.distance_rate as f64),
        ("damage_rate", tuning.damage_rate as f64),
        ("hull_flood_rate", tuning.hull_flood_rate as f64),
        ("repair_time_ms", tuning.repair_time_ms),
        ("bail_time_ms", tuning.bail_time_ms),
        ("bail_amount", tuning.bail_amount as f64),
        ("row_time_ms", tuning.row_time_ms),
        ("row_boost", tuning.row_boost as f64),
    ];
    for (field, value) in non_negative {
        if value.is_nan() || value < 0.0 {
            errors.push(ConfigError::Negative { field, value });
        }
    }

    let ranged = [
        ("damaged_fraction", tuning.damaged_fraction as f64, 0.01, 0.99),
        ("support_factor", tuning.support_factor as f64, 0.0, 1.0),
        ("smoke_chance", tuning.smoke_chance as f64, 0.0, 1.0),
        ("max_difficulty", tuning.max_difficulty as f64, 1.0, 100.0),
    ];
    for (field, value, min, max) in ranged {
        if !(min..=max).contains(&value) {
            errors.push(ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
    }

    if tuning.max_tick_ms < tuning.tick_interval_ms {
        errors.push(ConfigError::TickCapBelowInterval {
            interval: tuning.tick_interval_ms,
            cap: tuning.max_tick_ms,
        });
    }

    // The starting hull is solid, so it may not occupy an edge column.
    if tuning.initial_hull_column == 0 || tuning.initial_hull_column >= SHIP_COLUMNS - 1 {
        errors.push(ConfigError::InvalidHullColumn(tuning.initial_hull_column));
    }

    errors
}
