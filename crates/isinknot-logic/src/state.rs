//! Aggregate per-session game state and the single pending player action.

use crate::config::Tuning;
use crate::modules::ModuleKind;
use crate::ship::Ship;

/// A timed player action. It resolves when the cooldown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Build { x: usize, y: usize, kind: ModuleKind },
    Repair { x: usize, y: usize },
    Bail,
    Row,
}

/// Why a player action could not start.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionError {
    /// Another action is still cooling down.
    Busy { remaining_ms: f64 },
    /// The kind cannot be placed at this slot.
    NotBuildable { x: usize, y: usize, kind: ModuleKind },
    /// Nothing repairable at this slot.
    NotRepairable { x: usize, y: usize },
    /// No build menu is open.
    NoMenu,
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::Busy { remaining_ms } => {
                write!(f, "another action is pending ({:.0} ms left)", remaining_ms)
            }
            ActionError::NotBuildable { x, y, kind } => {
                write!(f, "cannot build {} at ({}, {})", kind.name(), x, y)
            }
            ActionError::NotRepairable { x, y } => {
                write!(f, "nothing to repair at ({}, {})", x, y)
            }
            ActionError::NoMenu => write!(f, "no build menu is open"),
        }
    }
}

impl std::error::Error for ActionError {}

#[derive(Debug, Clone)]
pub struct GameState {
    pub ship: Ship,
    /// Depth of the ship's bottom below the water line, in px.
    pub draught: f32,
    pub distance: f32,
    pub elapsed_ms: f64,
    pub speed: f32,
    /// Extra speed while rowing.
    pub speed_boost: f32,
    pub cooldown_ms: f64,
    pub pending: Option<PendingAction>,
    pub paused: bool,
    pub debug: bool,
    /// False once the ship has sunk.
    pub running: bool,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            ship: Ship::starting(tuning.initial_hull_column),
            draught: tuning.initial_draught,
            distance: 0.0,
            elapsed_ms: 0.0,
            speed: 0.0,
            speed_boost: 0.0,
            cooldown_ms: 0.0,
            pending: None,
            paused: false,
            debug: false,
            running: true,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.cooldown_ms > 0.0 || self.pending.is_some()
    }

    /// Start a timed action. Fails while another one is pending.
    pub fn begin_action(&mut self, action: PendingAction, cooldown_ms: f64) -> Result<(), ActionError> {
        if self.is_busy() {
            return Err(ActionError::Busy {
                remaining_ms: self.cooldown_ms,
            });
        }
        log::debug!("Begin {:?} ({} ms)", action, cooldown_ms);
        self.pending = Some(action);
        self.cooldown_ms = cooldown_ms.max(0.0);
        Ok(())
    }

    /// Count the cooldown down. Returns the pending action exactly once, on
    /// the tick the cooldown reaches zero.
    pub fn advance_cooldown(&mut self, dt_ms: f64) -> Option<PendingAction> {
        self.cooldown_ms = (self.cooldown_ms - dt_ms).max(0.0);
        if self.cooldown_ms > 0.0 {
            return None;
        }
        self.pending.take()
    }

    /// Drop the pending action without running it.
    pub fn cancel_pending(&mut self) -> Option<PendingAction> {
        self.cooldown_ms = 0.0;
        self.pending.take()
    }

    /// Damage multiplier: grows with distance and with time afloat, capped.
    pub fn difficulty(&self, tuning: &Tuning) -> f32 {
        let by_distance = 1.0 + self.distance / tuning.difficulty_distance_scale;
        let by_time = 1.0 + (self.elapsed_ms / 1000.0) as f32 / tuning.difficulty_time_scale_secs;
        by_distance.max(by_time).min(tuning.max_difficulty)
    }

    /// The visible module stack has slipped below the water line.
    pub fn is_sunk(&self) -> bool {
        self.ship.stack_height() < self.draught
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }
}
