//! Sound effect and music cues.
//!
//! The simulation never plays audio itself. Entities queue [`Sound`]s into
//! the session outbox and the host drains and plays them; the host also polls
//! [`crate::game::Game::music`] to pick the background track.

use serde::{Deserialize, Serialize};

/// Seconds before the end of a track at which it jumps back to its loop point.
pub const LOOP_TAIL_BUFFER_SECS: f64 = 0.44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    Building,
    Repairing,
    Breaking,
    Confirm,
    Cancel,
    Row,
}

impl Sound {
    pub fn all() -> &'static [Sound] {
        &[
            Sound::Building,
            Sound::Repairing,
            Sound::Breaking,
            Sound::Confirm,
            Sound::Cancel,
            Sound::Row,
        ]
    }

    pub fn path(self) -> &'static str {
        match self {
            Sound::Building => "sound/building.mp3",
            Sound::Repairing => "sound/repairing.mp3",
            Sound::Breaking => "sound/breaking.mp3",
            Sound::Confirm => "sound/confirm.mp3",
            Sound::Cancel => "sound/cancel.mp3",
            Sound::Row => "sound/row.mp3",
        }
    }

    pub fn volume(self) -> f32 {
        match self {
            Sound::Breaking | Sound::Confirm | Sound::Row => 0.7,
            Sound::Cancel => 0.5,
            Sound::Building | Sound::Repairing => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Music {
    Title,
    Main,
}

impl Music {
    pub fn path(self) -> &'static str {
        match self {
            Music::Title => "sound/i sink not - song 1 - title.mp3",
            Music::Main => "sound/i sink not - song 2.mp3",
        }
    }

    /// Where playback resumes after reaching the tail buffer, in seconds.
    pub fn loop_start(self) -> f64 {
        match self {
            Music::Title => 0.0,
            Music::Main => 7.211,
        }
    }

    /// The position to seek to, if playback at `current` secs has entered the
    /// tail of a `duration`-long track.
    pub fn loop_position(self, current: f64, duration: f64) -> Option<f64> {
        (current > duration - LOOP_TAIL_BUFFER_SECS).then(|| self.loop_start())
    }
}
