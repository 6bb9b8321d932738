//! Simulation output events
//! These are the notifications handed to rendering/audio layers after each tick

use serde::{Deserialize, Serialize};

/// Which fighter a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Visual effect kinds understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Hit,
    Block,
    Throw,
    Spark,
}

/// Named sound cues understood by the audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Hit,
    Block,
    Throw,
    RoundStart,
    Ko,
    Select,
}

/// How a round was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// One side won the round (by KO or on health at time-up)
    Won { side: Side, ko: bool },
    /// Time ran out with equal health
    Draw,
    /// Both fighters dropped to zero health
    DoubleKo,
}

/// Events emitted by a simulation tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SimEvent {
    /// Spawn a short-lived visual at a world position
    SpawnEffect { kind: EffectKind, x: f64, y: f64 },

    /// Shake the camera; larger power = stronger shake
    CameraShake { power: f64 },

    /// Play a sound cue
    PlaySound { cue: SoundCue },

    /// A round has been decided
    RoundEnded {
        round: u32,
        outcome: RoundOutcome,
        score: [u32; 2],
    },

    /// A new round has begun after a reset
    RoundStarted { round: u32 },

    /// The match is over
    MatchEnded { winner: Side, score: [u32; 2] },
}
