//! Fight simulation modules

pub mod agent;
pub mod combat;
pub mod events;
pub mod fighter;
pub mod r#match;
pub mod moves;
pub mod physics;
pub mod roster;
pub mod runner;
pub mod sink;
pub mod snapshot;
pub mod state;

pub use agent::DecisionAgent;
pub use events::{EffectKind, RoundOutcome, Side, SimEvent, SoundCue};
pub use fighter::{BaseStats, Facing, Fighter};
pub use moves::MoveId;
pub use r#match::{Controller, Duel, FightSelection, MatchState, Screen};
pub use runner::{GameMatch, MatchHandle, MatchMsg, MatchRegistry};
pub use state::ActionState;

use serde::{Deserialize, Serialize};

/// Command set for one side for a single tick (level-sensitive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCommands {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub crouch: bool,
    pub block: bool,
    /// Attack trigger; re-attempted every tick it is held
    pub attack: Option<MoveId>,
    /// Throw trigger; re-attempted every tick it is held
    pub throw: bool,
}

/// Player input received by a running match
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub side: Side,
    pub commands: InputCommands,
}

/// Why an attack or throw did not start
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("fighter is busy and cannot act")]
    Busy,

    #[error("unknown move: {0}")]
    UnknownMove(String),

    #[error("target out of throw range ({distance:.1} > {max:.1})")]
    OutOfRange { distance: f64, max: f64 },
}
