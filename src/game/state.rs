//! Fighter action states and their transition table

use serde::{Deserialize, Serialize};

/// The one action a fighter is performing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    #[default]
    Idle,
    Walk,
    Jump,
    Crouch,
    Block,
    Attack,
    /// Grounded hitstun
    Hit,
    /// Launched or hit while airborne; lands into `Down`
    AirHit,
    Throw,
    /// Knocked down on the floor
    Down,
}

/// Things that happen to a fighter which may move it to another state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// The per-state countdown ran out
    TimerExpired,
    /// Hitstun dropped to zero
    HitstunCleared,
    /// Touched the ground after being airborne
    Landed,
}

/// Recovery time spent on the floor after landing from an air hit
pub const DOWN_RECOVERY: f64 = 0.6;

impl ActionState {
    /// Next state for `event`, or `None` when the event does not apply.
    pub fn on(self, event: StateEvent) -> Option<ActionState> {
        use ActionState::*;
        use StateEvent::*;

        match (self, event) {
            (Attack | Down | Throw | Block, TimerExpired) => Some(Idle),
            (Idle | Walk | Jump | Crouch | Hit | AirHit, TimerExpired) => None,

            (Hit | Block | Walk | Crouch | Idle, HitstunCleared) => Some(Idle),
            (Jump | Attack | AirHit | Throw | Down, HitstunCleared) => None,

            (AirHit, Landed) => Some(Down),
            (Jump, Landed) => Some(Idle),
            (Idle | Walk | Crouch | Block | Attack | Hit | Throw | Down, Landed) => None,
        }
    }

    /// Movement commands are ignored in these states
    pub fn locks_input(self) -> bool {
        matches!(self, ActionState::Hit | ActionState::Throw | ActionState::Down)
    }

    /// New attacks and throws are refused in these states
    pub fn locks_attack(self) -> bool {
        matches!(
            self,
            ActionState::Attack | ActionState::Throw | ActionState::Hit | ActionState::Down
        )
    }

    /// Ground friction does not act on these states
    pub fn keeps_momentum(self) -> bool {
        matches!(
            self,
            ActionState::Attack | ActionState::Hit | ActionState::Throw | ActionState::Down
        )
    }
}
