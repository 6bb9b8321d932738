//! Snapshot building for render sinks

use serde::Serialize;

use super::events::Side;
use super::fighter::{Facing, Fighter};
use super::moves::MoveId;
use super::r#match::Duel;
use super::state::ActionState;

/// Builds snapshots at a fixed tick interval
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

/// Fighter state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FighterSnapshot {
    pub side: Side,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub facing: Facing,
    pub state: ActionState,
    pub health: i32,
    pub max_health: i32,
    pub hitstun: f64,
    pub combo: u32,
    pub blocking: bool,
    pub crouching: bool,
    /// Move in flight and its progress in [0, 1]
    pub attack: Option<(MoveId, f64)>,
}

impl From<&Fighter> for FighterSnapshot {
    fn from(f: &Fighter) -> Self {
        let (vel_x, vel_y) = f.velocity();
        Self {
            side: f.side(),
            name: f.name().to_string(),
            x: f.x(),
            y: f.y(),
            vel_x,
            vel_y,
            facing: f.facing(),
            state: f.state(),
            health: f.health(),
            max_health: f.max_health(),
            hitstun: f.hitstun(),
            combo: f.combo(),
            blocking: f.is_blocking(),
            crouching: f.is_crouching(),
            attack: f.attack_instance().map(|a| {
                let progress = (a.elapsed / a.def.total_duration()).clamp(0.0, 1.0);
                (a.move_id, progress)
            }),
        }
    }
}

/// Whole-duel state for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuelSnapshot {
    pub tick: u64,
    pub round: u32,
    pub round_timer: f64,
    pub score: [u32; 2],
    pub round_over: bool,
    pub match_over: bool,
    pub fighters: [FighterSnapshot; 2],
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for round and match ends)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot of the duel
    pub fn build(&self, duel: &Duel) -> DuelSnapshot {
        let state = duel.state();
        let [f1, f2] = duel.fighters();
        DuelSnapshot {
            tick: duel.tick_count(),
            round: state.round,
            round_timer: state.round_timer,
            score: state.score,
            round_over: state.round_over,
            match_over: state.match_over,
            fighters: [f1.into(), f2.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::r#match::{Controller, FightSelection};
    use uuid::Uuid;

    #[test]
    fn interval_gates_sends() {
        let mut builder = SnapshotBuilder::new(3);
        let sent: Vec<bool> = (0..6).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![false, false, true, false, false, true]);
        builder.force_next();
        assert!(builder.should_send());
    }

    #[test]
    fn snapshot_reflects_duel() {
        let mut duel = Duel::new(
            Uuid::new_v4(),
            SimConfig::default(),
            [Controller::Human, Controller::Human],
        );
        duel.start_fight(FightSelection::default());
        duel.fighter_mut(Side::One).attack(MoveId::Jab).unwrap();

        let snapshot = SnapshotBuilder::new(1).build(&duel);
        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.fighters[0].name, "Ryuji");
        assert_eq!(snapshot.fighters[0].state, ActionState::Attack);
        assert_eq!(snapshot.fighters[0].attack, Some((MoveId::Jab, 0.0)));
        assert_eq!(snapshot.fighters[1].facing, Facing::Left);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["fighters"][1]["state"], "idle");
    }
}
