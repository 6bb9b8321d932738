//! Scripted opponent - distance-based offense on a cooldown, reactive guard every tick

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::combat::CombatSystem;
use super::events::SimEvent;
use super::fighter::Fighter;
use super::moves::MoveId;
use super::state::ActionState;

/// Range bands measured on the x axis
const CLINCH_RANGE: f64 = 80.0;
const MID_RANGE: f64 = 250.0;
const GUARD_RANGE: f64 = 180.0;

const BASE_COOLDOWN: f64 = 0.6;
const THROW_CHANCE: f64 = 0.25;
const ADVANCE_CHANCE: f64 = 0.6;
/// Scales difficulty into per-decision probabilities
const AGGRESSION: f64 = 0.6;
const JUMP_CHANCE: f64 = 0.1;
const GUARD_DURATION: f64 = 0.2;
/// Velocity added per advance, capped at the fighter's base speed
const ADVANCE_STEP: f64 = 40.0;

const CLINCH_MOVES: [MoveId; 4] = [MoveId::Jab, MoveId::Strong, MoveId::Low, MoveId::Roundhouse];
const POKE_MOVES: [MoveId; 2] = [MoveId::Jab, MoveId::Strong];

/// What the agent chose on its last offensive decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Throw,
    Attack(MoveId),
    Advance,
    Jump,
    Wait,
}

/// Non-learning opponent controller
#[derive(Debug, Clone)]
pub struct DecisionAgent {
    difficulty: f64,
    cooldown: f64,
    timer: f64,
    rng: ChaCha8Rng,
}

impl DecisionAgent {
    pub fn new(difficulty: f64, rng: ChaCha8Rng) -> Self {
        assert!(
            (0.0..=1.0).contains(&difficulty),
            "difficulty must be within [0, 1], got {difficulty}"
        );
        Self {
            difficulty,
            cooldown: BASE_COOLDOWN,
            timer: 0.0,
            rng,
        }
    }

    pub fn with_seed(difficulty: f64, seed: u64) -> Self {
        Self::new(difficulty, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Seconds until the next offensive decision
    pub fn timer(&self) -> f64 {
        self.timer
    }

    /// Run one tick of control for `me` against `opponent`.
    /// Offense waits on the cooldown; the guard reaction is checked every tick.
    pub fn update(
        &mut self,
        dt: f64,
        me: &mut Fighter,
        opponent: &mut Fighter,
        events: &mut Vec<SimEvent>,
    ) -> Option<Decision> {
        self.timer -= dt;
        if me.in_hitstun() {
            return None;
        }

        let distance = (opponent.x() - me.x()).abs();

        let decision = if self.timer <= 0.0 {
            self.timer = self.next_cooldown();
            let decision = self.decide(distance, me.is_grounded());
            self.execute(decision, me, opponent, events);
            debug!(side = ?me.side(), ?decision, distance, "Agent decision");
            Some(decision)
        } else {
            None
        };

        if opponent.state() == ActionState::Attack
            && distance < GUARD_RANGE
            && self.rng.gen::<f64>() < AGGRESSION * self.difficulty
        {
            me.hold_block(GUARD_DURATION);
        }

        decision
    }

    /// Randomized cooldown; harder agents act sooner on average
    fn next_cooldown(&mut self) -> f64 {
        self.cooldown * (0.5 + self.rng.gen::<f64>() * 1.5 * (1.0 - self.difficulty))
    }

    fn decide(&mut self, distance: f64, grounded: bool) -> Decision {
        if distance < CLINCH_RANGE {
            if self.rng.gen::<f64>() < THROW_CHANCE {
                Decision::Throw
            } else {
                Decision::Attack(self.pick(&CLINCH_MOVES))
            }
        } else if distance < MID_RANGE {
            if self.rng.gen::<f64>() < AGGRESSION * self.difficulty {
                Decision::Attack(self.pick(&POKE_MOVES))
            } else {
                Decision::Advance
            }
        } else if self.rng.gen::<f64>() < ADVANCE_CHANCE {
            Decision::Advance
        } else if self.rng.gen::<f64>() < JUMP_CHANCE * self.difficulty && grounded {
            Decision::Jump
        } else {
            Decision::Wait
        }
    }

    fn pick(&mut self, moves: &[MoveId]) -> MoveId {
        *moves.choose(&mut self.rng).unwrap_or(&MoveId::Jab)
    }

    fn execute(
        &self,
        decision: Decision,
        me: &mut Fighter,
        opponent: &mut Fighter,
        events: &mut Vec<SimEvent>,
    ) {
        // Refusals are routine; the agent simply tries again next cooldown
        match decision {
            Decision::Throw => {
                let _ = CombatSystem::throw(me, opponent, events);
            }
            Decision::Attack(id) => {
                let _ = me.attack(id);
            }
            Decision::Advance => me.nudge_toward(opponent.x(), ADVANCE_STEP),
            Decision::Jump => {
                me.jump();
            }
            Decision::Wait => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::events::Side;
    use crate::game::fighter::BaseStats;

    const DT: f64 = 1.0 / 60.0;

    fn fighters(gap: f64) -> (Fighter, Fighter) {
        let cfg = SimConfig::default();
        let me = Fighter::new("Agent", Side::Two, BaseStats::default(), 800.0, cfg.ground_y);
        let opp = Fighter::new("Player", Side::One, BaseStats::default(), 800.0 - gap, cfg.ground_y);
        (me, opp)
    }

    #[test]
    fn same_seed_same_choices() {
        let run = |seed| {
            let mut agent = DecisionAgent::with_seed(0.7, seed);
            (0..50).map(|_| agent.decide(150.0, true)).collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn clinch_range_only_strikes_or_throws() {
        let mut agent = DecisionAgent::with_seed(0.7, 1);
        for _ in 0..200 {
            match agent.decide(40.0, true) {
                Decision::Throw => {}
                Decision::Attack(id) => assert!(CLINCH_MOVES.contains(&id)),
                other => panic!("unexpected clinch decision {other:?}"),
            }
        }
    }

    #[test]
    fn mid_range_pokes_or_advances() {
        let mut agent = DecisionAgent::with_seed(1.0, 2);
        for _ in 0..200 {
            match agent.decide(200.0, true) {
                Decision::Advance => {}
                Decision::Attack(id) => assert!(POKE_MOVES.contains(&id)),
                other => panic!("unexpected mid-range decision {other:?}"),
            }
        }
    }

    #[test]
    fn zero_difficulty_never_jumps_or_pokes() {
        let mut agent = DecisionAgent::with_seed(0.0, 3);
        for _ in 0..200 {
            assert_eq!(agent.decide(200.0, true), Decision::Advance);
            assert_ne!(agent.decide(600.0, true), Decision::Jump);
        }
    }

    #[test]
    fn cooldown_bounds_follow_difficulty() {
        let mut easy = DecisionAgent::with_seed(0.0, 4);
        let mut hard = DecisionAgent::with_seed(1.0, 4);
        for _ in 0..100 {
            let c = easy.next_cooldown();
            assert!((0.3..=1.2).contains(&c));
            assert!((hard.next_cooldown() - 0.3).abs() < 1e-12);
        }
    }

    #[test]
    fn advance_accelerates_without_teleporting() {
        let (mut me, opp) = fighters(400.0);
        me.nudge_toward(opp.x(), ADVANCE_STEP);
        assert_eq!(me.velocity().0, -40.0);
        assert_eq!(me.x(), 800.0);
        for _ in 0..20 {
            me.nudge_toward(opp.x(), ADVANCE_STEP);
        }
        assert_eq!(me.velocity().0, -360.0);
    }

    #[test]
    fn offense_is_throttled_by_cooldown() {
        let (mut me, mut opp) = fighters(600.0);
        let mut agent = DecisionAgent::with_seed(0.5, 5);
        let mut events = Vec::new();
        let decisions = (0..60)
            .filter_map(|_| agent.update(DT, &mut me, &mut opp, &mut events))
            .count();
        // At least 0.3s between decisions over one second
        assert!((1..=4).contains(&decisions));
    }

    #[test]
    fn guard_reaction_is_not_throttled() {
        let (mut me, mut opp) = fighters(100.0);
        opp.attack(MoveId::Roundhouse).unwrap();
        let mut agent = DecisionAgent::with_seed(1.0, 6);
        agent.timer = 100.0;

        let mut events = Vec::new();
        let mut blocked = false;
        for _ in 0..20 {
            assert!(agent.update(DT, &mut me, &mut opp, &mut events).is_none());
            blocked |= me.is_blocking();
        }
        assert!(blocked);
        assert_eq!(me.state(), ActionState::Block);
    }

    #[test]
    fn stunned_agent_does_nothing() {
        let (mut me, mut opp) = fighters(40.0);
        me.receive_hit(0, 1.0, 0.0);
        let mut agent = DecisionAgent::with_seed(1.0, 8);
        let mut events = Vec::new();
        for _ in 0..30 {
            assert!(agent.update(DT, &mut me, &mut opp, &mut events).is_none());
        }
        assert!(me.attack_instance().is_none());
    }
}
