//! Fighter model - kinematics, action state and input handling

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::SimConfig;

use super::events::Side;
use super::moves::{AttackInstance, MoveCatalog, MoveDef, MoveId};
use super::physics::{PhysicsSystem, Rect};
use super::state::{ActionState, StateEvent, DOWN_RECOVERY};
use super::{ActionError, InputCommands};

/// Body size shared by every fighter
pub const BODY_WIDTH: f64 = 56.0;
pub const BODY_HEIGHT: f64 = 120.0;
pub const MAX_HEALTH: i32 = 1000;

/// Velocity kept each tick a block command is held
const BLOCK_DAMPING: f64 = 0.8;
/// Block state timer, in ticks, re-armed every tick the command holds
const BLOCK_REFRESH_TICKS: f64 = 1.5;
/// Below this horizontal speed a fighter without movement input stops dead
const STOP_SPEED: f64 = 1.0;
/// Upward velocity given to a fighter struck while airborne
const AIR_POP_VELOCITY: f64 = -200.0;

/// Tunable per-character stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub speed: f64,
    pub jump_power: f64,
    pub attack_damage: i32,
    pub throw_damage: i32,
    /// Damage taken is divided by this; blocked damage is multiplied by it
    pub defense: f64,
    pub reach: f64,
    pub weight: f64,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            speed: 360.0,
            jump_power: 620.0,
            attack_damage: 80,
            throw_damage: 140,
            defense: 0.8,
            reach: 48.0,
            weight: 1.0,
        }
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Face toward `target_x`; a target directly on top faces left
    pub fn toward(from_x: f64, target_x: f64) -> Self {
        if target_x > from_x {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

/// One combatant
#[derive(Debug, Clone)]
pub struct Fighter {
    name: String,
    side: Side,
    stats: BaseStats,
    moves: MoveCatalog,

    // Position and movement
    x: f64,
    y: f64,
    vel_x: f64,
    vel_y: f64,
    facing: Facing,
    grounded: bool,

    // Action state
    state: ActionState,
    state_timer: f64,
    blocking: bool,
    crouching: bool,

    // Combat
    health: i32,
    max_health: i32,
    hitstun: f64,
    combo: u32,
    attack: Option<AttackInstance>,
}

impl Fighter {
    pub fn new(name: impl Into<String>, side: Side, stats: BaseStats, x: f64, ground_y: f64) -> Self {
        let facing = match side {
            Side::One => Facing::Right,
            Side::Two => Facing::Left,
        };
        Self {
            name: name.into(),
            side,
            moves: MoveCatalog::from_stats(&stats),
            stats,
            x,
            y: ground_y,
            vel_x: 0.0,
            vel_y: 0.0,
            facing,
            grounded: true,
            state: ActionState::Idle,
            state_timer: 0.0,
            blocking: false,
            crouching: false,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            hitstun: 0.0,
            combo: 0,
            attack: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn stats(&self) -> &BaseStats {
        &self.stats
    }

    pub fn move_def(&self, id: MoveId) -> &MoveDef {
        self.moves.get(id)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.vel_x, self.vel_y)
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn hitstun(&self) -> f64 {
        self.hitstun
    }

    pub fn in_hitstun(&self) -> bool {
        self.hitstun > 0.0
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn attack_instance(&self) -> Option<&AttackInstance> {
        self.attack.as_ref()
    }

    pub fn width(&self) -> f64 {
        BODY_WIDTH
    }

    /// Hurtbox: the full body, feet on `y`
    pub fn rect(&self) -> Rect {
        Rect::new(self.x - BODY_WIDTH / 2.0, self.y - BODY_HEIGHT, BODY_WIDTH, BODY_HEIGHT)
    }

    /// Move the body without touching velocity
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn set_velocity(&mut self, vel_x: f64, vel_y: f64) {
        self.vel_x = vel_x;
        self.vel_y = vel_y;
    }

    /// Scale horizontal velocity, used by body separation
    pub fn damp_horizontal(&mut self, factor: f64) {
        self.vel_x *= factor;
    }

    /// Set health, clamped to [0, max]
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    /// Apply per-tick movement commands. Ignored while stunned or committed.
    pub fn apply_input(&mut self, cmds: &InputCommands, dt: f64) {
        debug_assert!(dt >= 0.0, "negative dt");
        if self.in_hitstun() || self.state.locks_input() {
            trace!(side = ?self.side, state = ?self.state, "Input ignored while locked");
            return;
        }

        // An attack in flight keeps its state; only steering gets through
        let attacking = self.attack.is_some();

        self.blocking = cmds.block && !attacking;
        if self.blocking {
            self.state = ActionState::Block;
            self.state_timer = dt * BLOCK_REFRESH_TICKS;
            self.vel_x *= BLOCK_DAMPING;
            return;
        }

        let speed = self.stats.speed;
        if cmds.move_left && !cmds.move_right {
            self.vel_x = -speed;
            if !attacking {
                self.state = ActionState::Walk;
            }
        } else if cmds.move_right && !cmds.move_left {
            self.vel_x = speed;
            if !attacking {
                self.state = ActionState::Walk;
            }
        } else if self.vel_x.abs() < STOP_SPEED {
            self.vel_x = 0.0;
            if self.state == ActionState::Walk {
                self.state = ActionState::Idle;
            }
        }

        self.crouching = cmds.crouch && self.grounded;
        if !attacking {
            let walking = cmds.move_left != cmds.move_right;
            if self.crouching && !walking && matches!(self.state, ActionState::Idle | ActionState::Walk) {
                self.state = ActionState::Crouch;
            } else if !self.crouching && self.state == ActionState::Crouch {
                self.state = ActionState::Idle;
            }

            if cmds.jump {
                self.jump();
            }
        }
    }

    /// Leave the ground if standing on it. Returns whether the jump started.
    pub fn jump(&mut self) -> bool {
        if !self.grounded || self.state.locks_input() || self.in_hitstun() {
            return false;
        }
        self.vel_y = -self.stats.jump_power;
        self.grounded = false;
        self.crouching = false;
        self.blocking = false;
        self.state = ActionState::Jump;
        true
    }

    /// Accelerate toward `target_x` by `step`, capped at base speed
    pub fn nudge_toward(&mut self, target_x: f64, step: f64) {
        let speed = self.stats.speed;
        if target_x > self.x {
            self.vel_x = (self.vel_x + step).min(speed);
        } else {
            self.vel_x = (self.vel_x - step).max(-speed);
        }
    }

    /// Raise a guard for `duration` seconds. No effect while committed.
    pub fn hold_block(&mut self, duration: f64) -> bool {
        if self.in_hitstun() || self.state.locks_input() || self.attack.is_some() {
            return false;
        }
        self.blocking = true;
        self.state = ActionState::Block;
        self.state_timer = duration;
        true
    }

    /// Advance hitstun, gravity, friction, stage clamp, facing and state timers
    pub fn integrate(&mut self, dt: f64, opponent_x: f64, cfg: &SimConfig) {
        assert!(dt >= 0.0, "negative dt: {dt}");

        if self.hitstun > 0.0 {
            self.hitstun -= dt;
            if self.hitstun <= 0.0 {
                self.hitstun = 0.0;
                self.transition(StateEvent::HitstunCleared);
            }
        }

        if !self.grounded {
            self.vel_y += cfg.gravity * dt;
            self.y += self.vel_y * dt;
            if self.y >= cfg.ground_y {
                self.y = cfg.ground_y;
                self.vel_y = 0.0;
                self.grounded = true;
                if self.transition(StateEvent::Landed) == Some(ActionState::Down) {
                    self.state_timer = DOWN_RECOVERY;
                }
            }
        }

        if !self.state.keeps_momentum() && !self.blocking {
            self.vel_x = PhysicsSystem::apply_friction(self.vel_x, dt);
        }

        self.x += self.vel_x * dt;
        self.x = PhysicsSystem::clamp_to_stage(self.x, BODY_WIDTH / 2.0, cfg.stage_bounds);

        self.facing = Facing::toward(self.x, opponent_x);

        if self.state_timer > 0.0 {
            self.state_timer -= dt;
            if self.state_timer <= 0.0 {
                self.state_timer = 0.0;
                self.transition(StateEvent::TimerExpired);
            }
        }

        self.health = self.health.clamp(0, self.max_health);
    }

    /// Apply a transition from the state table, returning the new state if it changed
    fn transition(&mut self, event: StateEvent) -> Option<ActionState> {
        let next = self.state.on(event)?;
        if self.state == ActionState::Block {
            self.blocking = false;
        }
        self.state = next;
        Some(next)
    }

    /// Whether a new attack or throw may start now
    pub fn can_start_attack(&self) -> bool {
        !self.in_hitstun() && !self.state.locks_attack() && self.attack.is_none()
    }

    /// Start a move from the catalog
    pub fn attack(&mut self, id: MoveId) -> Result<(), ActionError> {
        if !self.can_start_attack() {
            trace!(side = ?self.side, move_id = %id, state = ?self.state, "Attack refused");
            return Err(ActionError::Busy);
        }

        let def = *self.moves.get(id);
        self.state = ActionState::Attack;
        self.state_timer = def.total_duration();
        self.blocking = false;
        self.attack = Some(AttackInstance::new(id, def));

        debug!(side = ?self.side, move_id = %id, "Attack started");
        Ok(())
    }

    /// Start a move by its catalog name
    pub fn attack_named(&mut self, name: &str) -> Result<(), ActionError> {
        let id: MoveId = name.parse()?;
        self.attack(id)
    }

    /// Advance the attack in flight and return a copy of it after the step
    pub(crate) fn advance_attack(&mut self, dt: f64) -> Option<AttackInstance> {
        let instance = self.attack.as_mut()?;
        instance.elapsed += dt;
        Some(*instance)
    }

    pub(crate) fn mark_attack_resolved(&mut self) {
        if let Some(instance) = self.attack.as_mut() {
            instance.resolved = true;
        }
    }

    /// Drop the attack instance once its full duration has elapsed
    pub(crate) fn retire_finished_attack(&mut self) {
        if self.attack.as_ref().is_some_and(AttackInstance::finished) {
            self.attack = None;
        }
    }

    pub(crate) fn register_combo_hit(&mut self) {
        self.combo += 1;
    }

    fn take_damage(&mut self, damage: i32) {
        self.health = (self.health - damage).clamp(0, self.max_health);
    }

    /// Chip damage and blockstun; the guard stays up
    pub(crate) fn receive_blocked_hit(&mut self, damage: i32, hitstun: f64, push_x: f64) {
        self.take_damage(damage);
        self.hitstun = hitstun;
        self.vel_x += push_x;
    }

    /// Clean hit: grounded fighters are knocked back, airborne ones popped up
    pub(crate) fn receive_hit(&mut self, damage: i32, hitstun: f64, push_x: f64) {
        self.take_damage(damage);
        self.hitstun = hitstun;
        self.combo = 0;
        self.blocking = false;
        if self.grounded {
            self.vel_x += push_x;
            self.state = ActionState::Hit;
        } else {
            self.vel_y = AIR_POP_VELOCITY;
            self.state = ActionState::AirHit;
        }
    }

    /// Thrown: launched into the air regardless of guard
    pub(crate) fn receive_throw(&mut self, damage: i32, hitstun: f64, vel_x: f64, vel_y: f64) {
        self.take_damage(damage);
        self.hitstun = hitstun;
        self.vel_x = vel_x;
        self.vel_y = vel_y;
        self.grounded = false;
        self.blocking = false;
        self.crouching = false;
        self.state = ActionState::AirHit;
    }

    pub(crate) fn enter_throw(&mut self, duration: f64) {
        self.state = ActionState::Throw;
        self.state_timer = duration;
        self.blocking = false;
    }

    /// Restore the round-start condition at `x`
    pub fn reset(&mut self, x: f64, ground_y: f64) {
        self.x = x;
        self.y = ground_y;
        self.vel_x = 0.0;
        self.vel_y = 0.0;
        self.grounded = true;
        self.state = ActionState::Idle;
        self.state_timer = 0.0;
        self.blocking = false;
        self.crouching = false;
        self.health = self.max_health;
        self.hitstun = 0.0;
        self.combo = 0;
        self.attack = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn fighter(x: f64) -> Fighter {
        Fighter::new("Test", Side::One, BaseStats::default(), x, SimConfig::DEFAULT_GROUND_Y)
    }

    fn right() -> InputCommands {
        InputCommands {
            move_right: true,
            ..InputCommands::default()
        }
    }

    #[test]
    fn walking_sets_speed_and_state() {
        let mut f = fighter(400.0);
        f.apply_input(&right(), DT);
        assert_eq!(f.velocity().0, 360.0);
        assert_eq!(f.state(), ActionState::Walk);
    }

    #[test]
    fn releasing_input_settles_to_idle() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        f.apply_input(&right(), DT);
        for _ in 0..120 {
            f.apply_input(&InputCommands::default(), DT);
            f.integrate(DT, 900.0, &cfg);
        }
        assert_eq!(f.velocity().0, 0.0);
        assert_eq!(f.state(), ActionState::Idle);
    }

    #[test]
    fn input_is_ignored_during_hitstun() {
        let mut f = fighter(400.0);
        f.receive_hit(10, 0.3, 50.0);
        let before = (f.velocity(), f.state());
        f.apply_input(&right(), DT);
        f.apply_input(
            &InputCommands {
                jump: true,
                block: true,
                ..InputCommands::default()
            },
            DT,
        );
        assert_eq!((f.velocity(), f.state()), before);
        assert!(f.is_grounded());
    }

    #[test]
    fn block_holds_while_pressed_and_expires_after_release() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        let block = InputCommands {
            block: true,
            ..InputCommands::default()
        };
        for _ in 0..5 {
            f.apply_input(&block, DT);
            f.integrate(DT, 900.0, &cfg);
            assert!(f.is_blocking());
            assert_eq!(f.state(), ActionState::Block);
        }
        f.apply_input(&InputCommands::default(), DT);
        f.integrate(DT, 900.0, &cfg);
        assert!(!f.is_blocking());
        assert_eq!(f.state(), ActionState::Idle);
    }

    #[test]
    fn jumping_lowers_a_held_guard() {
        let mut f = fighter(400.0);
        assert!(f.hold_block(0.2));
        assert!(f.jump());
        assert_eq!(f.state(), ActionState::Jump);
        assert!(!f.is_blocking());
    }

    #[test]
    fn block_damps_momentum() {
        let mut f = fighter(400.0);
        f.set_velocity(100.0, 0.0);
        f.apply_input(
            &InputCommands {
                block: true,
                ..InputCommands::default()
            },
            DT,
        );
        assert!((f.velocity().0 - 80.0).abs() < 1e-9);
    }

    #[test]
    fn jump_arc_lands_on_ground() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        f.apply_input(
            &InputCommands {
                jump: true,
                ..InputCommands::default()
            },
            DT,
        );
        assert_eq!(f.state(), ActionState::Jump);
        assert_eq!(f.velocity().1, -620.0);
        assert!(!f.is_grounded());

        let mut peak = f.y();
        for _ in 0..120 {
            f.integrate(DT, 900.0, &cfg);
            peak = peak.min(f.y());
        }
        assert!(peak < cfg.ground_y - 50.0);
        assert!(f.is_grounded());
        assert_eq!(f.y(), cfg.ground_y);
        assert_eq!(f.state(), ActionState::Idle);
    }

    #[test]
    fn air_hit_lands_into_down_then_recovers() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        f.receive_throw(140, 0.5, 200.0, -200.0);
        assert_eq!(f.state(), ActionState::AirHit);

        let mut saw_down = false;
        for _ in 0..120 {
            f.integrate(DT, 900.0, &cfg);
            saw_down |= f.state() == ActionState::Down;
        }
        assert!(saw_down);
        assert_eq!(f.state(), ActionState::Idle);
    }

    #[test]
    fn stage_clamp_is_exact() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        f.set_x(0.0);
        f.integrate(DT, 900.0, &cfg);
        assert_eq!(f.x(), cfg.stage_bounds.0 + BODY_WIDTH / 2.0);

        f.set_x(5000.0);
        f.integrate(DT, 100.0, &cfg);
        assert_eq!(f.x(), cfg.stage_bounds.1 - BODY_WIDTH / 2.0);
    }

    #[test]
    fn facing_follows_opponent() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        f.integrate(DT, 300.0, &cfg);
        assert_eq!(f.facing(), Facing::Left);
        f.integrate(DT, 500.0, &cfg);
        assert_eq!(f.facing(), Facing::Right);
    }

    #[test]
    fn health_setter_clamps() {
        let mut f = fighter(400.0);
        f.set_health(-50);
        assert_eq!(f.health(), 0);
        f.set_health(5000);
        assert_eq!(f.health(), MAX_HEALTH);
    }

    #[test]
    fn second_attack_is_rejected_while_one_is_in_flight() {
        let mut f = fighter(400.0);
        assert!(f.attack(MoveId::Jab).is_ok());
        let before = *f.attack_instance().unwrap();
        assert!(matches!(f.attack(MoveId::Strong), Err(ActionError::Busy)));
        assert_eq!(*f.attack_instance().unwrap(), before);
    }

    #[test]
    fn attack_state_returns_to_idle_after_duration() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        f.attack(MoveId::Jab).unwrap();
        assert_eq!(f.state(), ActionState::Attack);
        for _ in 0..30 {
            f.integrate(DT, 900.0, &cfg);
            f.advance_attack(DT);
            f.retire_finished_attack();
        }
        assert_eq!(f.state(), ActionState::Idle);
        assert!(f.attack_instance().is_none());
    }

    #[test]
    fn unknown_move_name_leaves_state_untouched() {
        let mut f = fighter(400.0);
        assert!(matches!(f.attack_named("uppercut"), Err(ActionError::UnknownMove(_))));
        assert_eq!(f.state(), ActionState::Idle);
        assert!(f.attack_instance().is_none());
        assert!(f.attack_named("low").is_ok());
    }

    #[test]
    fn cannot_attack_while_down() {
        let cfg = SimConfig::default();
        let mut f = fighter(400.0);
        f.receive_throw(0, 0.0, 0.0, -10.0);
        while f.state() != ActionState::Down {
            f.integrate(DT, 900.0, &cfg);
        }
        assert!(matches!(f.attack(MoveId::Jab), Err(ActionError::Busy)));
    }

    #[test]
    #[should_panic]
    fn negative_dt_is_a_programming_error() {
        let mut f = fighter(400.0);
        f.integrate(-0.1, 900.0, &SimConfig::default());
    }
}
