//! Combat system - hitboxes, block resolution, throws and damage

use tracing::debug;

use super::events::{EffectKind, SimEvent, Side, SoundCue};
use super::fighter::Fighter;
use super::moves::{MoveDef, MoveId};
use super::physics::Rect;
use super::ActionError;

/// Hitbox geometry relative to the attacker's body
const HITBOX_EXTRA_WIDTH: f64 = 24.0;
const HITBOX_HEIGHT: f64 = 28.0;
const HITBOX_FORWARD_OFFSET: f64 = 16.0;
const HITBOX_RAISE: f64 = 20.0;

/// Blocked hits: fraction of damage, hitstun and knockback that gets through
const BLOCK_DAMAGE_SCALE: f64 = 0.25;
const BLOCK_HITSTUN_SCALE: f64 = 0.6;
const BLOCK_KNOCKBACK_SCALE: f64 = 0.2;

/// Throws connect when bodies are closer than this fraction of the thrower's width
const THROW_RANGE_SCALE: f64 = 0.9;
const THROW_LAUNCH_X: f64 = 200.0;
const THROW_LAUNCH_Y: f64 = -200.0;
const THROW_EFFECT_RAISE: f64 = 40.0;

const BLOCK_SHAKE: f64 = 6.0;
const HIT_SHAKE: f64 = 12.0;
const THROW_SHAKE: f64 = 18.0;

/// Hit result from combat resolution
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub attacker: Side,
    pub defender: Side,
    pub move_id: MoveId,
    pub damage: i32,
    pub blocked: bool,
    pub x: f64,
    pub y: f64,
}

/// Combat system for attack resolution and throws
pub struct CombatSystem;

impl CombatSystem {
    /// Damage dealt through a guard
    pub fn blocked_damage(damage: i32, defense: f64) -> i32 {
        (damage as f64 * BLOCK_DAMAGE_SCALE * defense).floor() as i32
    }

    /// Damage dealt by a clean hit
    pub fn unblocked_damage(damage: i32, defense: f64) -> i32 {
        (damage as f64 * (1.0 / defense)).floor() as i32
    }

    /// The attacker's live hitbox, in front of the body toward its facing
    pub fn hitbox(attacker: &Fighter) -> Rect {
        let body = attacker.rect();
        let width = attacker.stats().reach + HITBOX_EXTRA_WIDTH;
        let anchor_y = body.center_y() - HITBOX_RAISE;
        if attacker.facing().sign() > 0.0 {
            Rect::from_mid_left(body.center_x() + HITBOX_FORWARD_OFFSET, anchor_y, width, HITBOX_HEIGHT)
        } else {
            Rect::from_mid_right(body.center_x() - HITBOX_FORWARD_OFFSET, anchor_y, width, HITBOX_HEIGHT)
        }
    }

    /// A guard only holds when facing the attacker
    pub fn is_blocked(attacker: &Fighter, defender: &Fighter) -> bool {
        defender.is_blocking() && defender.facing() != attacker.facing()
    }

    /// Advance the attacker's attack instance and apply at most one hit per activation
    pub fn resolve_attack(
        attacker: &mut Fighter,
        defender: &mut Fighter,
        dt: f64,
        events: &mut Vec<SimEvent>,
    ) -> Option<HitResult> {
        let instance = attacker.advance_attack(dt)?;

        let mut result = None;
        if instance.can_hit() {
            let hitbox = Self::hitbox(attacker);
            if hitbox.intersects(&defender.rect()) {
                result = Some(Self::apply_strike(
                    attacker,
                    defender,
                    instance.move_id,
                    &instance.def,
                    &hitbox,
                    events,
                ));
                attacker.mark_attack_resolved();
            }
        }

        attacker.retire_finished_attack();
        result
    }

    fn apply_strike(
        attacker: &mut Fighter,
        defender: &mut Fighter,
        move_id: MoveId,
        def: &MoveDef,
        hitbox: &Rect,
        events: &mut Vec<SimEvent>,
    ) -> HitResult {
        let direction = attacker.facing().sign();
        let defense = defender.stats().defense;
        let (x, y) = (hitbox.center_x(), hitbox.center_y());
        let blocked = Self::is_blocked(attacker, defender);

        let damage = if blocked {
            let damage = Self::blocked_damage(def.damage, defense);
            defender.receive_blocked_hit(
                damage,
                def.hitstun * BLOCK_HITSTUN_SCALE,
                def.knockback * BLOCK_KNOCKBACK_SCALE * direction,
            );
            events.push(SimEvent::SpawnEffect {
                kind: EffectKind::Block,
                x,
                y,
            });
            events.push(SimEvent::CameraShake { power: BLOCK_SHAKE });
            events.push(SimEvent::PlaySound {
                cue: SoundCue::Block,
            });
            damage
        } else {
            let damage = Self::unblocked_damage(def.damage, defense);
            let push = def.knockback / defender.stats().weight * direction;
            defender.receive_hit(damage, def.hitstun, push);
            attacker.register_combo_hit();
            events.push(SimEvent::SpawnEffect {
                kind: EffectKind::Hit,
                x,
                y,
            });
            events.push(SimEvent::CameraShake { power: HIT_SHAKE });
            events.push(SimEvent::PlaySound { cue: SoundCue::Hit });
            damage
        };

        debug!(
            attacker = ?attacker.side(),
            move_id = %move_id,
            damage,
            blocked,
            combo = attacker.combo(),
            "Strike connected"
        );

        HitResult {
            attacker: attacker.side(),
            defender: defender.side(),
            move_id,
            damage,
            blocked,
            x,
            y,
        }
    }

    /// Grab the opponent at close range. Throws ignore guards.
    pub fn throw(
        thrower: &mut Fighter,
        target: &mut Fighter,
        events: &mut Vec<SimEvent>,
    ) -> Result<HitResult, ActionError> {
        if !thrower.can_start_attack() {
            return Err(ActionError::Busy);
        }

        let distance = (thrower.x() - target.x()).abs();
        let max = thrower.width() * THROW_RANGE_SCALE;
        if distance > max {
            return Err(ActionError::OutOfRange { distance, max });
        }

        let def = *thrower.move_def(MoveId::Throw);
        let direction = thrower.facing().sign();
        thrower.enter_throw(def.total_duration());
        target.receive_throw(
            def.damage,
            def.hitstun,
            THROW_LAUNCH_X * direction,
            THROW_LAUNCH_Y,
        );

        let x = (thrower.x() + target.x()) / 2.0;
        let y = thrower.y() - THROW_EFFECT_RAISE;
        events.push(SimEvent::SpawnEffect {
            kind: EffectKind::Throw,
            x,
            y,
        });
        events.push(SimEvent::CameraShake { power: THROW_SHAKE });
        events.push(SimEvent::PlaySound {
            cue: SoundCue::Throw,
        });

        debug!(thrower = ?thrower.side(), damage = def.damage, "Throw connected");

        Ok(HitResult {
            attacker: thrower.side(),
            defender: target.side(),
            move_id: MoveId::Throw,
            damage: def.damage,
            blocked: false,
            x,
            y,
        })
    }
}
