//! Attack catalog - move timings, damage and knockback

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fighter::BaseStats;
use super::ActionError;

/// Move identifiers in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveId {
    Jab,
    Strong,
    Low,
    Roundhouse,
    Throw,
    Special,
}

impl MoveId {
    pub const ALL: [MoveId; 6] = [
        MoveId::Jab,
        MoveId::Strong,
        MoveId::Low,
        MoveId::Roundhouse,
        MoveId::Throw,
        MoveId::Special,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MoveId::Jab => "jab",
            MoveId::Strong => "strong",
            MoveId::Low => "low",
            MoveId::Roundhouse => "roundhouse",
            MoveId::Throw => "throw",
            MoveId::Special => "special",
        }
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveId {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ActionError::UnknownMove(s.to_string()))
    }
}

/// Frame data for one move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveDef {
    /// Seconds before the hitbox becomes live
    pub startup: f64,
    /// Seconds the hitbox stays live
    pub active: f64,
    /// Seconds after the active window before the fighter can act
    pub recovery: f64,
    pub damage: i32,
    /// Hitstun inflicted on an unblocked hit (seconds)
    pub hitstun: f64,
    pub knockback: f64,
}

impl MoveDef {
    pub fn new(
        startup: f64,
        active: f64,
        recovery: f64,
        damage: i32,
        hitstun: f64,
        knockback: f64,
    ) -> Self {
        assert!(
            startup >= 0.0 && active > 0.0 && recovery >= 0.0,
            "move timings must be non-negative with a non-empty active window"
        );
        assert!(damage >= 0 && hitstun >= 0.0, "move damage and hitstun must be non-negative");
        Self {
            startup,
            active,
            recovery,
            damage,
            hitstun,
            knockback,
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.startup + self.active + self.recovery
    }

    /// Whether `elapsed` lies in the half-open active window [startup, startup + active)
    pub fn is_active_at(&self, elapsed: f64) -> bool {
        elapsed >= self.startup && elapsed < self.startup + self.active
    }
}

/// Per-fighter move table, derived once from base stats
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCatalog {
    jab: MoveDef,
    strong: MoveDef,
    low: MoveDef,
    roundhouse: MoveDef,
    throw: MoveDef,
    special: MoveDef,
}

/// Damage scaled from the base attack stat, truncated toward zero
fn scaled(base: i32, ratio: f64) -> i32 {
    (base as f64 * ratio).floor() as i32
}

impl MoveCatalog {
    pub fn from_stats(stats: &BaseStats) -> Self {
        let atk = stats.attack_damage;
        Self {
            jab: MoveDef::new(0.06, 0.08, 0.26, scaled(atk, 0.9), 0.18, 180.0),
            strong: MoveDef::new(0.12, 0.12, 0.36, scaled(atk, 1.3), 0.28, 260.0),
            low: MoveDef::new(0.14, 0.10, 0.40, scaled(atk, 0.8), 0.24, 140.0),
            roundhouse: MoveDef::new(0.18, 0.14, 0.44, scaled(atk, 1.6), 0.36, 320.0),
            throw: MoveDef::new(0.10, 0.02, 0.40, stats.throw_damage, 0.5, 360.0),
            special: MoveDef::new(0.28, 0.16, 0.60, scaled(atk, 2.0), 0.6, 420.0),
        }
    }

    pub fn get(&self, id: MoveId) -> &MoveDef {
        match id {
            MoveId::Jab => &self.jab,
            MoveId::Strong => &self.strong,
            MoveId::Low => &self.low,
            MoveId::Roundhouse => &self.roundhouse,
            MoveId::Throw => &self.throw,
            MoveId::Special => &self.special,
        }
    }
}

/// An attack in flight, owned by the attacking fighter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackInstance {
    pub move_id: MoveId,
    pub def: MoveDef,
    pub elapsed: f64,
    /// Set once this activation has connected (hit or blocked)
    pub resolved: bool,
}

impl AttackInstance {
    pub fn new(move_id: MoveId, def: MoveDef) -> Self {
        Self {
            move_id,
            def,
            elapsed: 0.0,
            resolved: false,
        }
    }

    /// Hit detection runs only while live and not yet connected
    pub fn can_hit(&self) -> bool {
        !self.resolved && self.def.is_active_at(self.elapsed)
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.def.total_duration()
    }
}
