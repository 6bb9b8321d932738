//! Selectable fighters and stages

use super::fighter::BaseStats;

/// A selectable character
#[derive(Debug, Clone, Copy)]
pub struct FighterProfile {
    pub name: &'static str,
    pub stats: BaseStats,
}

/// A selectable stage. Geometry comes from `SimConfig`; stages only tag the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    pub index: usize,
    pub name: &'static str,
}

const DEFAULTS: BaseStats = BaseStats {
    speed: 360.0,
    jump_power: 620.0,
    attack_damage: 80,
    throw_damage: 140,
    defense: 0.8,
    reach: 48.0,
    weight: 1.0,
};

pub const ROSTER: [FighterProfile; 3] = [
    FighterProfile {
        name: "Ryuji",
        stats: BaseStats {
            speed: 380.0,
            attack_damage: 70,
            weight: 1.0,
            ..DEFAULTS
        },
    },
    FighterProfile {
        name: "Akira",
        stats: BaseStats {
            speed: 420.0,
            attack_damage: 62,
            weight: 0.9,
            ..DEFAULTS
        },
    },
    FighterProfile {
        name: "Mika",
        stats: BaseStats {
            speed: 340.0,
            attack_damage: 84,
            weight: 1.1,
            ..DEFAULTS
        },
    },
];

pub const STAGES: [StageInfo; 3] = [
    StageInfo {
        index: 0,
        name: "Dusk Harbor",
    },
    StageInfo {
        index: 1,
        name: "Ember Canyon",
    },
    StageInfo {
        index: 2,
        name: "Jade Grove",
    },
];

/// Roster entry for `index`, wrapping around the list
pub fn fighter(index: usize) -> &'static FighterProfile {
    &ROSTER[index % ROSTER.len()]
}

/// Stage for `index`, wrapping around the list
pub fn stage(index: usize) -> &'static StageInfo {
    &STAGES[index % STAGES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_base_stats() {
        assert_eq!(DEFAULTS, BaseStats::default());
    }

    #[test]
    fn overrides_keep_other_defaults() {
        let akira = fighter(1);
        assert_eq!(akira.name, "Akira");
        assert_eq!(akira.stats.speed, 420.0);
        assert_eq!(akira.stats.weight, 0.9);
        assert_eq!(akira.stats.throw_damage, 140);
        assert_eq!(akira.stats.defense, 0.8);
    }

    #[test]
    fn indices_wrap() {
        assert_eq!(fighter(3).name, "Ryuji");
        assert_eq!(stage(5).index, 2);
    }
}
