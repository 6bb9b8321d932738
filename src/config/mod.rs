//! Configuration module - simulation tunables and environment variable parsing

use std::env;
use std::str::FromStr;

use crate::util::time::SIMULATION_TPS;

/// Simulation tunables. These are constants of a match, not derived values.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Downward acceleration applied to airborne fighters (px/s²)
    pub gravity: f64,
    /// Y coordinate of the floor; fighters' feet rest here
    pub ground_y: f64,
    /// Left and right walls of the stage
    pub stage_bounds: (f64, f64),
    /// Round length in seconds
    pub round_time: f64,
    /// Rounds in a match (best of N)
    pub best_of: u32,
    /// Fixed tick rate target
    pub tick_rate: u32,
    /// Pause between a decided round and the next one (seconds)
    pub round_reset_delay: f64,
    /// Starting x for side one and side two
    pub spawn_x: (f64, f64),
}

impl SimConfig {
    pub const DEFAULT_GRAVITY: f64 = 1600.0;
    pub const DEFAULT_GROUND_Y: f64 = 580.0;
    pub const DEFAULT_STAGE_BOUNDS: (f64, f64) = (80.0, 1200.0);
    pub const DEFAULT_ROUND_TIME: f64 = 60.0;
    pub const DEFAULT_BEST_OF: u32 = 3;
    pub const DEFAULT_ROUND_RESET_DELAY: f64 = 1.2;
    pub const DEFAULT_SPAWN_X: (f64, f64) = (448.0, 832.0);

    /// Number of round wins needed to take the match
    pub fn wins_needed(&self) -> u32 {
        self.best_of / 2 + 1
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Self::DEFAULT_GRAVITY,
            ground_y: Self::DEFAULT_GROUND_Y,
            stage_bounds: Self::DEFAULT_STAGE_BOUNDS,
            round_time: Self::DEFAULT_ROUND_TIME,
            best_of: Self::DEFAULT_BEST_OF,
            tick_rate: SIMULATION_TPS,
            round_reset_delay: Self::DEFAULT_ROUND_RESET_DELAY,
            spawn_x: Self::DEFAULT_SPAWN_X,
        }
    }
}

/// How match events are written by the binary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventLog {
    /// Events only reach the tracing output
    None,
    /// One JSON object per event on stdout
    Json,
}

impl FromStr for EventLog {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(EventLog::None),
            "json" => Ok(EventLog::Json),
            _ => Err(()),
        }
    }
}

/// Format of the tracing output on stderr
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log line format (text or json)
    pub log_format: LogFormat,
    /// Simulation tunables
    pub sim: SimConfig,
    /// Scripted opponent difficulty in [0, 1]
    pub ai_difficulty: f64,
    /// Base seed; match `n` seeds its two agents from `seed + 2n` and `seed + 2n + 1`
    pub seed: u64,
    /// Number of headless matches to run concurrently
    pub match_count: usize,
    /// Roster index for side one
    pub p1_fighter: usize,
    /// Roster index for side two
    pub p2_fighter: usize,
    /// Stage index
    pub stage: usize,
    /// Pace ticks to wall-clock time instead of running flat out
    pub realtime: bool,
    /// Event output format
    pub event_log: EventLog,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut sim = SimConfig::default();
        sim.tick_rate = parse_or("TICK_RATE", sim.tick_rate)?;
        sim.round_time = parse_or("ROUND_TIME", sim.round_time)?;
        sim.best_of = parse_or("BEST_OF", sim.best_of)?;

        if sim.tick_rate == 0 {
            return Err(ConfigError::Invalid("TICK_RATE"));
        }
        if sim.best_of == 0 {
            return Err(ConfigError::Invalid("BEST_OF"));
        }
        if sim.round_time <= 0.0 {
            return Err(ConfigError::Invalid("ROUND_TIME"));
        }

        let ai_difficulty: f64 = parse_or("AI_DIFFICULTY", 0.7)?;
        if !(0.0..=1.0).contains(&ai_difficulty) {
            return Err(ConfigError::Invalid("AI_DIFFICULTY"));
        }

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_or("LOG_FORMAT", LogFormat::Text)?,
            sim,
            ai_difficulty,
            seed: parse_or("MATCH_SEED", 0x5EED)?,
            match_count: parse_or("MATCH_COUNT", 1)?,
            p1_fighter: parse_or("P1_FIGHTER", 0)?,
            p2_fighter: parse_or("P2_FIGHTER", 1)?,
            stage: parse_or("STAGE", 0)?,
            realtime: parse_or("REALTIME", false)?,
            event_log: parse_or("EVENT_LOG", EventLog::None)?,
        })
    }
}

/// Read `name` from the environment, falling back to `default` when unset
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
