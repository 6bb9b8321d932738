//! Duel Sim - fixed-tick simulation of a two-fighter duel
//!
//! The crate is split into:
//! - `game`: fighters, moves, combat resolution, the scripted agent and the match controller
//! - `config`: simulation tunables and environment configuration
//! - `util`: tick timing helpers

pub mod config;
pub mod game;
pub mod util;
