//! Match actor - owns one duel and runs its tick loop on a single task

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::info;
use uuid::Uuid;

use crate::util::time::{snapshot_interval, tick_delta, tick_duration, Timer};

use super::events::{Side, SimEvent};
use super::r#match::{Duel, FightSelection};
use super::snapshot::{DuelSnapshot, SnapshotBuilder};
use super::{InputCommands, PlayerInput};

/// Simulated time an unpaced run may take before it is stopped, in case neither side can finish
const MAX_UNPACED_SECONDS: u64 = 30 * 60;

/// Tick cap for an unpaced run at `tick_rate`
fn unpaced_tick_limit(tick_rate: u32) -> u64 {
    MAX_UNPACED_SECONDS * u64::from(tick_rate.max(1))
}

/// Messages broadcast by a running match
#[derive(Debug, Clone)]
pub enum MatchMsg {
    /// Events produced by one tick
    Events { tick: u64, events: Vec<SimEvent> },
    /// Periodic state for renderers
    Snapshot(DuelSnapshot),
    /// The match is over (or the actor stopped)
    MatchEnd {
        winner: Option<Side>,
        score: [u32; 2],
        ticks: u64,
        duration_ms: u64,
    },
}

/// Handle to a running match
#[derive(Clone)]
pub struct MatchHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub event_tx: broadcast::Sender<MatchMsg>,
}

impl MatchHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MatchMsg> {
        self.event_tx.subscribe()
    }
}

/// Registry of all active matches
pub struct MatchRegistry {
    matches: DashMap<Uuid, MatchHandle>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            matches: DashMap::new(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<MatchHandle> {
        self.matches.get(id).map(|m| m.value().clone())
    }

    pub fn insert(&self, handle: MatchHandle) {
        self.matches.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<MatchHandle> {
        self.matches.remove(id).map(|(_, h)| h)
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The single writer for one duel
pub struct GameMatch {
    duel: Duel,
    selection: FightSelection,
    input_rx: mpsc::Receiver<PlayerInput>,
    event_tx: broadcast::Sender<MatchMsg>,
    snapshot_builder: SnapshotBuilder,
    /// Latest commands per side; held until replaced
    current_input: [InputCommands; 2],
    realtime: bool,
}

impl GameMatch {
    /// Create a new match actor around `duel`
    pub fn new(duel: Duel, selection: FightSelection, realtime: bool) -> (Self, MatchHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (event_tx, _) = broadcast::channel(256);

        let handle = MatchHandle {
            id: duel.id(),
            input_tx,
            event_tx: event_tx.clone(),
        };

        let interval_ticks = snapshot_interval(duel.config().tick_rate);
        let game_match = Self {
            duel,
            selection,
            input_rx,
            event_tx,
            snapshot_builder: SnapshotBuilder::new(interval_ticks),
            current_input: [InputCommands::default(); 2],
            realtime,
        };

        (game_match, handle)
    }

    /// Run the tick loop until the match is decided. Returns the final duel.
    pub async fn run(mut self) -> Duel {
        let id = self.duel.id();
        let tick_rate = self.duel.config().tick_rate;
        let dt = tick_delta(tick_rate);
        let tick_limit = unpaced_tick_limit(tick_rate);
        let timer = Timer::new();

        info!(match_id = %id, tick_rate, realtime = self.realtime, "Match started");

        let events = self.duel.start_fight(self.selection);
        self.publish(events);

        let mut tick_interval = interval(tick_duration(tick_rate));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            if self.realtime {
                tick_interval.tick().await;
            } else {
                // Give other matches on the runtime a turn
                tokio::task::yield_now().await;
            }

            // Drain input queue
            self.process_inputs();

            let events = self.duel.tick(dt, &self.current_input);
            if !events.is_empty() {
                self.snapshot_builder.force_next();
                self.publish(events);
            }

            if self.snapshot_builder.should_send() {
                let snapshot = self.snapshot_builder.build(&self.duel);
                let _ = self.event_tx.send(MatchMsg::Snapshot(snapshot));
            }

            if self.duel.state().match_over {
                break;
            }

            if !self.realtime && self.duel.tick_count() >= tick_limit {
                info!(match_id = %id, "Tick limit reached, stopping match");
                break;
            }
        }

        let state = self.duel.state();
        let duration_ms = timer.elapsed_ms();
        info!(
            match_id = %id,
            winner = ?state.winner,
            score = ?state.score,
            rounds = state.round,
            ticks = self.duel.tick_count(),
            duration_ms,
            "Match ended"
        );

        let _ = self.event_tx.send(MatchMsg::MatchEnd {
            winner: state.winner,
            score: state.score,
            ticks: self.duel.tick_count(),
            duration_ms,
        });

        self.duel
    }

    /// Process all pending inputs; the last command per side wins
    fn process_inputs(&mut self) {
        while let Ok(input) = self.input_rx.try_recv() {
            self.current_input[input.side.index()] = input.commands;
        }
    }

    fn publish(&self, events: Vec<SimEvent>) {
        // No subscribers is fine; presentation is optional
        let _ = self.event_tx.send(MatchMsg::Events {
            tick: self.duel.tick_count(),
            events,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::agent::DecisionAgent;
    use crate::game::r#match::Controller;
    use tokio::sync::broadcast::error::TryRecvError;

    fn agent_duel(seed: u64) -> Duel {
        let cfg = SimConfig {
            round_time: 20.0,
            ..SimConfig::default()
        };
        Duel::new(
            Uuid::new_v4(),
            cfg,
            [
                Controller::Agent(DecisionAgent::with_seed(0.8, seed)),
                Controller::Agent(DecisionAgent::with_seed(0.8, seed + 1)),
            ],
        )
    }

    #[test]
    fn registry_tracks_handles() {
        let registry = MatchRegistry::new();
        let (_game, handle) = GameMatch::new(agent_duel(1), FightSelection::default(), false);
        let id = handle.id;
        registry.insert(handle);
        assert_eq!(registry.active_matches(), 1);
        assert!(registry.get(&id).is_some());
        assert!(registry.remove(&id).is_some());
        assert_eq!(registry.active_matches(), 0);
    }

    #[tokio::test]
    async fn unpaced_agent_match_reports_its_end() {
        let (game, handle) = GameMatch::new(agent_duel(11), FightSelection::default(), false);
        let mut rx = handle.subscribe();
        let duel = game.run().await;
        assert!(duel.tick_count() > 0);
        assert_eq!(duel.state().match_over, duel.state().winner.is_some());

        let mut saw_end = false;
        loop {
            match rx.try_recv() {
                Ok(MatchMsg::MatchEnd { winner, ticks, .. }) => {
                    assert_eq!(winner, duel.state().winner);
                    assert_eq!(ticks, duel.tick_count());
                    saw_end = true;
                }
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        assert!(saw_end);
    }

    #[test]
    fn tick_limit_follows_tick_rate() {
        assert_eq!(unpaced_tick_limit(60), 108_000);
        assert_eq!(unpaced_tick_limit(30), 54_000);
        assert_eq!(unpaced_tick_limit(0), 1_800);
    }

    #[tokio::test]
    async fn undecidable_match_stops_at_tick_limit() {
        // Idle humans draw every round on time, so nobody ever wins
        let cfg = SimConfig {
            tick_rate: 2,
            ..SimConfig::default()
        };
        let duel = Duel::new(Uuid::new_v4(), cfg, [Controller::Human, Controller::Human]);
        let (game, _handle) = GameMatch::new(duel, FightSelection::default(), false);
        let duel = game.run().await;
        assert_eq!(duel.tick_count(), unpaced_tick_limit(2));
        assert!(!duel.state().match_over);
        assert_eq!(duel.state().winner, None);
        assert_eq!(duel.state().score, [0, 0]);
    }

    #[test]
    fn latest_input_per_side_wins() {
        tokio_test::block_on(async {
            let (mut game, handle) =
                GameMatch::new(agent_duel(3), FightSelection::default(), false);
            let walk = InputCommands {
                move_right: true,
                ..InputCommands::default()
            };
            let block = InputCommands {
                block: true,
                ..InputCommands::default()
            };
            handle
                .input_tx
                .send(PlayerInput {
                    side: Side::One,
                    commands: walk,
                })
                .await
                .unwrap();
            handle
                .input_tx
                .send(PlayerInput {
                    side: Side::One,
                    commands: block,
                })
                .await
                .unwrap();

            game.process_inputs();
            assert_eq!(game.current_input[0], block);
            assert_eq!(game.current_input[1], InputCommands::default());
        });
    }
}
