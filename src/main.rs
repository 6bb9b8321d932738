//! Duel Sim - headless match runner
//!
//! Runs a batch of agent-vs-agent matches and reports the results:
//! - Each match runs on its own task as the single writer of its duel
//! - Tick events go to the tracing output, or to stdout as JSON lines
//! - Ctrl+C / SIGTERM stops every running match

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use duel_sim::config::{Config, EventLog, LogFormat};
use duel_sim::game::roster;
use duel_sim::game::sink::{dispatch, EventSink, JsonLinesSink, TracingSink};
use duel_sim::game::{
    Controller, DecisionAgent, Duel, FightSelection, GameMatch, MatchHandle, MatchMsg,
    MatchRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    let selection = FightSelection {
        p1: config.p1_fighter,
        p2: config.p2_fighter,
        stage: config.stage,
    };

    info!("Starting Duel Sim");
    info!(
        matches = config.match_count,
        tick_rate = config.sim.tick_rate,
        best_of = config.sim.best_of,
        difficulty = config.ai_difficulty,
        p1 = roster::fighter(selection.p1).name,
        p2 = roster::fighter(selection.p2).name,
        stage = roster::stage(selection.stage).name,
        realtime = config.realtime,
        "Configuration loaded"
    );

    let registry = Arc::new(MatchRegistry::new());
    let mut tasks = JoinSet::new();
    let mut loggers = JoinSet::new();

    for n in 0..config.match_count as u64 {
        let seed = config.seed.wrapping_add(2 * n);
        let duel = Duel::new(
            Uuid::new_v4(),
            config.sim.clone(),
            [
                Controller::Agent(DecisionAgent::with_seed(config.ai_difficulty, seed)),
                Controller::Agent(DecisionAgent::with_seed(
                    config.ai_difficulty,
                    seed.wrapping_add(1),
                )),
            ],
        );

        let (game, handle) = GameMatch::new(duel, selection, config.realtime);
        loggers.spawn(log_events(&handle, config.event_log));
        registry.insert(handle);

        let registry = registry.clone();
        tasks.spawn(async move {
            let duel = game.run().await;
            registry.remove(&duel.id());
            duel
        });
    }

    info!(active = registry.active_matches(), "Matches running");

    let finished = tokio::select! {
        _ = collect_results(&mut tasks) => {
            info!("All matches finished");
            true
        }
        _ = shutdown_signal() => {
            warn!(active = registry.active_matches(), "Stopping running matches");
            false
        }
    };

    tasks.shutdown().await;
    if finished {
        // Each logger stops on its match's MatchEnd; drain what is still queued
        while loggers.join_next().await.is_some() {}
    } else {
        loggers.shutdown().await;
    }

    info!("Duel Sim shutdown complete");
    Ok(())
}

/// Wait for every match task and log its outcome
async fn collect_results(tasks: &mut JoinSet<Duel>) {
    let mut wins = [0u32; 2];
    let mut undecided = 0u32;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(duel) => {
                let state = duel.state();
                match state.winner {
                    Some(side) => wins[side.index()] += 1,
                    None => undecided += 1,
                }
                info!(
                    match_id = %duel.id(),
                    winner = ?state.winner,
                    score = ?state.score,
                    rounds = state.round,
                    ticks = duel.tick_count(),
                    "Match result"
                );
            }
            Err(e) => warn!(error = %e, "Match task failed"),
        }
    }

    info!(p1_wins = wins[0], p2_wins = wins[1], undecided, "Batch complete");
}

/// Forward a match's tick events to the configured sink until the match ends
fn log_events(handle: &MatchHandle, event_log: EventLog) -> impl Future<Output = ()> + Send {
    let mut rx = handle.subscribe();
    let match_id = handle.id;

    async move {
        let mut sink: Box<dyn EventSink + Send> = match event_log {
            EventLog::Json => Box::new(JsonLinesSink::for_match(io::stdout(), match_id)),
            EventLog::None => Box::new(TracingSink),
        };

        loop {
            match rx.recv().await {
                Ok(MatchMsg::Events { tick, events }) => dispatch(tick, &events, sink.as_mut()),
                Ok(MatchMsg::Snapshot(_)) => {}
                Ok(MatchMsg::MatchEnd { .. }) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%match_id, skipped, "Event logger fell behind");
                }
            }
        }
    }
}

/// Initialize tracing/logging on stderr; stdout is reserved for JSON events
fn init_tracing(log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);

    match format {
        LogFormat::Json => registry.with(layer.json()).init(),
        LogFormat::Text => registry.with(layer).init(),
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_sim::config::SimConfig;
    use std::time::Duration;

    #[tokio::test]
    async fn event_logger_drains_and_stops_at_match_end() {
        // Idle humans never win, so the match runs to its tick cap and still reports its end
        let cfg = SimConfig {
            tick_rate: 2,
            ..SimConfig::default()
        };
        let duel = Duel::new(Uuid::new_v4(), cfg, [Controller::Human, Controller::Human]);
        let (game, handle) = GameMatch::new(duel, FightSelection::default(), false);

        let mut loggers = JoinSet::new();
        loggers.spawn(log_events(&handle, EventLog::None));
        game.run().await;

        // `handle` keeps the channel open, so only MatchEnd can stop the logger
        let joined = tokio::time::timeout(Duration::from_secs(5), loggers.join_next()).await;
        assert!(matches!(joined, Ok(Some(Ok(())))));
        drop(handle);
    }
}
