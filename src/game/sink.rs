//! Presentation sinks - where tick events go once the simulation is done with them

use std::io::Write;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::events::{EffectKind, SimEvent, SoundCue};

/// Consumer of presentation events. Every method is fire-and-forget.
pub trait EventSink {
    /// Called once before the events of `tick` are delivered
    fn begin_tick(&mut self, _tick: u64) {}

    fn spawn_effect(&mut self, kind: EffectKind, x: f64, y: f64);
    fn camera_shake(&mut self, power: f64);
    fn play_sound(&mut self, cue: SoundCue);

    /// Lifecycle events; presentation-only sinks may ignore them
    fn lifecycle(&mut self, _event: &SimEvent) {}
}

/// Discards everything (headless and test runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn spawn_effect(&mut self, _kind: EffectKind, _x: f64, _y: f64) {}
    fn camera_shake(&mut self, _power: f64) {}
    fn play_sound(&mut self, _cue: SoundCue) {}
}

/// Logs each event at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn spawn_effect(&mut self, kind: EffectKind, x: f64, y: f64) {
        debug!(?kind, x, y, "Spawn effect");
    }

    fn camera_shake(&mut self, power: f64) {
        debug!(power, "Camera shake");
    }

    fn play_sound(&mut self, cue: SoundCue) {
        debug!(?cue, "Play sound");
    }

    fn lifecycle(&mut self, event: &SimEvent) {
        debug!(?event, "Match event");
    }
}

/// One output line: the event tagged with where and when it happened
#[derive(Serialize)]
struct EventLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    match_id: Option<Uuid>,
    tick: u64,
    #[serde(flatten)]
    event: &'a SimEvent,
}

/// Writes one JSON object per event.
/// Each line goes out in a single `write_all`, so writers sharing stdout never split a line.
pub struct JsonLinesSink<W: Write> {
    out: W,
    match_id: Option<Uuid>,
    tick: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            match_id: None,
            tick: 0,
        }
    }

    /// Tag every line with `match_id`
    pub fn for_match(out: W, match_id: Uuid) -> Self {
        Self {
            match_id: Some(match_id),
            ..Self::new(out)
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, event: &SimEvent) {
        let line = EventLine {
            match_id: self.match_id,
            tick: self.tick,
            event,
        };
        let result = serde_json::to_vec(&line)
            .map_err(std::io::Error::from)
            .and_then(|mut buf| {
                buf.push(b'\n');
                self.out.write_all(&buf)
            });
        if let Err(e) = result {
            warn!(error = %e, "Failed to write event");
        }
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    fn spawn_effect(&mut self, kind: EffectKind, x: f64, y: f64) {
        self.write(&SimEvent::SpawnEffect { kind, x, y });
    }

    fn camera_shake(&mut self, power: f64) {
        self.write(&SimEvent::CameraShake { power });
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.write(&SimEvent::PlaySound { cue });
    }

    fn lifecycle(&mut self, event: &SimEvent) {
        self.write(event);
    }
}

/// Fan a tick's events out to a sink, in order
pub fn dispatch<S: EventSink + ?Sized>(tick: u64, events: &[SimEvent], sink: &mut S) {
    sink.begin_tick(tick);
    for event in events {
        match *event {
            SimEvent::SpawnEffect { kind, x, y } => sink.spawn_effect(kind, x, y),
            SimEvent::CameraShake { power } => sink.camera_shake(power),
            SimEvent::PlaySound { cue } => sink.play_sound(cue),
            SimEvent::RoundEnded { .. }
            | SimEvent::RoundStarted { .. }
            | SimEvent::MatchEnded { .. } => sink.lifecycle(event),
        }
    }
}
