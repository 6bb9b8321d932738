//! Match controller - round timer, scoring and the ordered per-tick update

use tracing::info;
use uuid::Uuid;

use crate::config::SimConfig;

use super::agent::DecisionAgent;
use super::combat::CombatSystem;
use super::events::{RoundOutcome, Side, SimEvent, SoundCue};
use super::fighter::Fighter;
use super::physics::PhysicsSystem;
use super::roster;
use super::InputCommands;

/// Top-level screen. Only `Fight` runs the simulation; the rest belong to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Instructions,
    CharacterSelect,
    StageSelect,
    Fight,
}

/// Roster and stage picks for a fight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FightSelection {
    pub p1: usize,
    pub p2: usize,
    pub stage: usize,
}

impl Default for FightSelection {
    fn default() -> Self {
        Self {
            p1: 0,
            p2: 1,
            stage: 0,
        }
    }
}

/// Who drives a side
#[derive(Debug, Clone)]
pub enum Controller {
    /// Commands supplied from outside every tick
    Human,
    /// Scripted opponent; external commands for this side are ignored
    Agent(DecisionAgent),
}

/// Round and score bookkeeping (owned by the controller)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub round: u32,
    pub best_of: u32,
    pub score: [u32; 2],
    /// Seconds left in the current round
    pub round_timer: f64,
    pub round_over: bool,
    pub match_over: bool,
    pub winner: Option<Side>,
    /// Seconds until the next round starts, once a round is decided
    pub reset_countdown: Option<f64>,
    pub last_outcome: Option<RoundOutcome>,
}

impl MatchState {
    pub fn new(cfg: &SimConfig) -> Self {
        Self {
            round: 1,
            best_of: cfg.best_of,
            score: [0, 0],
            round_timer: cfg.round_time,
            round_over: false,
            match_over: false,
            winner: None,
            reset_countdown: None,
            last_outcome: None,
        }
    }
}

/// Decide a round from final health values
pub fn decide_round(health: [i32; 2]) -> RoundOutcome {
    let [h1, h2] = health;
    if h1 <= 0 && h2 <= 0 {
        RoundOutcome::DoubleKo
    } else if h1 > h2 {
        RoundOutcome::Won {
            side: Side::One,
            ko: h2 <= 0,
        }
    } else if h2 > h1 {
        RoundOutcome::Won {
            side: Side::Two,
            ko: h1 <= 0,
        }
    } else {
        RoundOutcome::Draw
    }
}

/// A two-fighter duel. One instance is one match; ticks must not run concurrently.
pub struct Duel {
    id: Uuid,
    cfg: SimConfig,
    screen: Screen,
    selection: FightSelection,
    fighters: [Fighter; 2],
    controllers: [Controller; 2],
    state: MatchState,
    tick: u64,
}

impl Duel {
    pub fn new(id: Uuid, cfg: SimConfig, controllers: [Controller; 2]) -> Self {
        let selection = FightSelection::default();
        let fighters = Self::build_fighters(&cfg, &selection);
        let state = MatchState::new(&cfg);
        Self {
            id,
            cfg,
            screen: Screen::Menu,
            selection,
            fighters,
            controllers,
            state,
            tick: 0,
        }
    }

    /// Side one human, side two scripted (the usual single-player setup)
    pub fn versus_agent(id: Uuid, cfg: SimConfig, agent: DecisionAgent) -> Self {
        Self::new(id, cfg, [Controller::Human, Controller::Agent(agent)])
    }

    fn build_fighters(cfg: &SimConfig, selection: &FightSelection) -> [Fighter; 2] {
        let p1 = roster::fighter(selection.p1);
        let p2 = roster::fighter(selection.p2);
        [
            Fighter::new(p1.name, Side::One, p1.stats, cfg.spawn_x.0, cfg.ground_y),
            Fighter::new(p2.name, Side::Two, p2.stats, cfg.spawn_x.1, cfg.ground_y),
        ]
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn selection(&self) -> FightSelection {
        self.selection
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn fighter(&self, side: Side) -> &Fighter {
        &self.fighters[side.index()]
    }

    pub fn fighter_mut(&mut self, side: Side) -> &mut Fighter {
        &mut self.fighters[side.index()]
    }

    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    pub fn controller(&self, side: Side) -> &Controller {
        &self.controllers[side.index()]
    }

    /// Enter the fight screen with fresh fighters and a zeroed score
    pub fn start_fight(&mut self, selection: FightSelection) -> Vec<SimEvent> {
        self.selection = selection;
        self.fighters = Self::build_fighters(&self.cfg, &selection);
        self.state = MatchState::new(&self.cfg);
        self.screen = Screen::Fight;

        info!(
            match_id = %self.id,
            p1 = self.fighters[0].name(),
            p2 = self.fighters[1].name(),
            stage = roster::stage(selection.stage).name,
            "Fight started"
        );

        vec![SimEvent::PlaySound {
            cue: SoundCue::RoundStart,
        }]
    }

    /// Run a new fight with the same picks once the match is decided
    pub fn restart(&mut self) -> Vec<SimEvent> {
        if !self.state.match_over {
            return Vec::new();
        }
        self.start_fight(self.selection)
    }

    /// Skip the remaining delay and start the next round now
    pub fn request_reset(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.state.round_over && !self.state.match_over {
            self.reset_round(&mut events);
        }
        events
    }

    pub fn leave_fight(&mut self) {
        self.screen = Screen::Menu;
    }

    /// Advance the simulation by `dt` seconds.
    /// Order: commands, physics, attacks, body separation, round bookkeeping.
    pub fn tick(&mut self, dt: f64, inputs: &[InputCommands; 2]) -> Vec<SimEvent> {
        assert!(dt >= 0.0, "negative dt: {dt}");

        let mut events = Vec::new();
        if self.screen != Screen::Fight {
            return events;
        }
        self.tick += 1;

        self.advance_reset_countdown(dt, &mut events);

        let [f1, f2] = &mut self.fighters;
        let [c1, c2] = &mut self.controllers;

        if !self.state.round_over {
            Self::drive(c1, &inputs[0], f1, f2, dt, &mut events);
            Self::drive(c2, &inputs[1], f2, f1, dt, &mut events);
        }

        f1.integrate(dt, f2.x(), &self.cfg);
        f2.integrate(dt, f1.x(), &self.cfg);

        CombatSystem::resolve_attack(f1, f2, dt, &mut events);
        CombatSystem::resolve_attack(f2, f1, dt, &mut events);

        Self::separate_bodies(f1, f2);

        self.check_round_end(dt, &mut events);

        events
    }

    fn drive(
        controller: &mut Controller,
        cmds: &InputCommands,
        me: &mut Fighter,
        opponent: &mut Fighter,
        dt: f64,
        events: &mut Vec<SimEvent>,
    ) {
        match controller {
            Controller::Human => {
                me.apply_input(cmds, dt);
                if let Some(id) = cmds.attack {
                    let _ = me.attack(id);
                }
                if cmds.throw {
                    let _ = CombatSystem::throw(me, opponent, events);
                }
            }
            Controller::Agent(agent) => {
                agent.update(dt, me, opponent, events);
            }
        }
    }

    /// Soft push-apart so bodies never pass through each other
    pub fn separate_bodies(f1: &mut Fighter, f2: &mut Fighter) {
        let (r1, r2) = (f1.rect(), f2.rect());
        if let Some((x1, x2)) = PhysicsSystem::separate(f1.x(), &r1, f2.x(), &r2) {
            f1.set_x(x1);
            f2.set_x(x2);
            f1.damp_horizontal(PhysicsSystem::SEPARATION_DAMPING);
            f2.damp_horizontal(PhysicsSystem::SEPARATION_DAMPING);
        }
    }

    fn advance_reset_countdown(&mut self, dt: f64, events: &mut Vec<SimEvent>) {
        if self.state.match_over {
            return;
        }
        if let Some(remaining) = self.state.reset_countdown.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.reset_round(events);
            }
        }
    }

    fn check_round_end(&mut self, dt: f64, events: &mut Vec<SimEvent>) {
        if self.state.round_over {
            return;
        }

        self.state.round_timer = (self.state.round_timer - dt).max(0.0);

        let health = [self.fighters[0].health(), self.fighters[1].health()];
        let knockout = health.iter().any(|&h| h <= 0);
        if knockout || self.state.round_timer <= 0.0 {
            self.end_round(decide_round(health), knockout, events);
        }
    }

    fn end_round(&mut self, outcome: RoundOutcome, knockout: bool, events: &mut Vec<SimEvent>) {
        self.state.round_over = true;
        self.state.last_outcome = Some(outcome);

        if let RoundOutcome::Won { side, .. } = outcome {
            self.state.score[side.index()] += 1;
        }

        info!(
            match_id = %self.id,
            round = self.state.round,
            ?outcome,
            score = ?self.state.score,
            "Round over"
        );

        events.push(SimEvent::RoundEnded {
            round: self.state.round,
            outcome,
            score: self.state.score,
        });
        if knockout {
            events.push(SimEvent::PlaySound { cue: SoundCue::Ko });
        }

        let needed = self.cfg.wins_needed();
        let [s1, s2] = self.state.score;
        if s1 >= needed || s2 >= needed {
            let winner = if s1 > s2 { Side::One } else { Side::Two };
            self.state.match_over = true;
            self.state.winner = Some(winner);
            info!(match_id = %self.id, ?winner, score = ?self.state.score, "Match over");
            events.push(SimEvent::MatchEnded {
                winner,
                score: self.state.score,
            });
        } else {
            self.state.reset_countdown = Some(self.cfg.round_reset_delay);
        }
    }

    fn reset_round(&mut self, events: &mut Vec<SimEvent>) {
        let (x1, x2) = self.cfg.spawn_x;
        self.fighters[0].reset(x1, self.cfg.ground_y);
        self.fighters[1].reset(x2, self.cfg.ground_y);

        self.state.round += 1;
        self.state.round_timer = self.cfg.round_time;
        self.state.round_over = false;
        self.state.reset_countdown = None;

        info!(match_id = %self.id, round = self.state.round, "Round reset");
        events.push(SimEvent::RoundStarted {
            round: self.state.round,
        });
    }
}
