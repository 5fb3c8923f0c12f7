use std::time::Duration;

use tracing_subscriber::EnvFilter;

use sitestrike_core::events::GameEvent;
use sitestrike_core::game_trait::TacticalGame;
use sitestrike_core::presentation::{AudioSink, FrameSink, HudSink, dispatch_sounds};
use sitestrike_core::sound::SoundId;
use sitestrike_core::team::{Difficulty, Team};
use sitestrike_sim::config::SimConfig;
use sitestrike_sim::hud::HudView;
use sitestrike_sim::{MatchState, Simulation};

/// Audio backend stand-in that traces every request.
struct TraceAudio;

impl AudioSink for TraceAudio {
    fn play(&mut self, sound: SoundId, volume: f32) {
        tracing::trace!(sound = sound.as_str(), volume, "Sound");
    }
}

#[derive(Default)]
struct FrameCounter {
    frames: u64,
}

impl FrameSink<MatchState> for FrameCounter {
    fn render(&mut self, _snapshot: &MatchState) {
        self.frames += 1;
    }
}

#[derive(Default)]
struct HudTrace {
    last_timer: String,
}

impl HudSink<HudView> for HudTrace {
    fn update(&mut self, hud: &HudView) {
        if hud.timer != self.last_timer {
            tracing::trace!(
                timer = %hud.timer,
                health = hud.health,
                money = hud.money,
                ct = hud.ct_score,
                t = hud.t_score,
                "HUD"
            );
            self.last_timer.clone_from(&hud.timer);
        }
    }
}

struct Args {
    team: Option<Team>,
    difficulty: Option<Difficulty>,
    seed: Option<u64>,
    max_ticks: u64,
    realtime: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        team: None,
        difficulty: None,
        seed: None,
        max_ticks: 200_000,
        realtime: false,
    };
    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--team=") {
            args.team = match v.to_ascii_lowercase().as_str() {
                "ct" => Some(Team::Ct),
                "t" => Some(Team::T),
                _ => {
                    tracing::warn!("Unknown team {v}, using config");
                    None
                },
            };
        } else if let Some(v) = arg.strip_prefix("--difficulty=") {
            args.difficulty = Difficulty::from_name(v);
        } else if let Some(v) = arg.strip_prefix("--seed=") {
            args.seed = v.parse().ok();
        } else if let Some(v) = arg.strip_prefix("--max-ticks=") {
            args.max_ticks = v.parse().unwrap_or(args.max_ticks);
        } else if arg == "--realtime" {
            args.realtime = true;
        } else {
            tracing::warn!("Ignoring unknown argument {arg}");
        }
    }
    args
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::RoundEnded {
            winner,
            reason,
            ct_score,
            t_score,
        } => {
            tracing::info!(%winner, reason = reason.message(), ct_score, t_score, "Round over");
        },
        GameEvent::GameOver {
            outcome,
            ct_score,
            t_score,
        } => {
            tracing::info!(headline = outcome.headline(), ct_score, t_score, "Match over");
        },
        GameEvent::BombPlanted { planter, .. } => {
            tracing::debug!(planter = planter.index(), "Bomb planted");
        },
        _ => {},
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = parse_args();
    let mut config = SimConfig::load();
    if let Some(team) = args.team {
        config.team = team;
    }
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }

    let mut sim = match args.seed {
        Some(seed) => Simulation::with_seed(config, seed),
        None => Simulation::new(config),
    };
    sim.set_autopilot(true);

    let dt = 1.0 / sim.tick_rate();
    let mut interval = args.realtime.then(|| {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval
    });

    let mut audio = TraceAudio;
    let mut frames = FrameCounter::default();
    let mut hud = HudTrace::default();
    tracing::info!(max_ticks = args.max_ticks, realtime = args.realtime, "Headless match starting");

    let mut ticks = 0;
    while ticks < args.max_ticks && !sim.is_game_over() {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        let events = sim.tick(dt);
        dispatch_sounds(&events, &mut audio);
        events.iter().for_each(log_event);
        frames.render(sim.state());
        hud.update(&sim.hud());
        ticks += 1;
    }

    let state = sim.state();
    tracing::info!(
        ticks,
        frames = frames.frames,
        score = state.score,
        kills = state.carried.kills,
        deaths = state.carried.deaths,
        finished = sim.is_game_over(),
        "Headless match stopped"
    );
}
