//! End-to-end match flows driven through the public tick loop.

use sitestrike_core::events::{GameEvent, MatchOutcome, RoundEndReason};
use sitestrike_core::game_trait::TacticalGame;
use sitestrike_core::player::AgentId;
use sitestrike_core::protocol;
use sitestrike_core::sound::SoundId;
use sitestrike_core::team::Team;
use sitestrike_core::test_helpers::{self, sounds_in};

use crate::actions::PlayerAction;
use crate::config::SimConfig;
use crate::round::RoundPhase;
use crate::weapons::WeaponId;
use crate::{MatchState, PLAYER, PlayerInput, Simulation};

const DT: f32 = 0.05;
/// Inside site A, clear of crates.
const SITE_A: (f32, f32) = (950.0, 250.0);
/// Far corner, outside the blast radius of site A.
const SAFE_SPOT: (f32, f32) = (120.0, 1650.0);

fn sim(team: Team) -> Simulation {
    Simulation::with_seed(
        SimConfig {
            team,
            ..SimConfig::default()
        },
        42,
    )
}

fn skip_freeze(s: &mut Simulation) {
    s.state.round.freeze_timer = 0.0;
    s.tick(0.0);
    assert_eq!(s.state.round.phase, RoundPhase::Live);
}

fn teleport(s: &mut Simulation, id: AgentId, (x, y): (f32, f32)) {
    let agent = &mut s.state.agents[id.index()];
    agent.x = x;
    agent.y = y;
    agent.vx = 0.0;
    agent.vy = 0.0;
}

fn kill_team(s: &mut Simulation, team: Team) {
    for agent in s.state.agents.iter_mut().filter(|a| a.team == team && !a.is_player) {
        agent.kill();
    }
}

fn run(s: &mut Simulation, ticks: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(s.tick(DT));
    }
    events
}

fn last_reason(s: &Simulation) -> Option<RoundEndReason> {
    s.state.round.last_result.map(|r| r.reason)
}

#[test]
fn pistol_runs_dry_then_reloads() {
    let mut s = sim(Team::T);
    skip_freeze(&mut s);
    assert_eq!(s.player().unwrap().weapon().id, WeaponId::Glock);

    for _ in 0..20 {
        s.state.clock += 0.2;
        assert!(s.fire_player_weapon());
    }
    assert_eq!(s.player().unwrap().slot().mag, 0);
    s.events.clear();

    s.state.clock += 0.2;
    assert!(!s.fire_player_weapon());
    let sounds = sounds_in(&s.events);
    assert_eq!(sounds, vec![SoundId::Empty, SoundId::Reload]);
    assert!(s.player().unwrap().is_reloading());

    let reload = s.player().unwrap().weapon().reload_time;
    s.state.clock += reload + 0.01;
    s.finish_reload_if_due(PLAYER);
    let slot = s.player().unwrap().slot();
    assert_eq!((slot.mag, slot.reserve), (20, 100));
}

#[test]
fn planted_bomb_explodes_for_terrorists() {
    let mut s = sim(Team::T);
    skip_freeze(&mut s);
    teleport(&mut s, PLAYER, SITE_A);
    assert!(s.perform(PlayerAction::Interact));
    assert!(s.state.round.bomb.is_some());
    assert!(!s.player().unwrap().has_bomb);
    // A second plant is refused.
    assert!(!s.perform(PlayerAction::Interact));

    teleport(&mut s, PLAYER, SAFE_SPOT);
    kill_team(&mut s, Team::Ct);

    let events = run(&mut s, 798);
    assert_eq!(s.state.round.phase, RoundPhase::Live);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundEnded { .. }))
    );

    let events = run(&mut s, 4);
    assert_eq!(s.state.round.phase, RoundPhase::End);
    assert_eq!(last_reason(&s), Some(RoundEndReason::BombExploded));
    assert_eq!(s.state.round.t_score, 1);
    assert!(s.state.round.bomb.is_none());
    assert!(sounds_in(&events).contains(&SoundId::BombExplode));
    assert!(s.player().unwrap().alive);
}

#[test]
fn bomb_timer_survives_elimination_of_defenders() {
    let mut s = sim(Team::T);
    skip_freeze(&mut s);
    teleport(&mut s, PLAYER, SITE_A);
    assert!(s.perform(PlayerAction::Interact));
    teleport(&mut s, PLAYER, SAFE_SPOT);
    kill_team(&mut s, Team::Ct);
    run(&mut s, 5);
    // All CTs dead, but the round waits for the fuse.
    assert_eq!(s.state.round.phase, RoundPhase::Live);
}

fn ct_with_planted_bomb() -> (Simulation, AgentId) {
    let mut s = sim(Team::Ct);
    skip_freeze(&mut s);
    let carrier = s
        .state
        .agents
        .iter()
        .find(|a| a.has_bomb)
        .map(|a| a.id)
        .unwrap();
    teleport(&mut s, carrier, SITE_A);
    assert!(s.plant_bomb(carrier));
    if let Some(bomb) = s.state.round.bomb.as_mut() {
        bomb.fuse = 20.0;
    }
    kill_team(&mut s, Team::Ct);
    kill_team(&mut s, Team::T);
    teleport(&mut s, PLAYER, (970.0, 250.0));
    (s, carrier)
}

#[test]
fn kit_defuse_completes_after_five_seconds() {
    let (mut s, _) = ct_with_planted_bomb();
    assert!(s.perform(PlayerAction::Interact));
    let defuse = s.state.round.bomb.as_ref().and_then(|b| b.defuse).unwrap();
    assert!((defuse.duration - 5.0).abs() < f32::EPSILON);

    run(&mut s, 98);
    assert_eq!(s.state.round.phase, RoundPhase::Live);
    let progress = s.hud().defuse_progress.unwrap();
    assert!(progress > 0.9 && progress < 1.0);

    run(&mut s, 4);
    assert_eq!(s.state.round.phase, RoundPhase::End);
    assert_eq!(last_reason(&s), Some(RoundEndReason::BombDefused));
    assert_eq!(s.state.round.ct_score, 1);
    assert_eq!(s.state.round.t_score, 0);
}

#[test]
fn walking_away_aborts_defuse() {
    let (mut s, _) = ct_with_planted_bomb();
    assert!(s.perform(PlayerAction::Interact));
    run(&mut s, 10);
    teleport(&mut s, PLAYER, (1150.0, 450.0));
    let events = s.tick(DT);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GameEvent::DefuseAborted { defuser } if *defuser == PLAYER))
    );
    assert!(s.state.round.bomb.as_ref().unwrap().defuse.is_none());
    assert_eq!(s.state.round.phase, RoundPhase::Live);
}

#[test]
fn defuse_out_of_range_is_rejected() {
    let (mut s, _) = ct_with_planted_bomb();
    teleport(&mut s, PLAYER, (1150.0, 450.0));
    assert!(!s.perform(PlayerAction::Interact));
}

#[test]
fn elimination_ends_round_once_and_carries_money() {
    let mut s = sim(Team::Ct);
    skip_freeze(&mut s);
    kill_team(&mut s, Team::T);
    s.tick(DT);
    assert_eq!(s.state.round.phase, RoundPhase::End);
    assert_eq!(last_reason(&s), Some(RoundEndReason::TEliminated));
    assert_eq!(s.state.round.ct_score, 1);
    assert_eq!(s.player().unwrap().money, 800 + 3250);
    assert_eq!(s.state.score, 200);

    // Later win conditions in the same round are no-ops.
    assert!(!s.end_round(RoundEndReason::CtEliminated));
    assert_eq!(s.state.round.ct_score, 1);
    assert_eq!(s.state.round.t_score, 0);

    let events = run(&mut s, 85);
    assert!(events.contains(&GameEvent::RoundStarted { round: 2 }));
    assert_eq!(s.state.round.round, 2);
    assert_eq!(s.state.round.phase, RoundPhase::Freeze);
    assert_eq!(s.player().unwrap().money, 4050);
    assert!(s.state.agents.iter().all(|a| a.alive));
}

#[test]
fn losing_side_gets_loss_bonus() {
    let mut s = sim(Team::T);
    skip_freeze(&mut s);
    s.state.round.round_timer = 0.01;
    s.tick(DT);
    assert_eq!(last_reason(&s), Some(RoundEndReason::TimeExpired));
    assert_eq!(s.state.round.ct_score, 1);
    assert_eq!(s.player().unwrap().money, 800 + 1400);
    assert_eq!(s.state.score, 0);
}

#[test]
fn human_death_ends_session() {
    let mut s = sim(Team::Ct);
    skip_freeze(&mut s);
    let enemy = AgentId(5);
    s.damage_agent(PLAYER, Some(enemy), 10_000.0, false, "AK-47");
    assert!(!s.player().unwrap().alive);
    assert_eq!(s.state.agents[enemy.index()].kills, 1);

    let events = s.tick(DT);
    assert_eq!(s.state.round.phase, RoundPhase::GameOver);
    assert_eq!(s.state.round.outcome, Some(MatchOutcome::Eliminated));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::GameOver {
            outcome: MatchOutcome::Eliminated,
            ..
        }
    )));
    assert!(s.is_game_over());

    let frozen = s.snapshot_bytes().unwrap();
    run(&mut s, 20);
    assert_eq!(frozen, s.snapshot_bytes().unwrap());
    assert!(!s.perform(PlayerAction::ToggleBuyMenu));
}

#[test]
fn explosion_can_eliminate_the_planter() {
    let mut s = sim(Team::T);
    skip_freeze(&mut s);
    teleport(&mut s, PLAYER, SITE_A);
    assert!(s.perform(PlayerAction::Interact));
    if let Some(bomb) = s.state.round.bomb.as_mut() {
        bomb.fuse = 0.01;
    }
    s.state.agents[PLAYER.index()].health = 50.0;

    let events = s.tick(DT);
    assert_eq!(s.state.round.t_score, 1);
    assert_eq!(s.state.round.phase, RoundPhase::GameOver);
    assert_eq!(s.state.round.outcome, Some(MatchOutcome::Eliminated));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::Kill {
            killer: None,
            victim,
            ..
        } if *victim == PLAYER
    )));
    assert!(
        s.state
            .effects
            .kill_feed
            .iter()
            .any(|k| k.weapon == "C4" && k.killer.is_none())
    );
}

#[test]
fn reaching_threshold_wins_the_match() {
    let mut s = sim(Team::Ct);
    skip_freeze(&mut s);
    s.state.round.ct_score = 8;
    kill_team(&mut s, Team::T);
    s.tick(DT);
    assert_eq!(s.state.round.ct_score, 9);

    let events = run(&mut s, 85);
    assert_eq!(s.state.round.phase, RoundPhase::GameOver);
    assert_eq!(s.state.round.outcome, Some(MatchOutcome::Victory));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GameEvent::CenterMessage { text, .. } if text == "VICTORY!"))
    );
}

#[test]
fn tied_match_goes_to_terrorists() {
    let mut s = Simulation::with_seed(
        SimConfig {
            team: Team::Ct,
            max_rounds: 2,
            ..SimConfig::default()
        },
        3,
    );
    skip_freeze(&mut s);
    s.state.round.round = 2;
    s.state.round.t_score = 1;
    kill_team(&mut s, Team::T);
    s.tick(DT);
    run(&mut s, 85);
    assert_eq!(s.state.round.phase, RoundPhase::GameOver);
    assert_eq!(s.state.round.outcome, Some(MatchOutcome::Defeat));
}

#[test]
fn freeze_allows_movement_but_not_firing() {
    let mut s = sim(Team::Ct);
    teleport(&mut s, PLAYER, (2500.0, 950.0));
    s.set_input(PlayerInput {
        move_x: 1.0,
        fire: true,
        ..PlayerInput::default()
    });
    let mag = s.player().unwrap().slot().mag;
    run(&mut s, 5);
    assert_eq!(s.state.round.phase, RoundPhase::Freeze);
    let p = s.player().unwrap();
    assert!(p.x > 2500.0);
    assert_eq!(p.slot().mag, mag);
    assert!(s.state.bullets.is_empty());
}

#[test]
fn open_menu_blocks_firing() {
    let mut s = sim(Team::Ct);
    skip_freeze(&mut s);
    assert!(s.perform(PlayerAction::ToggleBuyMenu));
    s.set_input(PlayerInput {
        fire: true,
        aim_angle: s.player().unwrap().angle,
        ..PlayerInput::default()
    });
    let mag = s.player().unwrap().slot().mag;
    s.tick(DT);
    assert_eq!(s.player().unwrap().slot().mag, mag);

    assert!(s.perform(PlayerAction::ToggleBuyMenu));
    s.tick(DT);
    assert_eq!(s.player().unwrap().slot().mag, mag - 1);
}

#[test]
fn semi_automatic_needs_fresh_trigger_pull() {
    let mut s = sim(Team::Ct);
    skip_freeze(&mut s);
    s.set_input(PlayerInput {
        fire: true,
        aim_angle: s.player().unwrap().angle,
        ..PlayerInput::default()
    });
    let mag = s.player().unwrap().slot().mag;
    run(&mut s, 10);
    assert_eq!(s.player().unwrap().slot().mag, mag - 1);
    assert!(!s.input().fire);
}

#[test]
fn hud_reflects_fresh_session() {
    let s = sim(Team::Ct);
    let hud = s.hud();
    assert_eq!(hud.timer, "0:05");
    assert_eq!(hud.phase, RoundPhase::Freeze);
    assert_eq!(hud.ammo, Some((12, 100)));
    assert_eq!(hud.health, 250);
    assert_eq!(hud.max_health, 250);
    assert_eq!(hud.money, 800);
    assert_eq!(hud.round_label, "ROUND 1/15");
    assert!(hud.timer_low);
    assert!(hud.buy_items.is_empty());
    assert_eq!(hud.scoreboard.len(), 10);
}

#[test]
fn snapshot_decodes_to_published_state() {
    let mut s = sim(Team::T);
    run(&mut s, 20);
    let bytes = s.snapshot_bytes().unwrap();
    let decoded: MatchState = protocol::decode(&bytes).unwrap();
    assert_eq!(&decoded, s.state());
}

#[test]
fn malformed_input_keeps_previous_sample() {
    let mut s = sim(Team::Ct);
    let held = PlayerInput {
        move_y: -1.0,
        ..PlayerInput::default()
    };
    s.set_input(held);
    assert!(s.apply_input_bytes(&[0xc1, 0x00]).is_err());
    assert_eq!(s.input(), held);

    let encoded = protocol::encode(&PlayerInput {
        move_x: f32::NAN,
        aim_angle: f32::INFINITY,
        walk: true,
        ..PlayerInput::default()
    })
    .unwrap();
    assert!(s.apply_input_bytes(&encoded).is_ok());
    let input = s.input();
    assert_eq!(input.move_x, 0.0);
    assert_eq!(input.aim_angle, 0.0);
    assert!(input.walk);
}

#[test]
fn oversized_dt_is_clamped() {
    let mut s = sim(Team::Ct);
    s.tick(10.0);
    assert!((s.state.clock - 0.05).abs() < 1e-6);
    s.tick(f32::NAN);
    assert!((s.state.clock - 0.05).abs() < 1e-6);
    assert_eq!(s.state.round.phase, RoundPhase::Freeze);
}

#[test]
fn tactical_game_contract() {
    let mut s = sim(Team::Ct);
    test_helpers::contract_state_is_published(&s);
    test_helpers::contract_update_advances_time(&mut s);
    test_helpers::contract_pause_stops_updates(&mut s);
    test_helpers::contract_state_roundtrip_preserves(&mut s);
    test_helpers::contract_malformed_input_ignored(&mut s);
    assert_eq!(s.metadata().max_rounds, 15);
}

#[test]
fn seeded_sessions_are_deterministic() {
    let mut a = sim(Team::T);
    let mut b = sim(Team::T);
    a.set_autopilot(true);
    b.set_autopilot(true);
    let ea = test_helpers::run_game_ticks(&mut a, 300, DT);
    let eb = test_helpers::run_game_ticks(&mut b, 300, DT);
    assert_eq!(ea, eb);
    assert_eq!(a.snapshot_bytes().unwrap(), b.snapshot_bytes().unwrap());
}
