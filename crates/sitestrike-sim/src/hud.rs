//! Read-only projection of the match for the HUD and menu layer.

use serde::Serialize;

use sitestrike_core::player::TeamColor;
use sitestrike_core::team::Team;

use crate::Simulation;
use crate::effects::KillFeedEntry;
use crate::round::RoundPhase;
use crate::weapons::{EquipmentId, WeaponCategory, WeaponId, available_weapons};

/// Timer value below which the HUD flags urgency.
pub const LOW_TIMER: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuyKind {
    Weapon(WeaponId),
    Equipment(EquipmentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuySection {
    Pistols,
    Heavy,
    Equipment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyItem {
    pub kind: BuyKind,
    pub name: &'static str,
    pub price: u32,
    pub affordable: bool,
    pub section: BuySection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub name: String,
    pub team: Team,
    pub color: TeamColor,
    pub kills: u32,
    pub deaths: u32,
    pub alive: bool,
    pub is_player: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    pub health: u32,
    pub max_health: u32,
    pub armor: u32,
    pub helmet: bool,
    pub money: u32,
    pub weapon_name: &'static str,
    /// `(magazine, reserve)`; `None` for melee.
    pub ammo: Option<(u32, u32)>,
    pub reloading: bool,
    pub reload_progress: f32,
    pub ct_score: u8,
    pub t_score: u8,
    pub round_label: String,
    pub timer: String,
    pub timer_low: bool,
    pub score: u32,
    pub phase: RoundPhase,
    pub buy_menu_open: bool,
    pub buy_items: Vec<BuyItem>,
    pub scoreboard_open: bool,
    pub scoreboard: Vec<ScoreRow>,
    pub bomb_planted: bool,
    pub defuse_progress: Option<f32>,
    pub kill_feed: Vec<KillFeedEntry>,
}

/// `m:ss` with whole seconds rounded down, never negative.
pub fn format_timer(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u32;
    format!("{}:{:02}", total / 60, total % 60)
}

fn section_for(category: WeaponCategory) -> BuySection {
    match category {
        WeaponCategory::Pistol | WeaponCategory::Melee => BuySection::Pistols,
        _ => BuySection::Heavy,
    }
}

/// Buy menu entries for `team` with affordability against `money`.
pub fn buy_items(team: Team, money: u32, has_kit: bool) -> Vec<BuyItem> {
    let weapons = available_weapons(team)
        .filter(|w| !w.is_melee())
        .map(|w| BuyItem {
            kind: BuyKind::Weapon(w.id),
            name: w.name,
            price: w.price,
            affordable: money >= w.price,
            section: section_for(w.category),
        });
    let equipment = EquipmentId::ALL
        .into_iter()
        .filter(|e| *e != EquipmentId::DefuseKit || (team == Team::Ct && !has_kit))
        .map(|e| BuyItem {
            kind: BuyKind::Equipment(e),
            name: e.name(),
            price: e.price(),
            affordable: money >= e.price(),
            section: BuySection::Equipment,
        });
    weapons.chain(equipment).collect()
}

impl Simulation {
    /// Current HUD fields for the human agent.
    pub fn hud(&self) -> HudView {
        let state = &self.state;
        let round = &state.round;
        let player = self.player();

        let (health, max_health, armor, helmet, money) = player
            .map(|p| {
                (
                    p.health.max(0.0).ceil() as u32,
                    p.max_health.ceil() as u32,
                    p.armor.max(0.0).ceil() as u32,
                    p.helmet,
                    p.money,
                )
            })
            .unwrap_or_default();

        let weapon = player.map(|p| (p.weapon(), p.slot().mag, p.slot().reserve));
        let weapon_name = weapon.map_or("", |(w, ..)| w.name);
        let ammo = weapon
            .filter(|(w, ..)| !w.is_melee())
            .map(|(_, mag, reserve)| (mag, reserve));

        let (reloading, reload_progress) = match player.and_then(|p| p.reload_end.map(|end| (p, end))) {
            Some((p, end)) => {
                let total = p.weapon().reload_time;
                let left = (end - state.clock).max(0.0);
                let progress = if total > 0.0 {
                    (1.0 - left / total).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                (true, progress)
            },
            None => (false, 0.0),
        };

        let seconds = match (&round.bomb, round.phase) {
            (Some(bomb), _) => bomb.fuse,
            (None, RoundPhase::Freeze) => round.freeze_timer,
            (None, RoundPhase::End) => round.end_timer,
            (None, _) => round.round_timer,
        };

        let mut scoreboard: Vec<ScoreRow> = state
            .agents
            .iter()
            .map(|a| ScoreRow {
                name: a.name.clone(),
                team: a.team,
                color: a.color(),
                kills: a.kills,
                deaths: a.deaths,
                alive: a.alive,
                is_player: a.is_player,
            })
            .collect();
        scoreboard.sort_by(|a, b| b.kills.cmp(&a.kills));

        let buy_items = match player {
            Some(p) if self.buy_menu_open => buy_items(p.team, p.money, p.has_defuse_kit),
            _ => Vec::new(),
        };

        HudView {
            health,
            max_health,
            armor,
            helmet,
            money,
            weapon_name,
            ammo,
            reloading,
            reload_progress,
            ct_score: round.ct_score,
            t_score: round.t_score,
            round_label: format!("ROUND {}/{}", round.round.min(round.max_rounds), round.max_rounds),
            timer: format_timer(seconds),
            timer_low: seconds < LOW_TIMER,
            score: state.score,
            phase: round.phase,
            buy_menu_open: self.buy_menu_open,
            buy_items,
            scoreboard_open: self.scoreboard_open,
            scoreboard,
            bomb_planted: round.bomb.is_some(),
            defuse_progress: round
                .bomb
                .as_ref()
                .and_then(|b| b.defuse.as_ref())
                .map(|d| d.progress()),
            kill_feed: state.effects.kill_feed.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_formats_minutes_and_seconds() {
        assert_eq!(format_timer(105.0), "1:45");
        assert_eq!(format_timer(9.2), "0:09");
        assert_eq!(format_timer(104.9), "1:44");
        assert_eq!(format_timer(0.7), "0:00");
        assert_eq!(format_timer(0.0), "0:00");
        assert_eq!(format_timer(-3.0), "0:00");
    }

    #[test]
    fn scoreboard_rows_carry_team_colors() {
        let s = crate::test_helpers::arena_sim(2, sitestrike_core::team::Difficulty::Normal);
        let hud = s.hud();
        assert_eq!(hud.scoreboard.len(), 4);
        for row in &hud.scoreboard {
            assert_eq!(row.color, TeamColor::for_team(row.team));
        }
        assert!(hud.scoreboard.iter().any(|r| r.color == TeamColor::T));
    }

    #[test]
    fn t_menu_has_no_kit_or_ct_weapons() {
        let items = buy_items(Team::T, 16_000, false);
        assert!(
            !items
                .iter()
                .any(|i| i.kind == BuyKind::Equipment(EquipmentId::DefuseKit))
        );
        assert!(
            !items
                .iter()
                .any(|i| i.kind == BuyKind::Weapon(WeaponId::M4a1))
        );
        assert!(
            items
                .iter()
                .any(|i| i.kind == BuyKind::Weapon(WeaponId::Ak47))
        );
        assert!(items.iter().all(|i| i.affordable));
    }

    #[test]
    fn ct_with_kit_sees_no_kit_entry() {
        let items = buy_items(Team::Ct, 800, true);
        assert!(
            !items
                .iter()
                .any(|i| i.kind == BuyKind::Equipment(EquipmentId::DefuseKit))
        );
        let awp = items
            .iter()
            .find(|i| i.kind == BuyKind::Weapon(WeaponId::Awp))
            .unwrap();
        assert!(!awp.affordable);
        assert_eq!(awp.section, BuySection::Heavy);
    }
}
