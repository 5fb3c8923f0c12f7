//! Discrete requests from the HUD and menu layer.
//!
//! Each action is validated against the current state and applied atomically,
//! or rejected with no side effect.

use serde::{Deserialize, Serialize};

use sitestrike_core::sound::SoundId;
use sitestrike_core::team::Team;

use crate::round::RoundPhase;
use crate::weapons::{EquipmentId, WeaponId};
use crate::{PLAYER, Simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// 1 primary, 2 pistol, 3 melee.
    EquipSlot(u8),
    StartReload,
    ToggleBuyMenu,
    SetScoreboard(bool),
    BuyWeapon(WeaponId),
    BuyEquipment(EquipmentId),
    /// Plant when carrying the bomb inside a site, otherwise start a defuse.
    Interact,
}

impl Simulation {
    /// Apply `action` for the human agent. Returns whether it was accepted.
    pub fn perform(&mut self, action: PlayerAction) -> bool {
        if self.paused || self.state.round.phase == RoundPhase::GameOver {
            tracing::debug!(?action, "Action rejected: session not running");
            return false;
        }
        let accepted = match action {
            PlayerAction::EquipSlot(slot) => self.equip_slot(slot),
            PlayerAction::StartReload => self.start_player_reload(),
            PlayerAction::ToggleBuyMenu => {
                self.buy_menu_open = !self.buy_menu_open;
                true
            },
            PlayerAction::SetScoreboard(open) => {
                self.scoreboard_open = open;
                true
            },
            PlayerAction::BuyWeapon(id) => self.buy_weapon(id),
            PlayerAction::BuyEquipment(id) => self.buy_equipment(id),
            PlayerAction::Interact => self.interact(),
        };
        if !accepted {
            tracing::debug!(?action, "Action rejected");
        }
        accepted
    }

    fn player_alive(&self) -> bool {
        self.player().is_some_and(|p| p.alive)
    }

    fn buying_allowed(&self) -> bool {
        matches!(
            self.state.round.phase,
            RoundPhase::Freeze | RoundPhase::Live
        ) && self.player_alive()
    }

    fn equip_slot(&mut self, slot: u8) -> bool {
        if !self.player_alive() {
            return false;
        }
        self.state
            .agents
            .get_mut(PLAYER.index())
            .is_some_and(|p| p.equip_slot(slot))
    }

    fn start_player_reload(&mut self) -> bool {
        if !self.begin_reload(PLAYER) {
            return false;
        }
        self.play(SoundId::Reload);
        true
    }

    fn buy_weapon(&mut self, id: WeaponId) -> bool {
        if !self.buying_allowed() {
            return false;
        }
        let def = id.def();
        let Some(player) = self.state.agents.get_mut(PLAYER.index()) else {
            return false;
        };
        if def.is_melee() || !def.available_to(player.team) || player.money < def.price {
            return false;
        }
        player.money -= def.price;
        player.give_weapon(id);
        self.state.carried.money = player.money;
        tracing::debug!(weapon = def.name, money = player.money, "Bought weapon");
        self.play(SoundId::Buy);
        true
    }

    fn buy_equipment(&mut self, id: EquipmentId) -> bool {
        if !self.buying_allowed() {
            return false;
        }
        let Some(player) = self.state.agents.get_mut(PLAYER.index()) else {
            return false;
        };
        let price = id.price();
        if player.money < price {
            return false;
        }
        match id {
            EquipmentId::Kevlar => {
                player.armor = 100.0;
            },
            EquipmentId::KevlarHelmet => {
                player.armor = 100.0;
                player.helmet = true;
            },
            EquipmentId::DefuseKit => {
                if player.team != Team::Ct || player.has_defuse_kit {
                    return false;
                }
                player.has_defuse_kit = true;
            },
            EquipmentId::HeGrenade | EquipmentId::Flashbang | EquipmentId::Smoke => {
                if player.utility.contains(&id) {
                    return false;
                }
                player.utility.push(id);
            },
        }
        player.money -= price;
        self.state.carried.money = player.money;
        tracing::debug!(item = id.name(), money = player.money, "Bought equipment");
        self.play(SoundId::Buy);
        true
    }

    fn interact(&mut self) -> bool {
        if self.state.round.phase != RoundPhase::Live {
            return false;
        }
        let Some(team) = self.player().map(|p| p.team) else {
            return false;
        };
        match team {
            Team::T => self.plant_bomb(PLAYER),
            Team::Ct => self.start_defuse(PLAYER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn sim(team: Team) -> Simulation {
        Simulation::with_seed(
            SimConfig {
                team,
                ..SimConfig::default()
            },
            7,
        )
    }

    #[test]
    fn buying_deducts_and_equips() {
        let mut s = sim(Team::Ct);
        s.state.agents[0].money = 3500;
        assert!(s.perform(PlayerAction::BuyWeapon(WeaponId::M4a1)));
        let p = s.player().unwrap();
        assert_eq!(p.money, 400);
        assert_eq!(p.weapon().id, WeaponId::M4a1);
        assert_eq!(s.state.carried.money, 400);
    }

    #[test]
    fn unaffordable_or_wrong_team_is_rejected() {
        let mut s = sim(Team::Ct);
        assert!(!s.perform(PlayerAction::BuyWeapon(WeaponId::Awp)));
        s.state.agents[0].money = 10_000;
        assert!(!s.perform(PlayerAction::BuyWeapon(WeaponId::Ak47)));
        assert!(!s.perform(PlayerAction::BuyWeapon(WeaponId::Knife)));
        assert_eq!(s.player().unwrap().money, 10_000);
    }

    #[test]
    fn kit_rules() {
        let mut t = sim(Team::T);
        assert!(!t.perform(PlayerAction::BuyEquipment(EquipmentId::DefuseKit)));
        let mut ct = sim(Team::Ct);
        // CTs spawn with a kit.
        assert!(!ct.perform(PlayerAction::BuyEquipment(EquipmentId::DefuseKit)));
        assert_eq!(ct.player().unwrap().money, 800);
    }

    #[test]
    fn one_grenade_of_each_kind() {
        let mut s = sim(Team::T);
        assert!(s.perform(PlayerAction::BuyEquipment(EquipmentId::Flashbang)));
        assert!(!s.perform(PlayerAction::BuyEquipment(EquipmentId::Flashbang)));
        assert!(s.perform(PlayerAction::BuyEquipment(EquipmentId::Smoke)));
        assert_eq!(s.player().unwrap().money, 800 - 200 - 300);
    }

    #[test]
    fn armor_purchase() {
        let mut s = sim(Team::Ct);
        assert!(s.perform(PlayerAction::BuyEquipment(EquipmentId::Kevlar)));
        let p = s.player().unwrap();
        assert!((p.armor - 100.0).abs() < f32::EPSILON);
        assert!(!p.helmet);
        assert!(!s.perform(PlayerAction::BuyEquipment(EquipmentId::KevlarHelmet)));
    }

    #[test]
    fn interact_needs_live_round() {
        let mut s = sim(Team::T);
        assert_eq!(s.state.round.phase, RoundPhase::Freeze);
        assert!(!s.perform(PlayerAction::Interact));
    }

    #[test]
    fn paused_session_rejects_actions() {
        let mut s = sim(Team::Ct);
        s.paused = true;
        assert!(!s.perform(PlayerAction::ToggleBuyMenu));
        assert!(!s.buy_menu_open);
        s.paused = false;
        assert!(s.perform(PlayerAction::ToggleBuyMenu));
        assert!(s.buy_menu_open);
    }

    #[test]
    fn reload_action_requires_missing_rounds() {
        let mut s = sim(Team::Ct);
        assert!(!s.perform(PlayerAction::StartReload));
        if let Some(slot) = s.state.agents[0].slot_mut() {
            slot.mag = 3;
        }
        assert!(s.perform(PlayerAction::StartReload));
        assert!(s.player().unwrap().is_reloading());
        // Switching weapons cancels it.
        assert!(s.perform(PlayerAction::EquipSlot(3)));
        assert!(!s.player().unwrap().is_reloading());
    }
}
