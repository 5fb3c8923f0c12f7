use serde::{Deserialize, Serialize};

use sitestrike_core::sound::SoundId;
use sitestrike_core::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponId {
    Knife,
    Glock,
    Usp,
    Deagle,
    Mp5,
    #[serde(rename = "shotgun")]
    Xm1014,
    Ak47,
    M4a1,
    Awp,
    Famas,
    Galil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponCategory {
    Melee,
    Pistol,
    Smg,
    Shotgun,
    Rifle,
    Sniper,
}

impl WeaponCategory {
    /// Equip slot: 1 primary, 2 pistol, 3 melee.
    pub fn slot(self) -> u8 {
        match self {
            WeaponCategory::Smg
            | WeaponCategory::Shotgun
            | WeaponCategory::Rifle
            | WeaponCategory::Sniper => 1,
            WeaponCategory::Pistol => 2,
            WeaponCategory::Melee => 3,
        }
    }

    pub fn sound(self) -> SoundId {
        match self {
            WeaponCategory::Melee => SoundId::Knife,
            WeaponCategory::Pistol => SoundId::Pistol,
            WeaponCategory::Smg | WeaponCategory::Rifle => SoundId::Rifle,
            WeaponCategory::Shotgun => SoundId::Shotgun,
            WeaponCategory::Sniper => SoundId::Awp,
        }
    }
}

/// Static weapon stats. Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDef {
    pub id: WeaponId,
    pub name: &'static str,
    pub category: WeaponCategory,
    pub damage: f32,
    pub headshot_mult: f32,
    pub range: f32,
    pub fire_interval: f32,
    pub reload_time: f32,
    /// Zero for melee weapons, which never consume ammo.
    pub mag_size: u32,
    pub reserve_ammo: u32,
    pub move_speed: f32,
    pub price: u32,
    pub kill_reward: u32,
    /// 0..=1, higher is tighter.
    pub accuracy: f32,
    pub recoil: f32,
    /// Carried on bullets but not used by hit resolution.
    pub penetration: f32,
    pub automatic: bool,
    /// Projectiles per shot.
    pub pellets: u32,
    /// `None` when both sides can buy it.
    pub team: Option<Team>,
}

impl WeaponDef {
    pub fn is_melee(&self) -> bool {
        self.category == WeaponCategory::Melee
    }

    pub fn slot(&self) -> u8 {
        self.category.slot()
    }

    pub fn sound(&self) -> SoundId {
        self.category.sound()
    }

    pub fn available_to(&self, team: Team) -> bool {
        self.team.is_none_or(|t| t == team)
    }
}

static KNIFE: WeaponDef = WeaponDef {
    id: WeaponId::Knife,
    name: "Knife",
    category: WeaponCategory::Melee,
    damage: 40.0,
    headshot_mult: 1.5,
    range: 60.0,
    fire_interval: 0.5,
    reload_time: 0.0,
    mag_size: 0,
    reserve_ammo: 0,
    move_speed: 250.0,
    price: 0,
    kill_reward: 1500,
    accuracy: 1.0,
    recoil: 0.0,
    penetration: 0.0,
    automatic: false,
    pellets: 1,
    team: None,
};

static GLOCK: WeaponDef = WeaponDef {
    id: WeaponId::Glock,
    name: "Glock-18",
    category: WeaponCategory::Pistol,
    damage: 25.0,
    headshot_mult: 4.0,
    range: 600.0,
    fire_interval: 0.15,
    reload_time: 2.2,
    mag_size: 20,
    reserve_ammo: 120,
    move_speed: 240.0,
    price: 200,
    kill_reward: 300,
    accuracy: 0.92,
    recoil: 2.0,
    penetration: 0.47,
    automatic: false,
    pellets: 1,
    team: Some(Team::T),
};

static USP: WeaponDef = WeaponDef {
    id: WeaponId::Usp,
    name: "USP-S",
    category: WeaponCategory::Pistol,
    damage: 30.0,
    headshot_mult: 4.0,
    range: 650.0,
    fire_interval: 0.17,
    reload_time: 2.5,
    mag_size: 12,
    reserve_ammo: 100,
    move_speed: 240.0,
    price: 200,
    kill_reward: 300,
    accuracy: 0.95,
    recoil: 1.5,
    penetration: 0.5,
    automatic: false,
    pellets: 1,
    team: Some(Team::Ct),
};

static DEAGLE: WeaponDef = WeaponDef {
    id: WeaponId::Deagle,
    name: "Desert Eagle",
    category: WeaponCategory::Pistol,
    damage: 53.0,
    headshot_mult: 4.0,
    range: 700.0,
    fire_interval: 0.35,
    reload_time: 2.2,
    mag_size: 7,
    reserve_ammo: 35,
    move_speed: 230.0,
    price: 700,
    kill_reward: 300,
    accuracy: 0.88,
    recoil: 5.0,
    penetration: 0.75,
    automatic: false,
    pellets: 1,
    team: None,
};

static MP5: WeaponDef = WeaponDef {
    id: WeaponId::Mp5,
    name: "MP5",
    category: WeaponCategory::Smg,
    damage: 26.0,
    headshot_mult: 3.0,
    range: 500.0,
    fire_interval: 0.08,
    reload_time: 2.6,
    mag_size: 30,
    reserve_ammo: 120,
    move_speed: 235.0,
    price: 1500,
    kill_reward: 600,
    accuracy: 0.86,
    recoil: 2.5,
    penetration: 0.4,
    automatic: true,
    pellets: 1,
    team: None,
};

static XM1014: WeaponDef = WeaponDef {
    id: WeaponId::Xm1014,
    name: "XM1014",
    category: WeaponCategory::Shotgun,
    damage: 20.0,
    headshot_mult: 2.0,
    range: 350.0,
    fire_interval: 0.35,
    reload_time: 3.5,
    mag_size: 7,
    reserve_ammo: 32,
    move_speed: 220.0,
    price: 3000,
    kill_reward: 900,
    accuracy: 0.7,
    recoil: 6.0,
    penetration: 0.3,
    automatic: false,
    pellets: 6,
    team: None,
};

static AK47: WeaponDef = WeaponDef {
    id: WeaponId::Ak47,
    name: "AK-47",
    category: WeaponCategory::Rifle,
    damage: 36.0,
    headshot_mult: 4.0,
    range: 800.0,
    fire_interval: 0.1,
    reload_time: 2.5,
    mag_size: 30,
    reserve_ammo: 90,
    move_speed: 215.0,
    price: 2700,
    kill_reward: 300,
    accuracy: 0.82,
    recoil: 4.0,
    penetration: 0.77,
    automatic: true,
    pellets: 1,
    team: Some(Team::T),
};

static M4A1: WeaponDef = WeaponDef {
    id: WeaponId::M4a1,
    name: "M4A1",
    category: WeaponCategory::Rifle,
    damage: 33.0,
    headshot_mult: 4.0,
    range: 800.0,
    fire_interval: 0.09,
    reload_time: 3.1,
    mag_size: 30,
    reserve_ammo: 90,
    move_speed: 220.0,
    price: 3100,
    kill_reward: 300,
    accuracy: 0.88,
    recoil: 3.0,
    penetration: 0.7,
    automatic: true,
    pellets: 1,
    team: Some(Team::Ct),
};

static AWP: WeaponDef = WeaponDef {
    id: WeaponId::Awp,
    name: "AWP",
    category: WeaponCategory::Sniper,
    damage: 115.0,
    headshot_mult: 4.0,
    range: 1200.0,
    fire_interval: 1.5,
    reload_time: 3.5,
    mag_size: 10,
    reserve_ammo: 30,
    move_speed: 200.0,
    price: 4750,
    kill_reward: 100,
    accuracy: 0.97,
    recoil: 8.0,
    penetration: 0.95,
    automatic: false,
    pellets: 1,
    team: None,
};

static FAMAS: WeaponDef = WeaponDef {
    id: WeaponId::Famas,
    name: "FAMAS",
    category: WeaponCategory::Rifle,
    damage: 30.0,
    headshot_mult: 4.0,
    range: 750.0,
    fire_interval: 0.09,
    reload_time: 3.3,
    mag_size: 25,
    reserve_ammo: 90,
    move_speed: 220.0,
    price: 2250,
    kill_reward: 300,
    accuracy: 0.85,
    recoil: 2.5,
    penetration: 0.65,
    automatic: true,
    pellets: 1,
    team: Some(Team::Ct),
};

static GALIL: WeaponDef = WeaponDef {
    id: WeaponId::Galil,
    name: "Galil",
    category: WeaponCategory::Rifle,
    damage: 30.0,
    headshot_mult: 4.0,
    range: 750.0,
    fire_interval: 0.095,
    reload_time: 2.8,
    mag_size: 35,
    reserve_ammo: 90,
    move_speed: 215.0,
    price: 2000,
    kill_reward: 300,
    accuracy: 0.83,
    recoil: 3.0,
    penetration: 0.6,
    automatic: true,
    pellets: 1,
    team: Some(Team::T),
};

impl WeaponId {
    /// Catalog order, as shown in the buy menu.
    pub const ALL: [WeaponId; 11] = [
        WeaponId::Knife,
        WeaponId::Glock,
        WeaponId::Usp,
        WeaponId::Deagle,
        WeaponId::Mp5,
        WeaponId::Xm1014,
        WeaponId::Ak47,
        WeaponId::M4a1,
        WeaponId::Awp,
        WeaponId::Famas,
        WeaponId::Galil,
    ];

    pub fn def(self) -> &'static WeaponDef {
        match self {
            WeaponId::Knife => &KNIFE,
            WeaponId::Glock => &GLOCK,
            WeaponId::Usp => &USP,
            WeaponId::Deagle => &DEAGLE,
            WeaponId::Mp5 => &MP5,
            WeaponId::Xm1014 => &XM1014,
            WeaponId::Ak47 => &AK47,
            WeaponId::M4a1 => &M4A1,
            WeaponId::Awp => &AWP,
            WeaponId::Famas => &FAMAS,
            WeaponId::Galil => &GALIL,
        }
    }
}

/// Sidearm every agent of `team` spawns with.
pub fn default_pistol(team: Team) -> WeaponId {
    match team {
        Team::Ct => WeaponId::Usp,
        Team::T => WeaponId::Glock,
    }
}

/// Weapons `team` is allowed to buy or carry, in catalog order.
pub fn available_weapons(team: Team) -> impl Iterator<Item = &'static WeaponDef> {
    WeaponId::ALL
        .into_iter()
        .map(WeaponId::def)
        .filter(move |w| w.available_to(team))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentId {
    Kevlar,
    #[serde(rename = "helmet")]
    KevlarHelmet,
    HeGrenade,
    Flashbang,
    Smoke,
    DefuseKit,
}

impl EquipmentId {
    pub const ALL: [EquipmentId; 6] = [
        EquipmentId::Kevlar,
        EquipmentId::KevlarHelmet,
        EquipmentId::HeGrenade,
        EquipmentId::Flashbang,
        EquipmentId::Smoke,
        EquipmentId::DefuseKit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EquipmentId::Kevlar => "Kevlar Vest",
            EquipmentId::KevlarHelmet => "Kevlar + Helmet",
            EquipmentId::HeGrenade => "HE Grenade",
            EquipmentId::Flashbang => "Flashbang",
            EquipmentId::Smoke => "Smoke Grenade",
            EquipmentId::DefuseKit => "Defuse Kit",
        }
    }

    pub fn price(self) -> u32 {
        match self {
            EquipmentId::Kevlar => 650,
            EquipmentId::KevlarHelmet => 1000,
            EquipmentId::HeGrenade => 300,
            EquipmentId::Flashbang => 200,
            EquipmentId::Smoke => 300,
            EquipmentId::DefuseKit => 400,
        }
    }

    /// Grenades are carried as utility, one of each kind.
    pub fn is_grenade(self) -> bool {
        matches!(
            self,
            EquipmentId::HeGrenade | EquipmentId::Flashbang | EquipmentId::Smoke
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_match_defs() {
        for id in WeaponId::ALL {
            assert_eq!(id.def().id, id);
        }
    }

    #[test]
    fn only_knife_is_melee_and_free() {
        for id in WeaponId::ALL {
            let def = id.def();
            assert_eq!(def.is_melee(), id == WeaponId::Knife);
            if !def.is_melee() {
                assert!(def.mag_size > 0, "{} has no magazine", def.name);
                assert!(def.price > 0);
            }
        }
    }

    #[test]
    fn team_restrictions() {
        let ct: Vec<WeaponId> = available_weapons(Team::Ct).map(|w| w.id).collect();
        let t: Vec<WeaponId> = available_weapons(Team::T).map(|w| w.id).collect();
        assert!(ct.contains(&WeaponId::M4a1) && !ct.contains(&WeaponId::Ak47));
        assert!(t.contains(&WeaponId::Galil) && !t.contains(&WeaponId::Famas));
        assert!(ct.contains(&WeaponId::Awp) && t.contains(&WeaponId::Awp));
        assert_eq!(ct.len(), 8);
        assert_eq!(t.len(), 8);
    }

    #[test]
    fn default_pistols_belong_to_team() {
        for team in [Team::Ct, Team::T] {
            let pistol = default_pistol(team).def();
            assert_eq!(pistol.category, WeaponCategory::Pistol);
            assert!(pistol.available_to(team));
        }
    }

    #[test]
    fn slots_and_sounds() {
        assert_eq!(WeaponId::Mp5.def().slot(), 1);
        assert_eq!(WeaponId::Mp5.def().sound(), SoundId::Rifle);
        assert_eq!(WeaponId::Deagle.def().slot(), 2);
        assert_eq!(WeaponId::Knife.def().slot(), 3);
        assert_eq!(WeaponId::Awp.def().sound(), SoundId::Awp);
        assert_eq!(WeaponId::Xm1014.def().pellets, 6);
    }

    #[test]
    fn shotgun_serializes_under_legacy_name() {
        assert_eq!(serde_json::to_string(&WeaponId::Xm1014).unwrap(), "\"shotgun\"");
        assert_eq!(serde_json::to_string(&EquipmentId::DefuseKit).unwrap(), "\"defuse_kit\"");
    }
}
