use serde::{Deserialize, Serialize};

use sitestrike_core::team::{Difficulty, Team};

/// Data-driven configuration for a match session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Side the human agent plays on.
    pub team: Team,
    /// Bot skill preset.
    pub difficulty: Difficulty,
    /// Money every agent starts the session with.
    pub starting_money: u32,
    /// Hard cap on any agent's balance.
    pub money_cap: u32,
    /// Rounds in a full match.
    pub max_rounds: u8,
    /// Agents per side, the human included.
    pub team_size: u8,
    /// Freeze phase length (seconds).
    pub freeze_time: f32,
    /// Live round length (seconds).
    pub round_time: f32,
    /// Pause between round end and the next freeze (seconds).
    pub round_end_pause: f32,
    /// Bomb fuse once planted (seconds).
    pub bomb_fuse: f32,
    pub defuse_time_kit: f32,
    pub defuse_time_no_kit: f32,
    /// Maximum distance from the bomb at which a defuse can start or continue.
    pub defuse_range: f32,
    /// Human money credited when their side wins a round.
    pub win_bonus: u32,
    /// Human money credited when their side loses a round.
    pub loss_bonus: u32,
    pub player_max_health: f32,
    pub bot_max_health: f32,
    /// Seconds without damage before the human starts regenerating.
    pub regen_delay: f32,
    /// Human regeneration (HP/s).
    pub regen_rate: f32,
    /// Bomb blast radius.
    pub explosion_radius: f32,
    /// Upper bound on a single tick's delta time (seconds).
    pub max_frame_dt: f32,
    /// Map name looked up by [`crate::map::load_map`].
    pub map: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            team: Team::Ct,
            difficulty: Difficulty::Normal,
            starting_money: 800,
            money_cap: 16_000,
            max_rounds: 15,
            team_size: 5,
            freeze_time: 5.0,
            round_time: 105.0,
            round_end_pause: 4.0,
            bomb_fuse: 40.0,
            defuse_time_kit: 5.0,
            defuse_time_no_kit: 10.0,
            defuse_range: 60.0,
            win_bonus: 3250,
            loss_bonus: 1400,
            player_max_health: 250.0,
            bot_max_health: 120.0,
            regen_delay: 3.0,
            regen_rate: 3.0,
            explosion_radius: 500.0,
            max_frame_dt: 0.05,
            map: "dust".to_string(),
        }
    }
}

impl SimConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        let mut config = Self::read_file().unwrap_or_default();
        config.validate();
        config
    }

    fn read_file() -> Option<Self> {
        if let Ok(path) = std::env::var("SITESTRIKE_CONFIG")
            && let Some(config) = Self::from_file(&path)
        {
            return Some(config);
        }
        Self::from_file("config/sitestrike.toml")
    }

    /// Parse a TOML config file. Missing files are silent, malformed ones warn.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}");
                None
            },
        }
    }

    /// Reset nonsensical values to their defaults.
    pub fn validate(&mut self) {
        let defaults = Self::default();

        if self.max_rounds == 0 {
            tracing::warn!("max_rounds must be at least 1, using {}", defaults.max_rounds);
            self.max_rounds = defaults.max_rounds;
        }
        if !(1..=5).contains(&self.team_size) {
            tracing::warn!(
                team_size = self.team_size,
                "team_size must be within 1..=5, using {}",
                defaults.team_size
            );
            self.team_size = defaults.team_size;
        }
        if self.starting_money > self.money_cap {
            tracing::warn!("starting_money exceeds money_cap, clamping");
            self.starting_money = self.money_cap;
        }

        let durations: [(&str, &mut f32, f32); 13] = [
            ("freeze_time", &mut self.freeze_time, defaults.freeze_time),
            ("round_time", &mut self.round_time, defaults.round_time),
            ("round_end_pause", &mut self.round_end_pause, defaults.round_end_pause),
            ("bomb_fuse", &mut self.bomb_fuse, defaults.bomb_fuse),
            ("defuse_time_kit", &mut self.defuse_time_kit, defaults.defuse_time_kit),
            ("defuse_time_no_kit", &mut self.defuse_time_no_kit, defaults.defuse_time_no_kit),
            ("defuse_range", &mut self.defuse_range, defaults.defuse_range),
            ("player_max_health", &mut self.player_max_health, defaults.player_max_health),
            ("bot_max_health", &mut self.bot_max_health, defaults.bot_max_health),
            ("regen_delay", &mut self.regen_delay, defaults.regen_delay),
            ("regen_rate", &mut self.regen_rate, defaults.regen_rate),
            ("explosion_radius", &mut self.explosion_radius, defaults.explosion_radius),
            ("max_frame_dt", &mut self.max_frame_dt, defaults.max_frame_dt),
        ];
        for (name, value, fallback) in durations {
            if !value.is_finite() || *value <= 0.0 {
                tracing::warn!("{name} must be positive, using {fallback}");
                *value = fallback;
            }
        }
    }

    /// Rounds a side must win to take the match early.
    pub fn win_threshold(&self) -> u8 {
        self.max_rounds.div_ceil(2) + 1
    }

    /// Spawn health for the human or a bot.
    pub fn max_health(&self, is_player: bool) -> f32 {
        if is_player {
            self.player_max_health
        } else {
            self.bot_max_health
        }
    }

    pub fn defuse_time(&self, has_kit: bool) -> f32 {
        if has_kit {
            self.defuse_time_kit
        } else {
            self.defuse_time_no_kit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: SimConfig = toml::from_str("max_rounds = 5\nteam = \"t\"").unwrap();
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.team, Team::T);
        assert_eq!(config.starting_money, 800);
        assert!((config.bomb_fuse - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn validate_repairs_bad_values() {
        let mut config = SimConfig {
            max_rounds: 0,
            team_size: 9,
            round_time: -3.0,
            max_frame_dt: f32::NAN,
            ..SimConfig::default()
        };
        config.validate();
        assert_eq!(config.max_rounds, 15);
        assert_eq!(config.team_size, 5);
        assert!((config.round_time - 105.0).abs() < f32::EPSILON);
        assert!((config.max_frame_dt - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn win_threshold_is_majority_plus_one() {
        assert_eq!(SimConfig::default().win_threshold(), 9);
        let short = SimConfig {
            max_rounds: 4,
            ..SimConfig::default()
        };
        assert_eq!(short.win_threshold(), 3);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = include_str!("../../../config/sitestrike.toml");
        let config: SimConfig = toml::from_str(shipped).unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(SimConfig::from_file("/nonexistent/sitestrike.toml").is_none());
    }
}
