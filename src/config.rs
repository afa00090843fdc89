//! Engine configuration and tuning
//!
//! Every field falls back to the defaults in [`crate::consts`], so a config
//! file only needs the values it wants to change.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// How the flyer follows its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementModel {
    /// Move a fixed fraction of the remaining distance each tick, hard clamp
    Lerp,
    /// Accelerate toward the target with friction and a soft edge bounce
    #[default]
    Velocity,
}

impl MovementModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementModel::Lerp => "lerp",
            MovementModel::Velocity => "velocity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lerp" | "smooth" => Some(MovementModel::Lerp),
            "velocity" | "vel" | "physics" => Some(MovementModel::Velocity),
            _ => None,
        }
    }
}

/// Tuning for one engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Playfield ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Player ===
    pub movement: MovementModel,
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub accel: f32,
    pub friction: f32,
    pub max_speed: f32,
    pub bounce: f32,
    pub lerp_factor: f32,
    pub key_step: f32,

    // === Carriers ===
    pub carrier_width: f32,
    pub carrier_height: f32,
    pub carrier_speed: f32,
    pub min_spawn_gap: f32,

    // === Spawning ===
    pub spawn_interval_ms: f64,
    pub min_spawn_interval_ms: f64,
    pub interval_step_ms: f64,
    /// Points needed for each interval step (0 disables the ramp)
    pub score_per_step: u32,
    pub correct_probability: f64,

    // === Scoring ===
    pub reward: u32,
    /// Points lost on a wrong hit (0 = score only ever goes up)
    pub miss_penalty: u32,
    pub starting_lives: u32,
    pub hit_padding: f32,

    // === Questions ===
    /// Largest operand for generated arithmetic
    pub max_operand: u32,
    /// Shuffle external decks (and reshuffle when exhausted)
    pub shuffle_deck: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            movement: MovementModel::Velocity,
            player_x: PLAYER_X,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            accel: PLAYER_ACCEL,
            friction: PLAYER_FRICTION,
            max_speed: PLAYER_MAX_SPEED,
            bounce: PLAYER_BOUNCE,
            lerp_factor: LERP_FACTOR,
            key_step: KEY_TARGET_STEP,

            carrier_width: CARRIER_WIDTH,
            carrier_height: CARRIER_HEIGHT,
            carrier_speed: CARRIER_SPEED,
            min_spawn_gap: MIN_SPAWN_GAP,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,
            interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            score_per_step: SCORE_PER_STEP,
            correct_probability: CORRECT_PROBABILITY,

            reward: CORRECT_REWARD,
            miss_penalty: 0,
            starting_lives: STARTING_LIVES,
            hit_padding: HIT_PADDING,

            max_operand: DEFAULT_MAX_OPERAND,
            shuffle_deck: true,
        }
    }
}

impl EngineConfig {
    /// Defaults with a different movement model
    pub fn with_movement(movement: MovementModel) -> Self {
        Self {
            movement,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values that would break the simulation's invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.player_height <= 0.0 || self.player_height > self.canvas_height {
            return Err(invalid("player_height", "must fit inside the canvas"));
        }
        if self.player_width <= 0.0 || self.player_width > self.canvas_width {
            return Err(invalid("player_width", "must fit inside the canvas"));
        }
        if self.carrier_height <= 0.0 || self.carrier_height > self.canvas_height {
            return Err(invalid("carrier_height", "must fit inside the canvas"));
        }
        if self.carrier_width <= 0.0 {
            return Err(invalid("carrier_width", "must be positive"));
        }
        if self.carrier_speed <= 0.0 {
            return Err(invalid("carrier_speed", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(invalid("friction", "must be in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.bounce) {
            return Err(invalid("bounce", "must be in [0, 1]"));
        }
        if !(self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            return Err(invalid("lerp_factor", "must be in (0, 1]"));
        }
        if self.max_speed <= 0.0 {
            return Err(invalid("max_speed", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.correct_probability) {
            return Err(invalid("correct_probability", "must be in [0, 1]"));
        }
        if self.min_spawn_interval_ms <= 0.0 || self.spawn_interval_ms < self.min_spawn_interval_ms
        {
            return Err(invalid(
                "spawn_interval_ms",
                "must be positive and not below min_spawn_interval_ms",
            ));
        }
        if self.starting_lives == 0 {
            return Err(invalid("starting_lives", "must be at least 1"));
        }
        if self.max_operand == 0 || self.max_operand > MAX_OPERAND {
            return Err(invalid(
                "max_operand",
                format!("must be between 1 and {MAX_OPERAND}"),
            ));
        }
        Ok(())
    }

    /// Highest legal y for the flyer
    pub fn player_max_y(&self) -> f32 {
        self.canvas_height - self.player_height
    }

    /// Highest legal x for the flyer
    pub fn player_max_x(&self) -> f32 {
        self.canvas_width - self.player_width
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "quiz_flyer_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load_stored() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save_stored(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        EngineConfig::default().validate().unwrap();
        EngineConfig::with_movement(MovementModel::Lerp)
            .validate()
            .unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "movement": "lerp", "reward": 25 }"#).unwrap();
        assert_eq!(config.movement, MovementModel::Lerp);
        assert_eq!(config.reward, 25);
        assert_eq!(config.starting_lives, STARTING_LIVES);
        assert_eq!(config.canvas_height, CANVAS_HEIGHT);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_json(r#"{ "friction": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "friction", .. }));

        let err = EngineConfig::from_json(r#"{ "starting_lives": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "starting_lives", .. }));

        let err = EngineConfig::from_json(r#"{ "player_height": 9000 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player_height", .. }));
    }

    #[test]
    fn test_operand_range() {
        let err = EngineConfig::from_json(r#"{ "max_operand": 4294967295 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_operand", .. }));

        let err = EngineConfig::from_json(r#"{ "max_operand": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_operand", .. }));

        let json = format!(r#"{{ "max_operand": {MAX_OPERAND} }}"#);
        assert_eq!(EngineConfig::from_json(&json).unwrap().max_operand, MAX_OPERAND);
    }

    #[test]
    fn test_bad_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_movement_from_str() {
        assert_eq!(MovementModel::from_str("LERP"), Some(MovementModel::Lerp));
        assert_eq!(MovementModel::from_str("vel"), Some(MovementModel::Velocity));
        assert_eq!(MovementModel::from_str("teleport"), None);
        assert_eq!(MovementModel::Lerp.as_str(), "lerp");
    }
}
