//! Tuning values: inventory size, EXP curve, clock and starting zone.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::DataError;
use crate::progression::ProgressionCurve;
use crate::shared::*;

pub const EMBEDDED_CONFIG: &str = include_str!("../../assets/data/config.ron");

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub inventory_capacity: usize,
    pub exp_to_next_level: Vec<u32>,
    pub starting_level: u32,
    pub starting_exp: u32,
    pub day_length_secs: f32,
    pub start_time: f32,
    pub starting_zone: ZoneId,
    pub notification_history: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            exp_to_next_level: DEFAULT_EXP_CURVE.to_vec(),
            starting_level: STARTING_LEVEL,
            starting_exp: STARTING_EXP,
            day_length_secs: DEFAULT_DAY_LENGTH_SECS,
            start_time: DEFAULT_START_TIME,
            starting_zone: DEFAULT_STARTING_ZONE.to_string(),
            notification_history: DEFAULT_NOTIFICATION_HISTORY,
        }
    }
}

impl GameConfig {
    pub fn embedded() -> Result<Self, DataError> {
        Self::from_ron(EMBEDDED_CONFIG)
    }

    pub fn from_ron(source: &str) -> Result<Self, DataError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&source)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.inventory_capacity == 0 {
            return Err(DataError::Invalid("inventory_capacity must be at least 1".into()));
        }
        if self.starting_level == 0 {
            return Err(DataError::Invalid("starting_level must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.start_time) {
            return Err(DataError::Invalid(format!(
                "start_time {} is outside 0.0..=1.0",
                self.start_time
            )));
        }
        Ok(())
    }

    pub fn curve(&self) -> ProgressionCurve {
        ProgressionCurve {
            exp_to_next_level: self.exp_to_next_level.clone(),
            starting_level: self.starting_level,
            starting_exp: self.starting_exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        assert_eq!(GameConfig::embedded().unwrap(), GameConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = GameConfig::from_ron("(inventory_capacity: 12)").unwrap();
        assert_eq!(config.inventory_capacity, 12);
        assert_eq!(config.exp_to_next_level, DEFAULT_EXP_CURVE.to_vec());
        assert_eq!(config.starting_zone, "zone_hub");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            GameConfig::from_ron("(inventory_capacity: 0)"),
            Err(DataError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_ron("(start_time: 1.5)"),
            Err(DataError::Invalid(_))
        ));
    }
}
