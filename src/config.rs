use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Tunable numbers for a single encounter.
///
/// Every field has a default, so a RON document only needs to list what it overrides:
///
/// ```ron
/// (seed: 42, minimum_damage: 0, max_turns: Some(200))
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BattleConfig {
    /// Seeds both the real and the simulated random streams.
    pub seed: u64,
    /// Stat stages are clamped to `-stage_bound..=stage_bound`.
    pub stage_bound: i8,
    /// Inclusive bounds of the damage roll, in percent.
    pub random_min: u16,
    pub random_max: u16,
    pub crit_multiplier: f64,
    /// Crit chance is `1 / denominator`, indexed by crit stage.
    pub crit_stage_denominators: Vec<u16>,
    pub stab_multiplier: f64,
    /// Floor applied to any hit that is not a "no effect".
    pub minimum_damage: u16,
    pub weather_turns: u8,
    pub terrain_turns: u8,
    pub screen_multiplier: f64,
    pub paralysis_speed_multiplier: f64,
    /// Ends the battle in a draw once this many turns have been played.
    pub max_turns: Option<u32>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            stage_bound: 6,
            random_min: 85,
            random_max: 100,
            crit_multiplier: 1.5,
            crit_stage_denominators: vec![24, 8, 2, 1],
            stab_multiplier: 1.5,
            minimum_damage: 1,
            weather_turns: 5,
            terrain_turns: 5,
            screen_multiplier: 0.5,
            paralysis_speed_multiplier: 0.5,
            max_turns: None,
        }
    }
}

impl BattleConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig =
            ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stage_bound <= 0 {
            return Err(ConfigError::Invalid(format!(
                "stage_bound must be positive, got {}",
                self.stage_bound
            )));
        }
        if self.random_min == 0 || self.random_min > self.random_max {
            return Err(ConfigError::Invalid(format!(
                "random band {}..={} is empty or starts at zero",
                self.random_min, self.random_max
            )));
        }
        if self.crit_stage_denominators.is_empty()
            || self.crit_stage_denominators.contains(&0)
        {
            return Err(ConfigError::Invalid(
                "crit_stage_denominators must be non-empty and non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Crit denominator for a given crit stage; stages past the table use its last entry.
    pub fn crit_denominator(&self, stage: u8) -> u16 {
        let last = self.crit_stage_denominators.len().saturating_sub(1);
        self.crit_stage_denominators
            .get((stage as usize).min(last))
            .copied()
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = BattleConfig::from_ron_str("(seed: 7, minimum_damage: 0)").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.minimum_damage, 0);
        assert_eq!(config.stage_bound, 6);
        assert_eq!(config.crit_stage_denominators, vec![24, 8, 2, 1]);
    }

    #[test]
    fn test_invalid_random_band_is_rejected() {
        let err = BattleConfig::from_ron_str("(random_min: 100, random_max: 85)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = BattleConfig::from_ron_str("(seed: \"nope\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_crit_denominator_saturates_at_table_end() {
        let config = BattleConfig::default();
        assert_eq!(config.crit_denominator(0), 24);
        assert_eq!(config.crit_denominator(1), 8);
        assert_eq!(config.crit_denominator(3), 1);
        assert_eq!(config.crit_denominator(9), 1);
    }
}
