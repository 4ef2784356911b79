//! Arbiter tuning, defaulting to the crate constants

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::LoadReason;
use crate::{
    CRUISE_FRACTION, DOMINANCE_FACTOR, MAX_DOMINANCE_FACTOR, MAX_SPEED, OBSTACLE_THRESHOLD,
    PAUSE_WINDOW_MS, SEARCH_SPEED, SETTLE_WINDOW_MS, TIME_STEP_MS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    pub time_step_ms: u32,
    pub max_speed: f64,
    pub search_speed: f64,
    pub cruise_fraction: f64,
    pub obstacle_threshold: f64,
    pub dominance_factor: u64,
    pub settle_window_ms: u32,
    pub pause_window_ms: u32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            time_step_ms: TIME_STEP_MS,
            max_speed: MAX_SPEED,
            search_speed: SEARCH_SPEED,
            cruise_fraction: CRUISE_FRACTION,
            obstacle_threshold: OBSTACLE_THRESHOLD,
            dominance_factor: DOMINANCE_FACTOR,
            settle_window_ms: SETTLE_WINDOW_MS,
            pause_window_ms: PAUSE_WINDOW_MS,
        }
    }
}

impl ArbiterConfig {
    /// Load from a JSON file; missing fields take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadReason> {
        let json = std::fs::read_to_string(path)
            .map_err(|_| LoadReason::R601_LOAD_READ_ERROR)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|_| LoadReason::R602_LOAD_PARSE_ERROR)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_time_step(mut self, time_step_ms: u32) -> Self {
        self.time_step_ms = time_step_ms;
        self
    }

    pub fn validate(&self) -> Result<(), LoadReason> {
        let ok = self.time_step_ms > 0
            && self.max_speed.is_finite()
            && self.max_speed > 0.0
            && (0.0..=self.max_speed).contains(&self.search_speed)
            && (0.0..=1.0).contains(&self.cruise_fraction)
            && self.obstacle_threshold.is_finite()
            && self.obstacle_threshold > 0.0
            && (1..=MAX_DOMINANCE_FACTOR).contains(&self.dominance_factor);
        if ok {
            Ok(())
        } else {
            Err(LoadReason::R604_LOAD_INVALID_CONFIG)
        }
    }

    /// Speed for voice steering and avoidance
    pub fn cruise_speed(&self) -> f64 {
        self.cruise_fraction * self.max_speed
    }

    /// Pause counter value above which the robot holds still after a find
    pub fn settle_ticks(&self) -> u32 {
        self.settle_window_ms / self.time_step_ms
    }

    /// Pause counter restart value after a find
    pub fn pause_ticks(&self) -> u32 {
        self.pause_window_ms / self.time_step_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tick_windows() {
        let config = ArbiterConfig::default();
        assert_eq!(config.pause_ticks(), 20);
        assert_eq!(config.settle_ticks(), 10);
        assert!((config.cruise_speed() - 0.5 * MAX_SPEED).abs() < 1e-9);
    }

    #[test]
    fn test_time_step_override() {
        let config = ArbiterConfig::default().with_time_step(32);
        assert_eq!(config.pause_ticks(), 40);
        assert_eq!(config.settle_ticks(), 20);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: ArbiterConfig = serde_json::from_str(r#"{"time_step_ms": 128}"#).unwrap();
        assert_eq!(config.time_step_ms, 128);
        assert_eq!(config.max_speed, MAX_SPEED);
        assert_eq!(config.pause_ticks(), 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_step = ArbiterConfig::default().with_time_step(0);
        assert_eq!(zero_step.validate(), Err(LoadReason::R604_LOAD_INVALID_CONFIG));

        let fast_search = ArbiterConfig { search_speed: 10.0, ..ArbiterConfig::default() };
        assert_eq!(fast_search.validate(), Err(LoadReason::R604_LOAD_INVALID_CONFIG));

        assert!(ArbiterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_threshold_and_factor() {
        for threshold in [f64::NAN, f64::INFINITY, 0.0, -5.0] {
            let config = ArbiterConfig { obstacle_threshold: threshold, ..ArbiterConfig::default() };
            assert_eq!(config.validate(), Err(LoadReason::R604_LOAD_INVALID_CONFIG), "threshold {}", threshold);
        }
        for factor in [0, MAX_DOMINANCE_FACTOR + 1, u64::MAX / 2] {
            let config = ArbiterConfig { dominance_factor: factor, ..ArbiterConfig::default() };
            assert_eq!(config.validate(), Err(LoadReason::R604_LOAD_INVALID_CONFIG), "factor {}", factor);
        }
        let config = ArbiterConfig { dominance_factor: MAX_DOMINANCE_FACTOR, ..ArbiterConfig::default() };
        assert!(config.validate().is_ok());
    }
}
