// In: src/config.rs

//! Encoder configuration.
//!
//! `EncoderConfig` is the caller-facing surface: plain values as a user would
//! type them (on the command line, in a JSON file), accepting out-of-range
//! numbers. `EncoderSettings` is what an encoder session actually applies,
//! produced by [`EncoderConfig::resolve`] and fixed for the session's life.

use serde::{Deserialize, Serialize};

use crate::error::FlifError;

/// Base unit of the native split threshold.
const SPLIT_THRESHOLD_UNIT: i64 = 5461 * 8;
/// Smallest factor applied to [`SPLIT_THRESHOLD_UNIT`].
const MIN_SPLIT_THRESHOLD_FACTOR: i64 = 4;

//==================================================================================
// I. Caller-Facing Configuration
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct EncoderConfig {
    /// Store a checksum so decoders can detect corruption.
    #[serde(default = "default_true")]
    pub crc_check: bool,

    /// Interlaced (progressive) encoding.
    #[serde(default)]
    pub interlaced: bool,

    /// Number of MANIAC learning passes. Negative values are treated as 0.
    #[serde(default = "default_learn_repeat")]
    pub learn_repeat: i64,

    /// Multiplier for the MANIAC tree split threshold; values below 4 are
    /// raised to 4.
    #[serde(default = "default_split_threshold_factor")]
    pub split_threshold_factor: i64,

    /// Allowed loss in percent, clamped to 0..=100. 0 is lossless.
    #[serde(default)]
    pub max_loss: i64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            crc_check: true,
            interlaced: false,
            learn_repeat: default_learn_repeat(),
            split_threshold_factor: default_split_threshold_factor(),
            max_loss: 0,
        }
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

fn default_learn_repeat() -> i64 {
    4
}

fn default_split_threshold_factor() -> i64 {
    12
}

impl EncoderConfig {
    /// Parses a (possibly partial) JSON document. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, FlifError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_crc_check(mut self, crc_check: bool) -> Self {
        self.crc_check = crc_check;
        self
    }

    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    pub fn with_learn_repeat(mut self, learn_repeat: i64) -> Self {
        self.learn_repeat = learn_repeat;
        self
    }

    pub fn with_split_threshold_factor(mut self, factor: i64) -> Self {
        self.split_threshold_factor = factor;
        self
    }

    pub fn with_max_loss(mut self, max_loss: i64) -> Self {
        self.max_loss = max_loss;
        self
    }

    /// Clamps every field into the range the native encoder accepts.
    pub fn resolve(&self) -> EncoderSettings {
        let factor = self.split_threshold_factor.max(MIN_SPLIT_THRESHOLD_FACTOR);
        let split_threshold = SPLIT_THRESHOLD_UNIT
            .saturating_mul(factor)
            .min(i32::MAX as i64) as i32;

        EncoderSettings {
            crc_check: self.crc_check,
            interlaced: self.interlaced,
            learn_repeat: self.learn_repeat.clamp(0, u32::MAX as i64) as u32,
            split_threshold,
            max_loss: self.max_loss.clamp(0, 100) as i32,
        }
    }
}

//==================================================================================
// II. Resolved Settings
//==================================================================================

/// The values an encoder session hands to the native library, in native types.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub crc_check: bool,
    pub interlaced: bool,
    pub learn_repeat: u32,
    pub split_threshold: i32,
    pub max_loss: i32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        EncoderConfig::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EncoderConfig::default().resolve();
        assert!(settings.crc_check);
        assert!(!settings.interlaced);
        assert_eq!(settings.learn_repeat, 4);
        assert_eq!(settings.split_threshold, 5461 * 8 * 12);
        assert_eq!(settings.max_loss, 0);
    }

    #[test]
    fn test_clamping() {
        let settings = EncoderConfig::default()
            .with_max_loss(150)
            .with_learn_repeat(-3)
            .with_split_threshold_factor(1)
            .resolve();
        assert_eq!(settings.max_loss, 100);
        assert_eq!(settings.learn_repeat, 0);
        assert_eq!(settings.split_threshold, 174_752);

        let settings = EncoderConfig::default().with_max_loss(-20).resolve();
        assert_eq!(settings.max_loss, 0);
    }

    #[test]
    fn test_split_threshold_saturates() {
        let settings = EncoderConfig::default()
            .with_split_threshold_factor(i64::MAX)
            .resolve();
        assert_eq!(settings.split_threshold, i32::MAX);
    }

    #[test]
    fn test_partial_json() {
        let config = EncoderConfig::from_json(r#"{"interlaced": true, "max_loss": 30}"#).unwrap();
        assert!(config.interlaced);
        assert_eq!(config.max_loss, 30);
        assert!(config.crc_check);
        assert_eq!(config.learn_repeat, 4);
        assert_eq!(config.split_threshold_factor, 12);

        assert_eq!(EncoderConfig::from_json("{}").unwrap(), EncoderConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        let err = EncoderConfig::from_json(r#"{"learn_repeat": "many"}"#).unwrap_err();
        assert!(matches!(err, FlifError::Config(_)));
    }
}
