use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by fail-fast validation at construction time.
///
/// Misconfiguration is the only fatal condition in this system: it is
/// rejected before any bytes are processed, never per byte.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("frame_samples must be between 1 and 255 to fit the one-byte length field, got {0}")]
    BadFrameSamples(usize),

    #[error("n_out must be at least 1")]
    BadWindow,

    #[error("sample_rate_hz must be positive and finite, got {0}")]
    BadSampleRate(f32),
}

/// Immutable link and acquisition configuration, supplied at construction
/// to every component that needs it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// Samples per binary frame; must match the firmware's frame size.
    pub frame_samples: usize,
    /// Effective sample rate of the stream, after device-side decimation.
    pub sample_rate_hz: f32,
    /// ADC full-scale input voltage.
    pub full_scale_v: f32,
    /// Multiplicative correction applied after full-scale conversion.
    pub calibration_gain: f32,
    /// Samples per triggered output trace.
    pub n_out: usize,
}

impl LinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_samples == 0 || self.frame_samples > u8::MAX as usize {
            return Err(ConfigError::BadFrameSamples(self.frame_samples));
        }
        if self.n_out == 0 {
            return Err(ConfigError::BadWindow);
        }
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigError::BadSampleRate(self.sample_rate_hz));
        }
        Ok(())
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            frame_samples: 252,
            sample_rate_hz: 30_000.0,
            full_scale_v: 5.0,
            calibration_gain: 1.0,
            n_out: 150,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LinkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_frame_samples_rejected() {
        let config = LinkConfig {
            frame_samples: 0,
            ..LinkConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BadFrameSamples(0)));
    }

    #[test]
    fn test_oversized_frame_samples_rejected() {
        // A one-byte length field can never announce 256 samples.
        let config = LinkConfig {
            frame_samples: 256,
            ..LinkConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BadFrameSamples(256)));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = LinkConfig {
            n_out: 0,
            ..LinkConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BadWindow));
    }

    #[test]
    fn test_bad_sample_rate_rejected() {
        for rate in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = LinkConfig {
                sample_rate_hz: rate,
                ..LinkConfig::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_config_serialization() {
        let config = LinkConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: LinkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
