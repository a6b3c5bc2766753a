use crate::Calibration;
use core_types::{ConfigError, LinkConfig, SampleFrame};
use serde::{Deserialize, Serialize};

/// Peak-to-peak spans below this many codes are treated as flat, allowing
/// roughly one code of noise on either side of a DC level.
const FLAT_P2P_CODES: f32 = 3.0;

/// A trigger-aligned, calibrated voltage trace of fixed length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggeredTrace {
    /// Calibrated samples; index 0 is the trigger point, or the frame start
    /// when no trigger was found. Always exactly `n_out` elements, with
    /// hold-last-value padding when the source frame runs out.
    pub volts: Vec<f32>,
}

impl TriggeredTrace {
    pub fn len(&self) -> usize {
        self.volts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volts.is_empty()
    }
}

/// Scalar estimates derived from one frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    /// Estimated fundamental frequency. 0.0 signals no discernible
    /// periodicity (flat signal or fewer than two rising edges).
    pub frequency_hz: f32,
    /// Peak-to-peak amplitude in calibrated volts, reported unconditionally.
    pub amplitude_vpp: f32,
}

/// Converts one completed frame into a triggered display trace and
/// frequency/amplitude estimates, using only the frame's own statistics.
#[derive(Debug, Clone)]
pub struct WaveformAnalyzer {
    sample_rate_hz: f32,
    n_out: usize,
    calibration: Calibration,
}

impl WaveformAnalyzer {
    /// Fails fast on a zero-length output window or an unusable sample rate;
    /// after construction the analyzer can never fail.
    pub fn new(
        sample_rate_hz: f32,
        calibration: Calibration,
        n_out: usize,
    ) -> Result<Self, ConfigError> {
        if n_out == 0 {
            return Err(ConfigError::BadWindow);
        }
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(ConfigError::BadSampleRate(sample_rate_hz));
        }
        Ok(Self {
            sample_rate_hz,
            n_out,
            calibration,
        })
    }

    pub fn from_config(config: &LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(
            config.sample_rate_hz,
            Calibration::new(config.full_scale_v, config.calibration_gain),
            config.n_out,
        )
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate_hz
    }

    /// Produce the fixed-length display trace, aligned to the first rising
    /// edge through the midpoint threshold.
    ///
    /// Flat frames and frames with no rising edge fall back to the window at
    /// the frame start.
    pub fn trigger_align(&self, frame: &SampleFrame) -> TriggeredTrace {
        let volts = self.calibration.volts_all(&frame.codes);
        let Some(stats) = FrameStats::of(&frame.codes) else {
            return TriggeredTrace {
                volts: vec![0.0; self.n_out],
            };
        };
        if stats.p2p < FLAT_P2P_CODES {
            return self.window(&volts, 0);
        }
        match rising_edges(&frame.codes, stats.threshold()).first() {
            Some(&trigger) => self.window(&volts, trigger),
            None => self.window(&volts, 0),
        }
    }

    /// Estimate fundamental frequency and peak-to-peak amplitude.
    ///
    /// The mean spacing of consecutive rising edges gives the period;
    /// crossing indices are strictly increasing, so the mean is always
    /// positive on the dividing path.
    pub fn estimate(&self, frame: &SampleFrame) -> Metrics {
        let Some(stats) = FrameStats::of(&frame.codes) else {
            return Metrics {
                frequency_hz: 0.0,
                amplitude_vpp: 0.0,
            };
        };
        let amplitude_vpp =
            (stats.p2p / 255.0) * self.calibration.full_scale_v * self.calibration.gain;
        if stats.p2p < FLAT_P2P_CODES {
            return Metrics {
                frequency_hz: 0.0,
                amplitude_vpp,
            };
        }
        let edges = rising_edges(&frame.codes, stats.threshold());
        if edges.len() < 2 {
            // A single edge cannot yield a period.
            return Metrics {
                frequency_hz: 0.0,
                amplitude_vpp,
            };
        }
        let period_sum: usize = edges.windows(2).map(|pair| pair[1] - pair[0]).sum();
        let mean_period = period_sum as f32 / (edges.len() - 1) as f32;
        Metrics {
            frequency_hz: self.sample_rate_hz / mean_period,
            amplitude_vpp,
        }
    }

    /// Copy `n_out` samples starting at `start`, repeating the last available
    /// value when the frame runs out.
    fn window(&self, volts: &[f32], start: usize) -> TriggeredTrace {
        let last = volts.last().copied().unwrap_or(0.0);
        let volts = (start..start + self.n_out)
            .map(|i| volts.get(i).copied().unwrap_or(last))
            .collect();
        TriggeredTrace { volts }
    }
}

struct FrameStats {
    min: f32,
    p2p: f32,
}

impl FrameStats {
    fn of(codes: &[u8]) -> Option<Self> {
        let min = *codes.iter().min()? as f32;
        let max = *codes.iter().max()? as f32;
        Some(Self {
            min,
            p2p: max - min,
        })
    }

    fn threshold(&self) -> f32 {
        self.min + self.p2p / 2.0
    }
}

/// Indices of the first sample above threshold at each rising crossing:
/// every `i + 1` where `codes[i] <= threshold < codes[i + 1]`.
fn rising_edges(codes: &[u8], threshold: f32) -> Vec<usize> {
    codes
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| (pair[0] as f32) <= threshold && (pair[1] as f32) > threshold)
        .map(|(i, _)| i + 1)
        .collect()
}
