//! Pipeline configuration. Everything is validated once, up front, so the
//! per-sample path never has to deal with inconsistent parameters.
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::utils::bitstream::WORD_BITS;

/// Frequency bounds of the detector, in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyRange {
    pub lowest: f64,
    pub highest: f64,
}

impl FrequencyRange {
    pub fn new(lowest: f64, highest: f64) -> Self {
        FrequencyRange { lowest, highest }
    }

    pub fn validate(&self, sample_rate: usize) -> Result<()> {
        for bound in [self.lowest, self.highest] {
            if !bound.is_finite() || bound <= 0.0 {
                return Err(ConfigError::NonPositiveFrequency(bound));
            }
        }
        if self.lowest >= self.highest {
            return Err(ConfigError::InvertedRange {
                lowest: self.lowest,
                highest: self.highest,
            });
        }
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        let nyquist = sample_rate as f64 / 2.0;
        if self.highest >= nyquist {
            return Err(ConfigError::AboveNyquist {
                highest: self.highest,
                nyquist,
            });
        }
        Ok(())
    }

    /// Period of the lowest frequency in whole samples, rounded up.
    pub fn max_period(&self, sample_rate: usize) -> usize {
        (sample_rate as f64 / self.lowest).ceil() as usize
    }

    /// Period of the highest frequency in whole samples, rounded down.
    pub fn min_period(&self, sample_rate: usize) -> usize {
        ((sample_rate as f64 / self.highest).floor() as usize).max(2)
    }

    /// Analysis window length: the longest period rounded up to a whole
    /// number of bitstream words.
    pub fn window_size(&self, sample_rate: usize) -> usize {
        self.max_period(sample_rate).div_ceil(WORD_BITS) * WORD_BITS
    }

    /// Period of the lowest frequency as a duration.
    pub fn longest_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.lowest)
    }
}

impl Default for FrequencyRange {
    fn default() -> Self {
        FrequencyRange::new(60.0, 600.0)
    }
}

/// Settings of the signal conditioner. Levels are in dBFS.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionerConfig {
    pub pre_clip_db: f64,
    pub comp_threshold_db: f64,
    /// Output slope above the compressor threshold; `1` disables compression.
    pub comp_slope: f64,
    pub gate_onset_db: f64,
    pub gate_release_db: f64,
    pub attack_width_samples: usize,
    pub release_time: Duration,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        ConditionerConfig {
            pre_clip_db: 0.0,
            comp_threshold_db: 0.0,
            comp_slope: 0.25,
            gate_onset_db: -42.0,
            gate_release_db: -57.0,
            attack_width_samples: 50,
            release_time: Duration::from_millis(30),
        }
    }
}

impl ConditionerConfig {
    pub fn validate(&self) -> Result<()> {
        let levels = [
            ("pre_clip_db", self.pre_clip_db),
            ("comp_threshold_db", self.comp_threshold_db),
            ("gate_onset_db", self.gate_onset_db),
            ("gate_release_db", self.gate_release_db),
        ];
        if let Some((name, value)) = levels.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::InvalidParameter(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        if !(0.0..=1.0).contains(&self.comp_slope) {
            return Err(ConfigError::InvalidParameter(format!(
                "comp_slope must be within [0, 1], got {}",
                self.comp_slope
            )));
        }
        if self.gate_onset_db <= self.gate_release_db {
            return Err(ConfigError::MissingHysteresis {
                onset_db: self.gate_onset_db,
                release_db: self.gate_release_db,
            });
        }
        Ok(())
    }
}

/// Complete configuration of a [PitchTracker](crate::pipeline::PitchTracker).
///
/// ```rust
/// use bacf_pitch::config::PipelineConfig;
///
/// let config = PipelineConfig::new(80.0, 1000.0, 48000)
///     .with_threshold_db(-50.0)
///     .with_conditioner(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    pub range: FrequencyRange,
    pub sample_rate: usize,
    /// Minimum input level for the detector to report a cycle.
    pub threshold_db: f64,
    pub conditioner_enabled: bool,
    pub conditioner: ConditionerConfig,
    /// Gap between cycles after which the next cycle counts as a new onset.
    pub silence_gap: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            range: FrequencyRange::default(),
            sample_rate: 44100,
            threshold_db: -40.0,
            conditioner_enabled: false,
            conditioner: ConditionerConfig::default(),
            silence_gap: None,
        }
    }
}

impl PipelineConfig {
    pub fn new(lowest: f64, highest: f64, sample_rate: usize) -> Self {
        PipelineConfig {
            range: FrequencyRange::new(lowest, highest),
            sample_rate,
            ..Default::default()
        }
    }

    /// Configuration for a given lowest frequency, with the highest set to
    /// ten times that.
    pub fn from_lowest(lowest: f64, sample_rate: usize) -> Self {
        PipelineConfig::new(lowest, lowest * 10.0, sample_rate)
    }

    pub fn with_threshold_db(mut self, threshold_db: f64) -> Self {
        self.threshold_db = threshold_db;
        self
    }

    pub fn with_conditioner(mut self, enabled: bool) -> Self {
        self.conditioner_enabled = enabled;
        self
    }

    pub fn with_conditioner_config(mut self, conditioner: ConditionerConfig) -> Self {
        self.conditioner = conditioner;
        self
    }

    pub fn with_silence_gap(mut self, gap: Duration) -> Self {
        self.silence_gap = Some(gap);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate(self.sample_rate)?;
        if !self.threshold_db.is_finite() {
            return Err(ConfigError::InvalidParameter(format!(
                "threshold_db must be finite, got {}",
                self.threshold_db
            )));
        }
        // Checked even when the conditioner is disabled.
        self.conditioner.validate()
    }
}
