//! Signal conditioning ahead of the detector.
//!
//! The chain per sample is: pre-clip, fast envelope of `|s|`, noise gate
//! driven by that envelope, smoothing of the gate gain, and a downward
//! compressor above `comp_threshold_db`. The gate decides on the raw
//! envelope; only the gain it outputs is smoothed.
use std::time::Duration;

use crate::config::{ConditionerConfig, FrequencyRange};
use crate::float::Float;
use crate::utils::level::{db_to_gain, duration_to_samples, gain_to_db};

pub mod envelope;
pub mod gate;

use envelope::{EnvelopeFollower, FastEnvelopeFollower};
use gate::{GateState, NoiseGate};

/// Attack of the follower that smooths the gate gain.
const GATE_SMOOTHING_ATTACK: Duration = Duration::from_micros(500);
/// Release of the envelope follower relative to the longest period.
const ENVELOPE_RELEASE_PERIODS: f64 = 0.6;

#[derive(Debug, Clone)]
pub struct SignalConditioner<T>
where
    T: Float,
{
    pre_clip: T,
    comp_threshold_db: T,
    comp_slope: T,
    envelope: FastEnvelopeFollower<T>,
    gate: NoiseGate<T>,
    gate_envelope: EnvelopeFollower<T>,
}

impl<T> SignalConditioner<T>
where
    T: Float,
{
    pub fn new(config: &ConditionerConfig, range: &FrequencyRange, sample_rate: usize) -> Self {
        let envelope_release = range.longest_period().mul_f64(ENVELOPE_RELEASE_PERIODS);
        SignalConditioner {
            pre_clip: db_to_gain(T::cast(config.pre_clip_db)),
            comp_threshold_db: T::cast(config.comp_threshold_db),
            comp_slope: T::cast(config.comp_slope),
            envelope: FastEnvelopeFollower::new(envelope_release, sample_rate),
            gate: NoiseGate::new(
                T::cast(config.gate_onset_db),
                T::cast(config.gate_release_db),
                config.attack_width_samples,
                duration_to_samples(config.release_time, sample_rate),
            ),
            gate_envelope: EnvelopeFollower::new(
                GATE_SMOOTHING_ATTACK,
                config.release_time,
                sample_rate,
            ),
        }
    }

    #[inline]
    pub fn process(&mut self, sample: T) -> T {
        let s = sample.max(-self.pre_clip).min(self.pre_clip);

        let env = self.envelope.update(s.abs());
        let gate = self.gate.update(env);
        let s = s * self.gate_envelope.update(gate);

        s * self.compressor_gain(env)
    }

    /// Condition `buffer` in place.
    pub fn process_buffer(&mut self, buffer: &mut [T]) {
        buffer.iter_mut().for_each(|s| *s = self.process(*s));
    }

    fn compressor_gain(&self, env: T) -> T {
        let env_db = gain_to_db(env);
        if env_db <= self.comp_threshold_db {
            return T::one();
        }
        let reduction_db = (self.comp_threshold_db - env_db) * (T::one() - self.comp_slope);
        db_to_gain(reduction_db)
    }

    /// Current output of the fast envelope follower.
    pub fn envelope(&self) -> T {
        self.envelope.level()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn reset(&mut self) {
        self.envelope.reset();
        self.gate.reset();
        self.gate_envelope.reset();
    }
}
