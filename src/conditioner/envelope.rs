//! Envelope followers: asymmetric one-pole smoothers over a rectified signal.
use std::time::Duration;

use crate::float::Float;
use crate::utils::level::time_to_coeff;

/// Tracks a level with independent attack and release time constants.
///
/// When the input is above the current level the level moves toward it with
/// the attack coefficient, otherwise with the release coefficient.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower<T>
where
    T: Float,
{
    attack_coeff: T,
    release_coeff: T,
    level: T,
}

impl<T> EnvelopeFollower<T>
where
    T: Float,
{
    pub fn new(attack: Duration, release: Duration, sample_rate: usize) -> Self {
        EnvelopeFollower {
            attack_coeff: time_to_coeff(attack, sample_rate),
            release_coeff: time_to_coeff(release, sample_rate),
            level: T::zero(),
        }
    }

    #[inline]
    pub fn update(&mut self, input: T) -> T {
        let coeff = if input > self.level {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.level = coeff * self.level + (T::one() - coeff) * input;
        self.level
    }

    pub fn level(&self) -> T {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = T::zero();
    }
}

/// Peak follower with an instantaneous attack and an exponential release.
/// Drives the noise gate.
#[derive(Debug, Clone)]
pub struct FastEnvelopeFollower<T>
where
    T: Float,
{
    inner: EnvelopeFollower<T>,
}

impl<T> FastEnvelopeFollower<T>
where
    T: Float,
{
    pub fn new(release: Duration, sample_rate: usize) -> Self {
        FastEnvelopeFollower {
            inner: EnvelopeFollower::new(Duration::ZERO, release, sample_rate),
        }
    }

    #[inline]
    pub fn update(&mut self, input: T) -> T {
        self.inner.update(input)
    }

    pub fn level(&self) -> T {
        self.inner.level()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLE_RATE: usize = 44100;

    #[test]
    fn attack_is_faster_than_release() {
        let mut env = EnvelopeFollower::<f64>::new(
            Duration::from_millis(1),
            Duration::from_millis(100),
            SAMPLE_RATE,
        );
        for _ in 0..441 {
            env.update(1.0);
        }
        // 10 ms is ten attack time constants.
        assert!(env.level() > 0.999);

        for _ in 0..441 {
            env.update(0.0);
        }
        // ...but only a tenth of a release time constant.
        assert_abs_diff_eq!(env.level(), (-0.1_f64).exp(), epsilon = 1e-2);
    }

    #[test]
    fn one_time_constant_reaches_63_percent() {
        let mut env =
            EnvelopeFollower::<f64>::new(Duration::from_millis(10), Duration::ZERO, SAMPLE_RATE);
        for _ in 0..441 {
            env.update(1.0);
        }
        assert_abs_diff_eq!(env.level(), 1.0 - (-1.0_f64).exp(), epsilon = 1e-3);
    }

    #[test]
    fn fast_follower_jumps_to_peaks() {
        let mut env = FastEnvelopeFollower::<f32>::new(Duration::from_millis(10), SAMPLE_RATE);
        assert_eq!(env.update(0.8), 0.8);
        let decayed = env.update(0.0);
        assert!(decayed < 0.8 && decayed > 0.79);
        assert_eq!(env.update(0.9), 0.9);
        env.reset();
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn fast_follower_holds_a_sine_envelope() {
        let mut env = FastEnvelopeFollower::<f64>::new(Duration::from_millis(10), SAMPLE_RATE);
        let freq = 440.0;
        let mut min_level = f64::MAX;
        for i in 0..SAMPLE_RATE / 10 {
            let s = (2.0 * std::f64::consts::PI * freq * i as f64 / SAMPLE_RATE as f64).sin();
            let level = env.update(s.abs());
            if i > SAMPLE_RATE / 100 {
                min_level = min_level.min(level);
            }
        }
        assert!(min_level > 0.8, "ripple too deep: {}", min_level);
    }
}
