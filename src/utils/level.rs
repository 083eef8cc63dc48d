//! Level and time-constant conversions shared by the conditioner and the detector.
use std::time::Duration;

use crate::float::Float;

/// Floor returned by [gain_to_db] for silent input.
pub const MIN_DB: f64 = -120.0;

/// Convert decibels to linear amplitude.
#[inline]
pub fn db_to_gain<T: Float>(db: T) -> T {
    T::cast(10.0).powf(db / T::cast(20.0))
}

/// Convert linear amplitude to decibels, floored at [MIN_DB].
#[inline]
pub fn gain_to_db<T: Float>(gain: T) -> T {
    if gain <= T::zero() {
        T::cast(MIN_DB)
    } else {
        (T::cast(20.0) * gain.log10()).max(T::cast(MIN_DB))
    }
}

/// One-pole smoothing coefficient for a time constant. A zero duration
/// yields `0`, i.e. the output follows the input immediately.
#[inline]
pub fn time_to_coeff<T: Float>(time: Duration, sample_rate: usize) -> T {
    let samples = time.as_secs_f64() * sample_rate as f64;
    if samples <= 0.0 {
        T::zero()
    } else {
        T::cast((-1.0 / samples).exp())
    }
}

/// Number of whole samples spanned by `time`, rounded to nearest.
#[inline]
pub fn duration_to_samples(time: Duration, sample_rate: usize) -> usize {
    (time.as_secs_f64() * sample_rate as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn decibel_conversion() {
        assert_abs_diff_eq!(gain_to_db(1.0_f64), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(gain_to_db(0.5_f64), -6.0206, epsilon = 1e-3);
        assert_abs_diff_eq!(db_to_gain(0.0_f64), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(db_to_gain(-40.0_f64), 0.01, epsilon = 1e-9);
        assert_eq!(gain_to_db(0.0_f32), MIN_DB as f32);
    }

    #[test]
    fn zero_time_is_instantaneous() {
        let coeff: f64 = time_to_coeff(Duration::ZERO, 44100);
        assert_eq!(coeff, 0.0);

        let coeff: f64 = time_to_coeff(Duration::from_millis(10), 44100);
        assert!(coeff > 0.99 && coeff < 1.0);
    }

    #[test]
    fn samples_from_duration() {
        assert_eq!(duration_to_samples(Duration::from_millis(30), 44100), 1323);
        assert_eq!(duration_to_samples(Duration::ZERO, 48000), 0);
    }
}
