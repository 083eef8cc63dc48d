//! Bitstream autocorrelation (BACF) pitch detection.
//!
//! The input is reduced to one bit per sample with a Schmitt trigger, so a
//! cycle is a run of ones followed by a run of zeros. For a bitstream $b$ and
//! window length $N$ the detector keeps, for every candidate lag $L$, the
//! number of mismatching bit pairs
//! $$ c(L) = \sum_{i=0}^{N-1} b_i \oplus b_{i+L}, $$
//! where $b_0$ is the newest bit. This is a correlation with the sign of the
//! signal only: cheap to maintain and indifferent to amplitude. Each new bit
//! changes every $c(L)$ by at most one, so the counts are updated in place
//! rather than recomputed.
//!
//! A period is confirmed on rising edges of the bitstream. The mean of
//! $c(L)$ over all candidate lags is the noise floor; the first valley of
//! $c(L)$ that dips well below it gives the period, which is then refined
//! to sub-sample precision with a parabola through the valley bottom. For
//! periods much longer than the shortest lag, the counts near that lag are
//! still on the slope out of lag 0 and are skipped first.
//! Sub-harmonics have valleys as deep as the fundamental, which is why the
//! first valley is taken and not the deepest one.
use tracing::debug;

use crate::config::FrequencyRange;
use crate::detector::internals::AnalysisWindow;
use crate::detector::{CycleEvent, PitchDetector};
use crate::float::Float;
use crate::utils::level::db_to_gain;
use crate::utils::peak::refine_minimum;

/// Schmitt trigger half-width, in dB below the detection threshold. A
/// signal that passes the level gate always crosses the trigger.
const HYSTERESIS_BELOW_THRESHOLD_DB: f64 = 6.0;
/// Position of the valley threshold between the deepest count and the
/// noise floor.
const VALLEY_RATIO: f64 = 0.25;
/// Cycles with a lower periodicity are not reported.
const MIN_PERIODICITY: f64 = 0.5;

pub struct BacfDetector<T>
where
    T: Float,
{
    window: AnalysisWindow<T>,
    sample_rate: T,
    threshold: T,
    min_period: usize,
    max_period: usize,
    last_emit: Option<u64>,
    last_period: usize,
}

impl<T> BacfDetector<T>
where
    T: Float,
{
    /// Create a detector for `range`. `threshold_db` is the lowest input
    /// peak level, in dBFS, at which cycles are reported; it also sets the
    /// width of the binarizer's hysteresis band. The range must have been
    /// validated against `sample_rate`.
    pub fn new(range: &FrequencyRange, sample_rate: usize, threshold_db: f64) -> Self {
        let min_period = range.min_period(sample_rate);
        let max_period = range.max_period(sample_rate);
        let window_size = range.window_size(sample_rate);
        debug!(
            window_size,
            min_period, max_period, threshold_db, "creating bitstream autocorrelator"
        );

        BacfDetector {
            window: AnalysisWindow::new(
                window_size,
                min_period - 1,
                max_period + 1,
                db_to_gain(T::cast(threshold_db - HYSTERESIS_BELOW_THRESHOLD_DB)),
            ),
            sample_rate: T::cast(sample_rate as f64),
            threshold: db_to_gain(T::cast(threshold_db)),
            min_period,
            max_period,
            last_emit: None,
            last_period: 0,
        }
    }

    pub fn min_period(&self) -> usize {
        self.min_period
    }

    pub fn max_period(&self) -> usize {
        self.max_period
    }

    pub fn samples_processed(&self) -> u64 {
        self.window.samples_seen()
    }

    /// Pick the lag at the bottom of the first valley of the mismatch counts.
    /// Returns the lag and its periodicity score.
    fn select_lag(&self) -> Option<(usize, f64)> {
        let lag_lo = self.window.lag_lo();
        let all = self.window.counts();
        let first = self.min_period - lag_lo;
        let counts = &all[first..=self.max_period - lag_lo];

        let sum: u64 = counts.iter().map(|&c| c as u64).sum();
        let mean = sum as f64 / counts.len() as f64;
        if mean <= 0.0 {
            return None;
        }

        // Counts still rising at the shortest lag belong to the lobe around
        // lag 0, or to a period shorter than the range. The search starts
        // where that lobe crosses the noise floor.
        let start = if all[first] > all[first - 1] {
            counts.iter().position(|&c| c as f64 > mean)?
        } else {
            0
        };
        let search = &counts[start..];
        let min = search.iter().copied().min()? as f64;
        let valley = min + VALLEY_RATIO * (mean - min);

        let (offset, count) = search
            .iter()
            .enumerate()
            .skip_while(|&(_, &c)| c as f64 > valley)
            .take_while(|&(_, &c)| c as f64 <= valley)
            .fold(None, |best: Option<(usize, u32)>, (k, &c)| match best {
                Some((_, best_c)) if best_c <= c => best,
                _ => Some((k, c)),
            })?;

        // The bottom must be a minimum of the tracked lags, not a slope
        // running off either end of the range.
        let k = first + start + offset;
        if all[k - 1] < count || all[k + 1] < count {
            return None;
        }

        let periodicity = (1.0 - count as f64 / mean).clamp(0.0, 1.0);
        Some((self.min_period + start + offset, periodicity))
    }
}

impl<T> PitchDetector<T> for BacfDetector<T>
where
    T: Float,
{
    fn process(&mut self, sample: T) -> Option<CycleEvent<T>> {
        let rising = self.window.push(sample);
        if !rising || !self.window.is_primed() {
            return None;
        }

        let index = self.window.samples_seen() - 1;
        if let Some(last) = self.last_emit {
            // One event per period: skip edges inside the last detected cycle.
            if index - last < self.last_period.saturating_sub(1) as u64 {
                return None;
            }
        }

        if self.window.peak(self.max_period) < self.threshold {
            return None;
        }

        let (lag, periodicity) = self.select_lag()?;
        if periodicity < MIN_PERIODICITY {
            return None;
        }

        let lag_lo = self.window.lag_lo();
        let period = refine_minimum::<T>(self.window.counts(), lag - lag_lo)
            + T::cast(lag_lo as f64);
        let whole_period = period.as_f64().round() as usize;

        self.last_emit = Some(index);
        self.last_period = whole_period;

        Some(CycleEvent {
            sample_index: (index + 1).saturating_sub(whole_period as u64),
            frequency: self.sample_rate / period,
            periodicity: T::cast(periodicity),
            period,
        })
    }

    fn window_size(&self) -> usize {
        self.window.window_size()
    }

    fn reset(&mut self) {
        self.window.reset();
        self.last_emit = None;
        self.last_period = 0;
    }
}
