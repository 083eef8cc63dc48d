use crate::float::Float;
use crate::utils::bitstream::{Bitstream, WORD_BITS};

/// Everything the bitstream autocorrelator mutates per sample, kept in one
/// place: the sample ring, the binarized history and the running mismatch
/// counts for every candidate lag. All buffers are allocated once in
/// [AnalysisWindow::new]; [AnalysisWindow::push] never allocates.
pub struct AnalysisWindow<T>
where
    T: Float,
{
    window_size: usize,
    samples: Box<[T]>,
    sample_pos: usize,
    bits: Bitstream,
    bit: bool,
    hysteresis: T,
    lag_lo: usize,
    // Mismatches of the newest `window_size` bits against the same bits
    // delayed by `lag_lo + k`, at index `k`.
    counts: Box<[u32]>,
    samples_seen: u64,
}

impl<T> AnalysisWindow<T>
where
    T: Float,
{
    /// `lag_lo..=lag_hi` is the range of lags to track; `lag_hi` may not
    /// exceed `window_size + 1`.
    pub fn new(window_size: usize, lag_lo: usize, lag_hi: usize, hysteresis: T) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        assert!(
            lag_lo > 0 && lag_lo <= lag_hi,
            "Lag range must be non-empty and start above 0"
        );
        assert!(
            lag_hi <= window_size + 1,
            "Lags longer than the window cannot be tracked"
        );

        AnalysisWindow {
            window_size,
            samples: vec![T::zero(); window_size].into_boxed_slice(),
            sample_pos: 0,
            bits: Bitstream::new(2 * window_size + WORD_BITS),
            bit: false,
            hysteresis,
            lag_lo,
            counts: vec![0; lag_hi - lag_lo + 1].into_boxed_slice(),
            samples_seen: 0,
        }
    }

    /// Add one sample. Returns `true` when the binarized signal has a rising
    /// edge on this sample.
    #[inline]
    pub fn push(&mut self, sample: T) -> bool {
        self.samples[self.sample_pos] = sample;
        self.sample_pos += 1;
        if self.sample_pos == self.window_size {
            self.sample_pos = 0;
        }

        // Schmitt trigger: inside the hysteresis band the bit keeps its value.
        let previous = self.bit;
        if sample > self.hysteresis {
            self.bit = true;
        } else if sample < -self.hysteresis {
            self.bit = false;
        }
        self.bits.push(self.bit);

        let n = self.window_size;
        let newest = self.bit;
        let leaving = self.bits.get(n);
        for (k, count) in self.counts.iter_mut().enumerate() {
            let lag = self.lag_lo + k;
            let entering = newest != self.bits.get(lag);
            let left = leaving != self.bits.get(n + lag);
            *count += entering as u32;
            *count -= left as u32;
        }

        self.samples_seen += 1;
        !previous && self.bit
    }

    /// Mismatch counts for lags `lag_lo()..=lag_hi()`.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn lag_lo(&self) -> usize {
        self.lag_lo
    }

    pub fn lag_hi(&self) -> usize {
        self.lag_lo + self.counts.len() - 1
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// True once every tracked count covers real input only.
    pub fn is_primed(&self) -> bool {
        self.samples_seen >= (self.window_size + self.lag_hi()) as u64
    }

    /// Largest absolute value among the newest `span` samples.
    pub fn peak(&self, span: usize) -> T {
        let span = span.min(self.window_size);
        (1..=span)
            .map(|age| self.samples[(self.sample_pos + self.window_size - age) % self.window_size])
            .fold(T::zero(), |peak, s| peak.max(s.abs()))
    }

    pub fn bits(&self) -> &Bitstream {
        &self.bits
    }

    pub fn reset(&mut self) {
        self.samples.iter_mut().for_each(|s| *s = T::zero());
        self.sample_pos = 0;
        self.bits.clear();
        self.bit = false;
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.samples_seen = 0;
    }
}
