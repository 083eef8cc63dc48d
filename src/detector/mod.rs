use crate::float::Float;

pub mod bacf;
pub mod internals;

/// A confirmed cycle of a periodic signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleEvent<T>
where
    T: Float,
{
    /// Index, in the detector's input stream, of the first sample of the
    /// last confirmed cycle, i.e. the one that ended on the sample that
    /// produced this event. It is not the start of the note: a note's
    /// first event comes one analysis window after its onset.
    pub sample_index: u64,
    pub frequency: T,
    /// How strongly the signal repeats at the detected period, in `[0, 1]`.
    pub periodicity: T,
    /// Detected period in samples, with sub-sample precision.
    pub period: T,
}

/// A detector consumes one sample per call and reports a [CycleEvent] on
/// the sample that completes a confirmed period. Most calls return `None`;
/// that is the steady state, not a failure.
pub trait PitchDetector<T>
where
    T: Float,
{
    fn process(&mut self, sample: T) -> Option<CycleEvent<T>>;

    /// Number of samples covered by the analysis window.
    fn window_size(&self) -> usize;

    fn reset(&mut self);
}
