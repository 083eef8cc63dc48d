//! Turns detector cycles into a frequency curve that is safe to interpolate.
use crate::detector::CycleEvent;
use crate::float::Float;

/// One point of the output curve. A zero frequency marks silence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitchEvent<T> {
    pub sample_index: u64,
    pub frequency: T,
}

/// Events produced for a single cycle: an optional silence marker followed
/// by the cycle itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assembled<T> {
    events: [Option<PitchEvent<T>>; 2],
}

impl<T> Assembled<T>
where
    T: Float,
{
    pub fn none() -> Self {
        Assembled {
            events: [None, None],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events[1].is_none()
    }

    pub fn len(&self) -> usize {
        self.events.iter().flatten().count()
    }

    /// The silence marker emitted ahead of an onset, if any.
    pub fn marker(&self) -> Option<PitchEvent<T>> {
        self.events[0]
    }

    pub fn event(&self) -> Option<PitchEvent<T>> {
        self.events[1]
    }

    pub fn iter(&self) -> impl Iterator<Item = PitchEvent<T>> + '_ {
        self.events.iter().flatten().copied()
    }
}

impl<T> IntoIterator for Assembled<T> {
    type Item = PitchEvent<T>;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<PitchEvent<T>>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter().flatten()
    }
}

/// Converts [CycleEvent]s into [PitchEvent]s with strictly increasing
/// sample indices.
///
/// When a cycle with a nonzero frequency follows silence, a zero-frequency
/// marker is emitted one sample before it. A consumer that interpolates
/// linearly between events then rises from zero at the onset instead of
/// ramping from whatever pitch came before the silence.
///
/// ```rust
/// use bacf_pitch::detector::CycleEvent;
/// use bacf_pitch::events::EventAssembler;
///
/// let mut assembler = EventAssembler::new();
/// let cycle = CycleEvent { sample_index: 1000, frequency: 220.0, periodicity: 0.98, period: 200.45 };
/// let events: Vec<_> = assembler.assemble(&cycle).into_iter().collect();
/// assert_eq!(events.len(), 2);
/// assert_eq!((events[0].sample_index, events[0].frequency), (999, 0.0));
/// assert_eq!((events[1].sample_index, events[1].frequency), (1000, 220.0));
/// ```
#[derive(Debug, Clone)]
pub struct EventAssembler<T> {
    previous_frequency: T,
    // Last index handed out, marker or event.
    last_index: Option<u64>,
    // Index of the last cycle, as reported by the detector.
    last_cycle: Option<u64>,
    silence_gap: Option<u64>,
}

impl<T> Default for EventAssembler<T>
where
    T: Float,
{
    fn default() -> Self {
        EventAssembler::new()
    }
}

impl<T> EventAssembler<T>
where
    T: Float,
{
    pub fn new() -> Self {
        EventAssembler {
            previous_frequency: T::zero(),
            last_index: None,
            last_cycle: None,
            silence_gap: None,
        }
    }

    /// Treat cycles more than `samples` apart as separated by silence, so the
    /// later one is preceded by a marker.
    pub fn with_silence_gap(mut self, samples: u64) -> Self {
        self.silence_gap = Some(samples);
        self
    }

    pub fn assemble(&mut self, cycle: &CycleEvent<T>) -> Assembled<T> {
        if let (Some(gap), Some(last)) = (self.silence_gap, self.last_cycle) {
            if cycle.sample_index.saturating_sub(last) > gap {
                self.previous_frequency = T::zero();
            }
        }
        self.last_cycle = Some(cycle.sample_index);

        let mut out = Assembled::none();
        if self.previous_frequency <= T::zero() && cycle.frequency > T::zero() {
            let index = self.next_index(cycle.sample_index.saturating_sub(1));
            out.events[0] = Some(PitchEvent {
                sample_index: index,
                frequency: T::zero(),
            });
        }

        let index = self.next_index(cycle.sample_index);
        out.events[1] = Some(PitchEvent {
            sample_index: index,
            frequency: cycle.frequency,
        });
        self.previous_frequency = cycle.frequency;
        out
    }

    /// Claim `wanted`, or the first index after the last one handed out if
    /// `wanted` would not advance.
    fn next_index(&mut self, wanted: u64) -> u64 {
        let index = match self.last_index {
            Some(last) if wanted <= last => last + 1,
            _ => wanted,
        };
        self.last_index = Some(index);
        index
    }

    pub fn previous_frequency(&self) -> T {
        self.previous_frequency
    }

    pub fn reset(&mut self) {
        self.previous_frequency = T::zero();
        self.last_index = None;
        self.last_cycle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(sample_index: u64, frequency: f64) -> CycleEvent<f64> {
        CycleEvent {
            sample_index,
            frequency,
            periodicity: 1.0,
            period: 44100.0 / frequency,
        }
    }

    fn pairs(assembled: Assembled<f64>) -> Vec<(u64, f64)> {
        assembled
            .into_iter()
            .map(|e| (e.sample_index, e.frequency))
            .collect()
    }

    #[test]
    fn first_onset_gets_a_marker() {
        let mut assembler = EventAssembler::new();
        assert_eq!(
            pairs(assembler.assemble(&cycle(500, 220.0))),
            vec![(499, 0.0), (500, 220.0)]
        );
        assert_eq!(pairs(assembler.assemble(&cycle(700, 221.0))), vec![(700, 221.0)]);
        assert_eq!(pairs(assembler.assemble(&cycle(900, 219.0))), vec![(900, 219.0)]);
    }

    #[test]
    fn indices_never_go_backwards() {
        let mut assembler = EventAssembler::new();
        let mut out = vec![];
        for c in [cycle(500, 220.0), cycle(450, 110.0), cycle(450, 110.0), cycle(800, 110.0)] {
            out.extend(pairs(assembler.assemble(&c)));
        }
        let indices: Vec<u64> = out.iter().map(|p| p.0).collect();
        assert_eq!(indices, vec![499, 500, 501, 502, 800]);
    }

    #[test]
    fn marker_at_stream_start_saturates() {
        let mut assembler = EventAssembler::new();
        assert_eq!(
            pairs(assembler.assemble(&cycle(0, 300.0))),
            vec![(0, 0.0), (1, 300.0)]
        );
    }

    #[test]
    fn silence_gap_starts_a_new_onset() {
        let mut assembler = EventAssembler::new().with_silence_gap(1000);
        assembler.assemble(&cycle(500, 220.0));
        assembler.assemble(&cycle(700, 220.0));
        assert_eq!(
            pairs(assembler.assemble(&cycle(5000, 330.0))),
            vec![(4999, 0.0), (5000, 330.0)]
        );
        assert_eq!(pairs(assembler.assemble(&cycle(5100, 330.0))), vec![(5100, 330.0)]);
    }

    #[test]
    fn without_gap_only_the_first_onset_is_marked() {
        let mut assembler = EventAssembler::new();
        assembler.assemble(&cycle(500, 220.0));
        assert_eq!(pairs(assembler.assemble(&cycle(50_000, 330.0))), vec![(50_000, 330.0)]);
    }

    #[test]
    fn accessors_and_reset() {
        let mut assembler = EventAssembler::new();
        let assembled = assembler.assemble(&cycle(10, 440.0));
        assert_eq!(assembled.len(), 2);
        assert!(!assembled.is_empty());
        assert_eq!(assembled.marker().map(|e| e.frequency), Some(0.0));
        assert_eq!(assembled.event().map(|e| e.frequency), Some(440.0));
        assert_eq!(assembled.iter().count(), 2);
        assert_eq!(assembler.previous_frequency(), 440.0);

        assembler.reset();
        assert_eq!(assembler.previous_frequency(), 0.0);
        assert_eq!(assembler.assemble(&cycle(5, 440.0)).len(), 2);
        assert!(Assembled::<f64>::none().is_empty());
    }
}
