//! The complete tracker: optional conditioning, detection and event
//! assembly, driven one sample at a time.
use tracing::{debug, trace};

use crate::conditioner::SignalConditioner;
use crate::config::PipelineConfig;
use crate::detector::bacf::BacfDetector;
use crate::detector::PitchDetector;
use crate::error::Result;
use crate::events::{Assembled, EventAssembler, PitchEvent};
use crate::float::Float;
use crate::utils::level::duration_to_samples;

/// Streaming pitch tracker for one channel.
///
/// ```rust
/// use bacf_pitch::config::PipelineConfig;
/// use bacf_pitch::pipeline::PitchTracker;
///
/// const SAMPLE_RATE: usize = 44100;
/// let signal: Vec<f64> = (0..SAMPLE_RATE / 2)
///     .map(|i| (2.0 * std::f64::consts::PI * 330.0 * i as f64 / SAMPLE_RATE as f64).sin())
///     .collect();
///
/// let mut tracker = PitchTracker::new(PipelineConfig::new(60.0, 1500.0, SAMPLE_RATE)).unwrap();
/// let events = tracker.track(&signal);
///
/// // A silence marker, then the tone.
/// assert_eq!(events[0].frequency, 0.0);
/// assert!(events[1..].iter().all(|e| (e.frequency - 330.0).abs() < 3.3));
/// ```
pub struct PitchTracker<T>
where
    T: Float,
{
    config: PipelineConfig,
    conditioner: Option<SignalConditioner<T>>,
    detector: BacfDetector<T>,
    assembler: EventAssembler<T>,
}

impl<T> PitchTracker<T>
where
    T: Float,
{
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let sample_rate = config.sample_rate;
        let conditioner = config
            .conditioner_enabled
            .then(|| SignalConditioner::new(&config.conditioner, &config.range, sample_rate));
        let detector = BacfDetector::new(&config.range, sample_rate, config.threshold_db);
        let mut assembler = EventAssembler::new();
        if let Some(gap) = config.silence_gap {
            assembler = assembler.with_silence_gap(duration_to_samples(gap, sample_rate) as u64);
        }

        debug!(
            lowest = config.range.lowest,
            highest = config.range.highest,
            sample_rate,
            conditioner = config.conditioner_enabled,
            "pitch tracker ready"
        );

        Ok(PitchTracker {
            config,
            conditioner,
            detector,
            assembler,
        })
    }

    /// Feed one sample. Returns the sample as the detector saw it, and the
    /// events it completed.
    #[inline]
    pub fn process(&mut self, sample: T) -> (T, Assembled<T>) {
        let sample = match self.conditioner.as_mut() {
            Some(conditioner) => conditioner.process(sample),
            None => sample,
        };
        let events = match self.detector.process(sample) {
            Some(cycle) => self.assembler.assemble(&cycle),
            None => Assembled::none(),
        };
        (sample, events)
    }

    /// Process `buffer` in place, replacing each sample with its conditioned
    /// value, and hand every event to `sink` in order.
    pub fn process_buffer<F>(&mut self, buffer: &mut [T], mut sink: F)
    where
        F: FnMut(PitchEvent<T>),
    {
        for s in buffer.iter_mut() {
            let (conditioned, events) = self.process(*s);
            *s = conditioned;
            events.into_iter().for_each(&mut sink);
        }
    }

    /// Run a whole signal through the tracker and collect the events.
    pub fn track(&mut self, signal: &[T]) -> Vec<PitchEvent<T>> {
        let mut buffer = signal.to_vec();
        let mut events = Vec::new();
        self.process_buffer(&mut buffer, |e| events.push(e));
        events
    }

    pub fn reset(&mut self) {
        trace!("resetting pitch tracker");
        if let Some(conditioner) = self.conditioner.as_mut() {
            conditioner.reset();
        }
        self.detector.reset();
        self.assembler.reset();
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detector(&self) -> &BacfDetector<T> {
        &self.detector
    }

    pub fn conditioner(&self) -> Option<&SignalConditioner<T>> {
        self.conditioner.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::conditioner::gate::GateState;
    use crate::error::ConfigError;

    const SAMPLE_RATE: usize = 44100;

    fn sine(freq: f64, amplitude: f64, range: std::ops::Range<usize>) -> Vec<f64> {
        range
            .map(|i| {
                amplitude
                    * (2.0 * std::f64::consts::PI * freq * i as f64 / SAMPLE_RATE as f64).sin()
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_config() {
        let result = PitchTracker::<f64>::new(PipelineConfig::new(300.0, 200.0, SAMPLE_RATE));
        assert!(matches!(result, Err(ConfigError::InvertedRange { .. })));
    }

    #[test]
    fn conditioner_only_when_enabled() {
        let config = PipelineConfig::new(60.0, 1500.0, SAMPLE_RATE);
        let tracker = PitchTracker::<f32>::new(config.clone()).unwrap();
        assert!(tracker.conditioner().is_none());

        let tracker = PitchTracker::<f32>::new(config.with_conditioner(true)).unwrap();
        assert_eq!(
            tracker.conditioner().map(|c| c.gate_state()),
            Some(GateState::Closed)
        );
        assert_eq!(tracker.detector().window_size(), 768);
        assert!(tracker.config().conditioner_enabled);
    }

    #[test]
    fn raw_samples_pass_through_unconditioned() {
        let mut tracker =
            PitchTracker::<f64>::new(PipelineConfig::new(60.0, 1500.0, SAMPLE_RATE)).unwrap();
        let mut buffer = sine(220.0, 0.5, 0..4096);
        let original = buffer.clone();
        tracker.process_buffer(&mut buffer, |_| {});
        assert_eq!(buffer, original);
    }

    #[test]
    fn process_matches_track() {
        let config = PipelineConfig::new(60.0, 1500.0, SAMPLE_RATE).with_conditioner(true);
        let signal = sine(247.0, 0.4, 0..SAMPLE_RATE / 2);

        let mut tracker = PitchTracker::<f64>::new(config.clone()).unwrap();
        let mut streamed = vec![];
        for &s in &signal {
            streamed.extend(tracker.process(s).1);
        }

        let mut tracker = PitchTracker::<f64>::new(config).unwrap();
        assert_eq!(tracker.track(&signal), streamed);
        assert!(!streamed.is_empty());
    }

    #[test]
    fn reset_starts_a_new_stream() {
        let mut tracker =
            PitchTracker::<f64>::new(PipelineConfig::new(60.0, 1500.0, SAMPLE_RATE)).unwrap();
        let signal = sine(220.0, 0.5, 0..SAMPLE_RATE / 4);
        let first = tracker.track(&signal);
        tracker.reset();
        assert_eq!(tracker.detector().samples_processed(), 0);
        assert_eq!(tracker.track(&signal), first);
    }

    #[test]
    fn silence_gap_marks_every_onset() {
        let config = PipelineConfig::new(60.0, 1500.0, SAMPLE_RATE)
            .with_silence_gap(Duration::from_millis(50));
        let mut tracker = PitchTracker::<f64>::new(config).unwrap();

        let mut signal = sine(220.0, 0.5, 0..SAMPLE_RATE / 4);
        signal.extend(vec![0.0; SAMPLE_RATE / 4]);
        signal.extend(sine(330.0, 0.5, 0..SAMPLE_RATE / 4));

        let markers = tracker
            .track(&signal)
            .iter()
            .filter(|e| e.frequency == 0.0)
            .count();
        assert_eq!(markers, 2);
    }
}
