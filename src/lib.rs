//! # BACF Pitch
//! *bacf_pitch* tracks the fundamental frequency of a monophonic signal in
//! real time. Samples go in one at a time; out comes a sparse curve of
//! `(sample_index, frequency)` events, one per detected period, with a zero
//! frequency marking where a note starts after silence.
//!
//! # Pipeline
//! The [PitchTracker][pipeline::PitchTracker] chains three stages:
//!
//!   * an optional [SignalConditioner][conditioner::SignalConditioner]: an
//!     envelope driven noise gate with pre-clip and a downward compressor;
//!   * the [BacfDetector][detector::bacf::BacfDetector], a bitstream
//!     autocorrelation detector reporting at most one cycle per period;
//!   * the [EventAssembler][events::EventAssembler], which keeps indices
//!     increasing and inserts the silence markers.
//!
//! Each stage can also be used on its own.
//!
//! # Examples
//! ```
//! use bacf_pitch::config::PipelineConfig;
//! use bacf_pitch::pipeline::PitchTracker;
//!
//! fn main() {
//!     const SAMPLE_RATE: usize = 44100;
//!
//!     // Signal coming from some source (microphone, generated, etc...)
//!     let dt = 1.0 / SAMPLE_RATE as f64;
//!     let freq = 440.0;
//!     let signal: Vec<f64> = (0..SAMPLE_RATE)
//!         .map(|x| 0.5 * (2.0 * std::f64::consts::PI * x as f64 * dt * freq).sin())
//!         .collect();
//!
//!     let config = PipelineConfig::new(60.0, 1500.0, SAMPLE_RATE).with_conditioner(true);
//!     let mut tracker = PitchTracker::new(config).unwrap();
//!
//!     let mut buffer = signal.clone();
//!     tracker.process_buffer(&mut buffer, |event| {
//!         println!("{}: {} Hz", event.sample_index, event.frequency);
//!     });
//! }
//! ```

pub use config::PipelineConfig;
pub use detector::CycleEvent;
pub use error::{ConfigError, Result};
pub use events::PitchEvent;
pub use pipeline::PitchTracker;

pub mod conditioner;
pub mod config;
pub mod detector;
pub mod error;
pub mod events;
pub mod float;
pub mod pipeline;
pub mod utils;
