//! Construction-time errors. Nothing in the per-sample path can fail.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("frequency bound must be positive and finite, got {0} Hz")]
    NonPositiveFrequency(f64),

    #[error("lowest frequency ({lowest} Hz) must be below highest frequency ({highest} Hz)")]
    InvertedRange { lowest: f64, highest: f64 },

    #[error("highest frequency ({highest} Hz) must be below the Nyquist frequency ({nyquist} Hz)")]
    AboveNyquist { highest: f64, nyquist: f64 },

    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,

    #[error("gate onset ({onset_db} dB) must be above gate release ({release_db} dB)")]
    MissingHysteresis { onset_db: f64, release_db: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
