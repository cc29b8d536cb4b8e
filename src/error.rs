use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Rejected configuration. The value that was being replaced stays in effect.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tempo must be a positive number of beats per minute, got {0}")]
    InvalidTempo(f64),

    #[error("time signature {beats_per_measure}/{beat_unit} needs a positive top and bottom")]
    InvalidSignature { beats_per_measure: u32, beat_unit: u32 },

    #[error("cannot read time signature {0:?}, expected something like \"4/4\"")]
    MalformedSignature(String),

    #[error("look-ahead window ({ahead:?}) must be longer than the tick interval ({tick:?})")]
    WindowTooShort { tick: Duration, ahead: Duration },
}

/// Failure to turn a file on disk into a playable sample.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to decode {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("{path} contains no audio frames")]
    Empty { path: PathBuf },

    #[error("audio engine queue is full, could not register {path}")]
    QueueFull { path: PathBuf },
}
