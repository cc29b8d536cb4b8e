//! A 6×6 loop station: each row picks one of six loop samples, and a
//! look-ahead beat scheduler fires the picked loops on every measure.
//!
//! - `clock`: tempo/signature arithmetic and time sources
//! - `scheduler`: the look-ahead loop and its timer thread
//! - `pipeline`: the pad grid store and on-disk settings
//! - `audio`: cpal output, sample buffers, looping voices
//! - `middle` / `tui`: the terminal front end

pub mod audio;
pub mod audio_api;
pub mod clock;
pub mod error;
pub mod loader;
pub mod middle;
pub mod pipeline;
pub mod scheduler;
pub mod shared;
pub mod tui;

pub use audio_api::{AudioEngine, BeatTime};
pub use clock::{Tempo, TimeSignature};
pub use error::{ConfigError, LoadError};
pub use pipeline::{PadGrid, PatternStore};
pub use scheduler::{LoopScheduler, SchedulerConfig, SchedulerEvent};
