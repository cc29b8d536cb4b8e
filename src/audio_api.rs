use std::path::Path;

pub use crate::audio::{SampleBuffer, SampleHandle};
use crate::error::LoadError;

/// Seconds on the shared monotonic clock (see `clock::MonotonicClock`).
pub type BeatTime = f64;

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The audio thread can't touch the disk, so buffers are decoded on the
    // caller's side and handed over already resampled.
    RegisterSample { handle: SampleHandle, buffer: SampleBuffer },

    // Start (or restart) a sample's loop at `at`.
    Play { handle: SampleHandle, at: BeatTime },

    // Silence every voice of a sample from `at` on.
    Stop { handle: SampleHandle, at: BeatTime },

    StopAll,
}

/// The audio side as seen by the scheduler and the app layer.
///
/// `play` and `stop` hand the request off and return; they never wait for
/// the audio thread.
pub trait AudioEngine: Send + Sync {
    fn load_sample(&self, path: &Path) -> Result<SampleHandle, LoadError>;

    fn play(&self, handle: SampleHandle, at: BeatTime);

    fn stop(&self, handle: SampleHandle, at: BeatTime);

    fn is_loaded(&self, handle: SampleHandle) -> bool;
}
