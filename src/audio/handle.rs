use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Names a buffer the audio thread holds. Handed out once per successful load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleHandle(pub u64);

impl fmt::Display for SampleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// atomic so loads can happen from any thread
pub fn next_sample_handle() -> SampleHandle {
    SampleHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
}
