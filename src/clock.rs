// Conversions between musical time (beats, measures) and wall-clock seconds.
// Nothing in here holds state except the time sources at the bottom.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::ConfigError;

pub const MIN_UI_TEMPO: f64 = 40.0;
pub const MAX_UI_TEMPO: f64 = 200.0;
pub const DEFAULT_TEMPO: f64 = 120.0;

// Beat lengths the scheduler can step through. Shorter beats vanish into the
// rounding of a running clock; longer ones park the cursor out of reach.
const MIN_SECONDS_PER_BEAT: f64 = 1e-3;
const MAX_SECONDS_PER_BEAT: f64 = 3600.0;

/// Signatures offered by the signature dialog, in display order.
pub const SIGNATURE_PRESETS: [TimeSignature; 6] = [
    TimeSignature { beats_per_measure: 2, beat_unit: 4 },
    TimeSignature { beats_per_measure: 3, beat_unit: 4 },
    TimeSignature { beats_per_measure: 4, beat_unit: 4 },
    TimeSignature { beats_per_measure: 6, beat_unit: 8 },
    TimeSignature { beats_per_measure: 7, beat_unit: 8 },
    TimeSignature { beats_per_measure: 5, beat_unit: 4 },
];

/// Beats per minute. Always positive, and one beat lasts between a
/// millisecond and an hour.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tempo(f64);

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self, ConfigError> {
        let beat = 60.0 / bpm;
        let steppable = (MIN_SECONDS_PER_BEAT..=MAX_SECONDS_PER_BEAT).contains(&beat);
        if bpm.is_finite() && bpm > 0.0 && steppable {
            Ok(Self(bpm))
        } else {
            Err(ConfigError::InvalidTempo(bpm))
        }
    }

    pub fn bpm(self) -> f64 {
        self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(DEFAULT_TEMPO)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}

/// Snap a slider value onto the whole-BPM range the UI offers.
pub fn ui_tempo(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return DEFAULT_TEMPO;
    }
    bpm.round().clamp(MIN_UI_TEMPO, MAX_UI_TEMPO)
}

/// "N/M". Only the numerator matters for scheduling; the beat unit is shown
/// to the user and otherwise ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    beats_per_measure: u32,
    beat_unit: u32,
}

impl TimeSignature {
    pub fn new(beats_per_measure: u32, beat_unit: u32) -> Result<Self, ConfigError> {
        if beats_per_measure == 0 || beat_unit == 0 {
            return Err(ConfigError::InvalidSignature { beats_per_measure, beat_unit });
        }
        Ok(Self { beats_per_measure, beat_unit })
    }

    pub fn beats_per_measure(self) -> u32 {
        self.beats_per_measure
    }

    pub fn beat_unit(self) -> u32 {
        self.beat_unit
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats_per_measure: 4, beat_unit: 4 }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_measure, self.beat_unit)
    }
}

impl FromStr for TimeSignature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedSignature(s.to_string());
        let (num, den) = s.split_once('/').ok_or_else(malformed)?;
        let num: u32 = num.trim().parse().map_err(|_| malformed())?;
        let den: u32 = den.trim().parse().map_err(|_| malformed())?;
        Self::new(num, den)
    }
}

pub fn seconds_per_beat(tempo: Tempo) -> f64 {
    60.0 / tempo.bpm()
}

pub fn beats_per_measure(signature: TimeSignature) -> u32 {
    signature.beats_per_measure()
}

/// Advance a beat counter inside a measure of `beats_per_measure` beats.
///
/// If the measure shrank underneath the counter (a signature change mid
/// measure), the next beat starts a fresh measure instead of landing
/// somewhere inside the new one.
pub fn next_beat_index(index: u32, beats_per_measure: u32) -> u32 {
    let next = index.saturating_add(1);
    if next >= beats_per_measure { 0 } else { next }
}

/// Seconds on a monotonic timeline shared by everything that needs to agree on "when".
pub trait TimeSource: Send + Sync {
    fn now(&self) -> f64;
}

#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to. Stored as f64 bits so it can be
/// shared with a scheduler thread.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { bits: AtomicU64::new(start.to_bits()) }
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
