// The look-ahead loop itself. No threads and no clocks in here: the caller
// says what time it is, and `BeatClock::tick` schedules every beat that falls
// inside the window.

use crate::audio_api::{AudioEngine, BeatTime, SampleHandle};
use crate::clock;
use crate::pipeline::{PatternStore, SampleSlot};
use crate::shared::NUM_ROWS;

use super::transport::SharedTransport;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledBeat {
    pub index: u32,
    pub at: BeatTime,
    pub seconds_per_beat: f64,
}

/// A pad that came due on a measure boundary. `slot` is `None` when the pad's
/// sample was not loaded and nothing was played.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerEvent {
    pub row: usize,
    pub column: usize,
    pub slot: Option<SampleSlot>,
    pub at: BeatTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedTrigger {
    pub row: usize,
    pub column: usize,
    pub name: String,
    pub at: BeatTime,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub beats: Vec<ScheduledBeat>,
    pub triggers: Vec<TriggerEvent>,
    pub skipped: Vec<SkippedTrigger>,
}

/// Per-run scheduling state. Created on start, dropped on stop.
#[derive(Debug)]
pub struct BeatClock {
    next_beat_time: BeatTime,
    beat_index: u32,
    sounding: [Option<SampleHandle>; NUM_ROWS], // what each row is currently playing
}

impl BeatClock {
    pub fn start(now: BeatTime) -> Self {
        Self {
            next_beat_time: now,
            beat_index: 0,
            sounding: [None; NUM_ROWS],
        }
    }

    pub fn next_beat_time(&self) -> BeatTime {
        self.next_beat_time
    }

    pub fn beat_index(&self) -> u32 {
        self.beat_index
    }

    pub fn sounding(&self, row: usize) -> Option<SampleHandle> {
        self.sounding.get(row).copied().flatten()
    }

    /// Schedule every beat with `next_beat_time < now + look_ahead`.
    ///
    /// A late tick schedules all the beats it missed, and the cursor only ever
    /// moves by whole beat durations, so timing error never accumulates.
    /// Tempo and signature are re-read for each beat.
    pub fn tick(
        &mut self,
        now: BeatTime,
        look_ahead: f64,
        transport: &SharedTransport,
        store: &dyn PatternStore,
        engine: &dyn AudioEngine,
    ) -> TickReport {
        let mut report = TickReport::default();

        while self.next_beat_time < now + look_ahead {
            let snapshot = transport.snapshot();
            let beats_per_measure = clock::beats_per_measure(snapshot.signature);
            let seconds_per_beat = clock::seconds_per_beat(snapshot.tempo);
            let at = self.next_beat_time;

            // the cursor has to move, or this loop never ends
            if at + seconds_per_beat <= at {
                log::warn!("beat of {seconds_per_beat}s is lost at {at}s, holding the cursor");
                break;
            }

            // the measure shrank under the counter: this beat opens a new one
            if self.beat_index >= beats_per_measure {
                self.beat_index = 0;
            }

            if self.beat_index == 0 {
                self.trigger_measure(at, store, engine, &mut report);
            }

            report.beats.push(ScheduledBeat {
                index: self.beat_index,
                at,
                seconds_per_beat,
            });

            self.beat_index = clock::next_beat_index(self.beat_index, beats_per_measure);
            self.next_beat_time += seconds_per_beat;
        }

        report
    }

    fn trigger_measure(
        &mut self,
        at: BeatTime,
        store: &dyn PatternStore,
        engine: &dyn AudioEngine,
        report: &mut TickReport,
    ) {
        for (row, column) in store.active_columns().into_iter().enumerate() {
            let Some(column) = column else {
                self.silence_row(row, at, engine);
                continue;
            };

            let slot = store.sample(row, column);
            match slot.handle.filter(|&handle| engine.is_loaded(handle)) {
                Some(handle) => {
                    if let Some(previous) = self.sounding[row].replace(handle) {
                        if previous != handle {
                            engine.stop(previous, at);
                        }
                    }
                    engine.play(handle, at);
                    report.triggers.push(TriggerEvent { row, column, slot: Some(slot), at });
                }
                None => {
                    let (r, c) = (row + 1, column + 1);
                    log::warn!("{} (row {r}, column {c}) is not loaded, skipping", slot.name);
                    self.silence_row(row, at, engine);
                    report.triggers.push(TriggerEvent { row, column, slot: None, at });
                    report.skipped.push(SkippedTrigger { row, column, name: slot.name, at });
                }
            }
        }
    }

    fn silence_row(&mut self, row: usize, at: BeatTime, engine: &dyn AudioEngine) {
        if let Some(previous) = self.sounding[row].take() {
            engine.stop(previous, at);
        }
    }

    /// Stop whatever the rows are still playing.
    pub fn release(&mut self, at: BeatTime, engine: &dyn AudioEngine) {
        for row in 0..NUM_ROWS {
            self.silence_row(row, at, engine);
        }
    }
}
