// The layer between the TUI and everything else: turns semantic input events
// into grid edits and scheduler calls, and builds the DisplayState the TUI draws.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::clock::{self, SIGNATURE_PRESETS};
use crate::pipeline::PadGrid;
use crate::scheduler::{LoopScheduler, ScheduledBeat, SchedulerEvent, TransportConfig};
use crate::shared::{DialogView, DisplayState, InputEvent, NUM_COLUMNS, NUM_ROWS, PadId, PadView};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Dialog {
    Tempo { pending: f64 },
    Signature { selected: usize },
}

pub struct Middle {
    grid: Arc<PadGrid>,
    scheduler: LoopScheduler,
    cursor: PadId,
    dialog: Option<Dialog>,
    current_beat: Option<u32>,
    upcoming: VecDeque<ScheduledBeat>, // scheduled ahead, not yet due
    notice: String,
}

impl Middle {
    pub fn new(grid: Arc<PadGrid>, scheduler: LoopScheduler) -> Self {
        Self {
            grid,
            scheduler,
            cursor: PadId::new(0, 0),
            dialog: None,
            current_beat: None,
            upcoming: VecDeque::new(),
            notice: String::new(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        self.scheduler.transport()
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::MoveCursor { rows, columns } => {
                self.cursor = PadId::new(
                    wrap(self.cursor.row, rows, NUM_ROWS),
                    wrap(self.cursor.column, columns, NUM_COLUMNS),
                );
            }
            InputEvent::TogglePad => {
                let now_active = self.grid.toggle_pad(self.cursor);
                let row = self.cursor.row + 1;
                log::debug!("row {row} now on column {:?}", now_active.map(|c| c + 1));
            }
            InputEvent::PlayPress => self.toggle_playback(),

            InputEvent::OpenTempoDialog => {
                let pending = clock::ui_tempo(self.transport().tempo.bpm());
                self.dialog = Some(Dialog::Tempo { pending });
            }
            InputEvent::OpenSignatureDialog => {
                let current = self.transport().signature;
                let selected = SIGNATURE_PRESETS.iter().position(|s| *s == current).unwrap_or(2);
                self.dialog = Some(Dialog::Signature { selected });
            }
            InputEvent::NudgeTempo(delta) => {
                if let Some(Dialog::Tempo { pending }) = &mut self.dialog {
                    *pending = clock::ui_tempo(*pending + delta);
                }
            }
            InputEvent::CycleSignature(step) => {
                if let Some(Dialog::Signature { selected }) = &mut self.dialog {
                    *selected = wrap(*selected, step, SIGNATURE_PRESETS.len());
                }
            }
            InputEvent::ApplyDialog => self.apply_dialog(),
            InputEvent::CancelDialog => self.dialog = None,

            InputEvent::Quit => self.shutdown(),
        }
    }

    fn toggle_playback(&mut self) {
        if self.scheduler.is_running() {
            self.scheduler.stop();
            self.forget_beats();
            return;
        }
        if let Err(err) = self.scheduler.start() {
            log::error!("could not start scheduler: {err}");
            self.notice = format!("cannot start: {err}");
        }
    }

    fn apply_dialog(&mut self) {
        let result = match self.dialog.take() {
            Some(Dialog::Tempo { pending }) => self.scheduler.set_tempo(pending).map(|_| ()),
            Some(Dialog::Signature { selected }) => {
                let sig = SIGNATURE_PRESETS[selected % SIGNATURE_PRESETS.len()];
                self.scheduler
                    .set_time_signature(sig.beats_per_measure(), sig.beat_unit())
                    .map(|_| ())
            }
            None => Ok(()),
        };
        if let Err(err) = result {
            log::warn!("{err}");
            self.notice = err.to_string();
        }
    }

    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        self.forget_beats();
        self.dialog = None;
    }

    fn forget_beats(&mut self) {
        self.current_beat = None;
        self.upcoming.clear();
    }

    /// Drain whatever the scheduler has reported since the last frame.
    /// Beats arrive up to a look-ahead window early; the display only moves
    /// on once a beat's time has actually come.
    pub fn tick(&mut self) {
        for event in self.scheduler.poll_events() {
            match event {
                SchedulerEvent::Beat(beat) => self.upcoming.push_back(beat),
                SchedulerEvent::Skipped(skipped) => {
                    self.notice = format!("{} has no sample loaded", skipped.name);
                }
            }
        }
        if !self.scheduler.is_running() {
            self.forget_beats();
            return;
        }

        let now = self.scheduler.now();
        while let Some(beat) = self.upcoming.front().filter(|b| b.at <= now) {
            self.current_beat = Some(beat.index);
            self.upcoming.pop_front();
        }
    }

    pub fn display_state(&self) -> DisplayState {
        let pattern = self.grid.pattern();
        let transport = self.transport();

        let pads = std::array::from_fn(|row| {
            std::array::from_fn(|column| {
                let slot = self.grid.slot(PadId::new(row, column));
                PadView {
                    label: slot.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                    active: pattern.active_column(row) == Some(column),
                    loaded: slot.is_some_and(|s| s.is_loaded()),
                }
            })
        });

        let dialog = self.dialog.map(|d| match d {
            Dialog::Tempo { pending } => DialogView::Tempo { pending },
            Dialog::Signature { selected } => DialogView::Signature {
                options: SIGNATURE_PRESETS.iter().map(|s| s.to_string()).collect(),
                selected,
            },
        });

        DisplayState {
            pads,
            cursor: self.cursor,
            playing: self.scheduler.is_running(),
            tempo: transport.tempo.bpm(),
            signature: transport.signature.to_string(),
            beats_per_measure: transport.signature.beats_per_measure(),
            current_beat: self.current_beat,
            dialog,
            notice: self.notice.clone(),
        }
    }
}

fn wrap(value: usize, delta: i32, len: usize) -> usize {
    let len = len as i64;
    (value as i64 + delta as i64).rem_euclid(len) as usize
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::audio_api::{AudioEngine, BeatTime, SampleHandle};
    use crate::clock::ManualClock;
    use crate::error::LoadError;
    use crate::scheduler::SchedulerConfig;

    struct Silent;

    impl AudioEngine for Silent {
        fn load_sample(&self, path: &Path) -> Result<SampleHandle, LoadError> {
            Err(LoadError::Empty { path: path.to_path_buf() })
        }
        fn play(&self, _: SampleHandle, _: BeatTime) {}
        fn stop(&self, _: SampleHandle, _: BeatTime) {}
        fn is_loaded(&self, _: SampleHandle) -> bool {
            false
        }
    }

    fn middle_with_clock(clock: Arc<ManualClock>) -> Middle {
        let grid = Arc::new(PadGrid::new());
        let scheduler = LoopScheduler::new(
            SchedulerConfig::default(),
            TransportConfig::default(),
            grid.clone(),
            Arc::new(Silent),
            clock,
        );
        Middle::new(grid, scheduler)
    }

    fn middle() -> Middle {
        middle_with_clock(Arc::new(ManualClock::new(0.0)))
    }

    // tick until the scheduler thread has reported `count` beats in total
    fn drain_until(m: &mut Middle, count: usize, seen: &mut usize) {
        for _ in 0..400 {
            let before = m.upcoming.len();
            m.tick();
            *seen += m.upcoming.len().saturating_sub(before);
            if *seen >= count {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    #[test]
    fn cursor_wraps_around_the_grid() {
        let mut m = middle();
        m.handle_input(InputEvent::MoveCursor { rows: -1, columns: 0 });
        assert_eq!(m.display_state().cursor, PadId::new(5, 0));
        m.handle_input(InputEvent::MoveCursor { rows: 1, columns: 7 });
        assert_eq!(m.display_state().cursor, PadId::new(0, 1));
    }

    #[test]
    fn toggling_pads_keeps_one_per_row() {
        let mut m = middle();
        m.handle_input(InputEvent::MoveCursor { rows: 2, columns: 3 });
        m.handle_input(InputEvent::TogglePad);
        m.handle_input(InputEvent::MoveCursor { rows: 0, columns: 2 });
        m.handle_input(InputEvent::TogglePad);

        let ds = m.display_state();
        let active: Vec<bool> = ds.pads[2].iter().map(|p| p.active).collect();
        assert_eq!(active, vec![false, false, false, false, false, true]);

        m.handle_input(InputEvent::TogglePad);
        assert!(m.display_state().pads[2].iter().all(|p| !p.active));
    }

    #[test]
    fn tempo_dialog_clamps_and_applies() {
        let mut m = middle();
        m.handle_input(InputEvent::OpenTempoDialog);
        m.handle_input(InputEvent::NudgeTempo(100.0));
        assert_eq!(m.display_state().dialog, Some(DialogView::Tempo { pending: 200.0 }));
        m.handle_input(InputEvent::NudgeTempo(-10.0));
        m.handle_input(InputEvent::ApplyDialog);
        assert_eq!(m.transport().tempo.bpm(), 190.0);
        assert!(m.display_state().dialog.is_none());
    }

    #[test]
    fn cancelled_dialog_changes_nothing() {
        let mut m = middle();
        m.handle_input(InputEvent::OpenTempoDialog);
        m.handle_input(InputEvent::NudgeTempo(-30.0));
        m.handle_input(InputEvent::CancelDialog);
        assert_eq!(m.transport().tempo.bpm(), 120.0);

        m.handle_input(InputEvent::OpenSignatureDialog);
        m.handle_input(InputEvent::CycleSignature(1));
        m.handle_input(InputEvent::CancelDialog);
        assert_eq!(m.display_state().signature, "4/4");
    }

    #[test]
    fn signature_dialog_cycles_presets() {
        let mut m = middle();
        m.handle_input(InputEvent::OpenSignatureDialog);
        let dialog = m.display_state().dialog;
        assert!(matches!(dialog, Some(DialogView::Signature { selected: 2, .. })));
        m.handle_input(InputEvent::CycleSignature(1));
        m.handle_input(InputEvent::ApplyDialog);
        let ds = m.display_state();
        assert_eq!(ds.signature, "6/8");
        assert_eq!(ds.beats_per_measure, 6);

        m.handle_input(InputEvent::OpenSignatureDialog);
        m.handle_input(InputEvent::CycleSignature(-4));
        m.handle_input(InputEvent::ApplyDialog);
        assert_eq!(m.display_state().signature, "5/4");
    }

    #[test]
    fn play_press_starts_and_stops() {
        let mut m = middle();
        m.handle_input(InputEvent::PlayPress);
        assert!(m.is_playing());
        m.handle_input(InputEvent::PlayPress);
        assert!(!m.is_playing());
        m.tick();
        assert_eq!(m.display_state().current_beat, None);
    }

    #[test]
    fn unloaded_pad_shows_a_notice() {
        let mut m = middle();
        m.handle_input(InputEvent::TogglePad);
        m.handle_input(InputEvent::PlayPress);
        // the first tick runs as soon as the thread starts; wait for it
        for _ in 0..200 {
            m.tick();
            if !m.display_state().notice.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        m.handle_input(InputEvent::Quit);
        assert_eq!(m.display_state().notice, "Loop R1C1 has no sample loaded");
        assert!(!m.is_playing());
    }

    #[test]
    fn beat_display_waits_for_the_beat_to_come_due() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut m = middle_with_clock(clock.clone());
        let mut seen = 0;

        // beat 0 lands at the start time, so it shows straight away
        m.handle_input(InputEvent::PlayPress);
        for _ in 0..400 {
            m.tick();
            if m.display_state().current_beat.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(m.display_state().current_beat, Some(0));
        seen += 1;

        // beat 1 at 0.5s is scheduled from 0.45s on, but not shown yet
        clock.set(0.45);
        drain_until(&mut m, 2, &mut seen);
        assert_eq!(m.upcoming.len(), 1);
        assert_eq!(m.display_state().current_beat, Some(0));

        clock.set(0.5);
        m.tick();
        assert_eq!(m.display_state().current_beat, Some(1));
        assert!(m.upcoming.is_empty());

        m.handle_input(InputEvent::PlayPress);
        m.tick();
        assert_eq!(m.display_state().current_beat, None);
    }
}
