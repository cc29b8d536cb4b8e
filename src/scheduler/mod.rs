// Drives `BeatClock` from a timer thread and exposes the controls the app
// layer uses: start, stop, tempo, signature.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select};

use crate::audio_api::AudioEngine;
use crate::clock::{Tempo, TimeSignature, TimeSource};
use crate::error::ConfigError;
use crate::pipeline::PatternStore;

mod beat_clock;
mod transport;

pub use beat_clock::{BeatClock, ScheduledBeat, SkippedTrigger, TickReport, TriggerEvent};
pub use transport::{SharedTransport, TransportConfig};

const EVENT_QUEUE: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    tick_interval: Duration,
    schedule_ahead: Duration,
}

impl SchedulerConfig {
    /// The window has to be longer than the tick, otherwise a slightly late
    /// tick leaves a gap nobody scheduled.
    pub fn new(tick_interval: Duration, schedule_ahead: Duration) -> Result<Self, ConfigError> {
        if tick_interval.is_zero() || schedule_ahead <= tick_interval {
            return Err(ConfigError::WindowTooShort { tick: tick_interval, ahead: schedule_ahead });
        }
        Ok(Self { tick_interval, schedule_ahead })
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn schedule_ahead(&self) -> Duration {
        self.schedule_ahead
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(25),
            schedule_ahead: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// What the scheduler thread reports back to whoever is drawing the screen.
#[derive(Clone, Debug, PartialEq)]
pub enum SchedulerEvent {
    Beat(ScheduledBeat),
    Skipped(SkippedTrigger),
}

struct Running {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

pub struct LoopScheduler {
    config: SchedulerConfig,
    transport: Arc<SharedTransport>,
    store: Arc<dyn PatternStore>,
    engine: Arc<dyn AudioEngine>,
    clock: Arc<dyn TimeSource>,
    events_tx: Sender<SchedulerEvent>,
    events_rx: Receiver<SchedulerEvent>,
    running: Option<Running>,
}

impl LoopScheduler {
    pub fn new(
        config: SchedulerConfig,
        transport: TransportConfig,
        store: Arc<dyn PatternStore>,
        engine: Arc<dyn AudioEngine>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::bounded(EVENT_QUEUE);
        Self {
            config,
            transport: Arc::new(SharedTransport::new(transport)),
            store,
            engine,
            clock,
            events_tx,
            events_rx,
            running: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.is_some() { SchedulerState::Running } else { SchedulerState::Stopped }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    pub fn transport(&self) -> TransportConfig {
        self.transport.snapshot()
    }

    pub fn set_tempo(&self, bpm: f64) -> Result<Tempo, ConfigError> {
        let tempo = self.transport.set_tempo(bpm)?;
        log::info!("tempo set to {tempo}");
        Ok(tempo)
    }

    pub fn set_time_signature(
        &self,
        beats_per_measure: u32,
        beat_unit: u32,
    ) -> Result<TimeSignature, ConfigError> {
        let signature = TimeSignature::new(beats_per_measure, beat_unit)?;
        self.transport.set_signature(signature);
        log::info!("time signature set to {signature}");
        Ok(signature)
    }

    /// Begin ticking from beat 0 of a fresh measure. Does nothing if already running.
    pub fn start(&mut self) -> std::io::Result<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let worker = Worker {
            config: self.config,
            transport: Arc::clone(&self.transport),
            store: Arc::clone(&self.store),
            engine: Arc::clone(&self.engine),
            clock: Arc::clone(&self.clock),
            events_tx: self.events_tx.clone(),
        };

        let thread = thread::Builder::new()
            .name("loopstation-scheduler".into())
            .spawn(move || worker.run(stop_rx))?;

        self.running = Some(Running { stop_tx, thread });
        log::info!("scheduler started");
        Ok(())
    }

    /// Stop ticking. Returns once the scheduler thread has finished its
    /// current tick and exited.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.stop_tx.send(());
        if running.thread.join().is_err() {
            log::error!("scheduler thread panicked");
        }
        log::info!("scheduler stopped");
    }

    /// The scheduler's own clock, which beat times are measured against.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn poll_events(&self) -> Vec<SchedulerEvent> {
        self.events_rx.try_iter().collect()
    }
}

impl Drop for LoopScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    config: SchedulerConfig,
    transport: Arc<SharedTransport>,
    store: Arc<dyn PatternStore>,
    engine: Arc<dyn AudioEngine>,
    clock: Arc<dyn TimeSource>,
    events_tx: Sender<SchedulerEvent>,
}

impl Worker {
    fn run(self, stop_rx: Receiver<()>) {
        let look_ahead = self.config.schedule_ahead.as_secs_f64();
        let ticker = crossbeam_channel::tick(self.config.tick_interval);
        let mut beat_clock = BeatClock::start(self.clock.now());

        loop {
            let now = self.clock.now();
            let report =
                beat_clock.tick(now, look_ahead, &self.transport, &*self.store, &*self.engine);
            self.publish(report);

            select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {}
            }
        }

        beat_clock.release(self.clock.now(), &*self.engine);
    }

    fn publish(&self, report: TickReport) {
        for beat in report.beats {
            log::debug!("beat {} at {:.3}s", beat.index, beat.at);
            let _ = self.events_tx.try_send(SchedulerEvent::Beat(beat));
        }
        for skipped in report.skipped {
            let _ = self.events_tx.try_send(SchedulerEvent::Skipped(skipped));
        }
    }
}
