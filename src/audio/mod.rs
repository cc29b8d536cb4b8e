use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::{AudioCommand, AudioEngine, BeatTime};
use crate::clock::{MonotonicClock, TimeSource};
use crate::error::LoadError;

mod engine;
mod frame;
mod handle;
mod sample_buffer;
mod voice;

pub use engine::Engine;
pub use frame::{StereoFrame, interleave};
pub use handle::{SampleHandle, next_sample_handle};
pub use sample_buffer::SampleBuffer;

const COMMAND_QUEUE: usize = 1024;
const MAX_BLOCK_FRAMES: usize = 8192;

/// Owns the output stream. Keep it alive for as long as there should be sound;
/// hand `port()` to anything that needs to talk to the engine.
pub struct AudioHandle {
    port: AudioPort,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn port(&self) -> AudioPort {
        self.port.clone()
    }

    pub fn stop_all(&self) {
        self.port.send(AudioCommand::StopAll);
    }
}

/// The sending half of the engine: cheap to clone, safe to share with the
/// scheduler thread.
#[derive(Clone)]
pub struct AudioPort {
    tx: Sender<AudioCommand>,
    loaded: Arc<RwLock<HashSet<SampleHandle>>>,
    sample_rate: u32,
}

impl AudioPort {
    pub fn new(tx: Sender<AudioCommand>, sample_rate: u32) -> Self {
        Self {
            tx,
            loaded: Arc::new(RwLock::new(HashSet::new())),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn send(&self, cmd: AudioCommand) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("audio queue rejected a command: {err}");
                false
            }
        }
    }
}

impl AudioEngine for AudioPort {
    fn load_sample(&self, path: &Path) -> Result<SampleHandle, LoadError> {
        let buffer = SampleBuffer::load_wav(path, self.sample_rate)?;
        let handle = next_sample_handle();
        let frames = buffer.len();
        if !self.send(AudioCommand::RegisterSample { handle, buffer }) {
            return Err(LoadError::QueueFull { path: path.to_path_buf() });
        }
        if let Ok(mut loaded) = self.loaded.write() {
            loaded.insert(handle);
        }
        log::info!("loaded {} as {handle} ({frames} frames)", path.display());
        Ok(handle)
    }

    fn play(&self, handle: SampleHandle, at: BeatTime) {
        self.send(AudioCommand::Play { handle, at });
    }

    fn stop(&self, handle: SampleHandle, at: BeatTime) {
        self.send(AudioCommand::Stop { handle, at });
    }

    fn is_loaded(&self, handle: SampleHandle) -> bool {
        self.loaded.read().map(|set| set.contains(&handle)).unwrap_or(false)
    }
}

pub fn start_audio(clock: MonotonicClock) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate();
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream =
                build_output_stream_f32(&device, &config.into(), rx, clock, sample_rate, channels)?;
            output_stream.play().context("failed to play output stream")?;
            log::info!("audio output running at {sample_rate} Hz, {channels} channels");

            Ok(AudioHandle {
                port: AudioPort::new(tx, sample_rate),
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    clock: MonotonicClock,
    sample_rate: u32,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(sample_rate);
    let mut scratch = vec![StereoFrame::SILENCE; MAX_BLOCK_FRAMES];

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            let now = clock.now();
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd, now);
            }

            // render in chunks so the scratch buffer never has to grow here
            for chunk in data.chunks_mut(MAX_BLOCK_FRAMES * channels.max(1)) {
                let n_frames = chunk.len() / channels.max(1);
                let frames = &mut scratch[..n_frames];
                engine.render_block(frames);
                interleave(frames, chunk, channels);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tone(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(if i % 2 == 0 { 8192i16 } else { -8192 }).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loading_registers_the_buffer_before_the_handle_counts_as_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.wav");
        write_tone(&path, 100);

        let (tx, rx) = crossbeam_channel::bounded(4);
        let port = AudioPort::new(tx, 16000);
        let handle = port.load_sample(&path).unwrap();

        assert!(port.is_loaded(handle));
        match rx.try_recv().unwrap() {
            AudioCommand::RegisterSample { handle: registered, buffer } => {
                assert_eq!(registered, handle);
                assert_eq!(buffer.len(), 200);
            }
            other => panic!("expected a registration, got {other:?}"),
        }
    }

    #[test]
    fn failed_loads_leave_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = crossbeam_channel::bounded(4);
        let port = AudioPort::new(tx, 44100);

        assert!(port.load_sample(&dir.path().join("missing.wav")).is_err());
        assert!(rx.try_recv().is_err());
        assert!(!port.is_loaded(SampleHandle(u64::MAX)));
    }

    #[test]
    fn a_full_queue_is_reported_as_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.wav");
        write_tone(&path, 10);

        let (tx, _rx) = crossbeam_channel::bounded(1);
        let port = AudioPort::new(tx, 8000);
        let first = port.load_sample(&path).unwrap();
        let second = port.load_sample(&path);

        assert!(port.is_loaded(first));
        assert!(matches!(second, Err(LoadError::QueueFull { .. })));
    }

    #[test]
    fn play_and_stop_go_out_in_order() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let port = AudioPort::new(tx, 44100);
        port.play(SampleHandle(3), 1.0);
        port.stop(SampleHandle(3), 2.0);

        let sent: Vec<AudioCommand> = rx.try_iter().collect();
        assert!(matches!(sent[0], AudioCommand::Play { handle: SampleHandle(3), at } if at == 1.0));
        assert!(matches!(sent[1], AudioCommand::Stop { handle: SampleHandle(3), at } if at == 2.0));
    }
}
