use std::collections::HashMap;

use crate::audio_api::{AudioCommand, BeatTime};

use super::frame::StereoFrame;
use super::handle::SampleHandle;
use super::sample_buffer::SampleBuffer;
use super::voice::Voice;

const MAX_VOICES: usize = 16; // hard cap so we never allocate voices in the callback
const SAMPLE_CAPACITY: usize = 64;
const VOICE_GAIN: f32 = 0.8;

pub struct Engine {
    sample_rate: f32,
    samples: HashMap<SampleHandle, SampleBuffer>,
    voices: [Option<Voice>; MAX_VOICES],
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            samples: HashMap::with_capacity(SAMPLE_CAPACITY),
            voices: std::array::from_fn(|_| None),
        }
    }

    /// `now` is the shared clock reading for the start of the next block.
    pub fn handle_cmd(&mut self, cmd: AudioCommand, now: BeatTime) {
        match cmd {
            AudioCommand::RegisterSample { handle, buffer } => {
                self.samples.insert(handle, buffer);
            }
            AudioCommand::Play { handle, at } => self.play(handle, self.frames_until(at, now)),
            AudioCommand::Stop { handle, at } => {
                let delay = self.frames_until(at, now);
                for voice in self.voices.iter_mut().flatten() {
                    if voice.handle == handle {
                        voice.stop_after(delay);
                    }
                }
            }
            AudioCommand::StopAll => self.voices.iter_mut().for_each(|v| *v = None),
        }
    }

    fn play(&mut self, handle: SampleHandle, delay: usize) {
        if !self.samples.contains_key(&handle) {
            return;
        }

        // a loop that is already running just jumps back to its start
        if let Some(voice) = self
            .voices
            .iter_mut()
            .flatten()
            .find(|v| v.handle == handle && !v.is_stopping())
        {
            voice.retrigger(delay);
            return;
        }

        let slot = self.voices.iter().position(Option::is_none).unwrap_or(0);
        self.voices[slot] = Some(Voice::new(handle, VOICE_GAIN, delay));
    }

    fn frames_until(&self, at: BeatTime, now: BeatTime) -> usize {
        ((at - now) * self.sample_rate as f64).round().max(0.0) as usize
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().flatten().filter(|v| v.is_active()).count()
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::SILENCE);

        let Self { samples, voices, .. } = self;
        for slot in voices.iter_mut() {
            let Some(voice) = slot.as_mut() else { continue };
            match samples.get(&voice.handle) {
                Some(buffer) => voice.render_into(buffer, out),
                None => *slot = None,
            }
            if slot.as_ref().is_some_and(|v| !v.is_active()) {
                *slot = None;
            }
        }
    }
}
