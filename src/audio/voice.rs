use super::frame::StereoFrame;
use super::handle::SampleHandle;
use super::sample_buffer::SampleBuffer;

/// One looping playback of a sample. A voice can be told to (re)start and to
/// stop some number of frames in the future, which is how scheduled times
/// from the beat clock land on the right frame.
#[derive(Clone, Debug)]
pub struct Voice {
    pub handle: SampleHandle,
    pub gain: f32,
    pos: usize,
    started: bool,
    restart_in: Option<usize>,
    stop_in: Option<usize>,
    active: bool,
}

impl Voice {
    pub fn new(handle: SampleHandle, gain: f32, delay: usize) -> Self {
        Self {
            handle,
            gain,
            pos: 0,
            started: false,
            restart_in: Some(delay),
            stop_in: None,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_stopping(&self) -> bool {
        self.stop_in.is_some()
    }

    /// Jump back to the top of the loop after `delay` frames.
    pub fn retrigger(&mut self, delay: usize) {
        self.restart_in = Some(delay);
    }

    /// Go silent after `delay` frames. An earlier pending stop wins.
    pub fn stop_after(&mut self, delay: usize) {
        self.stop_in = Some(self.stop_in.map_or(delay, |pending| pending.min(delay)));
    }

    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        if buffer.is_empty() {
            self.active = false;
            return;
        }

        for frame in out.iter_mut() {
            if let Some(remaining) = self.stop_in {
                if remaining == 0 {
                    self.active = false;
                    return;
                }
                self.stop_in = Some(remaining - 1);
            }

            if let Some(remaining) = self.restart_in {
                if remaining == 0 {
                    self.pos = 0;
                    self.started = true;
                    self.restart_in = None;
                } else {
                    self.restart_in = Some(remaining - 1);
                }
            }

            if !self.started {
                continue;
            }

            frame.add_scaled(buffer.data[self.pos], self.gain);
            self.pos += 1;
            if self.pos >= buffer.len() {
                self.pos = 0; // loops run until stopped
            }
        }
    }
}
