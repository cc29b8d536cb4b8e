// One stereo frame; the engine renders in these and interleaves at the end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub const SILENCE: Self = Self { left: 0.0, right: 0.0 };

    pub fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    pub fn add_scaled(&mut self, other: StereoFrame, gain: f32) {
        self.left += other.left * gain;
        self.right += other.right * gain;
    }
}

/// Write rendered frames into a device buffer with `channels` interleaved
/// channels. Mono devices get the average; extra channels get silence.
pub fn interleave(frames: &[StereoFrame], out: &mut [f32], channels: usize) {
    if channels == 0 {
        return;
    }
    for (frame, chunk) in frames.iter().zip(out.chunks_exact_mut(channels)) {
        match chunk {
            [only] => *only = (frame.left + frame.right) * 0.5,
            [left, right, rest @ ..] => {
                *left = frame.left;
                *right = frame.right;
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_stereo_and_mono() {
        let frames = [StereoFrame { left: 0.5, right: -0.5 }, StereoFrame::mono(0.25)];

        let mut stereo = [9.0; 4];
        interleave(&frames, &mut stereo, 2);
        assert_eq!(stereo, [0.5, -0.5, 0.25, 0.25]);

        let mut mono = [9.0; 2];
        interleave(&frames, &mut mono, 1);
        assert_eq!(mono, [0.0, 0.25]);

        let mut quad = [9.0; 4];
        interleave(&frames[..1], &mut quad, 4);
        assert_eq!(quad, [0.5, -0.5, 0.0, 0.0]);
    }
}
