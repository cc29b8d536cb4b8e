use std::path::Path;

use super::frame::StereoFrame;
use crate::error::LoadError;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // at the engine's sample rate
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Decode a WAV file and bring it to stereo at `target_rate`
    pub fn load_wav(path: &Path, target_rate: u32) -> Result<Self, LoadError> {
        let wav_err = |source| LoadError::Wav { path: path.to_path_buf(), source };

        let mut reader = hound::WavReader::open(path).map_err(wav_err)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(wav_err)?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(wav_err)?
            }
        };

        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| match c {
                [l, r, ..] => StereoFrame { left: *l, right: *r },
                [m] => StereoFrame::mono(*m),
                [] => StereoFrame::SILENCE,
            })
            .collect();

        if frames.is_empty() {
            return Err(LoadError::Empty { path: path.to_path_buf() });
        }

        Ok(Self { data: resample_linear(&frames, spec.sample_rate, target_rate) })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || source_rate == 0 || target_rate == 0 {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx >= last {
                return frames[last];
            }
            let frac = (src_pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left + (b.left - a.left) * frac,
                right: a.right + (b.right - a.right) * frac,
            }
        })
        .collect()
}
