use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;

/// Decoded WAV file as planar `f32` channels.
pub struct WavData {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl WavData {
    pub fn frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Planar slices for `frames` starting at `start`, clipped to the file.
    pub fn block(&self, start: usize, frames: usize) -> Vec<&[f32]> {
        let end = (start + frames).min(self.frames());
        let start = start.min(end);
        self.channels.iter().map(|c| &c[start..end]).collect()
    }
}

/// Loads a WAV file, normalizing integer formats to [-1, 1].
pub fn load_wav(path: &Path) -> Result<WavData> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(anyhow!("{} has no channels", path.display()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let num_channels = spec.channels as usize;
    let mut channels = vec![Vec::with_capacity(interleaved.len() / num_channels); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    info!(
        "Loaded {}: {} channel(s), {} Hz, {} frames",
        path.display(),
        num_channels,
        spec.sample_rate,
        channels[0].len()
    );

    Ok(WavData {
        channels,
        sample_rate: spec.sample_rate,
    })
}
