//! Audio playback to speakers

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::{Error, Result};

/// Plays synthesized speech to completion
///
/// `play_to_end` resolves once the clip has finished (or failed), which is
/// what lets the sequencer order "reply finished, then unlock and advance"
/// without completion callbacks.
#[async_trait]
pub trait AudioSink: Send {
    /// Play a WAV clip and wait for it to finish
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    async fn play_to_end(&mut self, wav: &[u8]) -> Result<()>;
}

/// Plays WAV clips on the default output device via cpal
///
/// The output stream is created per clip and dropped when the clip ends,
/// so at most one playback handle is ever live.
pub struct SpeakerSink;

impl SpeakerSink {
    /// Create a playback sink, verifying an output device exists
    ///
    /// # Errors
    ///
    /// Returns error if no output device is available
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            "speaker sink initialized"
        );

        Ok(Self)
    }

    /// Play mono samples at `sample_rate`, blocking until done
    #[allow(clippy::cast_precision_loss)]
    fn play_samples_blocking(samples: Vec<f32>, sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device".to_string()))?;

        let supported_config = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                (c.channels() == 1 || c.channels() == 2)
                    && c.min_sample_rate() <= SampleRate(sample_rate)
                    && c.max_sample_rate() >= SampleRate(sample_rate)
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config: StreamConfig = supported_config
            .with_sample_rate(SampleRate(sample_rate))
            .config();
        let channels = config.channels as usize;

        let shared = Arc::new(Mutex::new((samples, 0usize, false)));
        let shared_cb = Arc::clone(&shared);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut state = shared_cb.lock().unwrap();
                    let (samples, pos, finished) = &mut *state;

                    for frame in data.chunks_mut(channels) {
                        let sample = if *pos < samples.len() {
                            let s = samples[*pos];
                            *pos += 1;
                            s
                        } else {
                            *finished = true;
                            0.0
                        };
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "playback stream error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        let sample_count = shared.lock().unwrap().0.len();
        let duration_ms = (sample_count as u64 * 1000) / u64::from(sample_rate);

        // Poll for completion, bounded by the clip duration plus margin
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(duration_ms + 500);

        while !shared.lock().unwrap().2 {
            if start.elapsed() > timeout {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        // Let the device drain the tail
        std::thread::sleep(std::time::Duration::from_millis(100));

        drop(stream);
        tracing::debug!(samples = sample_count, "playback complete");

        Ok(())
    }
}

#[async_trait]
impl AudioSink for SpeakerSink {
    #[allow(clippy::unused_async)]
    async fn play_to_end(&mut self, wav: &[u8]) -> Result<()> {
        let (samples, sample_rate) = decode_wav(wav)?;
        Self::play_samples_blocking(samples, sample_rate)
    }
}

/// Decode WAV bytes to mono f32 samples plus the source sample rate
fn decode_wav(wav: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::new(Cursor::new(wav))
        .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?,
        hound::SampleFormat::Int => {
            let max = f32::from(i16::MAX);
            let shift = i32::from(spec.bits_per_sample.saturating_sub(16));
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as f32 / max))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?
        }
    };

    // Downmix to mono by averaging frames
    #[allow(clippy::cast_precision_loss)]
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::samples_to_wav;

    #[test]
    fn test_decode_mono_wav() {
        let original = vec![0.0f32, 0.5, -0.5, 0.25];
        let wav = samples_to_wav(&original, 16000).unwrap();

        let (samples, rate) = decode_wav(&wav).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(samples.len(), original.len());
        for (decoded, expected) in samples.iter().zip(&original) {
            assert!((decoded - expected).abs() < 0.001);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_wav(b"not a wav file").is_err());
    }
}
