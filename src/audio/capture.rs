//! Microphone capture

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for clip capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Source of recorded practice clips
///
/// Implementations own at most one live capture handle; `start` while a
/// stale handle exists releases it before acquiring a new one.
pub trait Recorder {
    /// Begin capturing from the microphone
    ///
    /// # Errors
    ///
    /// Returns error if the device is unavailable or capture cannot start
    fn start(&mut self) -> Result<()>;

    /// Stop capturing and return the finalized clip as WAV bytes
    ///
    /// # Errors
    ///
    /// Returns error if no capture is active or encoding fails
    fn stop(&mut self) -> Result<Vec<u8>>;

    /// Whether a capture is currently active
    fn is_recording(&self) -> bool;
}

/// Captures clips from the default input device via cpal
pub struct MicRecorder {
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl MicRecorder {
    /// Create a recorder bound to the default input device
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if no input device is available (missing
    /// hardware or OS-level microphone access denied)
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host.default_input_device().ok_or_else(|| {
            Error::PermissionDenied("no input device available".to_string())
        })?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable input config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "microphone recorder initialized"
        );

        Ok(Self {
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Snapshot of the capture buffer without consuming it (level meters)
    #[must_use]
    pub fn peek_samples(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    fn input_device() -> Result<Device> {
        cpal::default_host()
            .default_input_device()
            .ok_or_else(|| Error::PermissionDenied("no input device available".to_string()))
    }
}

impl Recorder for MicRecorder {
    fn start(&mut self) -> Result<()> {
        // Release any stale handle before acquiring a new one
        if let Some(stale) = self.stream.take() {
            drop(stale);
            tracing::debug!("stale capture handle released");
        }
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        let buffer = Arc::clone(&self.buffer);
        let device = Self::input_device()?;
        let config = self.config.clone();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "capture stream error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("capture started");
        Ok(())
    }

    fn stop(&mut self) -> Result<Vec<u8>> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| Error::Audio("no capture active".to_string()))?;
        drop(stream);

        let samples = self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        tracing::debug!(samples = samples.len(), "capture stopped");
        samples_to_wav(&samples, SAMPLE_RATE)
    }

    fn is_recording(&self) -> bool {
        self.stream.is_some()
    }
}

/// Encode f32 samples as 16-bit mono WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_to_wav_header() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0];
        let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert!(wav.len() > 44);
    }

    #[test]
    fn test_wav_spec_roundtrip() {
        let samples = vec![0.25f32; 160];
        let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.channels, 1);
        assert_eq!(reader.len(), 160);
    }
}
