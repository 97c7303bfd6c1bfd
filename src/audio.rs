//! PCM audio — decoding synthesized speech into normalized samples.
//!
//! The speech model returns raw 16-bit little-endian PCM, 24 kHz mono,
//! base64-encoded. We decode it into `f32` samples in `[-1, 1]`.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use hound::{SampleFormat, WavSpec, WavWriter};

pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
pub const SPEECH_CHANNELS: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("invalid base64 audio: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("wav encode failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Decoded, interleaved audio ready for an output device.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Decode base64 speech output (16-bit LE PCM, 24 kHz, mono).
    ///
    /// # Errors
    ///
    /// The payload is not valid base64.
    pub fn from_base64_pcm(data: &str) -> Result<Self, AudioError> {
        let bytes = STANDARD.decode(data.trim())?;
        Ok(Self { samples: decode_pcm16_le(&bytes), sample_rate: SPEECH_SAMPLE_RATE, channels: SPEECH_CHANNELS })
    }

    /// Frames per channel.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate.max(1))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encode as a 16-bit WAV file.
    ///
    /// # Errors
    ///
    /// The WAV writer rejected the spec or a sample.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, AudioError> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &self.samples {
            writer.write_sample(to_i16(sample))?;
        }
        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}

/// Convert 16-bit little-endian PCM into samples in `[-1, 1]`.
/// A trailing odd byte is dropped.
#[must_use]
pub fn decode_pcm16_le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}

#[cfg(test)]
#[path = "audio_test.rs"]
mod tests;
