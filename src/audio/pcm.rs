//! 16-bit PCM decoding for speech payloads.
//!
//! The speech API returns base64 encoded little-endian signed 16-bit PCM.
//! Samples are normalized by dividing by 32768, so the decoded range is
//! [-1.0, 1.0).

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{DaemonError, Result};

/// Sample rate of speech API audio (24kHz).
pub const SAMPLE_RATE: u32 = 24000;

/// Number of channels in speech API audio (mono).
pub const CHANNELS: u16 = 1;

/// Divisor mapping an i16 sample into [-1.0, 1.0).
pub const PCM16_SCALE: f32 = 32768.0;

/// Decoded floating-point audio, one sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPcmBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioPcmBuffer {
    /// Creates a buffer from per-channel samples.
    ///
    /// Returns an error if the rate is zero, there are no channels, or the
    /// channels differ in length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DaemonError::decode_failed("sample rate must be > 0"));
        }
        let Some(first) = channels.first() else {
            return Err(DaemonError::decode_failed("channel count must be > 0"));
        };
        let frames = first.len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(DaemonError::decode_failed("channels have different lengths"));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Samples of one channel, or None if out of range.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Playback duration of the buffer.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// Returns the samples interleaved frame by frame.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}

/// Decodes raw little-endian 16-bit PCM into a normalized buffer.
///
/// `bytes` holds interleaved frames of `channel_count` samples. Fails when
/// the length is not a multiple of `2 * channel_count`.
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channel_count: u16) -> Result<AudioPcmBuffer> {
    if channel_count == 0 {
        return Err(DaemonError::decode_failed("channel count must be > 0"));
    }
    if sample_rate == 0 {
        return Err(DaemonError::decode_failed("sample rate must be > 0"));
    }

    let channel_count = channel_count as usize;
    let frame_bytes = 2 * channel_count;
    if bytes.len() % frame_bytes != 0 {
        return Err(DaemonError::decode_failed(format!(
            "byte length {} is not a multiple of {}",
            bytes.len(),
            frame_bytes
        )));
    }

    let frame_count = bytes.len() / frame_bytes;
    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for (i, pair) in bytes.chunks_exact(2).enumerate() {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        channels[i % channel_count].push(sample as f32 / PCM16_SCALE);
    }

    AudioPcmBuffer::new(sample_rate, channels)
}

/// Decodes a base64 payload of 16-bit PCM.
pub fn decode_base64_pcm(
    payload: &str,
    sample_rate: u32,
    channel_count: u16,
) -> Result<AudioPcmBuffer> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DaemonError::decode_failed(format!("invalid base64: {}", e)))?;
    decode_pcm16(&bytes, sample_rate, channel_count)
}

/// Converts a normalized sample back to i16, clamping to the valid range.
pub fn sample_to_pcm16(sample: f32) -> i16 {
    (sample * PCM16_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
