//! WAV file writer for generated song audio.
//!
//! Writes decoded audio back to 16-bit PCM using the hound crate, which is
//! the speech API's native encoding.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::pcm::{sample_to_pcm16, AudioPcmBuffer};
use crate::error::{DaemonError, ErrorCode, Result};

/// Bits per sample for exported WAV files.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Writes an audio buffer to a WAV file.
///
/// # Example
///
/// ```ignore
/// use lyricloom_daemon::audio::{decode_pcm16, write_wav};
///
/// let buffer = decode_pcm16(&bytes, 24000, 1)?;
/// write_wav(&buffer, Path::new("/tmp/song.wav"))?;
/// ```
pub fn write_wav(buffer: &AudioPcmBuffer, path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.channel_count(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| {
        DaemonError::with_source(
            ErrorCode::ExportFailed,
            format!("Failed to create WAV file {}", path.display()),
            e,
        )
    })?;

    for sample in buffer.interleaved() {
        writer
            .write_sample(sample_to_pcm16(sample))
            .map_err(|e| DaemonError::export_failed(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| DaemonError::export_failed(format!("Failed to finalize WAV file: {}", e)))?;

    tracing::info!(
        path = %path.display(),
        frames = buffer.frame_count(),
        "wrote WAV file"
    );
    Ok(())
}
