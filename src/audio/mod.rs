//! Audio module.
//!
//! Provides PCM decoding, playback control, output devices and WAV export.

pub mod device;
pub mod pcm;
pub mod playback;
pub mod wav;

// Re-export commonly used items
pub use device::{AudioContext, AudioDevice, OutputKind, PlaybackSource, SilentDevice, SystemDevice};
pub use pcm::{decode_base64_pcm, decode_pcm16, AudioPcmBuffer, CHANNELS, SAMPLE_RATE};
pub use playback::{PlaybackController, PlaybackState};
pub use wav::write_wav;
