//! Audio output devices.
//!
//! A device is opened once into a context with a fixed sample rate and
//! channel count; the context starts playback sources. Every source reports
//! natural completion through its `on_ended` callback, which may run on
//! another thread.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use serde::{Deserialize, Serialize};

use super::pcm::AudioPcmBuffer;
use crate::error::{DaemonError, Result};

/// Callback fired once when a source plays to the end on its own.
pub type EndedCallback = Box<dyn FnOnce() + Send + 'static>;

/// A started playback source.
pub trait PlaybackSource {
    /// Terminates playback immediately. `on_ended` must not fire afterwards.
    fn stop(&mut self);
}

/// An opened audio output.
pub trait AudioContext {
    /// Sample rate the context was opened with.
    fn sample_rate(&self) -> u32;

    /// Channel count the context was opened with.
    fn channel_count(&self) -> u16;

    /// Starts playing `buffer` from the beginning.
    fn start(
        &mut self,
        buffer: AudioPcmBuffer,
        on_ended: EndedCallback,
    ) -> Result<Box<dyn PlaybackSource>>;
}

/// A platform audio output that can be opened into a context.
pub trait AudioDevice {
    type Context: AudioContext;

    /// Acquires the output at the given format.
    fn open(&mut self, sample_rate: u32, channels: u16) -> Result<Self::Context>;
}

/// Output device selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Speaker when compiled with the `speaker` feature, silent otherwise.
    #[default]
    Auto,

    /// Default output device via cpal.
    Speaker,

    /// No sound; playback only tracks timing.
    Silent,
}

impl OutputKind {
    /// Returns the string representation of the output kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Auto => "auto",
            OutputKind::Speaker => "speaker",
            OutputKind::Silent => "silent",
        }
    }

    /// Parses an output kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(OutputKind::Auto),
            "speaker" | "cpal" => Some(OutputKind::Speaker),
            "silent" | "none" | "null" => Some(OutputKind::Silent),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Silent output
// ============================================================================

/// Output that plays nothing but ends each source after its duration.
///
/// Used on headless machines and when the `speaker` feature is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentDevice;

/// Context of a [`SilentDevice`].
#[derive(Debug)]
pub struct SilentContext {
    sample_rate: u32,
    channels: u16,
}

struct SilentSource {
    stop_tx: Option<mpsc::Sender<()>>,
}

impl PlaybackSource for SilentSource {
    fn stop(&mut self) {
        // Dropping the sender wakes the timer thread without firing on_ended.
        self.stop_tx.take();
    }
}

impl AudioDevice for SilentDevice {
    type Context = SilentContext;

    fn open(&mut self, sample_rate: u32, channels: u16) -> Result<SilentContext> {
        tracing::debug!(sample_rate, channels, "opened silent output");
        Ok(SilentContext {
            sample_rate,
            channels,
        })
    }
}

impl AudioContext for SilentContext {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channel_count(&self) -> u16 {
        self.channels
    }

    fn start(
        &mut self,
        buffer: AudioPcmBuffer,
        on_ended: EndedCallback,
    ) -> Result<Box<dyn PlaybackSource>> {
        let duration = buffer.duration();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("silent-playback".to_string())
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(duration) {
                    on_ended();
                }
            })
            .map_err(|e| DaemonError::playback_failed(format!("timer thread: {}", e)))?;

        Ok(Box::new(SilentSource {
            stop_tx: Some(stop_tx),
        }))
    }
}

// ============================================================================
// Speaker output (cpal)
// ============================================================================

#[cfg(feature = "speaker")]
pub use speaker::{SpeakerContext, SpeakerDevice};

#[cfg(feature = "speaker")]
mod speaker {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use super::{AudioContext, AudioDevice, EndedCallback, PlaybackSource};
    use crate::audio::pcm::AudioPcmBuffer;
    use crate::error::{DaemonError, Result};

    /// The host's default output device.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SpeakerDevice;

    /// An opened output device with a fixed stream format.
    pub struct SpeakerContext {
        device: cpal::Device,
        config: cpal::StreamConfig,
    }

    struct SpeakerSource {
        /// Hold the cpal stream alive. Audio plays as long as this exists.
        stream: Option<cpal::Stream>,
    }

    impl PlaybackSource for SpeakerSource {
        fn stop(&mut self) {
            if let Some(stream) = self.stream.take() {
                if let Err(e) = stream.pause() {
                    tracing::warn!("failed to pause stream: {e}");
                }
            }
        }
    }

    impl AudioDevice for SpeakerDevice {
        type Context = SpeakerContext;

        fn open(&mut self, sample_rate: u32, channels: u16) -> Result<SpeakerContext> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| DaemonError::playback_failed("no output audio device found"))?;

            let config = cpal::StreamConfig {
                channels,
                sample_rate: cpal::SampleRate(sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            tracing::info!(
                device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
                sample_rate,
                channels,
                "opened audio output"
            );
            Ok(SpeakerContext { device, config })
        }
    }

    impl AudioContext for SpeakerContext {
        fn sample_rate(&self) -> u32 {
            self.config.sample_rate.0
        }

        fn channel_count(&self) -> u16 {
            self.config.channels
        }

        fn start(
            &mut self,
            buffer: AudioPcmBuffer,
            on_ended: EndedCallback,
        ) -> Result<Box<dyn PlaybackSource>> {
            let samples = buffer.interleaved();
            let mut position = 0usize;
            let mut on_ended = Some(on_ended);

            let stream = self
                .device
                .build_output_stream(
                    &self.config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        // Report completion one callback after the last
                        // sample was handed to the device.
                        if position >= samples.len() {
                            data.fill(0.0);
                            if let Some(ended) = on_ended.take() {
                                ended();
                            }
                            return;
                        }
                        for out in data.iter_mut() {
                            *out = samples.get(position).copied().unwrap_or(0.0);
                            position += 1;
                        }
                    },
                    |err| {
                        tracing::error!("Playback error: {err}");
                    },
                    None,
                )
                .map_err(|e| DaemonError::playback_failed(format!("build stream: {}", e)))?;

            stream
                .play()
                .map_err(|e| DaemonError::playback_failed(format!("start stream: {}", e)))?;

            Ok(Box::new(SpeakerSource {
                stream: Some(stream),
            }))
        }
    }
}

// ============================================================================
// Runtime selection
// ============================================================================

/// Output device chosen at runtime from an [`OutputKind`].
pub enum SystemDevice {
    Silent(SilentDevice),
    #[cfg(feature = "speaker")]
    Speaker(SpeakerDevice),
}

/// Context of a [`SystemDevice`].
pub enum SystemContext {
    Silent(SilentContext),
    #[cfg(feature = "speaker")]
    Speaker(SpeakerContext),
}

impl SystemDevice {
    /// Resolves the output kind against the compiled features.
    pub fn from_kind(kind: OutputKind) -> Result<Self> {
        match kind {
            OutputKind::Silent => Ok(SystemDevice::Silent(SilentDevice)),
            #[cfg(feature = "speaker")]
            OutputKind::Auto | OutputKind::Speaker => Ok(SystemDevice::Speaker(SpeakerDevice)),
            #[cfg(not(feature = "speaker"))]
            OutputKind::Auto => Ok(SystemDevice::Silent(SilentDevice)),
            #[cfg(not(feature = "speaker"))]
            OutputKind::Speaker => Err(DaemonError::playback_failed(
                "speaker output requested but built without the `speaker` feature",
            )),
        }
    }

    /// Returns true if this device produces sound.
    pub fn is_audible(&self) -> bool {
        !matches!(self, SystemDevice::Silent(_))
    }
}

impl AudioDevice for SystemDevice {
    type Context = SystemContext;

    fn open(&mut self, sample_rate: u32, channels: u16) -> Result<SystemContext> {
        match self {
            SystemDevice::Silent(d) => d.open(sample_rate, channels).map(SystemContext::Silent),
            #[cfg(feature = "speaker")]
            SystemDevice::Speaker(d) => d.open(sample_rate, channels).map(SystemContext::Speaker),
        }
    }
}

impl AudioContext for SystemContext {
    fn sample_rate(&self) -> u32 {
        match self {
            SystemContext::Silent(c) => c.sample_rate(),
            #[cfg(feature = "speaker")]
            SystemContext::Speaker(c) => c.sample_rate(),
        }
    }

    fn channel_count(&self) -> u16 {
        match self {
            SystemContext::Silent(c) => c.channel_count(),
            #[cfg(feature = "speaker")]
            SystemContext::Speaker(c) => c.channel_count(),
        }
    }

    fn start(
        &mut self,
        buffer: AudioPcmBuffer,
        on_ended: EndedCallback,
    ) -> Result<Box<dyn PlaybackSource>> {
        match self {
            SystemContext::Silent(c) => c.start(buffer, on_ended),
            #[cfg(feature = "speaker")]
            SystemContext::Speaker(c) => c.start(buffer, on_ended),
        }
    }
}
