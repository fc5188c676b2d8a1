//! Playback controller.
//!
//! Owns the audio output context and at most one active source. The
//! context is opened on first use and released on teardown. Sources report
//! natural completion through a channel, so the controller never polls the
//! device.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::device::{AudioContext, AudioDevice, EndedCallback, PlaybackSource};
use super::pcm::{decode_base64_pcm, AudioPcmBuffer, CHANNELS, SAMPLE_RATE};
use crate::error::{DaemonError, Result};
use crate::generation::SpeechClient;

/// Playback state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing playing.
    #[default]
    Idle,
    /// Song audio is being requested and decoded.
    Generating,
    /// A source is playing.
    Playing,
}

struct ActiveSource {
    id: u64,
    source: Box<dyn PlaybackSource>,
}

/// Drives a single playback source on an exclusively owned output.
pub struct PlaybackController<D: AudioDevice> {
    device: D,
    context: Option<D::Context>,
    active: Option<ActiveSource>,
    state: PlaybackState,
    next_source_id: u64,
    ended_tx: mpsc::UnboundedSender<u64>,
    ended_rx: mpsc::UnboundedReceiver<u64>,
}

impl<D: AudioDevice> PlaybackController<D> {
    /// Creates an idle controller. The device is not opened until the
    /// first source starts.
    pub fn new(device: D) -> Self {
        let (ended_tx, ended_rx) = mpsc::unbounded_channel();
        Self {
            device,
            context: None,
            active: None,
            state: PlaybackState::Idle,
            next_source_id: 0,
            ended_tx,
            ended_rx,
        }
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns true if a source is playing.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Returns true if the output context has been opened.
    pub fn is_open(&self) -> bool {
        self.context.is_some()
    }

    /// Requests song audio for `script`, decodes it and starts playback.
    ///
    /// Any playing source is stopped first. On failure the controller is
    /// left Idle.
    pub async fn create_song<S: SpeechClient>(
        &mut self,
        speech: &S,
        script: &str,
        voice: &str,
    ) -> Result<()> {
        self.stop();
        self.state = PlaybackState::Generating;

        let result = self.generate_and_play(speech, script, voice).await;
        if let Err(ref e) = result {
            tracing::warn!(code = %e.code, "song audio failed: {}", e.message);
            self.state = PlaybackState::Idle;
        }
        result
    }

    async fn generate_and_play<S: SpeechClient>(
        &mut self,
        speech: &S,
        script: &str,
        voice: &str,
    ) -> Result<()> {
        let payload = speech.generate_song_audio(script, voice).await?;
        let buffer = decode_base64_pcm(&payload, SAMPLE_RATE, CHANNELS)?;
        self.play(buffer)
    }

    /// Starts playing an already decoded buffer, replacing any active source.
    pub fn play(&mut self, buffer: AudioPcmBuffer) -> Result<()> {
        if let Some(mut previous) = self.active.take() {
            tracing::debug!(source = previous.id, "stopping previous source");
            previous.source.stop();
        }
        self.state = PlaybackState::Idle;

        let context = match self.context.take() {
            Some(context) => context,
            None => self.device.open(SAMPLE_RATE, CHANNELS)?,
        };
        let context = self.context.insert(context);

        if buffer.sample_rate() != context.sample_rate()
            || buffer.channel_count() != context.channel_count()
        {
            return Err(DaemonError::playback_failed(format!(
                "buffer is {} Hz x{}, output is {} Hz x{}",
                buffer.sample_rate(),
                buffer.channel_count(),
                context.sample_rate(),
                context.channel_count()
            )));
        }

        let id = self.next_source_id;
        self.next_source_id += 1;
        let ended_tx = self.ended_tx.clone();
        let on_ended: EndedCallback = Box::new(move || {
            // The controller may already be gone.
            let _ = ended_tx.send(id);
        });

        let duration = buffer.duration();
        let source = context.start(buffer, on_ended)?;
        self.active = Some(ActiveSource { id, source });
        self.state = PlaybackState::Playing;

        tracing::info!(source = id, duration_sec = duration.as_secs_f32(), "playback started");
        Ok(())
    }

    /// Stops the active source. Does nothing when idle.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.source.stop();
            tracing::info!(source = active.id, "playback stopped");
        }
        self.state = PlaybackState::Idle;
    }

    /// Applies completion signals that have already arrived.
    ///
    /// Returns true if the active source finished.
    pub fn poll_completions(&mut self) -> bool {
        let mut finished = false;
        while let Ok(id) = self.ended_rx.try_recv() {
            finished |= self.handle_ended(id);
        }
        finished
    }

    /// Waits until the active source finishes on its own.
    ///
    /// Stale signals from stopped sources are skipped. When nothing is
    /// playing this waits until something is started and finishes, so it is
    /// meant to be raced against other events in a `select!`.
    pub async fn wait_for_completion(&mut self) {
        while let Some(id) = self.ended_rx.recv().await {
            if self.handle_ended(id) {
                return;
            }
        }
    }

    fn handle_ended(&mut self, id: u64) -> bool {
        if !self.active.as_ref().is_some_and(|active| active.id == id) {
            tracing::debug!(source = id, "ignoring completion of inactive source");
            return false;
        }
        self.active = None;
        self.state = PlaybackState::Idle;
        tracing::info!(source = id, "playback finished");
        true
    }

    /// Stops playback and releases the output context.
    pub fn release(&mut self) {
        self.stop();
        if self.context.take().is_some() {
            tracing::debug!("audio output released");
        }
    }
}

impl<D: AudioDevice> Drop for PlaybackController<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
