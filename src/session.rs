//! Composition session.
//!
//! Holds the current song, loading and error flags, and the playback
//! controller. State changes go through [`SessionState`] transitions that
//! are independent of any UI or transport; [`CompositionSession`] wires them
//! to the lyrics client, speech client and audio output.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::audio::{AudioDevice, PlaybackController, PlaybackState};
use crate::error::{DaemonError, Result};
use crate::generation::{LyricsClient, SpeechClient};
use crate::render::{self, SectionCard};
use crate::types::{GeneratorParams, SongLyrics};

/// User-visible message after a failed compose.
pub const COMPOSE_FAILED_MESSAGE: &str = "Failed to compose lyrics. Please try again.";

/// User-visible message after failed song audio.
pub const AUDIO_FAILED_MESSAGE: &str = "Failed to generate song audio.";

/// Song and flags of a session, with pure transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    song: Option<SongLyrics>,
    composing: bool,
    error: Option<String>,
}

impl SessionState {
    /// Current song, if one has been composed.
    pub fn song(&self) -> Option<&SongLyrics> {
        self.song.as_ref()
    }

    /// True while a compose request is outstanding.
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Last user-visible error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Marks a compose as started.
    ///
    /// Rejects a second compose while one is outstanding and params with an
    /// empty topic; the state is unchanged on rejection.
    pub fn begin_compose(&mut self, params: &GeneratorParams) -> Result<()> {
        if self.composing {
            return Err(DaemonError::busy("compose"));
        }
        params.validate()?;
        self.composing = true;
        self.error = None;
        Ok(())
    }

    /// Applies the outcome of a compose.
    ///
    /// On failure the previous song is kept.
    pub fn finish_compose(&mut self, result: Result<SongLyrics>) -> Result<&SongLyrics> {
        self.composing = false;
        match result {
            Ok(song) => {
                self.error = None;
                Ok(self.song.insert(song))
            }
            Err(e) => {
                self.error = Some(COMPOSE_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Clears the error before an audio request.
    pub fn begin_audio(&mut self) -> Result<&SongLyrics> {
        let song = self.song.as_ref().ok_or_else(DaemonError::no_song)?;
        self.error = None;
        Ok(song)
    }

    /// Records a failed audio request.
    pub fn audio_failed(&mut self) {
        self.error = Some(AUDIO_FAILED_MESSAGE.to_string());
    }

    /// Drops the current song.
    pub fn discard(&mut self) {
        self.song = None;
        self.error = None;
    }
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub title: Option<String>,
    pub artist_style: Option<String>,
    pub sections: Vec<SectionCard>,
    pub composing: bool,
    pub playback: PlaybackState,
    pub error: Option<String>,
}

/// One user's composition session.
pub struct CompositionSession<L, S, D: AudioDevice> {
    lyrics: L,
    speech: S,
    playback: PlaybackController<D>,
    state: SessionState,
    voice: String,
}

impl<L, S, D> CompositionSession<L, S, D>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    /// Creates a session. The audio device is opened on first playback.
    pub fn new(lyrics: L, speech: S, device: D, voice: impl Into<String>) -> Self {
        Self {
            lyrics,
            speech,
            playback: PlaybackController::new(device),
            state: SessionState::default(),
            voice: voice.into(),
        }
    }

    /// Session state (song, flags, error).
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current song, if any.
    pub fn song(&self) -> Option<&SongLyrics> {
        self.state.song()
    }

    /// Current playback state.
    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Voice used for sung previews.
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Changes the voice used for future previews.
    pub fn set_voice(&mut self, voice: impl Into<String>) {
        self.voice = voice.into();
    }

    /// Composes new lyrics, replacing the current song on success.
    ///
    /// Playback is stopped first. An empty topic is rejected before the
    /// lyrics client is called.
    pub async fn compose(&mut self, params: &GeneratorParams) -> Result<&SongLyrics> {
        self.state.begin_compose(params)?;
        self.playback.stop();

        let result = self.lyrics.generate_lyrics(params).await;
        if let Err(ref e) = result {
            tracing::error!(code = %e.code, "compose failed: {}", e.message);
        }
        self.state.finish_compose(result)
    }

    /// Generates and plays a sung preview of the current song.
    pub async fn create_song(&mut self) -> Result<()> {
        if self.playback.state() == PlaybackState::Generating {
            return Err(DaemonError::busy("song audio"));
        }
        let script = render::speech_script(self.state.begin_audio()?);

        let result = self
            .playback
            .create_song(&self.speech, &script, &self.voice)
            .await;
        if result.is_err() {
            self.state.audio_failed();
        }
        result
    }

    /// Stops playback if playing, otherwise creates and plays the song.
    ///
    /// Returns the playback state after the action.
    pub async fn toggle_playback(&mut self) -> Result<PlaybackState> {
        self.poll_playback();
        if self.playback.is_playing() {
            self.playback.stop();
        } else {
            self.create_song().await?;
        }
        Ok(self.playback.state())
    }

    /// Stops playback. Idempotent.
    pub fn stop(&mut self) {
        self.playback.stop();
    }

    /// Applies completions that already arrived; true if playback ended.
    pub fn poll_playback(&mut self) -> bool {
        self.playback.poll_completions()
    }

    /// Resolves when the playing source finishes on its own.
    pub async fn wait_for_playback_end(&mut self) {
        self.playback.wait_for_completion().await
    }

    /// Plain-text export of the current song.
    pub fn plain_text(&self) -> Result<String> {
        self.song().map(render::plain_text).ok_or_else(DaemonError::no_song)
    }

    /// Saves the current song's lyrics into `dir`.
    pub fn save_lyrics(&self, dir: &Path) -> Result<PathBuf> {
        let song = self.song().ok_or_else(DaemonError::no_song)?;
        render::save_lyrics(song, dir)
    }

    /// Serializable view of the session.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        self.poll_playback();
        let song = self.state.song();
        SessionSnapshot {
            title: song.map(|s| s.title.clone()),
            artist_style: song.and_then(|s| s.artist_style.clone()),
            sections: song.map(render::section_cards).unwrap_or_default(),
            composing: self.state.is_composing(),
            playback: self.playback.state(),
            error: self.state.error().map(str::to_string),
        }
    }

    /// Stops playback, releases the audio output and discards the song.
    pub fn teardown(&mut self) {
        self.playback.release();
        self.state.discard();
        tracing::info!("session torn down");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audio::playback::tests::{Event, MockDevice, StubSpeech};
    use crate::error::ErrorCode;
    use crate::types::{Genre, LyricSection, Mood, SectionKind};
    use std::cell::RefCell;

    /// Lyrics stub returning queued results and counting calls.
    pub(crate) struct StubLyrics {
        pub results: RefCell<Vec<Result<SongLyrics>>>,
        pub calls: RefCell<usize>,
    }

    impl StubLyrics {
        pub fn returning(results: Vec<Result<SongLyrics>>) -> Self {
            Self {
                results: RefCell::new(results),
                calls: RefCell::new(0),
            }
        }
    }

    impl LyricsClient for StubLyrics {
        async fn generate_lyrics(&self, _params: &GeneratorParams) -> Result<SongLyrics> {
            *self.calls.borrow_mut() += 1;
            let mut results = self.results.borrow_mut();
            if results.is_empty() {
                return Err(DaemonError::generation_failed("stub exhausted"));
            }
            results.remove(0)
        }
    }

    pub(crate) fn three_section_song() -> SongLyrics {
        SongLyrics::new(
            "City Rain",
            vec![
                LyricSection::new(SectionKind::Verse, ["Neon on the water", "Puddles hold the sky"]),
                LyricSection::new(SectionKind::Chorus, ["Rain in the city", "Falling slow"]),
                LyricSection::new(SectionKind::Verse, ["Umbrellas bloom", "Then fold away"]),
            ],
        )
    }

    fn rain_params() -> GeneratorParams {
        GeneratorParams::new("rain in the city", Genre::Jazz, Mood::Melancholic)
            .with_keywords(["neon", "puddles"])
    }

    type TestSession = CompositionSession<StubLyrics, StubSpeech, MockDevice>;

    fn session(lyrics: Vec<Result<SongLyrics>>, speech: StubSpeech) -> (TestSession, MockDevice) {
        let device = MockDevice::default();
        let session = CompositionSession::new(
            StubLyrics::returning(lyrics),
            speech,
            device.clone(),
            "Kore",
        );
        (session, device)
    }

    #[test]
    fn state_begin_compose_rejects_when_busy() {
        let mut state = SessionState::default();
        state.begin_compose(&rain_params()).unwrap();
        assert!(state.is_composing());

        let err = state.begin_compose(&rain_params()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Busy);
    }

    #[test]
    fn state_begin_compose_rejects_empty_topic() {
        let mut state = SessionState::default();
        let params = GeneratorParams::new("  ", Genre::Pop, Mood::Happy);
        let err = state.begin_compose(&params).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(!state.is_composing());
    }

    #[test]
    fn state_failed_compose_keeps_previous_song() {
        let mut state = SessionState::default();
        state.begin_compose(&rain_params()).unwrap();
        state.finish_compose(Ok(three_section_song())).unwrap();

        state.begin_compose(&rain_params()).unwrap();
        let err = state
            .finish_compose(Err(DaemonError::generation_failed("empty")))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::GenerationFailed);
        assert_eq!(state.song(), Some(&three_section_song()));
        assert_eq!(state.error(), Some(COMPOSE_FAILED_MESSAGE));
        assert!(!state.is_composing());
    }

    #[test]
    fn state_begin_audio_requires_song() {
        let mut state = SessionState::default();
        assert_eq!(state.begin_audio().unwrap_err().code, ErrorCode::NoSong);
    }

    #[tokio::test]
    async fn compose_with_empty_topic_never_calls_client() {
        let (mut session, _) = session(vec![Ok(three_section_song())], StubSpeech::silent());
        let params = GeneratorParams::new("", Genre::Pop, Mood::Happy);

        let err = session.compose(&params).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert_eq!(*session.lyrics.calls.borrow(), 0);
        assert!(session.song().is_none());
    }

    #[tokio::test]
    async fn rain_scenario_renders_three_cards() {
        let (mut session, _) = session(vec![Ok(three_section_song())], StubSpeech::silent());
        session.compose(&rain_params()).await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.title.as_deref(), Some("City Rain"));
        assert_eq!(snapshot.sections.len(), 3);
        let headings: Vec<&str> = snapshot.sections.iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(headings, vec!["Verse 1", "Chorus", "Verse 2"]);
        assert_eq!(snapshot.sections[0].lines[0], "Neon on the water");
        assert!(!snapshot.composing);
        assert_eq!(snapshot.playback, PlaybackState::Idle);
    }

    #[tokio::test]
    async fn failed_compose_keeps_song_and_sets_message() {
        let (mut session, _) = session(
            vec![
                Ok(three_section_song()),
                Err(DaemonError::schema_mismatch("bad json")),
            ],
            StubSpeech::silent(),
        );
        session.compose(&rain_params()).await.unwrap();
        let err = session.compose(&rain_params()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::SchemaMismatch);
        assert_eq!(session.song(), Some(&three_section_song()));
        assert_eq!(session.snapshot().error.as_deref(), Some(COMPOSE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn compose_stops_playback() {
        let (mut session, device) = session(
            vec![Ok(three_section_song()), Ok(three_section_song())],
            StubSpeech::with_samples(&[1, 2, 3, 4]),
        );
        session.compose(&rain_params()).await.unwrap();
        session.create_song().await.unwrap();
        assert_eq!(session.playback_state(), PlaybackState::Playing);

        session.compose(&rain_params()).await.unwrap();
        assert_eq!(session.playback_state(), PlaybackState::Idle);
        assert!(device.log.borrow().events.contains(&Event::Stopped(0)));
    }

    #[tokio::test]
    async fn create_song_without_lyrics_fails() {
        let (mut session, _) = session(vec![], StubSpeech::with_samples(&[1]));
        let err = session.create_song().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoSong);
        assert_eq!(session.playback_state(), PlaybackState::Idle);
    }

    #[tokio::test]
    async fn create_song_failure_sets_message_and_idle() {
        let (mut session, _) = session(vec![Ok(three_section_song())], StubSpeech::silent());
        session.compose(&rain_params()).await.unwrap();

        let err = session.create_song().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoAudio);
        assert_eq!(session.playback_state(), PlaybackState::Idle);
        assert_eq!(session.state().error(), Some(AUDIO_FAILED_MESSAGE));
        // Song survives an audio failure
        assert!(session.song().is_some());
    }

    #[tokio::test]
    async fn toggle_playback_plays_then_stops() {
        let (mut session, device) = session(
            vec![Ok(three_section_song())],
            StubSpeech::with_samples(&[5, 6]),
        );
        session.compose(&rain_params()).await.unwrap();

        assert_eq!(session.toggle_playback().await.unwrap(), PlaybackState::Playing);
        assert_eq!(session.toggle_playback().await.unwrap(), PlaybackState::Idle);
        assert!(device.log.borrow().events.contains(&Event::Stopped(0)));
    }

    #[tokio::test]
    async fn natural_end_is_reflected_in_snapshot() {
        let (mut session, device) = session(
            vec![Ok(three_section_song())],
            StubSpeech::with_samples(&[5, 6]),
        );
        session.compose(&rain_params()).await.unwrap();
        session.create_song().await.unwrap();

        device.log.borrow_mut().finish(0);
        assert_eq!(session.snapshot().playback, PlaybackState::Idle);
    }

    #[tokio::test]
    async fn poll_playback_applies_arrived_completion() {
        let (mut session, device) = session(
            vec![Ok(three_section_song())],
            StubSpeech::with_samples(&[5, 6]),
        );
        session.compose(&rain_params()).await.unwrap();
        session.create_song().await.unwrap();
        assert!(!session.poll_playback());

        device.log.borrow_mut().finish(0);
        assert!(session.poll_playback());
        assert_eq!(session.playback_state(), PlaybackState::Idle);
        // Already applied
        assert!(!session.poll_playback());
    }

    #[tokio::test]
    async fn toggle_after_natural_end_plays_again() {
        let (mut session, device) = session(
            vec![Ok(three_section_song())],
            StubSpeech::with_samples(&[5, 6]),
        );
        session.compose(&rain_params()).await.unwrap();
        session.create_song().await.unwrap();
        device.log.borrow_mut().finish(0);

        assert_eq!(session.toggle_playback().await.unwrap(), PlaybackState::Playing);
        assert!(device.log.borrow().events.contains(&Event::Started(1)));
    }

    #[tokio::test]
    async fn stop_when_idle_is_noop() {
        let (mut session, device) = session(vec![], StubSpeech::silent());
        session.stop();
        session.stop();
        assert_eq!(session.playback_state(), PlaybackState::Idle);
        assert!(device.log.borrow().events.is_empty());
    }

    #[tokio::test]
    async fn plain_text_and_teardown() {
        let (mut session, device) = session(
            vec![Ok(three_section_song())],
            StubSpeech::with_samples(&[1, 1]),
        );
        assert_eq!(session.plain_text().unwrap_err().code, ErrorCode::NoSong);

        session.compose(&rain_params()).await.unwrap();
        assert!(session.plain_text().unwrap().starts_with("City Rain\n\n[Verse]"));

        session.create_song().await.unwrap();
        session.teardown();
        assert!(session.song().is_none());
        assert_eq!(session.playback_state(), PlaybackState::Idle);
        assert!(device.log.borrow().events.contains(&Event::Stopped(0)));
    }
}
