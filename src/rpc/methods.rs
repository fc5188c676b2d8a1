//! JSON-RPC method handlers.
//!
//! Implements the handlers for all supported JSON-RPC methods.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::audio::AudioDevice;
use crate::generation::{LyricsClient, SpeechClient};

use super::server::ServerState;
use super::types::{
    ComposeParams, CreateSongParams, ExportTextResult, JsonRpcError, PlaybackResult, SaveParams,
    SaveResult,
};

/// Handles a JSON-RPC method call.
pub async fn handle_request<L, S, D>(
    method: &str,
    params: serde_json::Value,
    state: &mut ServerState<L, S, D>,
) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    match method {
        "compose" => handle_compose(params, state).await,
        "create_song" => handle_create_song(params, state).await,
        "toggle_playback" => handle_toggle_playback(params, state).await,
        "stop" => handle_stop(state),
        "status" => handle_status(state),
        "export_text" => handle_export_text(state),
        "save" => handle_save(params, state),
        "ping" => handle_ping(),
        "shutdown" => handle_shutdown(state),
        _ => Err(JsonRpcError::method_not_found(method)),
    }
}

/// Handles the ping method for health checks.
fn handle_ping() -> Result<serde_json::Value, JsonRpcError> {
    Ok(serde_json::json!({ "status": "ok" }))
}

/// Handles the shutdown method.
fn handle_shutdown<L, S, D>(state: &mut ServerState<L, S, D>) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    state.shutdown();
    Ok(serde_json::json!({ "status": "shutting_down" }))
}

/// Handles the compose method.
///
/// Returns the session snapshot with the new song's section cards.
async fn handle_compose<L, S, D>(
    params: serde_json::Value,
    state: &mut ServerState<L, S, D>,
) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    let params: ComposeParams = serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;
    let params = params.into_generator_params()?;

    tracing::info!(
        topic = %params.topic,
        genre = %params.genre,
        mood = %params.mood,
        keywords = params.keywords.len(),
        "compose requested"
    );
    state.session.compose(&params).await?;

    to_result(state.session.snapshot())
}

/// Handles the create_song method.
async fn handle_create_song<L, S, D>(
    params: serde_json::Value,
    state: &mut ServerState<L, S, D>,
) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    apply_voice(optional_params(params)?, state);
    state.session.create_song().await?;
    to_result(PlaybackResult {
        playback: state.session.playback_state(),
    })
}

/// Handles the toggle_playback method.
async fn handle_toggle_playback<L, S, D>(
    params: serde_json::Value,
    state: &mut ServerState<L, S, D>,
) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    apply_voice(optional_params(params)?, state);
    let playback = state.session.toggle_playback().await?;
    to_result(PlaybackResult { playback })
}

/// Handles the stop method. Stopping while idle succeeds.
fn handle_stop<L, S, D>(state: &mut ServerState<L, S, D>) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    state.session.stop();
    to_result(PlaybackResult {
        playback: state.session.playback_state(),
    })
}

/// Handles the status method.
fn handle_status<L, S, D>(state: &mut ServerState<L, S, D>) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    to_result(state.session.snapshot())
}

/// Handles the export_text method.
fn handle_export_text<L, S, D>(state: &ServerState<L, S, D>) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    let text = state.session.plain_text()?;
    to_result(ExportTextResult { text })
}

/// Handles the save method.
fn handle_save<L, S, D>(
    params: serde_json::Value,
    state: &ServerState<L, S, D>,
) -> Result<serde_json::Value, JsonRpcError>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    let params: SaveParams = optional_params(params)?;
    let dir = params
        .dir
        .map(PathBuf::from)
        .unwrap_or_else(|| state.config.effective_export_path());

    let path = state.session.save_lyrics(&dir)?;
    let song_id = state
        .session
        .song()
        .map(|song| song.song_id())
        .unwrap_or_default();
    to_result(SaveResult {
        path: path.to_string_lossy().to_string(),
        song_id,
    })
}

fn apply_voice<L, S, D>(params: CreateSongParams, state: &mut ServerState<L, S, D>)
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    if let Some(voice) = params.voice.filter(|v| !v.trim().is_empty()) {
        tracing::debug!(voice = %voice, "voice changed");
        state.session.set_voice(voice);
    }
}

/// Parses params that may be omitted entirely.
fn optional_params<T: DeserializeOwned + Default>(
    params: serde_json::Value,
) -> Result<T, JsonRpcError> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_result<T: Serialize>(value: T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::internal_error(format!("Failed to serialize result: {}", e)))
}
