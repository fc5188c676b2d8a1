//! JSON-RPC types for the daemon protocol.
//!
//! Request and result shapes for each method, the error object with the
//! application error codes, and notification payloads.

use serde::{Deserialize, Serialize};

use crate::audio::PlaybackState;
use crate::error::{DaemonError, ErrorCode};
use crate::types::{GeneratorParams, Genre, Mood};

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Notification sent when a song finishes playing on its own.
pub const PLAYBACK_FINISHED: &str = "playback_finished";

/// A JSON-RPC request ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Integer(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

/// A JSON-RPC request wrapper.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: RequestId,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC response wrapper.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    pub result: T,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(id: RequestId, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// A JSON-RPC error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

/// Extended error data for application-specific errors.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorData {
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub recovery: String,
}

impl JsonRpcError {
    /// Creates a parse error (-32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an invalid request error (-32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a method not found error (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }

    /// Creates an invalid params error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an internal error (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

/// Application error code for a daemon error code (-32000 to -32010).
pub fn application_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidParams => -32000,
        ErrorCode::Busy => -32001,
        ErrorCode::NoSong => -32002,
        ErrorCode::MissingApiKey => -32003,
        ErrorCode::CollaboratorUnavailable => -32004,
        ErrorCode::GenerationFailed => -32005,
        ErrorCode::SchemaMismatch => -32006,
        ErrorCode::NoAudio => -32007,
        ErrorCode::DecodeFailed => -32008,
        ErrorCode::PlaybackFailed => -32009,
        ErrorCode::ExportFailed => -32010,
    }
}

impl From<DaemonError> for JsonRpcError {
    fn from(err: DaemonError) -> Self {
        Self {
            code: application_code(err.code),
            message: err.code.description().to_string(),
            data: Some(JsonRpcErrorData {
                error_code: err.code.as_str().to_string(),
                details: Some(err.message),
                recovery: err.code.recovery_hint().to_string(),
            }),
        }
    }
}

// ============================================================================
// Method parameters and results
// ============================================================================

/// Parameters for a compose request.
///
/// Genre and mood accept either the display label ("Hip-Hop") or a slug
/// ("hip-hop", "hiphop").
#[derive(Debug, Deserialize)]
pub struct ComposeParams {
    pub topic: String,

    #[serde(default)]
    pub genre: Option<String>,

    #[serde(default)]
    pub mood: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ComposeParams {
    /// Resolves genre and mood names into generator parameters.
    ///
    /// Topic emptiness is left to the session so it reports INVALID_PARAMS
    /// the same way for every caller.
    pub fn into_generator_params(self) -> Result<GeneratorParams, JsonRpcError> {
        let genre = match self.genre.as_deref() {
            Some(name) => Genre::parse(name)
                .ok_or_else(|| DaemonError::invalid_params(format!("Unknown genre: {}", name)))?,
            None => Genre::default(),
        };
        let mood = match self.mood.as_deref() {
            Some(name) => Mood::parse(name)
                .ok_or_else(|| DaemonError::invalid_params(format!("Unknown mood: {}", name)))?,
            None => Mood::default(),
        };

        Ok(GeneratorParams::new(self.topic, genre, mood).with_keywords(self.keywords))
    }
}

/// Parameters for create_song and toggle_playback.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSongParams {
    /// Voice override for this and later previews.
    #[serde(default)]
    pub voice: Option<String>,
}

/// Parameters for a save request.
#[derive(Debug, Default, Deserialize)]
pub struct SaveParams {
    /// Target directory; the configured export path when omitted.
    #[serde(default)]
    pub dir: Option<String>,
}

/// Result of playback-affecting methods.
#[derive(Debug, Serialize)]
pub struct PlaybackResult {
    pub playback: PlaybackState,
}

/// Result of export_text.
#[derive(Debug, Serialize)]
pub struct ExportTextResult {
    pub text: String,
}

/// Result of save.
#[derive(Debug, Serialize)]
pub struct SaveResult {
    /// Absolute or configured path of the written file.
    pub path: String,
    pub song_id: String,
}

// ============================================================================
// Notifications
// ============================================================================

/// A JSON-RPC notification (no id field).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<T: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
}

impl<T: Serialize> JsonRpcNotification<T> {
    pub fn new(method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

/// Notification sent when playback ends without a stop request.
#[derive(Debug, Serialize)]
pub struct PlaybackFinishedParams {
    /// Title of the song that finished, if one is loaded.
    pub title: Option<String>,
    pub playback: PlaybackState,
}
