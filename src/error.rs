//! Error types for the lyricloom daemon.
//!
//! Defines all error codes and types used throughout the daemon for
//! consistent error handling and reporting.

use std::fmt;

/// Error codes returned by the daemon in error responses.
///
/// These codes are used in JSON-RPC error responses and allow clients
/// to programmatically handle specific error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Generator parameters are invalid.
    /// Trigger: Empty topic, unknown genre or mood.
    InvalidParams,

    /// An operation of the same kind is already in flight.
    /// Trigger: compose while composing, create_song while generating audio.
    Busy,

    /// No song has been composed yet.
    /// Trigger: create_song or export before a successful compose.
    NoSong,

    /// No API credential configured.
    /// Trigger: GEMINI_API_KEY and API_KEY both unset.
    MissingApiKey,

    /// The collaborator could not be reached or rejected the request.
    /// Trigger: Network error, timeout, non-2xx HTTP status.
    CollaboratorUnavailable,

    /// The text collaborator returned no usable text.
    GenerationFailed,

    /// Returned text did not parse into the declared song structure.
    SchemaMismatch,

    /// The speech collaborator returned no audio payload.
    NoAudio,

    /// Audio payload is not valid base64 or 16-bit PCM.
    DecodeFailed,

    /// The audio output device failed to open or start a source.
    PlaybackFailed,

    /// Writing an exported file failed.
    ExportFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::Busy => "BUSY",
            ErrorCode::NoSong => "NO_SONG",
            ErrorCode::MissingApiKey => "MISSING_API_KEY",
            ErrorCode::CollaboratorUnavailable => "COLLABORATOR_UNAVAILABLE",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
            ErrorCode::SchemaMismatch => "SCHEMA_MISMATCH",
            ErrorCode::NoAudio => "NO_AUDIO",
            ErrorCode::DecodeFailed => "DECODE_FAILED",
            ErrorCode::PlaybackFailed => "PLAYBACK_FAILED",
            ErrorCode::ExportFailed => "EXPORT_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParams => "Generator parameters are invalid",
            ErrorCode::Busy => "Another operation of this kind is still running",
            ErrorCode::NoSong => "No song has been composed yet",
            ErrorCode::MissingApiKey => "No API key configured for the Gemini API",
            ErrorCode::CollaboratorUnavailable => "The Gemini API request failed",
            ErrorCode::GenerationFailed => "The text model returned no lyrics",
            ErrorCode::SchemaMismatch => "The text model returned lyrics in an unexpected shape",
            ErrorCode::NoAudio => "The speech model returned no audio",
            ErrorCode::DecodeFailed => "Audio payload could not be decoded as 16-bit PCM",
            ErrorCode::PlaybackFailed => "Audio playback could not be started",
            ErrorCode::ExportFailed => "Failed to write exported file",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParams => {
                "Provide a non-empty topic and one of the listed genres and moods \
                 (e.g., topic: 'rain in the city', genre: 'Jazz', mood: 'Melancholic')"
            }
            ErrorCode::Busy => "Wait for the current request to finish before submitting another",
            ErrorCode::NoSong => "Compose lyrics first, then create the song",
            ErrorCode::MissingApiKey => {
                "Set GEMINI_API_KEY (or API_KEY) to a key from https://aistudio.google.com/apikey"
            }
            ErrorCode::CollaboratorUnavailable => {
                "Check internet connection and API key, raise LYRICLOOM_TIMEOUT_SECS, \
                 or try again later"
            }
            ErrorCode::GenerationFailed | ErrorCode::SchemaMismatch => {
                "Try again; rephrasing the topic sometimes helps"
            }
            ErrorCode::NoAudio => {
                "Try again, or pick another voice with --voice / LYRICLOOM_VOICE"
            }
            ErrorCode::DecodeFailed => {
                "The speech model changed its audio encoding; try another speech model"
            }
            ErrorCode::PlaybackFailed => {
                "Check the default output device, or use LYRICLOOM_OUTPUT=silent and --output to save a WAV"
            }
            ErrorCode::ExportFailed => {
                "Check that the export directory exists and is writable (LYRICLOOM_EXPORT_PATH)"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for daemon operations.
#[derive(Debug)]
pub struct DaemonError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DaemonError {
    /// Creates a new DaemonError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new DaemonError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an INVALID_PARAMS error for an empty topic.
    pub fn empty_topic() -> Self {
        Self::new(ErrorCode::InvalidParams, "Topic cannot be empty")
    }

    /// Creates an INVALID_PARAMS error.
    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, reason)
    }

    /// Creates a BUSY error.
    pub fn busy(operation: &str) -> Self {
        Self::new(
            ErrorCode::Busy,
            format!("A {} request is already in progress", operation),
        )
    }

    /// Creates a NO_SONG error.
    pub fn no_song() -> Self {
        Self::new(ErrorCode::NoSong, "No lyrics have been composed yet")
    }

    /// Creates a MISSING_API_KEY error.
    pub fn missing_api_key() -> Self {
        Self::new(
            ErrorCode::MissingApiKey,
            "Neither GEMINI_API_KEY nor API_KEY is set",
        )
    }

    /// Creates a COLLABORATOR_UNAVAILABLE error.
    pub fn collaborator_unavailable(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::CollaboratorUnavailable,
            format!("Gemini request failed: {}", reason.into()),
        )
    }

    /// Creates a GENERATION_FAILED error.
    pub fn generation_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::GenerationFailed,
            format!("Lyrics generation failed: {}", reason.into()),
        )
    }

    /// Creates a SCHEMA_MISMATCH error.
    pub fn schema_mismatch(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SchemaMismatch,
            format!("Response does not match song schema: {}", reason.into()),
        )
    }

    /// Creates a NO_AUDIO error.
    pub fn no_audio() -> Self {
        Self::new(
            ErrorCode::NoAudio,
            "Speech response contained no inline audio data",
        )
    }

    /// Creates a DECODE_FAILED error.
    pub fn decode_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DecodeFailed,
            format!("Audio decode failed: {}", reason.into()),
        )
    }

    /// Creates a PLAYBACK_FAILED error.
    pub fn playback_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PlaybackFailed,
            format!("Playback failed: {}", reason.into()),
        )
    }

    /// Creates an EXPORT_FAILED error.
    pub fn export_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExportFailed,
            format!("Export failed: {}", reason.into()),
        )
    }
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for DaemonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using DaemonError.
pub type Result<T> = std::result::Result<T, DaemonError>;
