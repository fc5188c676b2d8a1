//! lyricloom-daemon: AI songwriting with sung previews.
//!
//! Turns a topic, genre, mood and keywords into structured song lyrics with
//! a Gemini text model, then renders the lyrics as sung audio with a Gemini
//! speech model and plays it back.
//!
//! # Modules
//!
//! - [`types`]: Core data types (GeneratorParams, SongLyrics, LyricSection)
//! - [`generation`]: Gemini transport plus the lyrics and speech clients
//! - [`audio`]: PCM decoding, playback control, output devices, WAV export
//! - [`render`]: Section cards, plain-text export, speech script
//! - [`session`]: CompositionSession tying the above together
//! - [`rpc`]: JSON-RPC server over stdio
//! - [`config`]: Runtime configuration (DaemonConfig)
//! - [`error`]: Error types and codes (DaemonError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use lyricloom_daemon::{
//!     audio::SilentDevice,
//!     config::DaemonConfig,
//!     generation::{GeminiClient, GeminiLyricsClient, GeminiSpeechClient},
//!     session::CompositionSession,
//!     types::{GeneratorParams, Genre, Mood},
//! };
//!
//! let config = DaemonConfig::from_env();
//! let client = GeminiClient::from_config(&config)?;
//! let mut session = CompositionSession::new(
//!     GeminiLyricsClient::new(client.clone(), &config.text_model),
//!     GeminiSpeechClient::new(client, &config.speech_model),
//!     SilentDevice,
//!     "Kore",
//! );
//!
//! let params = GeneratorParams::new("rain in the city", Genre::Jazz, Mood::Melancholic)
//!     .with_keywords(["neon", "puddles"]);
//! session.compose(&params).await?;
//! session.create_song().await?;
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod render;
pub mod rpc;
pub mod session;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::DaemonConfig;
pub use error::{DaemonError, ErrorCode, Result};
pub use session::{CompositionSession, SessionSnapshot, SessionState};
pub use types::{compute_song_id, GeneratorParams, Genre, LyricSection, Mood, SectionKind, SongLyrics};
