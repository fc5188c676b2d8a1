//! Generation clients.
//!
//! Provides the lyrics and speech clients and the Gemini transport they share.

pub mod gemini;
pub mod lyrics;
pub mod speech;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use gemini::{ContentGenerator, GeminiClient, GenerateContentRequest, GenerateContentResponse};
pub use lyrics::{GeminiLyricsClient, LyricsClient, DEFAULT_TEXT_MODEL};
pub use speech::{GeminiSpeechClient, SpeechClient, DEFAULT_SPEECH_MODEL, DEFAULT_VOICE};
