//! Sung preview generation via the speech model.
//!
//! The lyric script is wrapped in a performance instruction and sent with
//! an audio response modality. The reply carries base64 16-bit PCM at
//! 24kHz in the first part of the first candidate.

use super::gemini::{
    Content, ContentGenerator, GenerateContentRequest, GenerationConfig, SpeechConfig,
};
use crate::error::{DaemonError, Result};

/// Default speech model.
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Default prebuilt voice.
pub const DEFAULT_VOICE: &str = "Kore";

/// Produces a base64 audio performance of lyric text.
#[allow(async_fn_in_trait)]
pub trait SpeechClient {
    async fn generate_song_audio(&self, text: &str, voice: &str) -> Result<String>;
}

/// Speech client backed by a Gemini TTS model.
#[derive(Debug, Clone)]
pub struct GeminiSpeechClient<G> {
    generator: G,
    model: String,
}

impl<G: ContentGenerator> GeminiSpeechClient<G> {
    /// Creates a client using `model` on `generator`.
    pub fn new(generator: G, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Model identifier requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the full request for `text` sung by `voice`.
    pub fn build_request(text: &str, voice: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text(performance_instruction(text))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt(voice)),
                ..Default::default()
            }),
        }
    }
}

impl<G: ContentGenerator> SpeechClient for GeminiSpeechClient<G> {
    async fn generate_song_audio(&self, text: &str, voice: &str) -> Result<String> {
        tracing::info!(
            chars = text.len(),
            voice,
            model = %self.model,
            "requesting song audio"
        );

        let request = Self::build_request(text, voice);
        let response = self.generator.generate_content(&self.model, &request).await?;

        let data = response
            .first_inline_data()
            .map(|inline| inline.data.trim())
            .filter(|data| !data.is_empty())
            .ok_or_else(DaemonError::no_audio)?;

        tracing::debug!(payload_len = data.len(), "received audio payload");
        Ok(data.to_string())
    }
}

/// Wraps lyric text in a performance instruction.
pub fn performance_instruction(text: &str) -> String {
    format!(
        "Perform these song lyrics expressively, with a rhythmic, melodic delivery \
         matching the mood of the words: {}",
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::generation::gemini::{GenerateContentResponse, InlineData, Part};
    use crate::generation::testing::CannedGenerator;

    fn audio_response(data: &str) -> GenerateContentResponse {
        GenerateContentResponse::from_parts(vec![Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: Some("audio/L16;codec=pcm;rate=24000".to_string()),
                data: data.to_string(),
            }),
        }])
    }

    #[test]
    fn instruction_wraps_text() {
        let instruction = performance_instruction("la la la");
        assert!(instruction.starts_with("Perform these song lyrics"));
        assert!(instruction.contains("mood"));
        assert!(instruction.ends_with("la la la"));
    }

    #[test]
    fn request_asks_for_audio_with_voice() {
        let request = GeminiSpeechClient::<CannedGenerator>::build_request("hello", "Puck");
        let json = serde_json::to_value(&request).unwrap();
        let config = &json["generationConfig"];
        assert_eq!(config["responseModalities"], serde_json::json!(["AUDIO"]));
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Puck"
        );
        assert!(json["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .ends_with("hello"));
    }

    #[tokio::test]
    async fn returns_first_inline_payload() {
        let client = GeminiSpeechClient::new(
            CannedGenerator::new(audio_response("AAD/fw==")),
            DEFAULT_SPEECH_MODEL,
        );
        let payload = client.generate_song_audio("words", DEFAULT_VOICE).await.unwrap();
        assert_eq!(payload, "AAD/fw==");
        assert_eq!(client.generator.calls()[0].0, DEFAULT_SPEECH_MODEL);
    }

    #[tokio::test]
    async fn missing_inline_data_is_no_audio() {
        let client = GeminiSpeechClient::new(
            CannedGenerator::new(GenerateContentResponse::from_text("I can't sing")),
            DEFAULT_SPEECH_MODEL,
        );
        let err = client.generate_song_audio("words", DEFAULT_VOICE).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoAudio);
    }

    #[tokio::test]
    async fn empty_payload_or_no_candidates_is_no_audio() {
        for response in [audio_response(""), GenerateContentResponse::default()] {
            let client =
                GeminiSpeechClient::new(CannedGenerator::new(response), DEFAULT_SPEECH_MODEL);
            let err = client.generate_song_audio("words", DEFAULT_VOICE).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::NoAudio);
        }
    }
}
