//! Lyrics generation via the text model.
//!
//! Builds a songwriting prompt from [`GeneratorParams`], asks the model for
//! JSON matching a fixed song schema, and parses the reply into
//! [`SongLyrics`].

use serde::Deserialize;
use serde_json::json;

use super::gemini::{Content, ContentGenerator, GenerateContentRequest, GenerationConfig};
use crate::error::{DaemonError, Result};
use crate::types::{GeneratorParams, LyricSection, SectionKind, SongLyrics};

/// Default text model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Persona sent as the system instruction.
pub const SONGWRITER_PERSONA: &str = "You are a professional, multi-platinum songwriter \
known for poetic depth and catchy hooks. You write lyrics that resonate deeply with listeners.";

/// Suggested (not enforced) section order.
pub const SUGGESTED_STRUCTURE: &str =
    "Intro, Verse 1, Chorus, Verse 2, Chorus, Bridge, Chorus, Outro";

/// Produces structured lyrics from songwriting preferences.
#[allow(async_fn_in_trait)]
pub trait LyricsClient {
    async fn generate_lyrics(&self, params: &GeneratorParams) -> Result<SongLyrics>;
}

/// Lyrics client backed by a Gemini text model.
#[derive(Debug, Clone)]
pub struct GeminiLyricsClient<G> {
    generator: G,
    model: String,
}

impl<G: ContentGenerator> GeminiLyricsClient<G> {
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

    /// Builds the full request for `params`.
    pub fn build_request(params: &GeneratorParams) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text(build_prompt(params))],
            system_instruction: Some(Content::text(SONGWRITER_PERSONA)),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(song_schema()),
                ..Default::default()
            }),
        }
    }
}

impl<G: ContentGenerator> LyricsClient for GeminiLyricsClient<G> {
    async fn generate_lyrics(&self, params: &GeneratorParams) -> Result<SongLyrics> {
        tracing::info!(
            genre = %params.genre,
            mood = %params.mood,
            keywords = params.keywords.len(),
            model = %self.model,
            "composing lyrics"
        );

        let request = Self::build_request(params);
        let response = self.generator.generate_content(&self.model, &request).await?;

        let Some(text) = response.text() else {
            let reason = response.finish_reason().unwrap_or("no candidates");
            return Err(DaemonError::generation_failed(format!(
                "no text in response (finish reason: {})",
                reason
            )));
        };

        let song = parse_song(&text)?;
        tracing::info!(
            title = %song.title,
            sections = song.sections.len(),
            lines = song.line_count(),
            "lyrics composed"
        );
        Ok(song)
    }
}

/// Builds the natural-language songwriting instruction.
pub fn build_prompt(params: &GeneratorParams) -> String {
    let mut prompt = format!(
        "Write a professionally structured song in the {} genre with a {} mood.\n\
         The song should be about: {}.\n",
        params.genre,
        params.mood,
        params.topic.trim()
    );
    if !params.keywords.is_empty() {
        prompt.push_str(&format!(
            "Incorporate these keywords naturally: {}.\n",
            params.keywords.join(", ")
        ));
    }
    prompt.push_str(&format!(
        "The output must follow a classic song structure (e.g., {}).\n\
         Ensure the rhymes are clever and the rhythm fits the genre.",
        SUGGESTED_STRUCTURE
    ));
    prompt
}

/// Output schema declared to the model.
pub fn song_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A creative title for the song"
            },
            "sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": {
                            "type": "STRING",
                            "description": "Section type: Intro, Verse, Chorus, Bridge, or Outro"
                        },
                        "lines": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["type", "lines"]
                }
            }
        },
        "required": ["title", "sections"]
    })
}

#[derive(Deserialize)]
struct RawSong {
    title: String,
    #[serde(rename = "artistStyle", default)]
    artist_style: Option<String>,
    sections: Vec<RawSection>,
}

#[derive(Deserialize)]
struct RawSection {
    #[serde(rename = "type")]
    kind: String,
    lines: Vec<String>,
}

/// Parses model output into lyrics, enforcing the song schema.
///
/// Fails when the text is not JSON of the declared shape, a section type is
/// unknown, a section has no non-blank lines, or there are no sections.
pub fn parse_song(text: &str) -> Result<SongLyrics> {
    let raw: RawSong = serde_json::from_str(text.trim())
        .map_err(|e| DaemonError::schema_mismatch(e.to_string()))?;

    if raw.sections.is_empty() {
        return Err(DaemonError::schema_mismatch("song has no sections"));
    }

    let sections = raw
        .sections
        .into_iter()
        .enumerate()
        .map(|(i, section)| {
            let kind = SectionKind::parse(&section.kind).ok_or_else(|| {
                DaemonError::schema_mismatch(format!(
                    "section {} has unknown type '{}'",
                    i, section.kind
                ))
            })?;
            if section.lines.iter().all(|line| line.trim().is_empty()) {
                return Err(DaemonError::schema_mismatch(format!(
                    "section {} ({}) has no lines",
                    i, kind
                )));
            }
            Ok(LyricSection {
                kind,
                lines: section.lines,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SongLyrics {
        title: raw.title,
        artist_style: raw.artist_style.filter(|s| !s.trim().is_empty()),
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::generation::gemini::GenerateContentResponse;
    use crate::generation::testing::CannedGenerator;
    use crate::types::{Genre, Mood};

    fn rain_params() -> GeneratorParams {
        GeneratorParams::new("rain in the city", Genre::Jazz, Mood::Melancholic)
            .with_keywords(["neon", "puddles"])
    }

    #[test]
    fn prompt_embeds_params() {
        let prompt = build_prompt(&rain_params());
        assert!(prompt.contains("Jazz genre"));
        assert!(prompt.contains("Melancholic mood"));
        assert!(prompt.contains("about: rain in the city."));
        assert!(prompt.contains("keywords naturally: neon, puddles."));
        assert!(prompt.contains(SUGGESTED_STRUCTURE));
    }

    #[test]
    fn prompt_omits_keywords_sentence_when_empty() {
        let params = GeneratorParams::new("summer", Genre::Pop, Mood::Happy);
        assert!(!build_prompt(&params).contains("keywords"));
    }

    #[test]
    fn schema_requires_title_and_sections() {
        let schema = song_schema();
        assert_eq!(schema["required"], json!(["title", "sections"]));
        assert_eq!(
            schema["properties"]["sections"]["items"]["required"],
            json!(["type", "lines"])
        );
    }

    #[test]
    fn request_declares_json_schema_and_persona() {
        let request = GeminiLyricsClient::<CannedGenerator>::build_request(&rain_params());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"], song_schema());
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("professional"));
    }

    #[test]
    fn parse_song_accepts_ordinal_labels_and_style() {
        let song = parse_song(
            r#"{"title":"T","artistStyle":"Sade","sections":[{"type":"Verse 1","lines":["a"]},{"type":"chorus","lines":["b"]}]}"#,
        )
        .unwrap();
        assert_eq!(song.sections[0].kind, SectionKind::Verse);
        assert_eq!(song.sections[1].kind, SectionKind::Chorus);
        assert_eq!(song.artist_style.as_deref(), Some("Sade"));
    }

    #[test]
    fn parse_song_rejects_bad_shapes() {
        let cases = [
            "not json",
            r#"{"sections":[]}"#,
            r#"{"title":"T"}"#,
            r#"{"title":"T","sections":[]}"#,
            r#"{"title":"T","sections":[{"type":"Verse"}]}"#,
            r#"{"title":"T","sections":[{"type":"Verse","lines":[]}]}"#,
            r#"{"title":"T","sections":[{"type":"Verse","lines":["","  "]}]}"#,
            r#"{"title":"T","sections":[{"type":"Verse","lines":["a"]},{"type":"Chorus","lines":[" "]}]}"#,
            r#"{"title":"T","sections":[{"type":"Solo","lines":["a"]}]}"#,
            r#"{"title":"T","sections":[{"type":"Verse","lines":[1,2]}]}"#,
        ];
        for case in cases {
            let err = parse_song(case).unwrap_err();
            assert_eq!(err.code, ErrorCode::SchemaMismatch, "case: {case}");
        }
    }

    #[test]
    fn parse_song_rejects_labels_outside_known_kinds() {
        // One unsupported label fails the whole song rather than dropping it
        let text = r#"{"title":"T","sections":[
            {"type":"Verse","lines":["a"]},
            {"type":"Pre-Chorus","lines":["b"]}
        ]}"#;
        let err = parse_song(text).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaMismatch);
        assert!(err.message.contains("Pre-Chorus"));
    }

    #[tokio::test]
    async fn generate_lyrics_parses_mocked_response() {
        let generator = CannedGenerator::new(GenerateContentResponse::from_text(
            r#"{"title":"T","sections":[{"type":"Verse","lines":["a","b"]}]}"#,
        ));
        let client = GeminiLyricsClient::new(generator, DEFAULT_TEXT_MODEL);

        let song = client.generate_lyrics(&rain_params()).await.unwrap();
        assert_eq!(song.title, "T");
        assert_eq!(song.sections.len(), 1);
        assert_eq!(song.sections[0].kind, SectionKind::Verse);
        assert_eq!(song.sections[0].lines, vec!["a", "b"]);

        let calls = client.generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, DEFAULT_TEXT_MODEL);
    }

    #[tokio::test]
    async fn generate_lyrics_empty_text_is_generation_error() {
        let client = GeminiLyricsClient::new(
            CannedGenerator::new(GenerateContentResponse::from_text("")),
            DEFAULT_TEXT_MODEL,
        );
        let err = client.generate_lyrics(&rain_params()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::GenerationFailed);

        let client = GeminiLyricsClient::new(
            CannedGenerator::new(GenerateContentResponse::default()),
            DEFAULT_TEXT_MODEL,
        );
        let err = client.generate_lyrics(&rain_params()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::GenerationFailed);
    }

    #[tokio::test]
    async fn generate_lyrics_invalid_json_is_schema_error() {
        let client = GeminiLyricsClient::new(
            CannedGenerator::new(GenerateContentResponse::from_text("Here are your lyrics!")),
            DEFAULT_TEXT_MODEL,
        );
        let err = client.generate_lyrics(&rain_params()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaMismatch);
    }

    #[tokio::test]
    async fn generate_lyrics_with_empty_topic_still_validates_schema() {
        let client = GeminiLyricsClient::new(
            CannedGenerator::new(GenerateContentResponse::from_text(r#"{"title":"T"}"#)),
            DEFAULT_TEXT_MODEL,
        );
        let params = GeneratorParams::new("", Genre::Pop, Mood::Happy);
        let err = client.generate_lyrics(&params).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaMismatch);
    }

    #[tokio::test]
    async fn generate_lyrics_propagates_transport_error() {
        let client = GeminiLyricsClient::new(CannedGenerator::failing(), DEFAULT_TEXT_MODEL);
        let err = client.generate_lyrics(&rain_params()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorUnavailable);
    }
}
