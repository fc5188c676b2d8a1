//! GeneratorParams type describing a lyrics request.
//!
//! Genre and mood are closed sets; keywords are an ordered, de-duplicated
//! list of short phrases the lyrics should work in.

use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, Result};

/// Musical genre of the requested song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Genre {
    #[default]
    Pop,
    Rock,
    #[serde(rename = "Hip-Hop")]
    HipHop,
    Country,
    #[serde(rename = "R&B")]
    RnB,
    Metal,
    Indie,
    Jazz,
    Folk,
}

impl Genre {
    /// All genres in display order.
    pub const ALL: [Genre; 9] = [
        Genre::Pop,
        Genre::Rock,
        Genre::HipHop,
        Genre::Country,
        Genre::RnB,
        Genre::Metal,
        Genre::Indie,
        Genre::Jazz,
        Genre::Folk,
    ];

    /// Returns the display label of the genre.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Pop => "Pop",
            Genre::Rock => "Rock",
            Genre::HipHop => "Hip-Hop",
            Genre::Country => "Country",
            Genre::RnB => "R&B",
            Genre::Metal => "Metal",
            Genre::Indie => "Indie",
            Genre::Jazz => "Jazz",
            Genre::Folk => "Folk",
        }
    }

    /// Parses a genre from its label or a slug.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pop" => Some(Genre::Pop),
            "rock" => Some(Genre::Rock),
            "hip-hop" | "hiphop" | "hip_hop" | "hip hop" | "rap" => Some(Genre::HipHop),
            "country" => Some(Genre::Country),
            "r&b" | "rnb" | "r-and-b" | "r_and_b" => Some(Genre::RnB),
            "metal" => Some(Genre::Metal),
            "indie" => Some(Genre::Indie),
            "jazz" => Some(Genre::Jazz),
            "folk" => Some(Genre::Folk),
            _ => None,
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Emotional mood of the requested song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Mood {
    #[default]
    Happy,
    Sad,
    Angry,
    Romantic,
    Melancholic,
    Energetic,
    Nostalgic,
    Rebellious,
}

impl Mood {
    /// All moods in display order.
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Romantic,
        Mood::Melancholic,
        Mood::Energetic,
        Mood::Nostalgic,
        Mood::Rebellious,
    ];

    /// Returns the display label of the mood.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Romantic => "Romantic",
            Mood::Melancholic => "Melancholic",
            Mood::Energetic => "Energetic",
            Mood::Nostalgic => "Nostalgic",
            Mood::Rebellious => "Rebellious",
        }
    }

    /// Parses a mood from its label, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Songwriting preferences submitted for a single lyrics request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorParams {
    /// What the song is about. Must be non-empty after trimming.
    pub topic: String,

    /// Musical genre.
    #[serde(default)]
    pub genre: Genre,

    /// Emotional mood.
    #[serde(default)]
    pub mood: Mood,

    /// Phrases to weave into the lyrics, in the order they were added.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl GeneratorParams {
    /// Creates params with no keywords.
    pub fn new(topic: impl Into<String>, genre: Genre, mood: Mood) -> Self {
        Self {
            topic: topic.into(),
            genre,
            mood,
            keywords: Vec::new(),
        }
    }

    /// Builder-style keyword addition, same rules as [`add_keyword`](Self::add_keyword).
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            self.add_keyword(keyword.as_ref());
        }
        self
    }

    /// Adds a keyword after trimming it.
    ///
    /// Returns false when the trimmed keyword is empty or already present.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k == keyword) {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    /// Removes the keyword at `index`, returning it if it existed.
    pub fn remove_keyword(&mut self, index: usize) -> Option<String> {
        if index < self.keywords.len() {
            Some(self.keywords.remove(index))
        } else {
            None
        }
    }

    /// Validates the params before submission.
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(DaemonError::empty_topic());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_parsing() {
        assert_eq!(Genre::parse("jazz"), Some(Genre::Jazz));
        assert_eq!(Genre::parse("Hip-Hop"), Some(Genre::HipHop));
        assert_eq!(Genre::parse("hiphop"), Some(Genre::HipHop));
        assert_eq!(Genre::parse("R&B"), Some(Genre::RnB));
        assert_eq!(Genre::parse("rnb"), Some(Genre::RnB));
        assert_eq!(Genre::parse("polka"), None);
    }

    #[test]
    fn genre_labels_round_trip() {
        for genre in Genre::ALL {
            assert_eq!(Genre::parse(genre.as_str()), Some(genre));
        }
    }

    #[test]
    fn mood_parsing() {
        assert_eq!(Mood::parse("MELANCHOLIC"), Some(Mood::Melancholic));
        assert_eq!(Mood::parse(" happy "), Some(Mood::Happy));
        assert_eq!(Mood::parse("bored"), None);
    }

    #[test]
    fn genre_serializes_as_label() {
        let json = serde_json::to_string(&Genre::RnB).unwrap();
        assert_eq!(json, "\"R&B\"");
        let genre: Genre = serde_json::from_str("\"Hip-Hop\"").unwrap();
        assert_eq!(genre, Genre::HipHop);
    }

    #[test]
    fn keywords_trimmed_and_deduplicated() {
        let mut params = GeneratorParams::new("rain", Genre::Jazz, Mood::Sad);
        assert!(params.add_keyword("  neon "));
        assert!(!params.add_keyword("neon"));
        assert!(!params.add_keyword("   "));
        assert!(params.add_keyword("puddles"));
        assert_eq!(params.keywords, vec!["neon", "puddles"]);
    }

    #[test]
    fn remove_keyword_by_index() {
        let mut params =
            GeneratorParams::new("rain", Genre::Jazz, Mood::Sad).with_keywords(["a", "b", "c"]);
        assert_eq!(params.remove_keyword(1), Some("b".to_string()));
        assert_eq!(params.remove_keyword(5), None);
        assert_eq!(params.keywords, vec!["a", "c"]);
    }

    #[test]
    fn validate_rejects_blank_topic() {
        let params = GeneratorParams::new("   ", Genre::Pop, Mood::Happy);
        let err = params.validate().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidParams);

        let params = GeneratorParams::new("summer", Genre::Pop, Mood::Happy);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: GeneratorParams = serde_json::from_str(r#"{"topic":"x"}"#).unwrap();
        assert_eq!(params.genre, Genre::Pop);
        assert_eq!(params.mood, Mood::Happy);
        assert!(params.keywords.is_empty());
    }
}
