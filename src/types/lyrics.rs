//! Song lyrics types.
//!
//! A SongLyrics is produced atomically by the lyrics client and identified
//! by a deterministic song_id computed from its content.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Structural role of a lyric section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

impl SectionKind {
    /// Returns the display name of the section kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Intro => "Intro",
            SectionKind::Verse => "Verse",
            SectionKind::Chorus => "Chorus",
            SectionKind::Bridge => "Bridge",
            SectionKind::Outro => "Outro",
        }
    }

    /// Parses a section kind, case-insensitively.
    ///
    /// Models often label sections "Verse 2" or "Chorus 1"; a trailing
    /// ordinal is accepted and dropped. The set is closed: labels such as
    /// "Pre-Chorus" or "Hook" return None and the song is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let name = s
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .trim();
        match name.to_lowercase().as_str() {
            "intro" => Some(SectionKind::Intro),
            "verse" => Some(SectionKind::Verse),
            "chorus" => Some(SectionKind::Chorus),
            "bridge" => Some(SectionKind::Bridge),
            "outro" => Some(SectionKind::Outro),
            _ => None,
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structural unit of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricSection {
    /// Section role (Verse, Chorus, ...).
    #[serde(rename = "type")]
    pub kind: SectionKind,

    /// Lines in singing order. Never empty for a parsed section.
    pub lines: Vec<String>,
}

impl LyricSection {
    /// Creates a section from any iterator of lines.
    pub fn new<I, S>(kind: SectionKind, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// A complete set of structured lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongLyrics {
    /// Song title.
    pub title: String,

    /// Optional style note returned by the model ("in the style of ...").
    #[serde(rename = "artistStyle", default, skip_serializing_if = "Option::is_none")]
    pub artist_style: Option<String>,

    /// Sections in performance order.
    pub sections: Vec<LyricSection>,
}

impl SongLyrics {
    /// Creates a song without an artist style.
    pub fn new(title: impl Into<String>, sections: Vec<LyricSection>) -> Self {
        Self {
            title: title.into(),
            artist_style: None,
            sections,
        }
    }

    /// Total number of lines across all sections.
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// Deterministic identifier for this song's content.
    pub fn song_id(&self) -> String {
        compute_song_id(self)
    }
}

/// Computes a deterministic song ID from the lyrics content.
///
/// The ID is the first 16 hex characters of the SHA256 hash of the title
/// followed by each section's kind and lines. Used to name exported files.
pub fn compute_song_id(song: &SongLyrics) -> String {
    let mut hasher = Sha256::new();
    hasher.update(song.title.as_bytes());
    for section in &song.sections {
        hasher.update(b"\n[");
        hasher.update(section.kind.as_str().as_bytes());
        hasher.update(b"]");
        for line in &section.lines {
            hasher.update(b"\n");
            hasher.update(line.as_bytes());
        }
    }
    let result = hasher.finalize();
    // Take first 8 bytes (16 hex chars)
    hex::encode(&result[..8])
}
