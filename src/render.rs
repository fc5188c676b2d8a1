//! Rendering and export of lyrics.
//!
//! Section cards number each kind independently ("Verse 1", "Verse 2"),
//! the plain-text form is what gets copied or printed, and the speech script
//! is the flat text handed to the speech model.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{DaemonError, ErrorCode, Result};
use crate::types::{SectionKind, SongLyrics};

/// A section prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCard {
    /// Section role.
    pub kind: SectionKind,

    /// 1-based occurrence of this kind within the song.
    pub ordinal: usize,

    /// Display heading: "Verse 2" for verses, the kind name otherwise.
    pub heading: String,

    /// Lines of the section.
    pub lines: Vec<String>,
}

/// Builds one card per section, in song order.
pub fn section_cards(song: &SongLyrics) -> Vec<SectionCard> {
    let mut cards: Vec<SectionCard> = Vec::with_capacity(song.sections.len());
    for section in &song.sections {
        let ordinal = cards.iter().filter(|c| c.kind == section.kind).count() + 1;
        let heading = match section.kind {
            SectionKind::Verse => format!("{} {}", section.kind, ordinal),
            kind => kind.to_string(),
        };
        cards.push(SectionCard {
            kind: section.kind,
            ordinal,
            heading,
            lines: section.lines.clone(),
        });
    }
    cards
}

/// Plain-text rendering used for clipboard, print and file export.
///
/// ```text
/// Title
///
/// [Verse]
/// line
/// line
///
/// [Chorus]
/// line
/// ```
pub fn plain_text(song: &SongLyrics) -> String {
    let body = song
        .sections
        .iter()
        .map(|s| format!("[{}]\n{}", s.kind, s.lines.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}\n\n{}", song.title, body)
}

/// Flat script sent to the speech model.
pub fn speech_script(song: &SongLyrics) -> String {
    song.sections
        .iter()
        .map(|s| s.lines.join(". "))
        .collect::<Vec<_>>()
        .join(". ")
}

/// Writes the plain-text rendering to `path`.
pub fn write_lyrics(song: &SongLyrics, path: &Path) -> Result<()> {
    let mut text = plain_text(song);
    text.push('\n');
    fs::write(path, text).map_err(|e| {
        DaemonError::with_source(
            ErrorCode::ExportFailed,
            format!("Failed to write lyrics to {}", path.display()),
            e,
        )
    })?;
    tracing::info!(path = %path.display(), "wrote lyrics");
    Ok(())
}

/// Writes the lyrics into `dir` as `<song_id>.txt`, creating the directory.
pub fn save_lyrics(song: &SongLyrics, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| {
        DaemonError::with_source(
            ErrorCode::ExportFailed,
            format!("Failed to create export directory {}", dir.display()),
            e,
        )
    })?;
    let path = dir.join(format!("{}.txt", song.song_id()));
    write_lyrics(song, &path)?;
    Ok(path)
}
