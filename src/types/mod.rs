//! Core types for the lyricloom daemon.
//!
//! This module re-exports all the core data types used throughout the daemon:
//! - [`GeneratorParams`]: Songwriting preferences for one lyrics request
//! - [`SongLyrics`]: Structured lyrics returned by the text model
//! - [`LyricSection`]: One Intro/Verse/Chorus/Bridge/Outro block

mod lyrics;
mod params;

// Re-export all types at the module level
pub use lyrics::{compute_song_id, LyricSection, SectionKind, SongLyrics};
pub use params::{GeneratorParams, Genre, Mood};
