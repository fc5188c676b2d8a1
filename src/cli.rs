//! CLI argument parser for standalone mode.
//!
//! Composes one song from the command line, optionally sings and plays it,
//! without the JSON-RPC daemon.

use std::path::PathBuf;

use clap::Parser;

use crate::types::{GeneratorParams, Genre, Mood};

/// lyricloom-daemon: AI songwriting with sung previews
#[derive(Parser, Debug)]
#[command(name = "lyricloom-daemon")]
#[command(about = "Compose song lyrics with Gemini and preview them as sung audio")]
#[command(version)]
pub struct Cli {
    /// What the song is about
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Musical genre (Pop, Rock, Hip-Hop, Country, R&B, Metal, Indie, Jazz, Folk)
    #[arg(short, long, default_value = "Pop", value_parser = parse_genre)]
    pub genre: Genre,

    /// Mood (Happy, Sad, Angry, Romantic, Melancholic, Energetic, Nostalgic, Rebellious)
    #[arg(short, long, default_value = "Happy", value_parser = parse_mood)]
    pub mood: Mood,

    /// Keyword to weave into the lyrics (repeatable)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Generate a sung preview of the lyrics
    #[arg(long)]
    pub sing: bool,

    /// Play the sung preview to the end (implies --sing). Audible only when
    /// built with `--features speaker`; otherwise playback is timed but silent
    /// (see LYRICLOOM_OUTPUT)
    #[arg(long)]
    pub play: bool,

    /// Write the sung preview to a WAV file (implies --sing)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the plain-text lyrics to a file
    #[arg(long)]
    pub lyrics_out: Option<PathBuf>,

    /// Prebuilt voice for the sung preview
    #[arg(long)]
    pub voice: Option<String>,

    /// Print the song as JSON instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Run in daemon mode (JSON-RPC over stdio)
    #[arg(long)]
    pub daemon: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running in CLI mode (not daemon mode).
    pub fn is_cli_mode(&self) -> bool {
        !self.daemon && self.topic.is_some()
    }

    /// Returns true if running in daemon mode.
    pub fn is_daemon_mode(&self) -> bool {
        self.daemon
    }

    /// Returns true if song audio should be generated.
    pub fn wants_audio(&self) -> bool {
        self.sing || self.play || self.output.is_some()
    }

    /// Builds generator params from the flags.
    pub fn generator_params(&self) -> GeneratorParams {
        GeneratorParams::new(self.topic.clone().unwrap_or_default(), self.genre, self.mood)
            .with_keywords(&self.keywords)
    }
}

fn parse_genre(s: &str) -> Result<Genre, String> {
    Genre::parse(s).ok_or_else(|| {
        let names: Vec<&str> = Genre::ALL.iter().map(|g| g.as_str()).collect();
        format!("unknown genre '{}', expected one of: {}", s, names.join(", "))
    })
}

fn parse_mood(s: &str) -> Result<Mood, String> {
    Mood::parse(s).ok_or_else(|| {
        let names: Vec<&str> = Mood::ALL.iter().map(|m| m.as_str()).collect();
        format!("unknown mood '{}', expected one of: {}", s, names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lyricloom-daemon").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--topic", "rain"]);
        assert_eq!(cli.genre, Genre::Pop);
        assert_eq!(cli.mood, Mood::Happy);
        assert!(cli.keywords.is_empty());
        assert!(!cli.wants_audio());
        assert!(!cli.json);
    }

    #[test]
    fn cli_mode_detection() {
        let cli_mode = parse(&["--topic", "rain"]);
        assert!(cli_mode.is_cli_mode());
        assert!(!cli_mode.is_daemon_mode());

        let daemon_mode = parse(&["--daemon"]);
        assert!(!daemon_mode.is_cli_mode());
        assert!(daemon_mode.is_daemon_mode());

        let neither = parse(&[]);
        assert!(!neither.is_cli_mode());
        assert!(!neither.is_daemon_mode());
    }

    #[test]
    fn genre_and_mood_slugs() {
        let cli = parse(&["-t", "rain", "-g", "hip-hop", "-m", "melancholic"]);
        assert_eq!(cli.genre, Genre::HipHop);
        assert_eq!(cli.mood, Mood::Melancholic);

        let cli = parse(&["-t", "rain", "--genre", "R&B"]);
        assert_eq!(cli.genre, Genre::RnB);
    }

    #[test]
    fn unknown_genre_rejected() {
        let result = Cli::try_parse_from(["lyricloom-daemon", "-t", "x", "-g", "polka"]);
        assert!(result.is_err());
    }

    #[test]
    fn keywords_build_params() {
        let cli = parse(&["-t", "rain in the city", "-k", "neon", "-k", "puddles", "-k", "neon"]);
        let params = cli.generator_params();
        assert_eq!(params.topic, "rain in the city");
        assert_eq!(params.keywords, vec!["neon", "puddles"]);
    }

    #[test]
    fn play_help_mentions_speaker_feature() {
        use clap::CommandFactory;
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("speaker"));
        assert!(help.contains("silent"));
    }

    #[test]
    fn audio_flags() {
        assert!(parse(&["-t", "x", "--sing"]).wants_audio());
        assert!(parse(&["-t", "x", "--play"]).wants_audio());
        assert!(parse(&["-t", "x", "-o", "song.wav"]).wants_audio());
        assert!(!parse(&["-t", "x", "--lyrics-out", "song.txt"]).wants_audio());
    }
}
