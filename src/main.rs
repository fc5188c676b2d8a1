//! lyricloom-daemon: AI songwriting with sung previews.
//!
//! This binary can run in two modes:
//! - CLI mode: Compose one song, optionally sing, save and play it
//! - Daemon mode: JSON-RPC server for editor integration

use std::time::Instant;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use lyricloom_daemon::audio::{
    decode_base64_pcm, write_wav, PlaybackController, SystemDevice, CHANNELS, SAMPLE_RATE,
};
use lyricloom_daemon::cli::Cli;
use lyricloom_daemon::config::DaemonConfig;
use lyricloom_daemon::generation::{
    GeminiClient, GeminiLyricsClient, GeminiSpeechClient, LyricsClient, SpeechClient,
};
use lyricloom_daemon::render::{self, write_lyrics};
use lyricloom_daemon::rpc::{run_server, ServerState};
use lyricloom_daemon::session::CompositionSession;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_tracing();

    if !cli.is_daemon_mode() && !cli.is_cli_mode() {
        print_usage();
        return Ok(());
    }

    let mut config = DaemonConfig::from_env();
    if let Some(ref voice) = cli.voice {
        config.voice = voice.clone();
    }
    if let Some(problem) = config.validate() {
        bail!("invalid configuration: {}", problem);
    }

    // cpal streams are not Send, so everything runs on one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    if cli.is_daemon_mode() {
        runtime.block_on(run_daemon_mode(config))
    } else {
        runtime.block_on(run_cli_mode(&cli, config))
    }
}

/// Logs go to stderr; stdout is reserved for lyrics and JSON-RPC.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lyricloom_daemon=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the CLI mode for a single song.
async fn run_cli_mode(cli: &Cli, config: DaemonConfig) -> anyhow::Result<()> {
    let params = cli.generator_params();
    let client = GeminiClient::from_config(&config)?;
    let lyrics = GeminiLyricsClient::new(client.clone(), &config.text_model);
    let speech = GeminiSpeechClient::new(client, &config.speech_model);

    eprintln!("=== lyricloom-daemon CLI ===");
    eprintln!("Topic: \"{}\"", params.topic);
    eprintln!("Genre: {}", params.genre);
    eprintln!("Mood: {}", params.mood);
    if !params.keywords.is_empty() {
        eprintln!("Keywords: {}", params.keywords.join(", "));
    }
    eprintln!("Model: {}", config.text_model);
    eprintln!();

    params.validate()?;

    eprintln!("Composing lyrics...");
    let start_time = Instant::now();
    let song = lyrics.generate_lyrics(&params).await?;
    eprintln!(
        "Composed \"{}\" ({} sections, {} lines) in {:.2}s",
        song.title,
        song.sections.len(),
        song.line_count(),
        start_time.elapsed().as_secs_f32()
    );
    eprintln!();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&song)?);
    } else {
        println!("{}", render::plain_text(&song));
    }

    if let Some(ref path) = cli.lyrics_out {
        write_lyrics(&song, path)?;
        eprintln!("Lyrics saved to: {}", path.display());
    }

    if !cli.wants_audio() {
        return Ok(());
    }

    eprintln!();
    eprintln!("Generating sung preview (voice: {})...", config.voice);
    let start_time = Instant::now();
    let payload = speech
        .generate_song_audio(&render::speech_script(&song), &config.voice)
        .await?;
    let buffer = decode_base64_pcm(&payload, SAMPLE_RATE, CHANNELS)?;
    eprintln!(
        "Generated {:.2}s of audio in {:.2}s",
        buffer.duration().as_secs_f32(),
        start_time.elapsed().as_secs_f32()
    );

    if let Some(ref path) = cli.output {
        eprintln!("Writing WAV file...");
        write_wav(&buffer, path)?;
        eprintln!("Saved to: {}", path.display());
    }

    if cli.play {
        let device = SystemDevice::from_kind(config.output)?;
        if !device.is_audible() {
            eprintln!("Note: silent output selected; playback is timed but inaudible.");
        }
        let mut controller = PlaybackController::new(device);
        controller.play(buffer)?;
        eprintln!("Playing... (Ctrl-C to stop)");

        tokio::select! {
            _ = controller.wait_for_completion() => eprintln!("Playback finished."),
            _ = tokio::signal::ctrl_c() => {
                controller.stop();
                eprintln!("Playback stopped.");
            }
        }
        controller.release();
    }

    Ok(())
}

/// Runs the daemon mode (JSON-RPC server).
async fn run_daemon_mode(config: DaemonConfig) -> anyhow::Result<()> {
    eprintln!("=== lyricloom-daemon JSON-RPC Server ===");
    eprintln!("Reading from stdin, writing to stdout.");
    eprintln!("Send JSON-RPC requests to control the daemon.");
    eprintln!();

    let client = GeminiClient::from_config(&config)?;
    let device = SystemDevice::from_kind(config.output)?;

    eprintln!("Text model: {}", config.text_model);
    eprintln!("Speech model: {} (voice: {})", config.speech_model, config.voice);
    if device.is_audible() {
        eprintln!("Audio output: speaker");
    } else {
        eprintln!("Audio output: silent (build with --features speaker for sound)");
    }
    eprintln!("Export directory: {}", config.effective_export_path().display());
    eprintln!();

    let session = CompositionSession::new(
        GeminiLyricsClient::new(client.clone(), &config.text_model),
        GeminiSpeechClient::new(client, &config.speech_model),
        device,
        config.voice.clone(),
    );

    run_server(ServerState::new(session, config)).await?;
    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("lyricloom-daemon: AI songwriting with sung previews");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  Compose lyrics:");
    eprintln!("    lyricloom-daemon --topic \"rain in the city\" --genre jazz --mood melancholic -k neon");
    eprintln!();
    eprintln!("  Compose, sing and play:");
    eprintln!("    lyricloom-daemon --topic \"summer road trip\" --play --output song.wav");
    eprintln!();
    eprintln!("  Daemon mode (JSON-RPC server):");
    eprintln!("    lyricloom-daemon --daemon");
    eprintln!();
    eprintln!("Requires GEMINI_API_KEY (or API_KEY) in the environment.");
    eprintln!("Run 'lyricloom-daemon --help' for full options.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_usage_doesnt_panic() {
        print_usage();
    }
}
