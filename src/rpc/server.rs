//! JSON-RPC server over stdin/stdout.
//!
//! Implements the JSON-RPC 2.0 protocol for daemon communication. Requests
//! are handled one at a time; between requests the server also waits for
//! playback to finish so it can notify the client.

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::audio::AudioDevice;
use crate::config::DaemonConfig;
use crate::error::Result;
use crate::generation::{LyricsClient, SpeechClient};
use crate::session::CompositionSession;

use super::methods::handle_request;
use super::types::{
    JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    PlaybackFinishedParams, JSONRPC_VERSION, PLAYBACK_FINISHED,
};

/// State shared across all request handlers.
pub struct ServerState<L, S, D: AudioDevice> {
    /// The composition session driven by requests.
    pub session: CompositionSession<L, S, D>,
    /// Daemon configuration.
    pub config: DaemonConfig,
    /// Set once a shutdown request has been handled.
    shutdown: bool,
}

impl<L, S, D> ServerState<L, S, D>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    /// Creates new server state.
    pub fn new(session: CompositionSession<L, S, D>, config: DaemonConfig) -> Self {
        Self {
            session,
            config,
            shutdown: false,
        }
    }

    /// Signals the server to shut down.
    pub fn shutdown(&mut self) {
        self.shutdown = true;
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }
}

/// Runs the JSON-RPC server, reading from stdin and writing to stdout.
///
/// Returns when stdin closes or a shutdown request is handled. The session
/// is torn down before returning.
pub async fn run_server<L, S, D>(mut state: ServerState<L, S, D>) -> Result<()>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    tracing::info!("JSON-RPC server started, waiting for requests");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => {
                        tracing::info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("error reading stdin: {}", e);
                        break;
                    }
                };

                // Skip empty lines
                if line.trim().is_empty() {
                    continue;
                }

                if let Some(response) = process_request(&line, &mut state).await {
                    write_line(&response);
                }

                if state.is_shutdown() {
                    tracing::info!("server shutdown requested");
                    break;
                }
            }
            _ = state.session.wait_for_playback_end() => {
                let title = state.session.song().map(|song| song.title.clone());
                send_notification(
                    PLAYBACK_FINISHED,
                    PlaybackFinishedParams {
                        title,
                        playback: state.session.playback_state(),
                    },
                );
            }
        }
    }

    state.session.teardown();
    tracing::info!("JSON-RPC server stopped");
    Ok(())
}

/// Processes a single JSON-RPC request line.
async fn process_request<L, S, D>(line: &str, state: &mut ServerState<L, S, D>) -> Option<String>
where
    L: LyricsClient,
    S: SpeechClient,
    D: AudioDevice,
{
    // Parse JSON
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                None,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            );
            return Some(serde_json::to_string(&error).unwrap_or_default());
        }
    };

    // Validate JSON-RPC version
    if request.jsonrpc != JSONRPC_VERSION {
        let error = JsonRpcErrorResponse::new(
            Some(request.id),
            JsonRpcError::invalid_request("Invalid JSON-RPC version (expected 2.0)"),
        );
        return Some(serde_json::to_string(&error).unwrap_or_default());
    }

    tracing::debug!(method = %request.method, "request");
    let result = handle_request(&request.method, request.params, state).await;

    match result {
        Ok(response) => Some(
            serde_json::to_string(&JsonRpcResponse::new(request.id, response)).unwrap_or_default(),
        ),
        Err(error) => {
            tracing::warn!(method = %request.method, code = error.code, "{}", error.message);
            Some(
                serde_json::to_string(&JsonRpcErrorResponse::new(Some(request.id), error))
                    .unwrap_or_default(),
            )
        }
    }
}

fn write_line(line: &str) {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", line).ok();
    stdout.flush().ok();
}

/// Sends a JSON-RPC notification to stdout.
pub fn send_notification<T: serde::Serialize>(method: &'static str, params: T) {
    let notification = JsonRpcNotification::new(method, params);
    if let Ok(json) = serde_json::to_string(&notification) {
        write_line(&json);
    }
}
