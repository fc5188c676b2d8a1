//! JSON-RPC module for daemon communication.
//!
//! Provides the JSON-RPC 2.0 server implementation for:
//! - `compose`: Compose lyrics from topic, genre, mood and keywords
//! - `create_song`: Generate and play a sung preview
//! - `toggle_playback`: Play or stop the preview
//! - `stop`: Stop playback
//! - `status`: Current song cards, playback state and error
//! - `export_text`: Plain-text lyrics
//! - `save`: Write lyrics to the export directory
//! - `ping`: Health check
//! - `shutdown`: Graceful shutdown
//!
//! Notifications:
//! - `playback_finished`: The preview played to the end

pub mod methods;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use server::{run_server, send_notification, ServerState};
pub use types::{
    ComposeParams, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, PlaybackFinishedParams, RequestId,
};
