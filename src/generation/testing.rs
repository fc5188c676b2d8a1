//! Canned collaborator for unit tests.

use std::cell::RefCell;

use super::gemini::{ContentGenerator, GenerateContentRequest, GenerateContentResponse};
use crate::error::{DaemonError, Result};

/// Returns the same response to every request and records each call.
pub struct CannedGenerator {
    response: Option<GenerateContentResponse>,
    calls: RefCell<Vec<(String, serde_json::Value)>>,
}

impl CannedGenerator {
    pub fn new(response: GenerateContentResponse) -> Self {
        Self {
            response: Some(response),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A generator whose every call fails like an unreachable network.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// (model, serialized request) for each call so far.
    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.borrow().clone()
    }
}

impl ContentGenerator for CannedGenerator {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let body = serde_json::to_value(request).unwrap();
        self.calls.borrow_mut().push((model.to_string(), body));
        self.response
            .clone()
            .ok_or_else(|| DaemonError::collaborator_unavailable("connection refused"))
    }
}
