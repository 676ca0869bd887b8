//! Normalized types exchanged with the remote generation API.

use serde::{Deserialize, Serialize};

/// Options recognized by a generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Text describing what should be excluded from the generated video.
    pub negative_prompt: Option<String>,
}

impl GenerationOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the negative prompt.
    pub fn with_negative_prompt(mut self, text: impl Into<String>) -> Self {
        self.negative_prompt = Some(text.into());
        self
    }
}

/// The payload of a completed generation, as normalized by the backend.
///
/// Exactly one of the fields is expected to be populated on success. The
/// backend is responsible for collapsing whatever shape the provider returns
/// into these two fields; callers never see the provider schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPayload {
    /// Raw video bytes, when the provider returned them inline.
    pub inline_bytes: Option<Vec<u8>>,
    /// A download reference, when the provider returned a URI instead.
    pub reference_uri: Option<String>,
}

/// One poll response for a long-running operation.
#[derive(Debug, Clone, Default)]
pub struct OperationSnapshot {
    /// Whether the operation has reached a terminal state.
    pub done: bool,
    /// The result payload, present only on successful completion.
    pub result: Option<GenerationPayload>,
    /// Remote-reported error description, present only on failure.
    pub error: Option<String>,
}
