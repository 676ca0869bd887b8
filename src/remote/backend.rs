//! Backend trait for remote video generation services.

use crate::error::Result;
use crate::remote::types::{GenerationOptions, OperationSnapshot};
use async_trait::async_trait;

/// Trait for services that run video generation as a long-running operation.
///
/// The orchestrator is written against this trait, so tests can substitute a
/// scripted fake for the real HTTP client.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Starts a generation job and returns its opaque operation handle.
    async fn start(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Queries the current state of a previously started operation.
    async fn poll(&self, handle: &str) -> Result<OperationSnapshot>;
}
