//! Job orchestration: submit, poll, extract.
//!
//! Drives one long-running remote generation operation per prompt. A
//! [`GenerationJob`] starts pending, is refreshed by poll snapshots, and is
//! absorbing once terminal.

use crate::error::{Result, StoryReelError};
use crate::remote::{GenerationOptions, GenerationPayload, VideoBackend};
use std::time::Duration;

/// One in-flight or completed remote generation operation.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    prompt: String,
    handle: String,
    done: bool,
    result: Option<GenerationPayload>,
    error: Option<String>,
}

impl GenerationJob {
    /// The prompt this job was submitted for.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The opaque operation handle assigned by the remote service.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Whether the job has reached a terminal state.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The remote-reported error, if the job failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Drives prompts through the remote API, one job at a time.
///
/// Holds the backend plus the polling policy: a fixed sleep between status
/// queries and a hard cap on the number of queries, so a single job can block
/// the caller for at most `poll_interval * max_attempts`.
pub struct Orchestrator<B> {
    backend: B,
    poll_interval: Duration,
    max_attempts: u32,
}

impl<B: VideoBackend> Orchestrator<B> {
    /// Creates an orchestrator with the default policy (10s interval,
    /// 60 attempts: 10 minutes max per job).
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            poll_interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }

    /// Sets the sleep between status queries.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum number of status queries per job.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Submits a generation request and returns the pending job.
    ///
    /// The returned job is never terminal: results only appear through
    /// [`await_completion`](Self::await_completion).
    pub async fn submit(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationJob> {
        if prompt.trim().is_empty() {
            return Err(StoryReelError::Submission("prompt is empty".into()));
        }

        let handle = self.backend.start(prompt, options).await?;
        tracing::debug!(handle = %handle, "submitted generation request");

        Ok(GenerationJob {
            prompt: prompt.to_string(),
            handle,
            done: false,
            result: None,
            error: None,
        })
    }

    /// Polls the job until it reaches a terminal state.
    ///
    /// Queries the remote status at most `max_attempts` times, replacing the
    /// job's state with each snapshot, and returns as soon as one reports
    /// completion. Fails with [`StoryReelError::Timeout`] when the budget is
    /// exhausted with the job still pending; the caller can skip this prompt
    /// and move on.
    pub async fn await_completion(&self, job: &mut GenerationJob) -> Result<()> {
        if job.done {
            return Ok(());
        }

        for attempt in 1..=self.max_attempts {
            let snapshot = self.backend.poll(&job.handle).await?;

            job.done = snapshot.done;
            job.error = snapshot.error;
            // A result is only trusted once the operation is terminal.
            job.result = if snapshot.done { snapshot.result } else { None };

            if job.done {
                tracing::debug!(handle = %job.handle, attempt, "generation reached terminal state");
                return Ok(());
            }

            tracing::debug!(
                handle = %job.handle,
                attempt,
                max_attempts = self.max_attempts,
                "generation still pending"
            );
            if attempt < self.max_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Err(StoryReelError::Timeout {
            attempts: self.max_attempts,
        })
    }

    /// Extracts the clip bytes from a terminal job.
    ///
    /// The bytes are returned exactly as the remote supplied them. A job that
    /// is not yet terminal, carries a remote error, has no result, or has only
    /// a reference URI fails with [`StoryReelError::Extraction`]. Dereferencing
    /// a URI needs a separate fetch protocol and is left to a collaborator.
    pub fn extract_result(job: &GenerationJob) -> Result<Vec<u8>> {
        if !job.done {
            return Err(StoryReelError::Extraction(
                "job has not reached a terminal state".into(),
            ));
        }

        if let Some(err) = &job.error {
            return Err(StoryReelError::Extraction(format!("remote error: {err}")));
        }

        match &job.result {
            Some(payload) => {
                if let Some(bytes) = &payload.inline_bytes {
                    return Ok(bytes.clone());
                }
                if let Some(uri) = &payload.reference_uri {
                    return Err(StoryReelError::Extraction(format!(
                        "result is a reference ({uri}); payload retrieval is not implemented here"
                    )));
                }
                Err(StoryReelError::Extraction(
                    "result carried neither inline bytes nor a reference".into(),
                ))
            }
            None => Err(StoryReelError::Extraction(
                "generation completed without a result".into(),
            )),
        }
    }

    /// Submits, awaits, and extracts in one call.
    pub async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<Vec<u8>> {
        let mut job = self.submit(prompt, options).await?;
        self.await_completion(&mut job).await?;
        Self::extract_result(&job)
    }
}
