//! Sequential scene runner.
//!
//! Walks an ordered script of prompts, drives each through the orchestrator,
//! and writes successful clips to disk. Scene failures are recorded, never
//! fatal; the report keeps prompt order throughout.

use crate::error::Result;
use crate::job::Orchestrator;
use crate::remote::{GenerationOptions, VideoBackend};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Returns the clip filename for a scene, 1-based and zero-padded so that a
/// sorted directory listing recovers prompt order.
pub fn scene_filename(index: usize) -> String {
    format!("scene_{:02}.mp4", index + 1)
}

/// Terminal status of one scene.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SceneStatus {
    /// Clip written to disk.
    Saved {
        /// Where the clip was written.
        path: PathBuf,
        /// Clip size in bytes.
        bytes: usize,
    },
    /// Generation or saving failed; the run continued.
    Failed {
        /// Why this scene produced no clip.
        reason: String,
    },
}

/// Outcome of one scene, in prompt order.
#[derive(Debug, Clone, Serialize)]
pub struct SceneOutcome {
    /// Zero-based position in the script.
    pub index: usize,
    /// The scene's prompt text.
    pub prompt: String,
    /// What happened.
    pub status: SceneStatus,
}

impl SceneOutcome {
    /// Whether this scene produced a clip.
    pub fn is_saved(&self) -> bool {
        matches!(self.status, SceneStatus::Saved { .. })
    }
}

/// Per-scene outcomes for a whole script run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Outcomes, one per prompt, in prompt order.
    pub scenes: Vec<SceneOutcome>,
}

impl RunReport {
    /// Number of scenes that produced a clip.
    pub fn successes(&self) -> usize {
        self.scenes.iter().filter(|s| s.is_saved()).count()
    }

    /// Number of scenes that failed.
    pub fn failures(&self) -> usize {
        self.scenes.len() - self.successes()
    }

    /// Paths of saved clips, in prompt-index order.
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.scenes
            .iter()
            .filter_map(|s| match &s.status {
                SceneStatus::Saved { path, .. } => Some(path.clone()),
                SceneStatus::Failed { .. } => None,
            })
            .collect()
    }
}

/// Runs every prompt of the script through the orchestrator, one at a time,
/// writing each successful clip to `output_dir` under its index-derived name.
///
/// Only the output-directory creation can fail the call itself; everything
/// that goes wrong for an individual scene ends up in the report.
pub async fn run_script<B: VideoBackend>(
    orchestrator: &Orchestrator<B>,
    prompts: &[String],
    options: &GenerationOptions,
    output_dir: &Path,
) -> Result<RunReport> {
    tokio::fs::create_dir_all(output_dir).await?;

    let mut report = RunReport::default();

    for (index, prompt) in prompts.iter().enumerate() {
        tracing::info!(
            scene = index + 1,
            total = prompts.len(),
            "generating scene"
        );

        let status = match generate_scene(orchestrator, prompt, options, output_dir, index).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(scene = index + 1, error = %e, "scene failed");
                SceneStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        report.scenes.push(SceneOutcome {
            index,
            prompt: prompt.clone(),
            status,
        });
    }

    Ok(report)
}

async fn generate_scene<B: VideoBackend>(
    orchestrator: &Orchestrator<B>,
    prompt: &str,
    options: &GenerationOptions,
    output_dir: &Path,
    index: usize,
) -> Result<SceneStatus> {
    let bytes = orchestrator.generate(prompt, options).await?;
    let path = output_dir.join(scene_filename(index));
    tokio::fs::write(&path, &bytes).await?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "scene saved");
    Ok(SceneStatus::Saved {
        path,
        bytes: bytes.len(),
    })
}
