//! Clip concatenation via the external `ffmpeg` binary.
//!
//! Uses the concat demuxer with stream copy, so merging is lossless and the
//! tool is treated as all-or-nothing: a non-zero exit fails the whole run.

use crate::error::{Result, StoryReelError};
use std::path::{Path, PathBuf};

/// Builds the contents of an ffmpeg concat manifest: one `file '<path>'` line
/// per clip, in the given order.
pub fn concat_manifest(clips: &[PathBuf]) -> String {
    let mut manifest = String::new();
    for clip in clips {
        manifest.push_str("file '");
        manifest.push_str(&clip.to_string_lossy());
        manifest.push_str("'\n");
    }
    manifest
}

/// Lists the `.mp4` clips of a directory in sorted order.
///
/// Clip names encode the scene index, so sorted order is prompt order.
pub async fn sorted_clips(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut clips = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("mp4") {
            clips.push(path);
        }
    }
    clips.sort();
    Ok(clips)
}

/// Concatenates the given clips, in order, into `output`.
///
/// Writes a concat manifest next to the output file, invokes ffmpeg, and
/// removes the manifest again whether or not ffmpeg succeeded. The clip list
/// must be non-empty; callers skip this step entirely when nothing was
/// generated.
pub async fn concatenate(clips: &[PathBuf], output: &Path) -> Result<()> {
    if clips.is_empty() {
        return Err(StoryReelError::Concat("no clips to concatenate".into()));
    }

    let manifest_path = output.with_extension("txt");
    tokio::fs::write(&manifest_path, concat_manifest(clips)).await?;

    tracing::info!(
        clips = clips.len(),
        output = %output.display(),
        "concatenating clips"
    );

    let status = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(&manifest_path)
        .args(["-c", "copy"])
        .arg(output)
        .status()
        .await;

    // Best-effort cleanup regardless of the ffmpeg outcome.
    let _ = tokio::fs::remove_file(&manifest_path).await;

    let status = status
        .map_err(|e| StoryReelError::Concat(format!("failed to run ffmpeg: {e}")))?;
    if !status.success() {
        return Err(StoryReelError::Concat(format!(
            "ffmpeg exited with {status}"
        )));
    }

    tracing::info!(output = %output.display(), "movie created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_format() {
        let clips = vec![
            PathBuf::from("/clips/scene_01.mp4"),
            PathBuf::from("/clips/scene_03.mp4"),
        ];
        assert_eq!(
            concat_manifest(&clips),
            "file '/clips/scene_01.mp4'\nfile '/clips/scene_03.mp4'\n"
        );
    }

    #[test]
    fn test_manifest_empty() {
        assert_eq!(concat_manifest(&[]), "");
    }

    #[tokio::test]
    async fn test_concatenate_refuses_empty_list() {
        let result = concatenate(&[], Path::new("/tmp/out.mp4")).await;
        assert!(matches!(result, Err(StoryReelError::Concat(_))));
    }

    #[tokio::test]
    async fn test_sorted_clips_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["scene_03.mp4", "scene_01.mp4", "notes.txt", "scene_02.mp4"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let clips = sorted_clips(dir.path()).await.unwrap();
        let names: Vec<_> = clips
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["scene_01.mp4", "scene_02.mp4", "scene_03.mp4"]);
    }

    #[tokio::test]
    async fn test_sorted_clips_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let clips = sorted_clips(dir.path()).await.unwrap();
        assert!(clips.is_empty());
    }
}
