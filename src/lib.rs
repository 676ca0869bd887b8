#![warn(missing_docs)]
//! StoryReel - scripted scene generation stitched into one video.
//!
//! Drives Google's Veo model through its long-running-operation API: each
//! prompt of a script is submitted, polled to completion, and saved as one
//! clip, then the clips are merged with ffmpeg.
//!
//! # Quick Start
//!
//! ```no_run
//! use storyreel::{GenerationOptions, Orchestrator, VeoClient};
//!
//! #[tokio::main]
//! async fn main() -> storyreel::Result<()> {
//!     let backend = VeoClient::builder().build()?;
//!     let orchestrator = Orchestrator::new(backend);
//!     let options = GenerationOptions::new().with_negative_prompt("barking, woofing");
//!
//!     let prompts = vec!["A dragon soars over snow-capped mountains".to_string()];
//!     let report =
//!         storyreel::run_script(&orchestrator, &prompts, &options, "movie_clips".as_ref())
//!             .await?;
//!
//!     let clips = report.saved_paths();
//!     if !clips.is_empty() {
//!         storyreel::concatenate(&clips, "final_movie.mp4".as_ref()).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Scene failures (submission rejected, polling exhausted, unusable result)
//! are recorded per prompt and never abort the run; only a failing ffmpeg
//! invocation is fatal.

mod concat;
mod error;
mod job;
pub mod remote;
mod run;

pub use concat::{concat_manifest, concatenate, sorted_clips};
pub use error::{Result, StoryReelError};
pub use job::{GenerationJob, Orchestrator};
pub use remote::{GenerationOptions, GenerationPayload, OperationSnapshot, VeoClient, VeoModel, VideoBackend};
pub use run::{run_script, scene_filename, RunReport, SceneOutcome, SceneStatus};
