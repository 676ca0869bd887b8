//! CLI for StoryReel - scripted scene generation stitched into one video.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use storyreel::{GenerationOptions, Orchestrator, RunReport, SceneStatus, VeoClient, VeoModel};

#[derive(Parser)]
#[command(name = "storyreel")]
#[command(about = "Generate video clips from a scene script via Veo and stitch them with ffmpeg")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one clip per scene of a script
    Generate(GenerateArgs),

    /// Concatenate existing clips into one movie
    Combine(CombineArgs),

    /// Generate all scenes, then concatenate the successful clips
    Run(RunArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Script file: one scene prompt per line ('#' lines and blanks skipped)
    #[arg(short, long)]
    script: PathBuf,

    /// Directory for the generated clips
    #[arg(short, long, default_value = "movie_clips")]
    output_dir: PathBuf,

    /// Text to exclude from generation
    #[arg(long)]
    negative_prompt: Option<String>,

    /// Seconds to sleep between status polls
    #[arg(long, default_value_t = 10)]
    poll_interval: u64,

    /// Maximum status polls per scene before giving up
    #[arg(long, default_value_t = 60)]
    max_attempts: u32,

    /// Veo model identifier
    #[arg(long, default_value = "veo-3.0-generate-preview")]
    model: VeoModel,
}

#[derive(Args)]
struct CombineArgs {
    /// Directory holding the clips to merge
    #[arg(short, long, default_value = "movie_clips")]
    clips_dir: PathBuf,

    /// Path of the merged movie
    #[arg(short, long, default_value = "final_movie.mp4")]
    output: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    generate: GenerateArgs,

    /// Path of the merged movie
    #[arg(long, default_value = "final_movie.mp4")]
    movie: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Combine(args) => {
            combine(&args.clips_dir, &args.output, cli.json).await?;
        }
        Commands::Run(args) => {
            let movie = args.movie.clone();
            let clips = generate(args.generate, cli.json).await?;
            if clips.is_empty() {
                println!("No clips were generated; skipping concatenation.");
            } else {
                storyreel::concatenate(&clips, &movie).await?;
                println!("Movie created at {}", movie.display());
            }
        }
    }

    Ok(())
}

fn read_script(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let prompts: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    anyhow::ensure!(
        !prompts.is_empty(),
        "script {} contains no prompts",
        path.display()
    );
    Ok(prompts)
}

/// Returns the saved clip paths, in scene order.
async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<Vec<PathBuf>> {
    let prompts = read_script(&args.script)?;

    let backend = VeoClient::builder().model(args.model).build()?;
    let orchestrator = Orchestrator::new(backend)
        .poll_interval(Duration::from_secs(args.poll_interval))
        .max_attempts(args.max_attempts);

    let mut options = GenerationOptions::new();
    if let Some(negative) = args.negative_prompt {
        options = options.with_negative_prompt(negative);
    }

    println!(
        "Generating {} scene(s) into {}",
        prompts.len(),
        args.output_dir.display()
    );

    let report = storyreel::run_script(&orchestrator, &prompts, &options, &args.output_dir).await?;

    print_summary(&report, json_output)?;
    Ok(report.saved_paths())
}

fn print_summary(report: &RunReport, json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\nScenes processed: {}", report.scenes.len());
    println!("Succeeded: {}", report.successes());
    println!("Failed: {}", report.failures());
    for scene in &report.scenes {
        match &scene.status {
            SceneStatus::Saved { path, bytes } => {
                println!(
                    "  scene {:02}: saved {} ({} bytes)",
                    scene.index + 1,
                    path.display(),
                    bytes
                );
            }
            SceneStatus::Failed { reason } => {
                println!("  scene {:02}: failed - {}", scene.index + 1, reason);
            }
        }
    }
    Ok(())
}

async fn combine(clips_dir: &Path, output: &Path, json_output: bool) -> anyhow::Result<()> {
    let clips = storyreel::sorted_clips(clips_dir).await?;

    if clips.is_empty() {
        println!("No clips found in {}; nothing to combine.", clips_dir.display());
        return Ok(());
    }

    storyreel::concatenate(&clips, output).await?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "clips": clips.len(),
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Merged {} clip(s) into {}",
            clips.len(),
            output.display()
        );
    }
    Ok(())
}
