use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use dreamer_core::checkpointing::DEFAULT_OUTPUT_DIR;

#[derive(Debug, Parser)]
#[command(name = "dreamer", version)]
#[command(about = "Transform audio into a synchronized visual storyboard")]
pub struct Cli {
    #[command(flatten)]
    pub generation: GenerationArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze an audio file, then render elements and scenes.
    Analyze(AnalyzeArgs),
    /// Render element reference images for an existing storyboard.
    Design(PhaseArgs),
    /// Render scene images for an existing storyboard.
    Render(PhaseArgs),
    /// Continue an interrupted run from its output directory.
    Resume(ResumeArgs),
}

/// Overrides for the environment settings. Unset flags keep the
/// environment (or built-in) value.
#[derive(Debug, Clone, Default, Args)]
pub struct GenerationArgs {
    /// Gemini API key (falls back to GEMINI_API_KEY).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Model used for audio analysis.
    #[arg(long, global = true)]
    pub analysis_model: Option<String>,

    /// Model used for image generation.
    #[arg(long, global = true)]
    pub image_model: Option<String>,

    /// Sampling temperature for analysis.
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Retries per image after the first attempt.
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Minimum backoff between image attempts, in seconds.
    #[arg(long, global = true)]
    pub min_wait: Option<f64>,

    /// Maximum backoff between image attempts, in seconds.
    #[arg(long, global = true)]
    pub max_wait: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// Input audio file (mp3, wav, m4a, aac, flac, ogg).
    pub audio: PathBuf,

    /// Directory to save results.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Stop after writing storyboard.json.
    #[arg(long)]
    pub analyze_only: bool,

    /// Replace the built-in analysis prompt with the contents of a file.
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct PhaseArgs {
    /// Storyboard JSON document.
    pub storyboard: PathBuf,

    /// Output directory (defaults to the storyboard's directory).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl PhaseArgs {
    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        match self.storyboard.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ResumeArgs {
    /// Output directory of a previous run.
    pub output_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_defaults() {
        let cli = Cli::try_parse_from(["dreamer", "analyze", "song.mp3"]).unwrap();
        assert_matches!(cli.command, Command::Analyze(ref args) if {
            args.output_dir == Path::new("./output") && !args.analyze_only
        });
        assert!(cli.generation.api_key.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dreamer", "resume", "out", "--retries", "5", "--image-model", "img-x",
        ])
        .unwrap();
        assert_eq!(cli.generation.retries, Some(5));
        assert_eq!(cli.generation.image_model.as_deref(), Some("img-x"));
        assert_matches!(cli.command, Command::Resume(ref args) if args.output_dir == Path::new("out"));
    }

    #[test]
    fn phase_output_dir_defaults_to_storyboard_dir() {
        let args = PhaseArgs {
            storyboard: PathBuf::from("runs/one/storyboard.json"),
            output_dir: None,
        };
        assert_eq!(args.resolved_output_dir(), PathBuf::from("runs/one"));

        let bare = PhaseArgs {
            storyboard: PathBuf::from("storyboard.json"),
            output_dir: None,
        };
        assert_eq!(bare.resolved_output_dir(), PathBuf::from("."));
    }

    #[test]
    fn explicit_output_dir_wins() {
        let cli = Cli::try_parse_from([
            "dreamer", "render", "a/storyboard.json", "--output-dir", "b",
        ])
        .unwrap();
        assert_matches!(cli.command, Command::Render(ref args) if {
            args.resolved_output_dir() == Path::new("b")
        });
    }

    #[test]
    fn missing_input_is_a_usage_error() {
        assert!(Cli::try_parse_from(["dreamer", "analyze"]).is_err());
    }
}
