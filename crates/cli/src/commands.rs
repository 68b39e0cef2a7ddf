//! Subcommand execution and terminal reporting.

use std::io::Write;
use std::path::Path;

use dreamer_core::audio::audio_mime_type;
use dreamer_core::checkpointing::FINAL_FILE;
use dreamer_core::prompts::ANALYSIS_PROMPT;
use dreamer_core::storyboard::Storyboard;
use dreamer_genai::{GenerationBackend, GenerationClient};
use dreamer_pipeline::persistence::load;
use dreamer_pipeline::{PhaseReport, Pipeline, PipelineError, RunReport};

use crate::cli::{AnalyzeArgs, Command};
use crate::config::Settings;
use crate::error::CliError;

/// Reject missing or unsupported inputs before any work starts.
pub fn validate_input(command: &Command) -> Result<(), CliError> {
    match command {
        Command::Analyze(args) => {
            require_file(&args.audio)?;
            audio_mime_type(&args.audio)?;
        }
        Command::Design(args) | Command::Render(args) => require_file(&args.storyboard)?,
        Command::Resume(args) => {
            if !args.output_dir.is_dir() {
                return Err(PipelineError::NotFound {
                    path: args.output_dir.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Run `command` with `client`, writing progress and results to `out`.
pub async fn execute<B: GenerationBackend>(
    command: &Command,
    settings: &Settings,
    client: &GenerationClient<B>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let analysis = settings.analysis_config()?;
    let image = settings.image_config()?;

    match command {
        Command::Analyze(args) => {
            let prompt = analysis_prompt(args).await?;
            let pipeline = Pipeline::new(client, analysis, image, &args.output_dir);

            writeln!(out, "Analyzing audio: {}", args.audio.display())?;
            let mut storyboard = pipeline.analyze(&args.audio, &prompt).await?;
            print_summary(out, &storyboard)?;
            writeln!(
                out,
                "Storyboard saved to: {}",
                pipeline.layout().checkpoint_path().display()
            )?;

            if args.analyze_only {
                return Ok(());
            }
            let report = pipeline.produce(&mut storyboard).await?;
            print_run(out, &report, pipeline.layout().root())?;
        }
        Command::Design(args) => {
            let mut storyboard = load(&args.storyboard).await?;
            let pipeline = Pipeline::new(client, analysis, image, args.resolved_output_dir());

            writeln!(out, "Designing {} element(s)", storyboard.elements().len())?;
            let design = pipeline.design_elements(&mut storyboard).await?;
            print_phase(out, &design.report)?;
            writeln!(out, "Storyboard saved to: {}", design.checkpoint_path.display())?;
        }
        Command::Render(args) => {
            let mut storyboard = load(&args.storyboard).await?;
            let pipeline = Pipeline::new(client, analysis, image, args.resolved_output_dir());

            let references = pipeline.collect_reference_paths(&storyboard);
            writeln!(
                out,
                "Rendering {} scene(s) with {} reference image(s)",
                storyboard.scenes().len(),
                references.len()
            )?;
            let (report, final_path) = pipeline.render_scenes(&mut storyboard, &references).await?;
            print_phase(out, &report)?;
            writeln!(out, "Storyboard saved to: {}", final_path.display())?;
        }
        Command::Resume(args) => {
            let pipeline = Pipeline::new(client, analysis, image, &args.output_dir);

            writeln!(out, "Resuming processing in {}", args.output_dir.display())?;
            let (_, report) = pipeline.resume().await?;
            print_run(out, &report, pipeline.layout().root())?;
        }
    }
    Ok(())
}

fn require_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::NotFound {
            path: path.to_path_buf(),
        }
        .into())
    }
}

async fn analysis_prompt(args: &AnalyzeArgs) -> Result<String, CliError> {
    match &args.prompt_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CliError::PromptFile {
                path: path.clone(),
                source,
            }),
        None => Ok(ANALYSIS_PROMPT.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

fn print_summary(out: &mut impl Write, storyboard: &Storyboard) -> std::io::Result<()> {
    let summary = storyboard.summary();
    writeln!(out, "== Storyboard Generated ==")?;
    writeln!(out, "Title:    {}", summary.title)?;
    writeln!(out, "Style:    {}", summary.art_style)?;
    writeln!(out, "Elements: {}", summary.element_count)?;
    writeln!(out, "Scenes:   {}", summary.scene_count)
}

fn print_phase(out: &mut impl Write, report: &PhaseReport) -> std::io::Result<()> {
    for failure in &report.failed {
        writeln!(out, "Warning: {failure}")?;
    }
    writeln!(
        out,
        "Generated {}, reused {}, failed {}",
        report.generated.len(),
        report.reused.len(),
        report.failed.len()
    )
}

fn print_run(out: &mut impl Write, report: &RunReport, root: &Path) -> std::io::Result<()> {
    print_phase(out, &report.elements)?;
    print_phase(out, &report.scenes)?;
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    writeln!(out, "== Production Complete ==")?;
    writeln!(out, "Output saved to: {}", root.display())?;
    writeln!(out, "Check '{FINAL_FILE}' for the complete timeline.")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use assert_matches::assert_matches;

    use super::*;
    use crate::cli::ResumeArgs;

    fn analyze(audio: PathBuf) -> Command {
        Command::Analyze(AnalyzeArgs {
            audio,
            output_dir: PathBuf::from("unused"),
            analyze_only: false,
            prompt_file: None,
        })
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("test.txt");
        std::fs::write(&input, "not audio").unwrap();

        let err = validate_input(&analyze(input)).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported audio format: .txt");
    }

    #[test]
    fn missing_audio_is_rejected() {
        let err = validate_input(&analyze(PathBuf::from("nonexistent.mp3"))).unwrap_err();
        assert_eq!(err.to_string(), "File nonexistent.mp3 not found.");
    }

    #[test]
    fn resume_requires_directory() {
        let command = Command::Resume(ResumeArgs {
            output_dir: PathBuf::from("/definitely/not/here"),
        });
        assert_matches!(
            validate_input(&command),
            Err(CliError::Pipeline(PipelineError::NotFound { .. }))
        );
    }

    #[test]
    fn phase_warnings_name_each_failure() {
        use dreamer_pipeline::{FailedItem, ItemFailure};

        let report = PhaseReport {
            failed: vec![ItemFailure {
                item: FailedItem::Element {
                    name: "Hero".to_string(),
                },
                error: "API Error 1".to_string(),
            }],
            ..PhaseReport::default()
        };
        let mut out = Vec::new();
        print_phase(&mut out, &report).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Warning: Failed to generate element 'Hero': API Error 1"));
        assert!(text.contains("failed 1"));
    }
}
