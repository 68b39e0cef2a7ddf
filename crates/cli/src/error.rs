use std::path::PathBuf;

use dreamer_core::error::CoreError;
use dreamer_genai::GenerationError;
use dreamer_pipeline::PipelineError;

/// Process exit code for any fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// Fatal errors surfaced to the user as `Error: ...`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// An environment variable held an unparseable value.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidSetting { name: &'static str, value: String },

    /// Rejected configuration or input format.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backend could not be constructed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to read prompt file {}: {source}", path.display())]
    PromptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the terminal failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

/// Exit code for an argument-parsing outcome.
///
/// `--help` and `--version` exit cleanly; every usage error is fatal.
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_FAILURE
    } else {
        0
    }
}
