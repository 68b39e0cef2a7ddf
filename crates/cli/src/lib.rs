//! `dreamer` command-line front end.
//!
//! Parses arguments, merges them over environment settings, validates
//! inputs and drives the pipeline. The binary in `main.rs` only wires up
//! logging and the HTTP backend; everything else lives here so it can be
//! exercised with a scripted backend.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

use std::io::Write;

use dreamer_genai::{GeminiApi, GenerationClient};

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::CliError;

/// Run one parsed invocation against the Gemini API.
///
/// Settings come from the environment with the command-line flags applied
/// on top.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let settings = Settings::from_env()?;
    run_with_settings(cli, settings, out).await
}

/// Like [`run`] with explicit base settings.
///
/// Inputs are validated before the backend is built or any directory is
/// created.
pub async fn run_with_settings(
    cli: Cli,
    settings: Settings,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let settings = settings.with_overrides(&cli.generation);
    commands::validate_input(&cli.command)?;

    let api = GeminiApi::with_base_url(settings.api_key().unwrap_or_default(), &settings.base_url)?;
    let client = GenerationClient::new(api);
    commands::execute(&cli.command, &settings, &client, out).await
}
