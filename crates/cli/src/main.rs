use std::process::ExitCode;

use clap::Parser;
use dreamer_cli::cli::Cli;
use dreamer_cli::error::usage_exit_code;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    dreamer_cli::logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            return ExitCode::from(usage_exit_code(&e));
        }
    };
    let mut stdout = std::io::stdout();

    match dreamer_cli::run(cli, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
