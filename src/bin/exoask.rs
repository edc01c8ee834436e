use std::process::ExitCode;

use clap::Parser;
use exochat::commands::ask::{self, AskArgs};

#[derive(Debug, Parser)]
#[command(
    name = "exoask",
    about = "Ask one question about Kepler exoplanet data",
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    ask: AskArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match ask::run(cli.ask).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
