use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;

use clap::Args;
use serde_json::json;
use tracing::debug;

use crate::commands::settings::{self, OutputMode, Settings, SettingsArgs};
use crate::llm::service::RetrievalOutcome;
use crate::logging;

/// Exit code for a question that ran but produced no answer.
pub const EXIT_NO_ANSWER: u8 = 2;

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
    /// Shorthand for --output json.
    #[arg(long)]
    pub json: bool,
    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,
    /// Print the planned requests without calling the service.
    #[arg(long)]
    pub dry_run: bool,
    /// Print version and build metadata.
    #[arg(long)]
    pub version: bool,
    /// Question to ask. Read from stdin when omitted.
    pub prompt: Option<String>,
}

pub async fn run(args: AskArgs) -> Result<ExitCode, String> {
    if args.version {
        println!("{}", settings::version_text());
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(args.settings.verbose, args.settings.quiet);
    let settings = settings::resolve(&args.settings)?;
    let output = settings::output_mode(args.json, args.output, &settings);
    let prompt = read_prompt(args.prompt)?;

    debug!(
        endpoint = %settings.endpoint,
        api_key_present = settings.api_key_present(),
        candidates = settings.retriever.candidates().len(),
        "resolved settings"
    );

    if args.dry_run {
        print_dry_run(&settings, &prompt, output)?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = settings.retriever().retrieve(&prompt).await;
    print_outcome(&outcome, output)
}

/// Argument first, then piped stdin. Blank prompts are rejected.
pub(crate) fn read_prompt(argument: Option<String>) -> Result<String, String> {
    let raw = match argument {
        Some(prompt) => prompt,
        None => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(no_prompt());
            }
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .map_err(|err| format!("Failed to read prompt from stdin: {err}"))?;
            buffer
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(no_prompt());
    }
    Ok(trimmed.to_string())
}

fn no_prompt() -> String {
    "No prompt provided. Pass a question or pipe it on stdin.".to_string()
}

fn print_dry_run(settings: &Settings, prompt: &str, output: OutputMode) -> Result<(), String> {
    let request = settings.retriever.request_for(prompt);
    let body = json!({
        "dry_run": true,
        "endpoint": settings.endpoint,
        "api_key_present": settings.api_key_present(),
        "candidates": settings.retriever.candidates(),
        "request": request,
        "timeout_secs": settings.timeout_secs,
        "max_attempts": settings.retriever.max_attempts,
        "fallback_limit": settings.retriever.fallback_limit,
        "prefer_tag": settings.retriever.prefer_tag,
        "output": output.as_str(),
    });
    let rendered = serde_json::to_string(&body)
        .map_err(|err| format!("Failed to render dry-run request: {err}"))?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn print_outcome(
    outcome: &RetrievalOutcome,
    output: OutputMode,
) -> Result<ExitCode, String> {
    match output {
        OutputMode::Json => {
            let candidate = outcome.candidate();
            let body = json!({
                "ok": !outcome.is_error(),
                "text": outcome.text(),
                "version": candidate.map(|c| c.api_version.as_str()),
                "model": candidate.map(|c| c.model.as_str()),
            });
            let rendered = serde_json::to_string(&body)
                .map_err(|err| format!("Failed to render response: {err}"))?;
            println!("{rendered}");
        }
        OutputMode::Text if outcome.is_error() => eprintln!("{}", outcome.text()),
        OutputMode::Text => println!("{}", outcome.text()),
    }

    Ok(if outcome.is_error() {
        ExitCode::from(EXIT_NO_ANSWER)
    } else {
        ExitCode::SUCCESS
    })
}
