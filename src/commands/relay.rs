use std::process::ExitCode;

use clap::Args;
use tracing::debug;

use crate::commands::ask::{print_outcome, read_prompt};
use crate::commands::settings::{self, OutputMode, SettingsArgs};
use crate::logging;

#[derive(Debug, Args, Clone)]
pub struct RelayArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
    #[arg(long)]
    pub json: bool,
    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,
    /// Message to relay. Read from stdin when omitted.
    pub prompt: Option<String>,
}

pub async fn run(args: RelayArgs) -> Result<ExitCode, String> {
    logging::init(args.settings.verbose, args.settings.quiet);
    let settings = settings::resolve(&args.settings)?;
    let output = settings::output_mode(args.json, args.output, &settings);
    let prompt = read_prompt(args.prompt)?;

    let relay = settings.relay();
    debug!(url = relay.url(), "relay target");
    let outcome = relay.send(&prompt).await;
    print_outcome(&outcome, output)
}
