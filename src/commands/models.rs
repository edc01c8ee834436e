use clap::Args;
use serde_json::json;

use crate::commands::settings::{self, OutputMode, SettingsArgs};
use crate::llm::gemini::API_KEY_ENV;
use crate::llm::listing::{list_usable_models, rank_models};
use crate::logging;

#[derive(Debug, Args, Clone)]
pub struct ModelsArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
    #[arg(long)]
    pub json: bool,
    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,
    /// Apply the same ranking and limit the fallback chain uses.
    #[arg(long)]
    pub ranked: bool,
}

pub async fn run(args: ModelsArgs) -> Result<(), String> {
    logging::init(args.settings.verbose, args.settings.quiet);
    let settings = settings::resolve(&args.settings)?;
    let output = settings::output_mode(args.json, args.output, &settings);
    if !settings.api_key_present() {
        return Err(format!("{API_KEY_ENV} is not set in the environment"));
    }

    let retriever = settings.retriever();
    let listed = list_usable_models(retriever.service(), &settings.retriever.api_versions)
        .await
        .ok_or_else(|| "No API version returned a usable model list.".to_string())?;

    let models = if args.ranked {
        rank_models(
            listed.models,
            settings.retriever.prefer_tag.as_deref(),
            settings.retriever.fallback_limit,
        )
    } else {
        listed.models
    };

    match output {
        OutputMode::Json => {
            let body = json!({
                "version": listed.api_version,
                "models": models.iter().filter_map(|m| m.model_id()).collect::<Vec<_>>(),
            });
            println!("{body}");
        }
        OutputMode::Text => {
            println!("version: {}", listed.api_version);
            for id in models.iter().filter_map(|m| m.model_id()) {
                println!("  {id}");
            }
        }
    }
    Ok(())
}
