use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use exochat::commands::ask::{self, AskArgs};
use exochat::commands::chat::{self, ChatArgs};
use exochat::commands::config::{self, ConfigArgs};
use exochat::commands::models::{self, ModelsArgs};
use exochat::commands::relay::{self, RelayArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  exochat ask \"What does koi_period measure?\"\n  echo \"Is Kepler-22b habitable?\" | exochat ask --model gemini-1.5-flash\n  exochat chat --relay --relay-url http://127.0.0.1:5000\n  exochat models --ranked\n  exochat completion bash > ~/.local/share/bash-completion/completions/exochat";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  exochat ask \"What does koi_period measure?\"\n  exochat ask --api-version v1beta --model gemini-1.5-pro \"Explain koi_prad\"\n  exochat ask --dry-run --json \"Explain koi_depth\"";

#[derive(Debug, Parser)]
#[command(
    name = "exochat",
    about = "Chat about Kepler exoplanet data through a generative-AI service",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Ask one question and print the answer", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Start an interactive chat session")]
    Chat(ChatArgs),
    #[command(about = "Send one message through the backend proxy")]
    Relay(RelayArgs),
    #[command(about = "List models the service currently offers")]
    Models(ModelsArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "exochat", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "exochat", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "exochat", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => ask::run(args).await,
        Commands::Relay(args) => relay::run(args).await,
        Commands::Chat(args) => chat::run(args).await.map(|()| ExitCode::SUCCESS),
        Commands::Models(args) => models::run(args).await.map(|()| ExitCode::SUCCESS),
        Commands::Config(args) => config::run(args).map(|()| ExitCode::SUCCESS),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
