use std::io::{self, IsTerminal, Write};

use clap::Args;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::chat::controller::{ChatController, Effect, Event};
use crate::chat::transcript::{ChatTurn, Role, TurnState};
use crate::commands::settings::{self, SettingsArgs};
use crate::llm::gemini::GeminiClient;
use crate::llm::relay::Relay;
use crate::llm::retriever::Retriever;
use crate::llm::service::RetrievalOutcome;
use crate::logging;

const HELP: &str = "Type a question and press Enter. Commands: /quick, /quick N, /hide, /show, /quit";

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
    /// Send messages through the backend proxy instead of calling the API.
    #[arg(long)]
    pub relay: bool,
}

enum Backend {
    Direct(Retriever<GeminiClient>),
    Relay(Relay),
}

impl Backend {
    async fn answer(&self, text: &str) -> RetrievalOutcome {
        match self {
            Self::Direct(retriever) => retriever.retrieve(text).await,
            Self::Relay(relay) => relay.send(text).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Message(String),
    ListQuick,
    Quick(usize),
    Hide,
    Show,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> Line {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Line::Message(line.to_string());
    };
    let mut words = command.split_whitespace();
    match (words.next(), words.next()) {
        (Some("quick"), None) => Line::ListQuick,
        (Some("quick"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Line::Quick(n - 1),
            _ => Line::Unknown(trimmed.to_string()),
        },
        (Some("hide"), None) => Line::Hide,
        (Some("show"), None) => Line::Show,
        (Some("quit" | "exit"), None) => Line::Quit,
        _ => Line::Unknown(trimmed.to_string()),
    }
}

pub async fn run(args: ChatArgs) -> Result<(), String> {
    logging::init(args.settings.verbose, args.settings.quiet);
    let settings = settings::resolve(&args.settings)?;
    let backend = if args.relay {
        Backend::Relay(settings.relay())
    } else {
        Backend::Direct(settings.retriever())
    };

    let mut chat = ChatController::new(settings.quick_actions.clone());
    chat.handle(Event::Toggle);
    println!("{}", HELP.dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|err| format!("Failed to read input: {err}"))?
    {
        let effect = match parse_line(&line) {
            Line::Quit => break,
            Line::Hide => {
                chat.handle(Event::Close);
                println!("{}", "(chat hidden, /show to reopen)".dimmed());
                continue;
            }
            Line::Show => {
                if !chat.is_open() {
                    chat.handle(Event::Toggle);
                }
                continue;
            }
            Line::ListQuick => {
                for (i, question) in chat.quick_actions().iter().enumerate() {
                    println!("  {} {question}", format!("/quick {}", i + 1).cyan());
                }
                continue;
            }
            Line::Unknown(command) => {
                println!("{} {command}. {HELP}", "unknown command".yellow());
                continue;
            }
            _ if !chat.is_open() => {
                println!("{}", "(chat hidden, /show to reopen)".dimmed());
                continue;
            }
            Line::Quick(index) => chat.handle(Event::QuickAction(index)),
            Line::Message(text) => {
                chat.handle(Event::Input(text));
                chat.handle(Event::Submit)
            }
        };

        if let Effect::Dispatch { turn, text } = effect {
            converse(&mut chat, &backend, turn, &text).await;
        }
    }
    Ok(())
}

async fn converse(chat: &mut ChatController, backend: &Backend, turn: usize, text: &str) {
    let interactive = io::stdout().is_terminal();
    if let Some(user) = turn.checked_sub(1).and_then(|i| chat.transcript().get(i)) {
        println!("{}", bubble(user));
    }
    if interactive {
        if let Some(placeholder) = chat.transcript().get(turn) {
            print!("{}", bubble(placeholder));
            if let Err(err) = io::stdout().flush() {
                debug!(%err, "stdout flush failed");
            }
        }
    }

    let outcome = backend.answer(text).await;
    debug!(turn, error = outcome.is_error(), "turn resolved");
    chat.handle(Event::Resolved { turn, outcome });

    if let Some(reply) = chat.transcript().get(turn) {
        if interactive {
            // Overwrite the placeholder line.
            print!("\r\x1b[2K");
        }
        println!("{}", bubble(reply));
    }
}

fn bubble(turn: &ChatTurn) -> String {
    match (turn.role, turn.state) {
        (Role::User, _) => format!("{} {}", "you ›".cyan().bold(), turn.text),
        (Role::Assistant, TurnState::Pending) => {
            format!("{} {}", "bot ›".green().bold(), turn.text.dimmed())
        }
        (Role::Assistant, TurnState::Final) => format!("{} {}", "bot ›".green().bold(), turn.text),
        (Role::Assistant, TurnState::Error) => {
            format!("{} {}", "bot ›".red().bold(), turn.text.red())
        }
    }
}
