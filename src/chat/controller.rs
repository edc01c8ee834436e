use tracing::debug;

use crate::chat::composer::{Composer, KeyIntent, KeyPress, Viewport, classify_key};
use crate::chat::transcript::Transcript;
use crate::llm::service::RetrievalOutcome;

/// Canned questions offered as quick actions.
pub const DEFAULT_QUICK_ACTIONS: [&str; 3] = [
    "What are exoplanets?",
    "What are the characteristics of exoplanets?",
    "Which exoplanets are the best known?",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The input box now holds this text.
    Input(String),
    Key(KeyPress),
    /// Send button.
    Submit,
    QuickAction(usize),
    /// Global open/close control.
    Toggle,
    /// Close button.
    Close,
    Resize(Viewport),
    Resolved {
        turn: usize,
        outcome: RetrievalOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start one retrieval for `text`; resolve it into `turn`.
    Dispatch { turn: usize, text: String },
    Render,
    None,
}

/// Owns the widget state and turns UI events into effects. Retrieval itself
/// happens outside; its outcome comes back as [`Event::Resolved`].
#[derive(Debug)]
pub struct ChatController {
    transcript: Transcript,
    composer: Composer,
    viewport: Viewport,
    open: bool,
    quick_actions: Vec<String>,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new(DEFAULT_QUICK_ACTIONS.iter().map(|q| q.to_string()).collect())
    }
}

impl ChatController {
    pub fn new(quick_actions: Vec<String>) -> Self {
        Self {
            transcript: Transcript::new(),
            composer: Composer::new(),
            viewport: Viewport::default(),
            open: false,
            quick_actions,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn quick_actions(&self) -> &[String] {
        &self.quick_actions
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn handle(&mut self, event: Event) -> Effect {
        match event {
            Event::Input(text) => {
                self.composer.set_text(text);
                Effect::Render
            }
            Event::Key(press) => match classify_key(press, self.viewport) {
                KeyIntent::Submit => self.submit(),
                KeyIntent::Newline => {
                    self.composer.insert_newline();
                    Effect::Render
                }
                KeyIntent::Close if self.open => {
                    self.open = false;
                    Effect::Render
                }
                KeyIntent::Close | KeyIntent::Ignore => Effect::None,
            },
            Event::Submit => self.submit(),
            Event::QuickAction(index) => match self.quick_actions.get(index) {
                Some(text) => {
                    let text = text.clone();
                    self.composer.set_text(text);
                    self.submit()
                }
                None => Effect::None,
            },
            Event::Toggle => {
                self.open = !self.open;
                Effect::Render
            }
            Event::Close => {
                self.open = false;
                Effect::Render
            }
            Event::Resize(viewport) => {
                self.viewport = viewport;
                Effect::None
            }
            Event::Resolved { turn, outcome } => {
                if self.transcript.resolve(turn, &outcome) {
                    Effect::Render
                } else {
                    debug!(turn, "ignoring outcome for a turn that is not pending");
                    Effect::None
                }
            }
        }
    }

    fn submit(&mut self) -> Effect {
        let Some(text) = self.composer.take() else {
            return Effect::None;
        };
        self.transcript.push_user(text.clone());
        let turn = self.transcript.push_placeholder();
        Effect::Dispatch { turn, text }
    }
}
