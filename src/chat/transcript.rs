use crate::llm::service::RetrievalOutcome;

pub const THINKING_TEXT: &str = "Thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Placeholder waiting for its outcome.
    Pending,
    Final,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    pub state: TurnState,
}

/// Ordered message list. Turns are only appended, and a placeholder is
/// finalised at most once.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> usize {
        self.push(ChatTurn {
            role: Role::User,
            text: text.into(),
            state: TurnState::Final,
        })
    }

    /// Appends a "Thinking..." assistant turn and returns its index.
    pub fn push_placeholder(&mut self) -> usize {
        self.push(ChatTurn {
            role: Role::Assistant,
            text: THINKING_TEXT.to_string(),
            state: TurnState::Pending,
        })
    }

    /// Writes `outcome` into the placeholder at `index`. Returns `false` when
    /// there is no pending placeholder there.
    pub fn resolve(&mut self, index: usize, outcome: &RetrievalOutcome) -> bool {
        match self.turns.get_mut(index) {
            Some(turn) if turn.state == TurnState::Pending => {
                turn.text = outcome.text().to_string();
                turn.state = if outcome.is_error() {
                    TurnState::Error
                } else {
                    TurnState::Final
                };
                true
            }
            _ => false,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&ChatTurn> {
        self.turns.get(index)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, turn: ChatTurn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }
}
