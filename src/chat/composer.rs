/// Height, in rows, of an empty composer.
pub const INITIAL_ROWS: usize = 1;

/// Viewports at or below this width use the mobile layout, where Enter
/// inserts a newline instead of sending.
pub const NARROW_VIEWPORT_WIDTH: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn with_shift(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
}

impl Viewport {
    pub fn is_narrow(&self) -> bool {
        self.width <= NARROW_VIEWPORT_WIDTH
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1024 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    Submit,
    Newline,
    Close,
    Ignore,
}

pub fn classify_key(press: KeyPress, viewport: Viewport) -> KeyIntent {
    match press.key {
        Key::Enter if !press.shift && !viewport.is_narrow() => KeyIntent::Submit,
        Key::Enter => KeyIntent::Newline,
        Key::Escape => KeyIntent::Close,
        Key::Other => KeyIntent::Ignore,
    }
}

/// The message input box.
#[derive(Debug, Clone)]
pub struct Composer {
    text: String,
    rows: usize,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            text: String::new(),
            rows: INITIAL_ROWS,
        }
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Replaces the buffer and grows to fit it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.fit();
    }

    pub fn insert_newline(&mut self) {
        self.text.push('\n');
        self.fit();
    }

    /// Trimmed text to send, resetting the box. Blank input is left alone
    /// and yields `None`.
    pub fn take(&mut self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let message = trimmed.to_string();
        self.text.clear();
        self.rows = INITIAL_ROWS;
        Some(message)
    }

    fn fit(&mut self) {
        let lines = self.text.split('\n').count();
        self.rows = lines.max(INITIAL_ROWS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: Viewport = Viewport { width: 1280 };
    const NARROW: Viewport = Viewport { width: 390 };

    #[test]
    fn enter_submits_only_on_wide_viewport_without_shift() {
        assert_eq!(classify_key(KeyPress::new(Key::Enter), WIDE), KeyIntent::Submit);
        assert_eq!(
            classify_key(KeyPress::with_shift(Key::Enter), WIDE),
            KeyIntent::Newline
        );
        assert_eq!(classify_key(KeyPress::new(Key::Enter), NARROW), KeyIntent::Newline);
        assert_eq!(
            classify_key(KeyPress::new(Key::Enter), Viewport { width: 800 }),
            KeyIntent::Newline
        );
    }

    #[test]
    fn escape_closes_and_other_keys_are_ignored() {
        assert_eq!(classify_key(KeyPress::new(Key::Escape), WIDE), KeyIntent::Close);
        assert_eq!(classify_key(KeyPress::new(Key::Other), NARROW), KeyIntent::Ignore);
    }

    #[test]
    fn rows_grow_with_content_and_reset_after_take() {
        let mut composer = Composer::new();
        assert_eq!(composer.rows(), INITIAL_ROWS);

        composer.set_text("line one");
        composer.insert_newline();
        composer.set_text(format!("{}line two\nline three", composer.text()));
        assert_eq!(composer.rows(), 3);

        assert_eq!(
            composer.take().as_deref(),
            Some("line one\nline two\nline three")
        );
        assert_eq!(composer.text(), "");
        assert_eq!(composer.rows(), INITIAL_ROWS);
    }

    #[test]
    fn blank_input_is_not_taken() {
        let mut composer = Composer::new();
        composer.set_text("  \n\t ");
        assert_eq!(composer.take(), None);
        assert_eq!(composer.rows(), 2);
    }

    #[test]
    fn take_trims_surrounding_whitespace() {
        let mut composer = Composer::new();
        composer.set_text("  Kepler-452b?  ");
        assert_eq!(composer.take().as_deref(), Some("Kepler-452b?"));
    }
}
