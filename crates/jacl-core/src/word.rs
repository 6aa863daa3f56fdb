use serde::Serialize;

/// Maximum number of words kept from a single line.
pub const MAX_WORDS: usize = 64;

/// One token of a source line or a player command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    /// The token text with surrounding quotes removed.
    pub text: String,
    /// The token came from inside `"..."` and must be used literally.
    pub quoted: bool,
    /// The token was followed by sentence-ending punctuation.
    pub punctuated: bool,
}

impl Word {
    /// A plain, unquoted word.
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
            punctuated: false,
        }
    }

    /// A quoted literal.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
            punctuated: false,
        }
    }

    /// The token as entered.
    pub fn text_of(&self) -> &str {
        &self.text
    }

    /// The token with a leading `+` removed, for positional argument
    /// references such as `+1`.
    pub fn arg_text_of(&self) -> &str {
        if self.quoted {
            return &self.text;
        }
        self.text.strip_prefix('+').unwrap_or(&self.text)
    }
}

/// Join the texts of `words` with single spaces.
pub fn join_words(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
