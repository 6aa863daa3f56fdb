//! Output markup shared by every sink.
//!
//! `^` is a line break and `~` a double quote. A text that is exactly
//! `tilde` or `caret` prints the literal character.

/// Expand the markup in `text`.
pub fn render(text: &str) -> String {
    match text {
        "tilde" => return "~".to_string(),
        "caret" => return "^".to_string(),
        _ => {}
    }
    text.chars()
        .map(|c| match c {
            '^' => '\n',
            '~' => '"',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_and_tilde() {
        assert_eq!(render("Hello.^"), "Hello.\n");
        assert_eq!(render("~Hi~ she said"), "\"Hi\" she said");
    }

    #[test]
    fn literal_words() {
        assert_eq!(render("tilde"), "~");
        assert_eq!(render("caret"), "^");
        assert_eq!(render("tildes"), "tildes");
    }
}
