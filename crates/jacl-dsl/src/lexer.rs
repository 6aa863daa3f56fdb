//! Line tokenizers for game source and player commands.
//!
//! Both split on spaces, tabs and colons and treat `"..."` as a single
//! literal token. Source words keep their case; command words are lowercased,
//! commas become tokens of their own and sentence punctuation marks the
//! preceding word instead of producing a token.

use jacl_core::word::{MAX_WORDS, Word};
use log::trace;
use logos::Logos;

/// Tokens of a source line. Borrows from the line; converted to owned
/// [`Word`]s after lexing.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t:\r\n]+")]
enum SourceToken {
    #[regex(r#""[^"]*""#)]
    Quoted,

    // A quote left open runs to the end of the line.
    #[regex(r#""[^"]*"#)]
    Unterminated,

    #[regex(r#"[^ \t:\r\n"]+"#)]
    Bare,
}

/// Tokens of a player command.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t:\r\n]+")]
enum CommandToken {
    #[regex(r#""[^"]*"?"#)]
    Quoted,

    #[token(",")]
    Comma,

    #[regex(r"[.?!;]+")]
    Stop,

    #[regex(r#"[^ \t:\r\n",.?!;]+"#)]
    Bare,
}

/// Split one line of game source into words.
///
/// At most [`MAX_WORDS`] words are returned; the rest of the line is dropped.
pub fn lex_line(line: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut lexer = SourceToken::lexer(line);

    while let Some(result) = lexer.next() {
        if words.len() == MAX_WORDS {
            break;
        }
        let slice = lexer.slice();
        match result {
            Ok(SourceToken::Quoted) => words.push(Word::quoted(&slice[1..slice.len() - 1])),
            Ok(SourceToken::Unterminated) => words.push(Word::quoted(&slice[1..])),
            Ok(SourceToken::Bare) => words.push(Word::bare(slice)),
            Err(()) => trace!("skipping unlexable input {slice:?}"),
        }
    }
    words
}

/// Split a player command into lowercased words.
///
/// A word followed by `.`, `?`, `!` or `;` is marked `punctuated`, which the
/// parser treats as the end of a sentence.
pub fn lex_command(input: &str) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut lexer = CommandToken::lexer(input);

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        match result {
            Ok(CommandToken::Stop) => {
                if let Some(last) = words.last_mut() {
                    last.punctuated = true;
                }
                continue;
            }
            _ if words.len() == MAX_WORDS => break,
            Ok(CommandToken::Quoted) => {
                let inner = slice[1..].strip_suffix('"').unwrap_or(&slice[1..]);
                words.push(Word::quoted(inner));
            }
            Ok(CommandToken::Comma) => words.push(Word::bare(",")),
            Ok(CommandToken::Bare) => words.push(Word::bare(slice.to_lowercase())),
            Err(()) => trace!("skipping unlexable input {slice:?}"),
        }
    }
    words
}
