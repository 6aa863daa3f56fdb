//! The grammar trie.
//!
//! Each `grammar` declaration is a path of words from the root to a terminal
//! word beginning with `>`, which names the action. Words at a node keep
//! their declaration order, and that order decides which production wins
//! when more than one matches a command.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// What a grammar word matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern<'a> {
    /// A literal word.
    Literal(&'a str),
    /// `*scope`: one object satisfying the scope criterion.
    Object(&'a str),
    /// `**scope`: one or more objects satisfying the scope criterion.
    Objects(&'a str),
    /// `$string`: any single word, stored as text.
    String,
    /// `$integer`: a numeric word.
    Integer,
    /// `$word`: any single word.
    Word,
    /// `>action`: the end of a production.
    Action(&'a str),
}

impl<'a> Pattern<'a> {
    /// Classify a grammar word.
    pub fn of(word: &'a str) -> Self {
        if let Some(action) = word.strip_prefix('>') {
            Pattern::Action(action)
        } else if let Some(scope) = word.strip_prefix("**") {
            Pattern::Objects(scope)
        } else if let Some(scope) = word.strip_prefix('*') {
            Pattern::Object(scope)
        } else {
            match word {
                "$string" => Pattern::String,
                "$integer" => Pattern::Integer,
                "$word" => Pattern::Word,
                _ => Pattern::Literal(word),
            }
        }
    }
}

/// One word of the trie and everything that may follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarNode {
    pub word: String,
    pub children: Vec<GrammarNode>,
}

impl GrammarNode {
    fn new(word: &str) -> Self {
        Self {
            word: word.to_string(),
            children: Vec::new(),
        }
    }

    pub fn pattern(&self) -> Pattern<'_> {
        Pattern::of(&self.word)
    }

    /// The action that completes a production at this node, if any.
    pub fn action(&self) -> Option<&str> {
        self.children.iter().find_map(|c| match c.pattern() {
            Pattern::Action(action) => Some(action),
            _ => None,
        })
    }
}

/// The root of the grammar trie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grammar {
    roots: Vec<GrammarNode>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one production. The last word must be `>action`, and a
    /// word sequence may end in at most one action.
    pub fn add(&mut self, words: &[String]) -> CoreResult<()> {
        let joined = words.join(" ");
        let Some((last, path)) = words.split_last() else {
            return Err(CoreError::GrammarWithoutAction(joined));
        };
        if !last.starts_with('>') || last.len() == 1 || path.is_empty() {
            return Err(CoreError::GrammarWithoutAction(joined));
        }
        if path.iter().any(|w| w.starts_with('>')) {
            return Err(CoreError::GrammarWithoutAction(joined));
        }

        let mut level = &mut self.roots;
        for word in path {
            let index = match level.iter().position(|n| n.word == *word) {
                Some(index) => index,
                None => {
                    level.push(GrammarNode::new(word));
                    level.len() - 1
                }
            };
            level = &mut level[index].children;
        }

        if let Some(existing) = level.iter().find(|n| n.word.starts_with('>')) {
            if existing.word == *last {
                return Ok(());
            }
            return Err(CoreError::DuplicateGrammar(joined));
        }
        level.push(GrammarNode::new(last));
        Ok(())
    }

    pub fn roots(&self) -> &[GrammarNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether some production starts with the literal `word`.
    pub fn knows_verb(&self, word: &str) -> bool {
        self.roots.iter().any(|n| n.word == word)
    }

    /// Number of complete productions.
    pub fn production_count(&self) -> usize {
        fn count(nodes: &[GrammarNode]) -> usize {
            nodes
                .iter()
                .map(|n| usize::from(n.word.starts_with('>')) + count(&n.children))
                .sum()
        }
        count(&self.roots)
    }
}
