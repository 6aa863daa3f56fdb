//! Matching a command against the grammar trie.
//!
//! The walk is depth first over each node's children in declaration order;
//! the first production that consumes every word wins. A noun phrase may
//! span several words, so each possible phrase end is tried, longest
//! first. When nothing matches, the failure that got furthest into the
//! command is reported, preferring object failures over word failures at
//! the same position.

use jacl_core::{GrammarNode, ObjectId, Pattern, Word, World};

use super::nouns::{NounResolver, ParseFailure, Vocabulary};
use crate::frame::NOUN_SLOTS;
use crate::interpreter::Pronouns;

/// Object slots a production can fill; the last noun slot belongs to
/// function arguments.
const OBJECT_SLOTS: usize = NOUN_SLOTS - 1;

/// A production that matched the whole command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    /// The action named by the production's `>` word.
    pub action: String,
    /// Objects bound to each `*` or `**` word, in order.
    pub lists: Vec<Vec<ObjectId>>,
    /// The slot bound by a `**` word, if any.
    pub multi: Option<usize>,
    /// Words matched by `$string`.
    pub strings: Vec<String>,
    /// Words matched by `$word`.
    pub words: Vec<String>,
    /// Numbers matched by `$integer`.
    pub integers: Vec<i32>,
}

/// Why no production matched, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Position of the offending word.
    pub index: usize,
    pub reason: ParseFailure,
}

impl Failure {
    fn outranks(&self, other: &Failure) -> bool {
        (self.index, self.reason.rank()) > (other.index, other.reason.rank())
    }
}

fn keep_best(best: &mut Option<Failure>, candidate: Failure) {
    if best.as_ref().is_none_or(|b| candidate.outranks(b)) {
        *best = Some(candidate);
    }
}

/// Walks the grammar for one command.
pub struct Matcher<'a> {
    words: &'a [Word],
    nouns: NounResolver<'a>,
}

impl<'a> Matcher<'a> {
    pub fn new(world: &'a World, pronouns: &'a Pronouns, vocabulary: &'a Vocabulary, words: &'a [Word]) -> Self {
        Self {
            words,
            nouns: NounResolver::new(world, pronouns, vocabulary),
        }
    }

    /// Match the command against `roots`.
    pub fn run(&self, roots: &[GrammarNode]) -> Result<Match, Failure> {
        self.walk(roots, 0, &Match::default())
    }

    fn walk(&self, nodes: &[GrammarNode], index: usize, bound: &Match) -> Result<Match, Failure> {
        let mut best = None;
        for node in nodes {
            match self.step(node, index, bound) {
                Ok(found) => return Ok(found),
                Err(failure) => keep_best(&mut best, failure),
            }
        }
        Err(best.unwrap_or_else(|| self.unexpected(index)))
    }

    fn unexpected(&self, index: usize) -> Failure {
        let reason = match self.words.get(index) {
            Some(word) => ParseFailure::CantUseWord(word.text.clone()),
            None => ParseFailure::Incomplete,
        };
        Failure { index, reason }
    }

    fn step(&self, node: &GrammarNode, index: usize, bound: &Match) -> Result<Match, Failure> {
        let pattern = node.pattern();
        if let Pattern::Action(action) = pattern {
            if index < self.words.len() {
                return Err(self.unexpected(index));
            }
            let mut found = bound.clone();
            found.action = action.to_string();
            return Ok(found);
        }
        let Some(word) = self.words.get(index) else {
            return Err(self.unexpected(index));
        };

        match pattern {
            Pattern::Literal(literal) => {
                if word.text != literal {
                    return Err(self.unexpected(index));
                }
                self.walk(&node.children, index + 1, bound)
            }
            Pattern::String => {
                let mut next = bound.clone();
                next.strings.push(word.text.clone());
                self.walk(&node.children, index + 1, &next)
            }
            Pattern::Word => {
                let mut next = bound.clone();
                next.words.push(word.text.clone());
                self.walk(&node.children, index + 1, &next)
            }
            Pattern::Integer => {
                let Ok(number) = word.text.parse::<i32>() else {
                    return Err(Failure {
                        index,
                        reason: ParseFailure::NotANumber,
                    });
                };
                let mut next = bound.clone();
                next.integers.push(number);
                self.walk(&node.children, index + 1, &next)
            }
            Pattern::Object(scope) => self.phrase(node, index, bound, scope, false),
            Pattern::Objects(scope) => self.phrase(node, index, bound, scope, bound.multi.is_none()),
            Pattern::Action(_) => Err(self.unexpected(index)),
        }
    }

    fn phrase(&self, node: &GrammarNode, index: usize, bound: &Match, scope: &str, multi: bool) -> Result<Match, Failure> {
        if bound.lists.len() >= OBJECT_SLOTS {
            return Err(self.unexpected(index));
        }
        let verb = self.words.first().map(|w| w.text.as_str()).unwrap_or_default();
        let rest = &self.words[index..];
        let extent = self.nouns.extent(rest);

        let mut best = None;
        for end in (1..=extent.max(1)).rev() {
            let objects = match self.nouns.resolve(&rest[..end], index, scope, multi, verb) {
                Ok(objects) => objects,
                Err(reason) => {
                    // A phrase that was read to its end failed after the
                    // words it consumed.
                    let at = if extent == 0 { index } else { index + end };
                    keep_best(&mut best, Failure { index: at, reason });
                    continue;
                }
            };
            let mut next = bound.clone();
            if multi {
                next.multi = Some(next.lists.len());
            }
            next.lists.push(objects);
            match self.walk(&node.children, index + end, &next) {
                Ok(found) => return Ok(found),
                Err(failure) => keep_best(&mut best, failure),
            }
        }
        Err(best.unwrap_or_else(|| self.unexpected(index)))
    }
}
