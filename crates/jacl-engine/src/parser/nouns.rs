//! Noun-phrase resolution.
//!
//! A phrase is the run of words bound to one `*scope` or `**scope` slot of
//! a grammar line. It may list several objects (`x and y`, `x, y`), use
//! `all`, exclude objects with `except`, count (`two coins`), refer back
//! with a pronoun or name a container with `from`.

use jacl_core::attribute::{ANIMATE, CLOSED, CONTAINER, FEMALE, PLURAL, SURFACE};
use jacl_core::relations::scope;
use jacl_core::{ObjectId, Word, World};

use crate::interpreter::Pronouns;

const NUMBER_WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Why a command could not be matched. Each has a message the player sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The command stopped before the grammar line was complete.
    Incomplete,
    /// A word that no grammar line allows at this point.
    CantUseWord(String),
    /// A word no object answers to, at this word position.
    UnknownObject { word: String, index: usize },
    /// Objects answer to the phrase but none are in scope.
    NotHere(String),
    /// More than one object in scope answers to the phrase.
    Ambiguous { phrase: String, options: Vec<ObjectId> },
    /// A pronoun with nothing to refer to.
    NoReferent(String),
    /// `all` with nothing held.
    NoneHeld,
    /// `all` with nothing in scope.
    NoObjects,
    /// Several objects for a slot that takes one; carries the verb.
    NoMulti(String),
    /// `from` an object that holds nothing.
    FromNonContainer(ObjectId),
    /// `from` a closed container.
    ContainerClosed,
    /// `except` used twice.
    DoubleExcept,
    /// `$integer` given something else.
    NotANumber,
    /// A count larger than the matching objects.
    NoSuchNumber,
}

impl ParseFailure {
    /// How specific the failure is, for choosing which to report when
    /// several grammar lines fail at the same word.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Incomplete | Self::CantUseWord(_) => 0,
            _ => 1,
        }
    }
}

/// The localisable words the phrase grammar is built from.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub then: String,
    pub and: String,
    pub except: String,
    pub but: String,
    pub from: String,
    pub all: String,
    pub it: String,
    pub him: String,
    pub her: String,
    pub them: String,
    pub that: String,
    pub those: String,
}

impl Vocabulary {
    /// Read the current words from the constant strings.
    pub fn of(world: &World) -> Self {
        let word = |name: &str| world.symbols.cstring(name).to_string();
        Self {
            then: word("THEN_WORD"),
            and: word("AND_WORD"),
            except: word("EXCEPT_WORD"),
            but: word("BUT_WORD"),
            from: word("FROM_WORD"),
            all: word("ALL_WORD"),
            it: word("IT_WORD"),
            him: word("HIM_WORD"),
            her: word("HER_WORD"),
            them: word("THEM_WORD"),
            that: word("THAT_WORD"),
            those: word("THOSE_WORD"),
        }
    }

    fn is_list_separator(&self, word: &str) -> bool {
        word == self.and || word == ","
    }

    fn is_except(&self, word: &str) -> bool {
        word == self.except || word == self.but
    }

    fn is_pronoun(&self, word: &str) -> bool {
        [&self.it, &self.him, &self.her, &self.them, &self.that, &self.those]
            .iter()
            .any(|p| *p == word)
    }

    /// Words that may appear in a phrase without naming an object.
    fn is_structural(&self, word: &str) -> bool {
        self.is_list_separator(word)
            || self.is_except(word)
            || self.is_pronoun(word)
            || word == self.all
            || word == self.from
    }
}

/// A count word: digits or `one` to `ten`.
fn quantity(word: &str) -> Option<usize> {
    word.parse()
        .ok()
        .or_else(|| NUMBER_WORDS.iter().position(|n| *n == word).map(|i| i + 1))
}

fn phrase_text(words: &[Word]) -> String {
    jacl_core::word::join_words(words)
}

/// Resolves phrases against one world state.
pub struct NounResolver<'a> {
    world: &'a World,
    pronouns: &'a Pronouns,
    vocabulary: &'a Vocabulary,
}

impl<'a> NounResolver<'a> {
    pub fn new(world: &'a World, pronouns: &'a Pronouns, vocabulary: &'a Vocabulary) -> Self {
        Self {
            world,
            pronouns,
            vocabulary,
        }
    }

    fn in_scope(&self, id: ObjectId, criterion: &str) -> bool {
        scope(self.world, id, criterion).ok().flatten().unwrap_or(false)
    }

    /// Objects `all` can mean: in scope, not places and not the player.
    fn everything(&self, criterion: &str) -> Vec<ObjectId> {
        self.world
            .objects()
            .filter(|(id, o)| *id != self.world.player && !o.is_location())
            .map(|(id, _)| id)
            .filter(|id| self.in_scope(*id, criterion))
            .collect()
    }

    /// Whether `word` can be part of a phrase.
    pub fn is_phrase_word(&self, word: &Word) -> bool {
        if word.quoted {
            return false;
        }
        let text = word.text.as_str();
        self.vocabulary.is_structural(text)
            || quantity(text).is_some()
            || self
                .world
                .objects()
                .any(|(_, o)| o.answers_to(text) || o.answers_to_plural(text))
    }

    /// Number of words from the start of `words` that may form a phrase.
    pub fn extent(&self, words: &[Word]) -> usize {
        words.iter().take_while(|w| self.is_phrase_word(w)).count()
    }

    /// Resolve a whole phrase. `offset` is the position of `words[0]` in
    /// the command, for reporting unknown words.
    pub fn resolve(
        &self,
        words: &[Word],
        offset: usize,
        criterion: &str,
        multi: bool,
        verb: &str,
    ) -> Result<Vec<ObjectId>, ParseFailure> {
        let excepts: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.vocabulary.is_except(&w.text))
            .map(|(i, _)| i)
            .collect();
        if excepts.len() > 1 {
            return Err(ParseFailure::DoubleExcept);
        }
        let (include, exclude) = match excepts.first() {
            Some(&at) => (&words[..at], &words[at + 1..]),
            None => (words, &words[words.len()..]),
        };

        let mut objects = Vec::new();
        for (start, item) in self.items(include, offset)? {
            for id in self.simple(item, start, criterion)? {
                if !objects.contains(&id) {
                    objects.push(id);
                }
            }
        }
        if !exclude.is_empty() {
            let exclude_offset = offset + include.len() + 1;
            for (start, item) in self.items(exclude, exclude_offset)? {
                for id in self.simple(item, start, criterion)? {
                    objects.retain(|o| *o != id);
                }
            }
        }

        if objects.is_empty() {
            return Err(self.nothing(criterion));
        }
        if !multi && objects.len() > 1 {
            return Err(ParseFailure::NoMulti(verb.to_string()));
        }
        Ok(objects)
    }

    /// Split a phrase at `and` and commas.
    fn items<'w>(&self, words: &'w [Word], offset: usize) -> Result<Vec<(usize, &'w [Word])>, ParseFailure> {
        let mut items = Vec::new();
        let mut start = 0;
        for (index, word) in words.iter().enumerate() {
            if self.vocabulary.is_list_separator(&word.text) {
                items.push((offset + start, &words[start..index]));
                start = index + 1;
            }
        }
        items.push((offset + start, &words[start..]));
        if items.iter().any(|(_, item)| item.is_empty()) {
            return Err(ParseFailure::Incomplete);
        }
        Ok(items)
    }

    fn nothing(&self, criterion: &str) -> ParseFailure {
        if criterion.trim_start_matches('*') == "held" {
            ParseFailure::NoneHeld
        } else {
            ParseFailure::NoObjects
        }
    }

    /// Resolve one item of a list.
    fn simple(&self, words: &[Word], offset: usize, criterion: &str) -> Result<Vec<ObjectId>, ParseFailure> {
        let first = words[0].text.as_str();
        let vocabulary = self.vocabulary;

        if first == vocabulary.all {
            let mut all = self.everything(criterion);
            if words.len() > 1 {
                all.retain(|id| self.world.get(*id).is_some_and(|o| names_or_plural(o, &words[1..])));
            }
            return if all.is_empty() {
                Err(self.nothing(criterion))
            } else {
                Ok(all)
            };
        }

        if words.len() == 1 && vocabulary.is_pronoun(first) {
            return self.pronoun(first, criterion);
        }

        if let Some(at) = words.iter().position(|w| w.text == vocabulary.from)
            && at > 0
            && at + 1 < words.len()
        {
            let container = self.container(&words[at + 1..], offset + at + 1)?;
            return self.named(&words[..at], offset, |id| {
                self.world.get(id).is_some_and(|o| o.parent() == container)
            });
        }

        if words.len() > 1
            && let Some(count) = quantity(first)
        {
            let rest = &words[1..];
            let matching: Vec<ObjectId> = self
                .world
                .objects()
                .filter(|(_, o)| plural_match(o, rest))
                .map(|(id, _)| id)
                .filter(|id| self.in_scope(*id, criterion))
                .collect();
            if matching.len() < count {
                return Err(ParseFailure::NoSuchNumber);
            }
            return Ok(matching[..count].to_vec());
        }

        self.named(words, offset, |id| self.in_scope(id, criterion))
    }

    fn pronoun(&self, word: &str, criterion: &str) -> Result<Vec<ObjectId>, ParseFailure> {
        let vocabulary = self.vocabulary;
        let referents = if word == vocabulary.it || word == vocabulary.that {
            vec![self.pronouns.it]
        } else if word == vocabulary.him {
            vec![self.pronouns.him]
        } else if word == vocabulary.her {
            vec![self.pronouns.her]
        } else {
            self.pronouns.them.clone()
        };
        let referents: Vec<ObjectId> = referents.into_iter().filter(|id| self.world.is_valid(*id)).collect();
        if referents.is_empty() {
            return Err(ParseFailure::NoReferent(word.to_string()));
        }
        let present: Vec<ObjectId> = referents.iter().copied().filter(|id| self.in_scope(*id, criterion)).collect();
        if present.is_empty() {
            return Err(ParseFailure::NotHere(self.name_of(referents[0])));
        }
        Ok(present)
    }

    /// The object named after `from`, which must be an open container or a
    /// surface.
    fn container(&self, words: &[Word], offset: usize) -> Result<ObjectId, ParseFailure> {
        let found = self.named(words, offset, |id| self.in_scope(id, "present"))?;
        let id = found[0];
        let Some(object) = self.world.get(id) else {
            return Err(ParseFailure::FromNonContainer(id));
        };
        if !object.has(CONTAINER | SURFACE) {
            return Err(ParseFailure::FromNonContainer(id));
        }
        if object.has(CONTAINER) && object.has(CLOSED) {
            return Err(ParseFailure::ContainerClosed);
        }
        Ok(id)
    }

    /// Objects answering to every word of `words`, narrowed by `visible`.
    ///
    /// A phrase ending in a plural name means every visible object with
    /// that plural. Among several visible singular matches, those whose
    /// last name is the phrase's last word are preferred.
    fn named(
        &self,
        words: &[Word],
        offset: usize,
        visible: impl Fn(ObjectId) -> bool,
    ) -> Result<Vec<ObjectId>, ParseFailure> {
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        if let Some(position) = texts.iter().position(|t| {
            !self
                .world
                .objects()
                .any(|(_, o)| o.answers_to(t) || o.answers_to_plural(t))
        }) {
            return Err(ParseFailure::UnknownObject {
                word: texts[position].to_string(),
                index: offset + position,
            });
        }

        let singular: Vec<ObjectId> = self
            .world
            .objects()
            .filter(|(_, o)| texts.iter().all(|t| o.answers_to(t)))
            .map(|(id, _)| id)
            .collect();
        if singular.is_empty() {
            let plural: Vec<ObjectId> = self
                .world
                .objects()
                .filter(|(_, o)| plural_match(o, words))
                .map(|(id, _)| id)
                .collect();
            if plural.is_empty() {
                return Err(ParseFailure::UnknownObject {
                    word: phrase_text(words),
                    index: offset,
                });
            }
            let present: Vec<ObjectId> = plural.iter().copied().filter(|id| visible(*id)).collect();
            if present.is_empty() {
                return Err(ParseFailure::NotHere(phrase_text(words)));
            }
            return Ok(present);
        }

        let present: Vec<ObjectId> = singular.iter().copied().filter(|id| visible(*id)).collect();
        match present.len() {
            0 if singular.len() == 1 => Err(ParseFailure::NotHere(self.name_of(singular[0]))),
            0 => Err(ParseFailure::NotHere(phrase_text(words))),
            1 => Ok(present),
            _ => {
                let last = texts[texts.len() - 1];
                let exact: Vec<ObjectId> = present
                    .iter()
                    .copied()
                    .filter(|id| {
                        self.world
                            .get(*id)
                            .and_then(|o| o.names.last())
                            .is_some_and(|n| n == last)
                    })
                    .collect();
                if exact.len() == 1 {
                    Ok(exact)
                } else {
                    Err(ParseFailure::Ambiguous {
                        phrase: phrase_text(words),
                        options: present,
                    })
                }
            }
        }
    }

    fn name_of(&self, id: ObjectId) -> String {
        self.world.get(id).map_or_else(String::new, |o| {
            if o.definite.is_empty() {
                o.inventory.clone()
            } else {
                format!("{} {}", o.definite, o.inventory)
            }
        })
    }
}

/// `words` names `object` with a plural: leading words are names, the last
/// a plural.
fn plural_match(object: &jacl_core::Object, words: &[Word]) -> bool {
    let Some((last, leading)) = words.split_last() else {
        return false;
    };
    object.answers_to_plural(&last.text) && leading.iter().all(|w| object.answers_to(&w.text))
}

fn names_or_plural(object: &jacl_core::Object, words: &[Word]) -> bool {
    words.iter().all(|w| object.answers_to(&w.text)) || plural_match(object, words)
}

/// Which pronoun a resolved object list should update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Referent {
    It,
    Him,
    Her,
    Them,
}

/// A single animate object is him or her; several objects, or one marked
/// `PLURAL`, are them; anything else is it.
pub fn referent_for(world: &World, objects: &[ObjectId]) -> Option<Referent> {
    match objects {
        [] => None,
        [one] => {
            let object = world.get(*one)?;
            Some(if object.has(PLURAL) {
                Referent::Them
            } else if object.has(ANIMATE) && object.has(FEMALE) {
                Referent::Her
            } else if object.has(ANIMATE) {
                Referent::Him
            } else {
                Referent::It
            })
        }
        _ => Some(Referent::Them),
    }
}
