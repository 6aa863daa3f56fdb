//! Resolving script words to numbers, text and assignable places.

use jacl_core::object::SLOT_COUNT;
use jacl_core::symbols::split_index;
use jacl_core::{ObjectId, Word};

use crate::error::EngineResult;
use crate::frame::ARG;
use crate::interpreter::Interpreter;
use crate::sink::PresentationSink;

/// How an object is named in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `{the}`: definite article and short name.
    The,
    /// `{The}`: the same, capitalised.
    TheCapital,
    /// `{list}`: indefinite article and short name.
    List,
    /// `{long}`: the long description.
    Long,
    /// `{label}`: the source label.
    Label,
    /// `{names}`: every name the player may use.
    Names,
}

impl Modifier {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "the" => Self::The,
            "The" => Self::TheCapital,
            "list" => Self::List,
            "long" => Self::Long,
            "label" => Self::Label,
            "names" => Self::Names,
            _ => return None,
        })
    }
}

/// Split `noun1{the}` into the object word and its modifier.
fn split_modifier(token: &str) -> Option<(&str, Modifier)> {
    let inner = token.strip_suffix('}')?;
    let open = inner.rfind('{')?;
    Some((&inner[..open], Modifier::parse(&inner[open + 1..])?))
}

fn is_element(token: &str) -> bool {
    token.contains('.') || token.contains("->")
}

/// A place a value can be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An integer variable cell.
    Integer { name: String, index: usize },
    /// One slot of an object.
    Slot { object: ObjectId, slot: usize },
    /// `noun1` to `noun4`.
    Noun(usize),
    /// The `player` pointer.
    Player,
}

impl<S: PresentationSink> Interpreter<S> {
    /// The integer value of a script word, reporting names that resolve to
    /// nothing and yielding -1 for them.
    pub(crate) fn value_of(&mut self, token: &str) -> EngineResult<i32> {
        match self.lookup(token)? {
            Some(value) => Ok(value),
            None => {
                self.report(format_args!("undefined value \"{token}\""))?;
                Ok(-1)
            }
        }
    }

    /// Resolve a script word without reporting failure.
    pub(crate) fn lookup(&mut self, token: &str) -> EngineResult<Option<i32>> {
        if let Some(n) = token.strip_prefix('+').and_then(|n| n.parse::<usize>().ok()) {
            return Ok(n
                .checked_sub(1)
                .and_then(|i| self.world.symbols.cinteger_resolve(ARG, i)));
        }
        if let Ok(n) = token.parse::<i32>() {
            return Ok(Some(n));
        }
        match token {
            "here" => return Ok(Some(self.here()?)),
            "player" => return Ok(Some(self.world.player)),
            "noun1" => return Ok(Some(self.command.nouns[0])),
            "noun2" => return Ok(Some(self.command.nouns[1])),
            "noun3" => return Ok(Some(self.command.nouns[2])),
            "noun4" => return Ok(Some(self.command.nouns[3])),
            "self" | "this" => return Ok(Some(self.self_object)),
            "objects" => return Ok(Some(self.world.object_count())),
            "random" => {
                let high = self.integer("max_rand");
                return Ok(Some(self.random.next_in(1, high)));
            }
            "arg" => return Ok(self.world.symbols.cinteger_resolve(ARG, 0)),
            _ => {}
        }
        if is_element(token) {
            return self.object_element(token).map(Some);
        }

        let (name, index) = split_index(token);
        let index = match index {
            Some(expr) => match usize::try_from(self.value_of(expr)?) {
                Ok(i) => i,
                Err(_) => return Ok(None),
            },
            None => 0,
        };
        let symbols = &self.world.symbols;
        if let Some(cell) = symbols.integer_resolve(name, index) {
            return Ok(Some(cell.value));
        }
        if let Some(value) = symbols.cinteger_resolve(name, index) {
            return Ok(Some(value));
        }
        if let Some((_, mask)) = symbols.attribute_resolve(name) {
            return Ok(Some(mask as i32));
        }
        Ok(self.world.find_label(name))
    }

    /// Resolve `object.slot` and `object->slot.slot` chains.
    fn object_element(&mut self, token: &str) -> EngineResult<i32> {
        let chain = token.replace("->", ".");
        let mut parts = chain.split('.');
        let first = parts.next().unwrap_or_default();
        let mut current = self.value_of(first)?;
        for part in parts {
            if !self.world.is_valid(current) {
                self.report_bad_pointer(token, current)?;
                return Ok(-1);
            }
            let Some(index) = self.slot_index(part) else {
                self.report(format_args!("unknown property \"{part}\" in \"{token}\""))?;
                return Ok(-1);
            };
            current = self.world.get(current).map_or(-1, |o| o.slots[index]);
        }
        Ok(current)
    }

    /// A slot number written as a number or a slot-name constant.
    fn slot_index(&self, name: &str) -> Option<usize> {
        let value = name
            .parse::<i32>()
            .ok()
            .or_else(|| self.world.symbols.cinteger_resolve(name, 0))?;
        usize::try_from(value).ok().filter(|i| *i < SLOT_COUNT)
    }

    /// Value of a `<`-separated function argument: variables, constants,
    /// element chains, labels and numbers, or -1.
    pub(crate) fn argument_value(&mut self, text: &str) -> EngineResult<i32> {
        Ok(self.lookup(text)?.unwrap_or(-1))
    }

    pub(crate) fn report_bad_pointer(&mut self, token: &str, value: i32) -> EngineResult<()> {
        self.report(format_args!("reference to non-existent object {value} by \"{token}\""))
    }

    /// Resolve a word that must name an object, reporting anything else.
    pub(crate) fn object_of(&mut self, token: &str) -> EngineResult<Option<ObjectId>> {
        let value = self.value_of(token)?;
        if self.world.is_valid(value) {
            Ok(Some(value))
        } else {
            self.report_bad_pointer(token, value)?;
            Ok(None)
        }
    }

    /// The object a word refers to directly, if it is an object word.
    pub(crate) fn object_ref(&self, token: &str) -> EngineResult<Option<ObjectId>> {
        Ok(match token {
            "here" => Some(self.here()?),
            "player" => Some(self.world.player),
            "noun1" => Some(self.command.nouns[0]),
            "noun2" => Some(self.command.nouns[1]),
            "noun3" => Some(self.command.nouns[2]),
            "noun4" => Some(self.command.nouns[3]),
            "self" | "this" => Some(self.self_object),
            _ => self.world.find_label(token),
        })
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    /// The text of a script word: quoted literals as written, string cells,
    /// object names and numbers; anything unresolved prints verbatim.
    pub(crate) fn text_of(&mut self, word: &Word) -> EngineResult<String> {
        if word.quoted {
            return Ok(word.text.clone());
        }
        let token = word.text.as_str();
        if let Some((base, modifier)) = split_modifier(token) {
            return Ok(match self.object_ref(base)? {
                Some(id) => self.describe(id, modifier),
                None => token.to_string(),
            });
        }

        let (name, index) = split_index(token);
        if self.world.symbols.has_string(name) || self.world.symbols.has_cstring(name) {
            let index = match index {
                Some(expr) => usize::try_from(self.value_of(expr)?).unwrap_or(usize::MAX),
                None => 0,
            };
            let symbols = &self.world.symbols;
            if let Some(cell) = symbols.string_resolve(name, index) {
                return Ok(cell.value.clone());
            }
            if let Some(text) = symbols.cstring_resolve(name, index) {
                return Ok(text.to_string());
            }
            return Ok(String::new());
        }
        if let Some(id) = self.object_ref(token)? {
            return Ok(self.describe(id, Modifier::List));
        }
        Ok(match self.lookup(token)? {
            Some(value) => value.to_string(),
            None => token.to_string(),
        })
    }

    /// Name an object.
    pub(crate) fn describe(&self, id: ObjectId, modifier: Modifier) -> String {
        let Some(object) = self.world.get(id) else {
            return "nothing".to_string();
        };
        let with_article = |article: &str| {
            if article.is_empty() {
                object.inventory.clone()
            } else {
                format!("{article} {}", object.inventory)
            }
        };
        match modifier {
            Modifier::The => with_article(&object.definite),
            Modifier::TheCapital => capitalise(&with_article(&object.definite)),
            Modifier::List => with_article(&object.article),
            Modifier::Long => object.described.clone(),
            Modifier::Label => object.label.clone(),
            Modifier::Names => object.names.join(" "),
        }
    }

    // -----------------------------------------------------------------------
    // Assignable places
    // -----------------------------------------------------------------------

    /// The place a word names, if it is assignable.
    pub(crate) fn container_resolve(&mut self, token: &str) -> EngineResult<Option<Target>> {
        match token {
            "noun1" => return Ok(Some(Target::Noun(0))),
            "noun2" => return Ok(Some(Target::Noun(1))),
            "noun3" => return Ok(Some(Target::Noun(2))),
            "noun4" => return Ok(Some(Target::Noun(3))),
            "player" => return Ok(Some(Target::Player)),
            _ => {}
        }
        if is_element(token) {
            let chain = token.replace("->", ".");
            let Some((owner, property)) = chain.rsplit_once('.') else {
                return Ok(None);
            };
            let object = self.value_of(owner)?;
            if !self.world.is_valid(object) {
                self.report_bad_pointer(token, object)?;
                return Ok(None);
            }
            return Ok(match self.slot_index(property) {
                Some(slot) => Some(Target::Slot { object, slot }),
                None => {
                    self.report(format_args!("unknown property \"{property}\" in \"{token}\""))?;
                    None
                }
            });
        }
        let (name, index) = split_index(token);
        let index = match index {
            Some(expr) => match usize::try_from(self.value_of(expr)?) {
                Ok(i) => i,
                Err(_) => return Ok(None),
            },
            None => 0,
        };
        Ok(self
            .world
            .symbols
            .integer_resolve(name, index)
            .map(|_| Target::Integer {
                name: name.to_string(),
                index,
            }))
    }

    pub(crate) fn get_target(&self, target: &Target) -> i32 {
        match target {
            Target::Integer { name, index } => self
                .world
                .symbols
                .integer_resolve(name, *index)
                .map_or(0, |c| c.value),
            Target::Slot { object, slot } => self.world.get(*object).map_or(0, |o| o.slots[*slot]),
            Target::Noun(i) => self.command.nouns[*i],
            Target::Player => self.world.player,
        }
    }

    pub(crate) fn set_target(&mut self, target: &Target, value: i32) {
        match target {
            Target::Integer { name, index } => {
                if let Some(cell) = self.world.symbols.integer_resolve_mut(name, *index) {
                    cell.value = value;
                }
            }
            Target::Slot { object, slot } => {
                if let Some(o) = self.world.get_mut(*object) {
                    o.slots[*slot] = value;
                }
            }
            Target::Noun(i) => self.command.nouns[*i] = value,
            Target::Player => self.world.player = value,
        }
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
