//! Typed global registries: integers, constants, strings, attributes,
//! synonyms, filters and parameters.
//!
//! Every table maps a name to a vector of cells. Declaring the same name
//! again appends a cell, which is how arrays and the per-call argument
//! vectors (`arg`, `string_arg`, `$word`, `field`) are represented.

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;

use crate::attribute::{self, MAX_ATTRIBUTE_BIT, Namespace};
use crate::error::{CoreError, CoreResult};

/// Capacity of a string cell, including the terminating byte of the save
/// format.
pub const STRING_CAPACITY: usize = 1024;

/// A mutable integer variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegerCell {
    pub value: i32,
    #[serde(skip)]
    pub backup: i32,
}

/// A mutable string variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringCell {
    pub value: String,
    #[serde(skip)]
    pub backup: String,
}

impl StringCell {
    /// Replace the contents, truncating to the cell capacity.
    pub fn set(&mut self, value: &str) {
        self.value = truncate_to_capacity(value).to_string();
    }

    /// Append to the contents, truncating to the cell capacity.
    pub fn push(&mut self, value: &str) {
        let mut joined = std::mem::take(&mut self.value);
        joined.push_str(value);
        self.set(&joined);
    }
}

/// Cut `value` to at most `STRING_CAPACITY - 1` bytes on a char boundary.
pub fn truncate_to_capacity(value: &str) -> &str {
    let limit = STRING_CAPACITY - 1;
    if value.len() <= limit {
        return value;
    }
    let mut end = limit;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// A `parameter` declaration. Stored for completeness; it has no runtime
/// behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub container: String,
    pub low: i32,
    pub high: i32,
}

/// Split `name[index]` into its base name and the index expression.
pub fn split_index(name: &str) -> (&str, Option<&str>) {
    match (name.find('['), name.strip_suffix(']')) {
        (Some(open), Some(inner)) if open > 0 => (&name[..open], Some(&inner[open + 1..])),
        _ => (name, None),
    }
}

/// The global symbol registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    integers: IndexMap<String, Vec<IntegerCell>>,
    cintegers: IndexMap<String, Vec<i32>>,
    strings: IndexMap<String, Vec<StringCell>>,
    cstrings: IndexMap<String, Vec<String>>,
    attributes: IndexMap<String, u32>,
    next_attribute: u32,
    synonyms: IndexMap<String, String>,
    filters: IndexSet<String>,
    parameters: Vec<Parameter>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            next_attribute: 1,
            ..Self::default()
        }
    }

    // -----------------------------------------------------------------------
    // Integers
    // -----------------------------------------------------------------------

    /// Append an integer cell named `name`.
    pub fn add_integer(&mut self, name: &str, value: i32) {
        self.integers
            .entry(name.to_string())
            .or_default()
            .push(IntegerCell {
                value,
                backup: value,
            });
    }

    /// The `index`-th integer cell named `name`.
    pub fn integer_resolve(&self, name: &str, index: usize) -> Option<&IntegerCell> {
        self.integers.get(name).and_then(|cells| cells.get(index))
    }

    pub fn integer_resolve_mut(&mut self, name: &str, index: usize) -> Option<&mut IntegerCell> {
        self.integers
            .get_mut(name)
            .and_then(|cells| cells.get_mut(index))
    }

    /// Value of the first integer cell named `name`, or 0.
    pub fn integer(&self, name: &str) -> i32 {
        self.integer_resolve(name, 0).map_or(0, |c| c.value)
    }

    /// Set the first integer cell named `name`, creating it if needed.
    pub fn set_integer(&mut self, name: &str, value: i32) {
        match self.integer_resolve_mut(name, 0) {
            Some(cell) => cell.value = value,
            None => self.add_integer(name, value),
        }
    }

    pub fn has_integer(&self, name: &str) -> bool {
        self.integers.contains_key(name)
    }

    /// Number of integer cells across all names.
    pub fn integer_cell_count(&self) -> usize {
        self.integers.values().map(Vec::len).sum()
    }

    /// All integer cells in declaration order.
    pub fn integer_cells(&self) -> impl Iterator<Item = &IntegerCell> {
        self.integers.values().flatten()
    }

    pub fn integer_cells_mut(&mut self) -> impl Iterator<Item = &mut IntegerCell> {
        self.integers.values_mut().flatten()
    }

    /// Integer names paired with their cells, for listings.
    pub fn integers(&self) -> impl Iterator<Item = (&str, &[IntegerCell])> {
        self.integers.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    // -----------------------------------------------------------------------
    // Constant integers
    // -----------------------------------------------------------------------

    /// Append a constant cell named `name`.
    pub fn add_cinteger(&mut self, name: &str, value: i32) {
        self.cintegers
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    pub fn cinteger_resolve(&self, name: &str, index: usize) -> Option<i32> {
        self.cintegers
            .get(name)
            .and_then(|cells| cells.get(index))
            .copied()
    }

    /// Overwrite an existing constant cell. Only the interpreter's own
    /// runtime-maintained constants (`volume`, `timer`) are written this way.
    pub fn set_cinteger(&mut self, name: &str, index: usize, value: i32) -> bool {
        match self
            .cintegers
            .get_mut(name)
            .and_then(|cells| cells.get_mut(index))
        {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn has_cinteger(&self, name: &str) -> bool {
        self.cintegers.contains_key(name)
    }

    pub fn cinteger_vec(&self, name: &str) -> &[i32] {
        self.cintegers.get(name).map_or(&[], Vec::as_slice)
    }

    /// Remove every cell named `name`.
    pub fn clear_cinteger(&mut self, name: &str) {
        if let Some(cells) = self.cintegers.get_mut(name) {
            cells.clear();
        }
    }

    /// Detach the whole vector named `name`, leaving it empty.
    pub fn take_cintegers(&mut self, name: &str) -> Vec<i32> {
        self.cintegers
            .get_mut(name)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Install `cells` as the vector named `name`.
    pub fn replace_cintegers(&mut self, name: &str, cells: Vec<i32>) {
        self.cintegers.insert(name.to_string(), cells);
    }

    pub fn cintegers(&self) -> impl Iterator<Item = (&str, &[i32])> {
        self.cintegers.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    // -----------------------------------------------------------------------
    // Strings
    // -----------------------------------------------------------------------

    pub fn add_string(&mut self, name: &str, value: &str) {
        let mut cell = StringCell::default();
        cell.set(value);
        cell.backup = cell.value.clone();
        self.strings.entry(name.to_string()).or_default().push(cell);
    }

    pub fn string_resolve(&self, name: &str, index: usize) -> Option<&StringCell> {
        self.strings.get(name).and_then(|cells| cells.get(index))
    }

    pub fn string_resolve_mut(&mut self, name: &str, index: usize) -> Option<&mut StringCell> {
        self.strings
            .get_mut(name)
            .and_then(|cells| cells.get_mut(index))
    }

    pub fn has_string(&self, name: &str) -> bool {
        self.strings.contains_key(name)
    }

    pub fn string_cell_count(&self) -> usize {
        self.strings.values().map(Vec::len).sum()
    }

    pub fn string_cells(&self) -> impl Iterator<Item = &StringCell> {
        self.strings.values().flatten()
    }

    pub fn string_cells_mut(&mut self) -> impl Iterator<Item = &mut StringCell> {
        self.strings.values_mut().flatten()
    }

    pub fn strings(&self) -> impl Iterator<Item = (&str, &[StringCell])> {
        self.strings.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    // -----------------------------------------------------------------------
    // Constant strings
    // -----------------------------------------------------------------------

    pub fn add_cstring(&mut self, name: &str, value: &str) {
        self.cstrings
            .entry(name.to_string())
            .or_default()
            .push(truncate_to_capacity(value).to_string());
    }

    pub fn cstring_resolve(&self, name: &str, index: usize) -> Option<&str> {
        self.cstrings
            .get(name)
            .and_then(|cells| cells.get(index))
            .map(String::as_str)
    }

    /// First cell named `name`, or the empty string.
    pub fn cstring(&self, name: &str) -> &str {
        self.cstring_resolve(name, 0).unwrap_or("")
    }

    pub fn has_cstring(&self, name: &str) -> bool {
        self.cstrings.contains_key(name)
    }

    pub fn cstring_vec(&self, name: &str) -> &[String] {
        self.cstrings.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn clear_cstring(&mut self, name: &str) {
        if let Some(cells) = self.cstrings.get_mut(name) {
            cells.clear();
        }
    }

    pub fn take_cstrings(&mut self, name: &str) -> Vec<String> {
        self.cstrings
            .get_mut(name)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn replace_cstrings(&mut self, name: &str, cells: Vec<String>) {
        self.cstrings.insert(name.to_string(), cells);
    }

    pub fn cstrings(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.cstrings.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// Declare a user attribute, assigning the next free bit.
    pub fn declare_attribute(&mut self, name: &str) -> CoreResult<u32> {
        if let Some(bit) = self.attributes.get(name) {
            return Ok(*bit);
        }
        if self.next_attribute == 0 || self.next_attribute > MAX_ATTRIBUTE_BIT {
            return Err(CoreError::AttributeOverflow(name.to_string()));
        }
        let bit = self.next_attribute;
        self.next_attribute = bit.checked_shl(1).unwrap_or(0);
        self.attributes.insert(name.to_string(), bit);
        debug!("attribute {name} = {bit}");
        Ok(bit)
    }

    /// Resolve an attribute name, system namespace first.
    pub fn attribute_resolve(&self, name: &str) -> Option<(Namespace, u32)> {
        if let Some(bit) = attribute::system_attribute(name) {
            return Some((Namespace::System, bit));
        }
        self.attributes
            .get(name)
            .map(|bit| (Namespace::User, *bit))
    }

    pub fn has_user_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Names of the user attributes set in `mask`.
    pub fn user_attribute_names(&self, mask: u32) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, bit)| mask & **bit != 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Synonyms and filters
    // -----------------------------------------------------------------------

    /// Record that `original` means `standard`. The first mapping for a word
    /// wins.
    pub fn add_synonym(&mut self, original: &str, standard: &str) {
        self.synonyms
            .entry(original.to_string())
            .or_insert_with(|| standard.to_string());
    }

    /// Collapse synonym chains so that every rewrite lands on a word that is
    /// not itself rewritten.
    pub fn canonicalise_synonyms(&mut self) -> CoreResult<()> {
        let keys: Vec<String> = self.synonyms.keys().cloned().collect();
        for key in keys {
            let mut target = match self.synonyms.get(&key) {
                Some(t) => t.clone(),
                None => continue,
            };
            if target == key {
                self.synonyms.shift_remove(&key);
                continue;
            }
            let mut steps = 0;
            while let Some(next) = self.synonyms.get(&target) {
                if *next == target {
                    break;
                }
                steps += 1;
                if steps > self.synonyms.len() || *next == key {
                    return Err(CoreError::SynonymCycle(key));
                }
                target = next.clone();
            }
            if target == key {
                return Err(CoreError::SynonymCycle(key));
            }
            self.synonyms.insert(key, target);
        }
        Ok(())
    }

    pub fn synonym(&self, word: &str) -> Option<&str> {
        self.synonyms.get(word).map(String::as_str)
    }

    pub fn synonym_count(&self) -> usize {
        self.synonyms.len()
    }

    pub fn add_filter(&mut self, word: &str) {
        self.filters.insert(word.to_string());
    }

    pub fn is_filter(&self, word: &str) -> bool {
        self.filters.contains(word)
    }

    // -----------------------------------------------------------------------
    // Parameters
    // -----------------------------------------------------------------------

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    // -----------------------------------------------------------------------
    // Namespaces
    // -----------------------------------------------------------------------

    /// The namespace `name` is already declared in, if any.
    pub fn namespace_of(&self, name: &str) -> Option<&'static str> {
        if self.has_integer(name) {
            Some("integer")
        } else if self.has_cinteger(name) {
            Some("constant")
        } else if self.has_string(name) {
            Some("string")
        } else if self.has_cstring(name) {
            Some("constant string")
        } else if self.attribute_resolve(name).is_some() {
            Some("attribute")
        } else {
            None
        }
    }

    /// Every declared name, for suggestions.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.integers
            .keys()
            .chain(self.cintegers.keys())
            .chain(self.strings.keys())
            .chain(self.cstrings.keys())
            .chain(self.attributes.keys())
            .map(String::as_str)
    }

    // -----------------------------------------------------------------------
    // Undo shadows
    // -----------------------------------------------------------------------

    pub(crate) fn save_backups(&mut self) {
        for cell in self.integer_cells_mut() {
            cell.backup = cell.value;
        }
        for cell in self.string_cells_mut() {
            cell.backup.clone_from(&cell.value);
        }
    }

    pub(crate) fn restore_backups(&mut self) {
        for cell in self.integer_cells_mut() {
            cell.value = cell.backup;
        }
        for cell in self.string_cells_mut() {
            cell.value.clone_from(&cell.backup);
        }
    }
}
