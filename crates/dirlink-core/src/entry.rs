//! Directory entry and search result data model
//!
//! Attribute names are matched case-insensitively, as directory servers do.
//! Attribute values form a set: adding a value twice keeps one copy.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Iteration order for entries, attributes and values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBehavior {
    /// No ordering guarantee
    #[default]
    Unordered,
    /// Insertion order
    Ordered,
    /// Lexicographic order
    Sorted,
}

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeValue {
    /// UTF-8 value
    Text(String),
    /// Binary value (e.g. `jpegPhoto`, `userCertificate;binary`)
    Binary(Vec<u8>),
}

impl AttributeValue {
    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Binary(_) => None,
        }
    }

    /// Raw bytes of the value; text values are returned as UTF-8
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttributeValue::Text(s) => s.as_bytes(),
            AttributeValue::Binary(b) => b,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(value: Vec<u8>) -> Self {
        AttributeValue::Binary(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A named, multi-valued attribute of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapAttribute {
    name: String,
    values: IndexSet<AttributeValue>,
    #[serde(default)]
    sort: SortBehavior,
}

impl LdapAttribute {
    /// Create an empty attribute
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_sort(name, SortBehavior::default())
    }

    /// Create an empty attribute with the given value ordering
    pub fn with_sort(name: impl Into<String>, sort: SortBehavior) -> Self {
        Self {
            name: name.into(),
            values: IndexSet::new(),
            sort,
        }
    }

    /// Create an attribute holding the given values
    pub fn with_values<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        let mut attr = Self::new(name);
        attr.add_values(values);
        attr
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort_behavior(&self) -> SortBehavior {
        self.sort
    }

    /// Add a value; returns false if it was already present
    pub fn add_value(&mut self, value: impl Into<AttributeValue>) -> bool {
        let inserted = self.values.insert(value.into());
        if inserted && self.sort == SortBehavior::Sorted {
            self.values.sort();
        }
        inserted
    }

    pub fn add_values<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        for value in values {
            self.add_value(value);
        }
    }

    /// Remove a value; returns false if it was not present
    pub fn remove_value(&mut self, value: &AttributeValue) -> bool {
        self.values.shift_remove(value)
    }

    pub fn values(&self) -> impl Iterator<Item = &AttributeValue> {
        self.values.iter()
    }

    /// All text values, skipping binary ones
    pub fn string_values(&self) -> Vec<&str> {
        self.values.iter().filter_map(AttributeValue::as_str).collect()
    }

    /// First value, if any
    pub fn value(&self) -> Option<&AttributeValue> {
        self.values.first()
    }

    /// Whether any value is binary
    pub fn is_binary(&self) -> bool {
        self.values
            .iter()
            .any(|v| matches!(v, AttributeValue::Binary(_)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn merge(&mut self, other: LdapAttribute) {
        self.add_values(other.values);
    }
}

/// A directory entry: a DN plus its attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapEntry {
    dn: String,
    /// Keyed by lowercased attribute name
    attributes: IndexMap<String, LdapAttribute>,
    #[serde(default)]
    sort: SortBehavior,
}

impl LdapEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self::with_sort(dn, SortBehavior::default())
    }

    pub fn with_sort(dn: impl Into<String>, sort: SortBehavior) -> Self {
        Self {
            dn: dn.into(),
            attributes: IndexMap::new(),
            sort,
        }
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn set_dn(&mut self, dn: impl Into<String>) {
        self.dn = dn.into();
    }

    /// Add an attribute, merging values into an existing attribute of the
    /// same (case-insensitive) name.
    pub fn add_attribute(&mut self, attribute: LdapAttribute) {
        let key = attribute.name().to_ascii_lowercase();
        match self.attributes.get_mut(&key) {
            Some(existing) => existing.merge(attribute),
            None => {
                self.attributes.insert(key, attribute);
                if self.sort == SortBehavior::Sorted {
                    self.attributes.sort_keys();
                }
            }
        }
    }

    /// Look up an attribute by name, ignoring case
    pub fn attribute(&self, name: &str) -> Option<&LdapAttribute> {
        self.attributes.get(&name.to_ascii_lowercase())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<LdapAttribute> {
        self.attributes.shift_remove(&name.to_ascii_lowercase())
    }

    pub fn attributes(&self) -> impl Iterator<Item = &LdapAttribute> {
        self.attributes.values()
    }

    /// Attribute names as they were first added
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.values().map(LdapAttribute::name).collect()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Entries returned by a search, keyed by DN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Keyed by lowercased DN
    entries: IndexMap<String, LdapEntry>,
    #[serde(default)]
    sort: SortBehavior,
}

impl SearchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sort(sort: SortBehavior) -> Self {
        Self {
            entries: IndexMap::new(),
            sort,
        }
    }

    /// Add an entry, replacing any entry with the same DN
    pub fn add_entry(&mut self, entry: LdapEntry) -> Option<LdapEntry> {
        let previous = self.entries.insert(entry.dn().to_ascii_lowercase(), entry);
        if self.sort == SortBehavior::Sorted {
            self.entries.sort_keys();
        }
        previous
    }

    pub fn entry(&self, dn: &str) -> Option<&LdapEntry> {
        self.entries.get(&dn.to_ascii_lowercase())
    }

    pub fn first_entry(&self) -> Option<&LdapEntry> {
        self.entries.first().map(|(_, entry)| entry)
    }

    pub fn remove_entry(&mut self, dn: &str) -> Option<LdapEntry> {
        self.entries.shift_remove(&dn.to_ascii_lowercase())
    }

    pub fn entries(&self) -> impl Iterator<Item = &LdapEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LdapEntry> for SearchResult {
    fn from_iter<T: IntoIterator<Item = LdapEntry>>(iter: T) -> Self {
        let mut result = SearchResult::new();
        for entry in iter {
            result.add_entry(entry);
        }
        result
    }
}
