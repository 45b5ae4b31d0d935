use crate::error::Result;
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A regular expression criterion with an explicit case-sensitivity flag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PatternSpec", into = "PatternSpec")]
pub struct Pattern {
    regex: Regex,
    case_insensitive: bool,
}

/// Wire form of a pattern: `{"pattern": "^Save", "case_insensitive": false}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PatternSpec {
    pattern: String,
    #[serde(default)]
    case_insensitive: bool,
}

impl Pattern {
    /// Compile a case-sensitive pattern
    pub fn new(source: &str) -> Result<Self> {
        Self::build(source, false)
    }

    /// Compile a case-insensitive pattern
    pub fn case_insensitive(source: &str) -> Result<Self> {
        Self::build(source, true)
    }

    fn build(source: &str, case_insensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self { regex, case_insensitive })
    }

    /// The pattern source as written by the caller
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source() && self.case_insensitive == other.case_insensitive
    }
}

impl TryFrom<PatternSpec> for Pattern {
    type Error = regex::Error;

    fn try_from(spec: PatternSpec) -> std::result::Result<Self, Self::Error> {
        let regex = RegexBuilder::new(&spec.pattern)
            .case_insensitive(spec.case_insensitive)
            .build()?;
        Ok(Self { regex, case_insensitive: spec.case_insensitive })
    }
}

impl From<Pattern> for PatternSpec {
    fn from(pattern: Pattern) -> Self {
        Self {
            pattern: pattern.source().to_string(),
            case_insensitive: pattern.case_insensitive,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source())?;
        if self.case_insensitive {
            write!(f, "i")?;
        }
        Ok(())
    }
}

/// Value of a single selector criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorValue {
    /// Only valid for `index`; negative values count from the end
    Index(i64),
    Str(String),
    /// "One of" these literals
    List(Vec<String>),
    Pattern(Pattern),
}

impl SelectorValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SelectorValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            SelectorValue::Pattern(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, SelectorValue::Pattern(_))
    }

    /// Whether a fetched value satisfies this criterion
    pub fn matches(&self, actual: Option<&str>) -> bool {
        match (self, actual) {
            (_, None) => false,
            (SelectorValue::Str(s), Some(a)) => s == a,
            (SelectorValue::List(items), Some(a)) => items.iter().any(|i| i == a),
            (SelectorValue::Pattern(p), Some(a)) => p.is_match(a),
            (SelectorValue::Index(_), Some(_)) => false,
        }
    }
}

impl fmt::Display for SelectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorValue::Index(i) => write!(f, "{}", i),
            SelectorValue::Str(s) => write!(f, "{:?}", s),
            SelectorValue::List(items) => write!(f, "{:?}", items),
            SelectorValue::Pattern(p) => write!(f, "{}", p),
        }
    }
}

impl From<&str> for SelectorValue {
    fn from(value: &str) -> Self {
        SelectorValue::Str(value.to_string())
    }
}

impl From<String> for SelectorValue {
    fn from(value: String) -> Self {
        SelectorValue::Str(value)
    }
}

impl From<Pattern> for SelectorValue {
    fn from(value: Pattern) -> Self {
        SelectorValue::Pattern(value)
    }
}

impl From<Vec<String>> for SelectorValue {
    fn from(value: Vec<String>) -> Self {
        SelectorValue::List(value)
    }
}

impl From<Vec<&str>> for SelectorValue {
    fn from(value: Vec<&str>) -> Self {
        SelectorValue::List(value.into_iter().map(String::from).collect())
    }
}

impl From<i64> for SelectorValue {
    fn from(value: i64) -> Self {
        SelectorValue::Index(value)
    }
}

/// Caller-supplied criteria, keyed by name, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    entries: IndexMap<String, SelectorValue>,
}

impl Selector {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Builder method: add a criterion
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SelectorValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Builder method: add an index criterion
    pub fn with_index(self, index: i64) -> Self {
        self.with("index", SelectorValue::Index(index))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SelectorValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SelectorValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SelectorValue)> {
        self.entries.iter()
    }

    /// Copy of this selector with `index` set to `index`
    pub fn merged_with_index(&self, index: i64) -> Selector {
        self.clone().with_index(index)
    }

    /// Parse a selector from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// A selector key after alias rewriting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    TagName,
    Text,
    XPath,
    Css,
    Index,
    Class,
    Label,
    /// Any other attribute, in its symbolic (underscored) spelling
    Attribute(String),
}

impl Key {
    /// Map a symbolic name to a key; aliases are not resolved here
    pub fn from_name(name: &str) -> Key {
        match name {
            "tag_name" => Key::TagName,
            "text" => Key::Text,
            "xpath" => Key::XPath,
            "css" => Key::Css,
            "index" => Key::Index,
            "class" => Key::Class,
            "label" => Key::Label,
            other => Key::Attribute(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Key::TagName => "tag_name",
            Key::Text => "text",
            Key::XPath => "xpath",
            Key::Css => "css",
            Key::Index => "index",
            Key::Class => "class",
            Key::Label => "label",
            Key::Attribute(name) => name,
        }
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self, Key::Attribute(_))
    }

    /// Whether this is the attribute `name`
    pub fn is_attribute(&self, name: &str) -> bool {
        matches!(self, Key::Attribute(n) if n == name)
    }

    /// HTML attribute name as rendered in the document (`data_foo` -> `data-foo`)
    pub fn html_name(&self) -> String {
        self.name().replace('_', "-")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated selector with aliases rewritten
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSelector {
    entries: IndexMap<Key, SelectorValue>,
}

impl NormalizedSelector {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    pub fn with(mut self, key: Key, value: impl Into<SelectorValue>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: Key, value: SelectorValue) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &Key) -> Option<&SelectorValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &Key) -> Option<SelectorValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &SelectorValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn has_pattern(&self) -> bool {
        self.entries.values().any(SelectorValue::is_pattern)
    }

    /// Remove all pattern criteria, returning them in selector order
    pub fn take_patterns(&mut self) -> Vec<(Key, Pattern)> {
        let mut patterns = Vec::new();
        self.entries.retain(|key, value| match value {
            SelectorValue::Pattern(p) => {
                patterns.push((key.clone(), p.clone()));
                false
            }
            _ => true,
        });
        patterns
    }

    /// Extract the index criterion; a non-integer index is rejected upstream
    pub fn take_index(&mut self) -> Option<i64> {
        match self.entries.shift_remove(&Key::Index) {
            Some(SelectorValue::Index(i)) => Some(i),
            _ => None,
        }
    }
}

impl fmt::Display for NormalizedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// Shorthand for a case-sensitive pattern value
pub fn pattern(source: &str) -> Result<SelectorValue> {
    Pattern::new(source).map(SelectorValue::Pattern)
}
