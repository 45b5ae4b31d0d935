//! Narrowing of broad XPath queries with literals taken from patterns
//!
//! A pattern such as `^Save (draft|copy)` cannot be expressed in XPath, but
//! any element it matches must contain `Save `. Appending
//! `[contains(lhs, 'Save ')]` to the broad query shrinks the candidate set
//! without ever dropping an element the exact matcher would accept.

use crate::locator::builder::Query;
use crate::locator::driver::By;
use crate::locator::kind::ElementKind;
use crate::locator::selector::{Key, Pattern};
use crate::locator::xpath;

/// Literal text every match of a pattern must start and end with
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiteralEdges {
    pub leading: String,
    pub trailing: String,
}

impl LiteralEdges {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }

    /// Non-empty literals, leading first
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        [self.leading.as_str(), self.trailing.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Atom {
    Literal(char),
    Other,
}

/// Split a regex body into atoms, marking quantified atoms as non-literal
///
/// Returns `None` for anything outside the simple subset (alternation,
/// inline flags, unbalanced classes, multi-character escapes).
fn atoms(body: &str) -> Option<Vec<Atom>> {
    let chars: Vec<char> = body.chars().collect();
    let mut atoms = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '|' => return None,
            '\\' => {
                let next = *chars.get(i + 1)?;
                match next {
                    c if c.is_ascii_punctuation() => atoms.push(Atom::Literal(c)),
                    // single-character classes, assertions and control escapes
                    'd' | 'D' | 's' | 'S' | 'w' | 'W' | 'b' | 'B' | 'A' | 'z' | 'n' | 'r' | 't' | 'f' | 'v' => {
                        atoms.push(Atom::Other)
                    }
                    // `\x41`, `\u{..}`, `\pL`, `\p{Lu}`, octal and friends span several characters
                    _ => return None,
                }
                i += 2;
            }
            '[' => {
                i = skip_class(&chars, i)?;
                atoms.push(Atom::Other);
            }
            '(' => {
                if chars.get(i + 1) == Some(&'?') {
                    return None;
                }
                atoms.push(Atom::Other);
                i += 1;
            }
            '?' | '*' | '+' | '{' => {
                if let Some(last) = atoms.last_mut() {
                    *last = Atom::Other;
                }
                if c == '{' {
                    while i < chars.len() && chars[i] != '}' {
                        i += 1;
                    }
                }
                atoms.push(Atom::Other);
                i += 1;
            }
            '.' | ')' | '^' | '$' | '}' | ']' => {
                atoms.push(Atom::Other);
                i += 1;
            }
            _ => {
                atoms.push(Atom::Literal(c));
                i += 1;
            }
        }
    }

    Some(atoms)
}

/// Index just past the `]` closing the class opened at `start`
///
/// Classes nest (`[[:alpha:]x]`, `[a-z&&[^q]]`).
fn skip_class(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    let mut depth = 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '[' => {
                depth += 1;
                i += 1;
            }
            ']' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

fn ends_with_unescaped_dollar(source: &str) -> bool {
    let Some(rest) = source.strip_suffix('$') else {
        return false;
    };
    let backslashes = rest.chars().rev().take_while(|c| *c == '\\').count();
    backslashes % 2 == 0
}

/// Leading and trailing literals of a case-sensitive, non-alternating pattern
pub fn literal_edges(pattern: &Pattern) -> Option<LiteralEdges> {
    if pattern.is_case_insensitive() {
        return None;
    }

    let source = pattern.source();
    let body = source.strip_prefix('^').unwrap_or(source);
    let body = if ends_with_unescaped_dollar(body) {
        &body[..body.len() - 1]
    } else {
        body
    };

    let atoms = atoms(body)?;
    let leading_len = atoms.iter().take_while(|a| matches!(a, Atom::Literal(_))).count();

    let leading: String = atoms[..leading_len].iter().filter_map(literal_char).collect();
    let trailing: String = if leading_len == atoms.len() {
        String::new()
    } else {
        let mut tail: Vec<char> = atoms
            .iter()
            .rev()
            .take_while(|a| matches!(a, Atom::Literal(_)))
            .filter_map(literal_char)
            .collect();
        tail.reverse();
        tail.into_iter().collect()
    };

    let edges = LiteralEdges { leading, trailing };
    if edges.is_empty() { None } else { Some(edges) }
}

fn literal_char(atom: &Atom) -> Option<char> {
    match atom {
        Atom::Literal(c) => Some(*c),
        Atom::Other => None,
    }
}

/// Narrow an XPath `base` with `contains()` predicates drawn from `patterns`
///
/// CSS queries and criteria compared through normalized or translated values
/// are left alone.
pub fn narrow(base: &Query, patterns: &[(Key, Pattern)], kind: &ElementKind) -> Query {
    if base.by != By::XPath {
        return base.clone();
    }

    let mut query = base.value.clone();
    for (key, pattern) in patterns {
        if matches!(key, Key::TagName | Key::Text) || key.is_attribute("type") {
            continue;
        }
        let Some(edges) = literal_edges(pattern) else {
            continue;
        };

        let lhs = xpath::lhs_for(key, kind);
        for literal in edges.literals() {
            if xpath::normalizes_space(key) && literal.chars().any(char::is_whitespace) {
                continue;
            }
            query.push_str(&format!("[contains({}, {})]", lhs, xpath::escape(literal)));
        }
    }

    if query != base.value {
        log::debug!("narrowed {:?} to {:?}", base.value, query);
    }
    Query::xpath(query)
}
