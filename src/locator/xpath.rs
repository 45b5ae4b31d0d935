//! XPath string helpers shared by query synthesis and literal narrowing

use crate::locator::kind::ElementKind;
use crate::locator::selector::Key;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

/// Quote `value` as an XPath string literal
///
/// XPath 1.0 has no escape sequences, so a value holding both quote kinds is
/// spliced together with `concat()`.
pub fn escape(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Left-hand side expression a criterion is compared through
pub fn lhs_for(key: &Key, kind: &ElementKind) -> String {
    match key {
        Key::Text => "normalize-space()".to_string(),
        Key::TagName => "local-name()".to_string(),
        Key::Class => "@class".to_string(),
        Key::Label if kind.has_native_label() => "@label".to_string(),
        Key::Attribute(name) if name == "href" => "normalize-space(@href)".to_string(),
        Key::Attribute(name) if name == "type" => {
            format!("translate(@type, '{}', '{}')", UPPERCASE, LOWERCASE)
        }
        other => format!("@{}", other.html_name()),
    }
}

/// Whether `lhs_for` folds whitespace for this key
pub fn normalizes_space(key: &Key) -> bool {
    matches!(key, Key::Text) || key.is_attribute("href")
}
