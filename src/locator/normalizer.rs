use crate::error::{BrowserError, Result};
use crate::locator::driver::By;
use crate::locator::kind::ElementKind;
use crate::locator::selector::{Key, NormalizedSelector, Selector, SelectorValue};

/// Rewrite a selector key alias to its canonical name
pub fn canonical_name(name: &str) -> &str {
    match name {
        "class_name" => "class",
        "caption" => "text",
        other => other,
    }
}

/// Validate `selector` against `kind` and rewrite aliases
///
/// The input is left untouched. Attribute names keep their underscored
/// spelling; hyphenation happens when a query is built. Keys the driver
/// answers natively (`link_text`, ...) are accepted on every kind.
pub fn normalize(selector: &Selector, kind: &ElementKind) -> Result<NormalizedSelector> {
    let mut normalized = NormalizedSelector::new();

    for (name, value) in selector.iter() {
        let key = Key::from_name(canonical_name(name));
        check_value(&key, value)?;

        if let Key::Attribute(attribute) = &key {
            if !kind.is_valid_attribute(attribute) && By::for_key(attribute).is_none() {
                return Err(BrowserError::UnsupportedAttribute {
                    attribute: attribute.clone(),
                    kind: kind.tag().to_string(),
                });
            }
        }

        normalized.insert(key, value.clone());
    }

    log::trace!("normalized {} to {}", selector, normalized);
    Ok(normalized)
}

fn check_value(key: &Key, value: &SelectorValue) -> Result<()> {
    let expected = match (key, value) {
        (Key::Index, SelectorValue::Index(_)) => return Ok(()),
        (Key::Index, _) => "integer",
        (Key::XPath | Key::Css, SelectorValue::Str(_)) => return Ok(()),
        (Key::XPath | Key::Css, _) => "string",
        (_, SelectorValue::Index(_)) => "string, pattern or list",
        _ => return Ok(()),
    };

    Err(BrowserError::InvalidValueType {
        key: key.name().to_string(),
        expected: expected.to_string(),
    })
}
