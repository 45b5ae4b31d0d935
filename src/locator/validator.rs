//! Client-side checks run against fetched element values
//!
//! Used twice: to filter broad-query candidates against pattern criteria, and
//! to re-check `tag_name`/`type` on the single-result path, where a raw
//! caller-supplied `xpath`/`css` was never attribute-checked.

use crate::error::Result;
use crate::locator::driver::ElementHandle;
use crate::locator::selector::{Key, Pattern, Selector, SelectorValue};

/// Trim and squeeze inner runs of whitespace to one space, like XPath `normalize-space()`
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Value a criterion is compared against, as read off the element
pub fn fetch_value<H: ElementHandle>(element: &H, key: &Key) -> Result<Option<String>> {
    let value = match key {
        Key::Text => Some(collapse_whitespace(&element.text()?)),
        Key::TagName => Some(element.tag_name()?.to_lowercase()),
        Key::Class => element.attribute("class")?,
        Key::Label => element.attribute("label")?,
        Key::Attribute(name) if name == "href" => element.attribute("href")?.map(|h| h.trim().to_string()),
        Key::Attribute(_) => element.attribute(&key.html_name())?,
        Key::XPath | Key::Css | Key::Index => None,
    };
    Ok(value)
}

/// Whether `element` satisfies every pattern criterion
pub fn matches_patterns<H: ElementHandle>(element: &H, patterns: &[(Key, Pattern)]) -> Result<bool> {
    for (key, pattern) in patterns {
        let matched = fetch_value(element, key)?.is_some_and(|value| pattern.is_match(&value));
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Lower-case the literals of `value`; tag names and input types compare case-insensitively
fn fold_case(value: &SelectorValue) -> SelectorValue {
    match value {
        SelectorValue::Str(s) => SelectorValue::Str(s.to_lowercase()),
        SelectorValue::List(items) => SelectorValue::List(items.iter().map(|i| i.to_lowercase()).collect()),
        other => other.clone(),
    }
}

fn matches_ignoring_case(actual: Option<&str>, expected: &SelectorValue) -> bool {
    let actual = actual.map(str::to_lowercase);
    fold_case(expected).matches(actual.as_deref())
}

/// Whether the element's tag satisfies the selector's `tag_name`, if any
pub fn validate_tag<H: ElementHandle>(element: &H, selector: &Selector) -> Result<bool> {
    match selector.get("tag_name") {
        Some(expected) => Ok(matches_ignoring_case(Some(&element.tag_name()?), expected)),
        None => Ok(true),
    }
}

/// Keep `element` only if it satisfies the selector's tag and input-type constraints
pub fn validate_element<H: ElementHandle>(element: H, selector: &Selector) -> Result<Option<H>> {
    if !validate_tag(&element, selector)? {
        log::debug!("discarding element: tag does not match {}", selector);
        return Ok(None);
    }

    if let Some(expected) = selector.get("type") {
        if element.tag_name()?.eq_ignore_ascii_case("input") {
            let actual = element.attribute("type")?;
            if !matches_ignoring_case(actual.as_deref(), expected) {
                log::debug!("discarding input: type {:?} does not match {}", actual, selector);
                return Ok(None);
            }
        }
    }

    Ok(Some(element))
}
