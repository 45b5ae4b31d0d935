use crate::error::Result;
use crate::locator::driver::{By, ElementHandle, SearchContext};
use crate::locator::selector::Pattern;

/// Outcome of resolving a `label` pattern through `<label>` elements
#[derive(Debug, Clone, PartialEq)]
pub enum LabelResolution<H> {
    /// The label points at this id through its `for` attribute
    Id(String),
    /// The label wraps its control; search inside it
    Root(H),
    NotFound,
}

/// Find the first `<label>` under `context` whose text matches `pattern`
///
/// Only the given search root is scanned.
pub fn resolve<H: ElementHandle>(
    context: &dyn SearchContext<Handle = H>,
    pattern: &Pattern,
) -> Result<LabelResolution<H>> {
    for label in context.find_elements(By::TagName, "label")? {
        if !pattern.is_match(label.text()?.trim()) {
            continue;
        }

        return match label.attribute("for")? {
            Some(id) if !id.is_empty() => {
                log::debug!("label {} resolved to id {:?}", pattern, id);
                Ok(LabelResolution::Id(id))
            }
            _ => {
                log::debug!("label {} has no `for`; searching inside it", pattern);
                Ok(LabelResolution::Root(label))
            }
        };
    }

    Ok(LabelResolution::NotFound)
}
