//! Lazily materialized result set of one `find_all`
//!
//! The first call that needs the full sequence issues the lookup; its result
//! is kept for the lifetime of the collection and never refreshed. Indexed
//! access past the end does not fail: it hands back a pending reference for
//! `selector + {index: i}` whose existence is only checked when used.

use crate::error::Result;
use crate::locator::driver::{ElementHandle, SearchContext};
use crate::locator::element::LazyElement;
use crate::locator::finder::{Finder, resolve_index};
use crate::locator::selector::Selector;
use std::cell::OnceCell;

pub struct ElementCollection<'a, C: SearchContext> {
    finder: Finder<'a, C>,
    selector: Selector,
    elements: OnceCell<Vec<C::Handle>>,
}

impl<'a, C> ElementCollection<'a, C>
where
    C: SearchContext,
    C::Handle: ElementHandle,
{
    pub fn new(finder: Finder<'a, C>, selector: Selector) -> Self {
        Self {
            finder,
            selector,
            elements: OnceCell::new(),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn is_materialized(&self) -> bool {
        self.elements.get().is_some()
    }

    /// Fetch every match once; later calls return the cached sequence
    ///
    /// A failed lookup leaves the collection unmaterialized.
    pub fn materialize(&self) -> Result<&[C::Handle]> {
        if let Some(elements) = self.elements.get() {
            return Ok(elements);
        }

        let found = self.finder.find_all(&self.selector)?;
        log::debug!("materialized {} element(s) for {}", found.len(), self.selector);
        Ok(self.elements.get_or_init(|| found))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.materialize()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.materialize()?.is_empty())
    }

    /// Element at `index`; negative indices count from the end
    ///
    /// Out-of-range indices yield a pending reference rather than an error.
    pub fn at(&self, index: i64) -> Result<LazyElement<'a, C>> {
        let elements = self.materialize()?;
        let selector = self.selector.merged_with_index(index);

        match resolve_index(elements.len(), index) {
            Some(position) => Ok(LazyElement::located(self.finder, selector, elements[position].clone())),
            None => {
                log::debug!("index {} outside {} element(s); deferring {}", index, elements.len(), selector);
                Ok(LazyElement::pending(self.finder, selector))
            }
        }
    }

    pub fn first(&self) -> Result<LazyElement<'a, C>> {
        self.at(0)
    }

    pub fn last(&self) -> Result<LazyElement<'a, C>> {
        self.at(-1)
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, C::Handle>> {
        Ok(self.materialize()?.iter())
    }

    pub fn to_vec(&self) -> Result<Vec<C::Handle>> {
        Ok(self.materialize()?.to_vec())
    }
}
