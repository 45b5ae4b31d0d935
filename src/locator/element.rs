use crate::error::{BrowserError, Result};
use crate::locator::driver::{ElementHandle, SearchContext};
use crate::locator::finder::Finder;
use crate::locator::selector::Selector;

/// Reference to an element that may not have been looked up yet
///
/// A located reference already holds its handle. A pending one only holds
/// the selector that would find it and is checked against the page when
/// something asks for the element.
pub struct LazyElement<'a, C: SearchContext> {
    finder: Finder<'a, C>,
    selector: Selector,
    handle: Option<C::Handle>,
}

impl<'a, C> LazyElement<'a, C>
where
    C: SearchContext,
    C::Handle: ElementHandle,
{
    pub fn pending(finder: Finder<'a, C>, selector: Selector) -> Self {
        Self {
            finder,
            selector,
            handle: None,
        }
    }

    pub fn located(finder: Finder<'a, C>, selector: Selector, handle: C::Handle) -> Self {
        Self {
            finder,
            selector,
            handle: Some(handle),
        }
    }

    /// Selector that identifies this element
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn is_located(&self) -> bool {
        self.handle.is_some()
    }

    /// Look the element up, or return the handle already held
    ///
    /// Pending references are resolved afresh on every call.
    pub fn locate(&self) -> Result<Option<C::Handle>> {
        match &self.handle {
            Some(handle) => Ok(Some(handle.clone())),
            None => self.finder.find(&self.selector),
        }
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.locate()?.is_some())
    }

    /// The element's handle; `ElementNotFound` when nothing matches
    pub fn handle(&self) -> Result<C::Handle> {
        self.locate()?
            .ok_or_else(|| BrowserError::ElementNotFound(self.selector.to_string()))
    }
}
