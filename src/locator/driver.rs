//! Seam between the locator and the remote browser driver
//!
//! The locator never talks to a browser directly. It issues `find_element` /
//! `find_elements` calls against a [`SearchContext`] (a page, or an element
//! acting as a search root) and reads tag names, attributes and text off the
//! returned [`ElementHandle`]s.

use crate::error::Result;
use std::fmt;

/// Lookup strategies understood by the remote driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Id,
    Name,
    ClassName,
    Css,
    XPath,
    TagName,
    LinkText,
    PartialLinkText,
}

impl By {
    /// Strategy natively backing a single-criterion selector key, if any
    pub fn for_key(key: &str) -> Option<By> {
        match key {
            "id" => Some(By::Id),
            "name" => Some(By::Name),
            "class" | "class_name" => Some(By::ClassName),
            "css" => Some(By::Css),
            "xpath" => Some(By::XPath),
            "tag_name" => Some(By::TagName),
            "link" | "link_text" => Some(By::LinkText),
            "partial_link_text" => Some(By::PartialLinkText),
            _ => None,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            By::Id => "id",
            By::Name => "name",
            By::ClassName => "class name",
            By::Css => "css selector",
            By::XPath => "xpath",
            By::TagName => "tag name",
            By::LinkText => "link text",
            By::PartialLinkText => "partial link text",
        };
        f.write_str(name)
    }
}

/// Something elements can be looked up from
pub trait SearchContext {
    type Handle;

    /// Fails with `NoSuchElement` when nothing matches
    fn find_element(&self, by: By, value: &str) -> Result<Self::Handle>;

    /// Returns matches in document order; empty, never an error, when nothing matches
    fn find_elements(&self, by: By, value: &str) -> Result<Vec<Self::Handle>>;
}

/// Opaque handle to a remote element
///
/// Handles are search roots in their own right so that a lookup can be
/// re-rooted at a previously found element.
pub trait ElementHandle: SearchContext<Handle = Self> + Clone {
    fn tag_name(&self) -> Result<String>;

    fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Rendered (visible) text
    fn text(&self) -> Result<String>;
}
