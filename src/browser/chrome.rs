//! Driver traits over `headless_chrome`
//!
//! headless_chrome only evaluates CSS selectors and XPath expressions, so
//! every other lookup strategy is rewritten into one of those before it is
//! sent to the tab.

use crate::error::{BrowserError, Result};
use crate::locator::driver::{By, ElementHandle, SearchContext};
use crate::locator::xpath::escape;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::{Element, Tab};
use std::fmt;
use std::rc::Rc;

/// Protocol messages meaning the remote node is gone
const LOST_NODE_MESSAGES: &[&str] = &[
    "Could not find node with given id",
    "No node with given id",
    "Could not find object with given id",
];

/// A lookup headless_chrome can run directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeQuery {
    Css(String),
    XPath(String),
}

impl NativeQuery {
    /// Rewrite a lookup strategy into CSS or XPath
    pub fn translate(by: By, value: &str) -> Self {
        match by {
            By::Css => NativeQuery::Css(value.to_string()),
            By::TagName => NativeQuery::Css(value.to_string()),
            By::XPath => NativeQuery::XPath(value.to_string()),
            By::Id => NativeQuery::XPath(format!(".//*[@id = {}]", escape(value))),
            By::Name => NativeQuery::XPath(format!(".//*[@name = {}]", escape(value))),
            By::ClassName => NativeQuery::XPath(format!(
                ".//*[contains(concat(' ', normalize-space(@class), ' '), {})]",
                escape(&format!(" {} ", value))
            )),
            By::LinkText => NativeQuery::XPath(format!(".//a[normalize-space() = {}]", escape(value))),
            By::PartialLinkText => {
                NativeQuery::XPath(format!(".//a[contains(normalize-space(), {})]", escape(value)))
            }
        }
    }
}

fn is_lost_node(message: &str) -> bool {
    LOST_NODE_MESSAGES.iter().any(|m| message.contains(m))
}

/// Map a headless_chrome failure onto the driver error taxonomy
fn driver_error(error: anyhow::Error, by: By, value: &str) -> BrowserError {
    if error.downcast_ref::<NoElementFound>().is_some() {
        return BrowserError::NoSuchElement(format!("{} {:?}", by, value));
    }
    let message = error.to_string();
    if is_lost_node(&message) {
        BrowserError::StaleElementReference(message)
    } else {
        BrowserError::Driver(message)
    }
}

fn read_error(error: anyhow::Error) -> BrowserError {
    let message = error.to_string();
    if is_lost_node(&message) {
        BrowserError::StaleElementReference(message)
    } else {
        BrowserError::Driver(message)
    }
}

/// `find_elements` reports "nothing matched" as an error; turn it into an empty result
fn none_found_is_empty<T>(result: std::result::Result<Vec<T>, anyhow::Error>) -> std::result::Result<Vec<T>, anyhow::Error> {
    match result {
        Err(e) if e.downcast_ref::<NoElementFound>().is_some() => Ok(Vec::new()),
        other => other,
    }
}

/// A tab's document as the top-level search root
#[derive(Clone, Copy)]
pub struct TabContext<'a> {
    tab: &'a Tab,
}

impl<'a> TabContext<'a> {
    pub fn new(tab: &'a Tab) -> Self {
        Self { tab }
    }

    pub fn tab(&self) -> &'a Tab {
        self.tab
    }
}

impl<'a> SearchContext for TabContext<'a> {
    type Handle = ChromeElement<'a>;

    fn find_element(&self, by: By, value: &str) -> Result<ChromeElement<'a>> {
        let found = match NativeQuery::translate(by, value) {
            NativeQuery::Css(css) => self.tab.find_element(&css),
            NativeQuery::XPath(xpath) => self.tab.find_element_by_xpath(&xpath),
        };
        found.map(ChromeElement::new).map_err(|e| driver_error(e, by, value))
    }

    fn find_elements(&self, by: By, value: &str) -> Result<Vec<ChromeElement<'a>>> {
        let found = match NativeQuery::translate(by, value) {
            NativeQuery::Css(css) => self.tab.find_elements(&css),
            NativeQuery::XPath(xpath) => self.tab.find_elements_by_xpath(&xpath),
        };
        let found = none_found_is_empty(found).map_err(|e| driver_error(e, by, value))?;
        Ok(found.into_iter().map(ChromeElement::new).collect())
    }
}

/// Element handle backed by a headless_chrome `Element`
#[derive(Clone)]
pub struct ChromeElement<'a> {
    element: Rc<Element<'a>>,
}

impl<'a> ChromeElement<'a> {
    fn new(element: Element<'a>) -> Self {
        Self { element: Rc::new(element) }
    }

    /// The underlying headless_chrome element, for clicking, typing and the like
    pub fn element(&self) -> &Element<'a> {
        &self.element
    }
}

impl fmt::Debug for ChromeElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeElement")
            .field("tag_name", &self.element.tag_name)
            .field("backend_node_id", &self.element.backend_node_id)
            .finish()
    }
}

impl<'a> ChromeElement<'a> {
    /// Re-create an XPath result on the tab's lifetime
    ///
    /// headless_chrome ties elements found by XPath under an element to that
    /// element's borrow; the node id alone is enough to rebuild them.
    fn on_tab(&self, found: Element<'_>) -> anyhow::Result<Element<'a>> {
        Element::new(self.element.parent, found.node_id)
    }
}

impl<'a> SearchContext for ChromeElement<'a> {
    type Handle = ChromeElement<'a>;

    fn find_element(&self, by: By, value: &str) -> Result<ChromeElement<'a>> {
        let found = match NativeQuery::translate(by, value) {
            NativeQuery::Css(css) => self.element.find_element(&css),
            NativeQuery::XPath(xpath) => self
                .element
                .find_element_by_xpath(&xpath)
                .and_then(|e| self.on_tab(e)),
        };
        found.map(ChromeElement::new).map_err(|e| driver_error(e, by, value))
    }

    fn find_elements(&self, by: By, value: &str) -> Result<Vec<ChromeElement<'a>>> {
        let found = match NativeQuery::translate(by, value) {
            NativeQuery::Css(css) => self.element.find_elements(&css),
            NativeQuery::XPath(xpath) => self
                .element
                .find_elements_by_xpath(&xpath)
                .and_then(|found| found.into_iter().map(|e| self.on_tab(e)).collect()),
        };
        let found = none_found_is_empty(found).map_err(|e| driver_error(e, by, value))?;
        Ok(found.into_iter().map(ChromeElement::new).collect())
    }
}

impl ElementHandle for ChromeElement<'_> {
    fn tag_name(&self) -> Result<String> {
        Ok(self.element.tag_name.to_lowercase())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element.get_attribute_value(name).map_err(read_error)
    }

    fn text(&self) -> Result<String> {
        self.element.get_inner_text().map_err(read_error)
    }
}
