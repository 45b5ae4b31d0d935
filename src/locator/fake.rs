//! Scripted in-memory driver used by unit tests
//!
//! Models a small document tree. Id, name, class, tag and link-text lookups
//! plus the `.//*` and `.//tag` scans are answered from the tree; any other
//! query must be stubbed. Every `find_element`/`find_elements` call is
//! recorded so tests can assert on remote round-trips.

use crate::error::{BrowserError, Result};
use crate::locator::driver::{By, ElementHandle, SearchContext};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
struct FakeNode {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<usize>,
}

#[derive(Default)]
struct Inner {
    nodes: RefCell<Vec<FakeNode>>,
    stubs: RefCell<HashMap<(By, String), Vec<usize>>>,
    stale: RefCell<HashSet<usize>>,
    calls: RefCell<Vec<(By, String)>>,
}

impl Inner {
    fn descendants(&self, root: usize) -> Vec<usize> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<usize> = nodes[root].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(nodes[id].children.iter().rev().copied());
        }
        out
    }

    fn attribute_of(&self, node: usize, name: &str) -> Option<String> {
        self.nodes.borrow()[node]
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn query(&self, root: usize, by: By, value: &str) -> Result<Vec<usize>> {
        self.check_live(root)?;
        self.calls.borrow_mut().push((by, value.to_string()));

        let candidates = self.descendants(root);
        let nodes = self.nodes.borrow();
        let keep = |pred: &dyn Fn(usize, &FakeNode) -> bool| -> Vec<usize> {
            candidates.iter().copied().filter(|id| pred(*id, &nodes[*id])).collect()
        };

        let found = match by {
            By::Id => keep(&|id, _| self.attribute_of(id, "id").as_deref() == Some(value)),
            By::Name => keep(&|id, _| self.attribute_of(id, "name").as_deref() == Some(value)),
            By::ClassName => keep(&|id, _| {
                self.attribute_of(id, "class")
                    .is_some_and(|c| c.split_whitespace().any(|t| t == value))
            }),
            By::TagName => keep(&|_, n| n.tag.eq_ignore_ascii_case(value)),
            By::LinkText => keep(&|_, n| n.tag == "a" && n.text.trim() == value),
            By::PartialLinkText => keep(&|_, n| n.tag == "a" && n.text.contains(value)),
            By::XPath if value == ".//*" => candidates.clone(),
            By::XPath if is_tag_scan(value) => keep(&|_, n| n.tag == value[3..]),
            _ => match self.stubs.borrow().get(&(by, value.to_string())) {
                Some(ids) => ids.clone(),
                None => return Err(BrowserError::Driver(format!("unstubbed query {} {:?}", by, value))),
            },
        };
        Ok(found)
    }

    fn check_live(&self, node: usize) -> Result<()> {
        if self.stale.borrow().contains(&node) {
            return Err(BrowserError::StaleElementReference(format!("node {}", node)));
        }
        Ok(())
    }
}

fn is_tag_scan(value: &str) -> bool {
    value
        .strip_prefix(".//")
        .is_some_and(|tag| !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// In-memory document acting as the top-level search context
#[derive(Clone)]
pub struct FakeDocument {
    inner: Rc<Inner>,
}

impl FakeDocument {
    /// A document holding a single `<html>` root (node 0)
    pub fn new() -> Self {
        let inner = Inner::default();
        inner.nodes.borrow_mut().push(FakeNode {
            tag: "html".to_string(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        });
        Self { inner: Rc::new(inner) }
    }

    /// Append an element under `parent`, returning its node id
    pub fn add(&self, parent: usize, tag: &str, attributes: &[(&str, &str)], text: &str) -> usize {
        let mut nodes = self.inner.nodes.borrow_mut();
        let id = nodes.len();
        nodes.push(FakeNode {
            tag: tag.to_string(),
            attributes: attributes.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            text: text.to_string(),
            children: Vec::new(),
        });
        nodes[parent].children.push(id);
        id
    }

    /// Answer `value` for `by` with these nodes
    pub fn stub(&self, by: By, value: &str, nodes: &[usize]) {
        self.inner.stubs.borrow_mut().insert((by, value.to_string()), nodes.to_vec());
    }

    /// Detach a node: reading from its handle now fails as stale
    pub fn make_stale(&self, node: usize) {
        self.inner.stale.borrow_mut().insert(node);
    }

    /// Remote lookups issued so far
    pub fn calls(&self) -> Vec<(By, String)> {
        self.inner.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.borrow().len()
    }

    pub fn element(&self, node: usize) -> FakeElement {
        FakeElement { doc: Rc::clone(&self.inner), node }
    }

    fn handles(&self, nodes: Vec<usize>) -> Vec<FakeElement> {
        nodes.into_iter().map(|node| self.element(node)).collect()
    }
}

fn first<T>(mut found: Vec<T>, by: By, value: &str) -> Result<T> {
    if found.is_empty() {
        return Err(BrowserError::NoSuchElement(format!("{} {:?}", by, value)));
    }
    Ok(found.swap_remove(0))
}

impl SearchContext for FakeDocument {
    type Handle = FakeElement;

    fn find_element(&self, by: By, value: &str) -> Result<FakeElement> {
        first(self.find_elements(by, value)?, by, value)
    }

    fn find_elements(&self, by: By, value: &str) -> Result<Vec<FakeElement>> {
        Ok(self.handles(self.inner.query(0, by, value)?))
    }
}

/// Handle to a node of a [`FakeDocument`]
#[derive(Clone)]
pub struct FakeElement {
    doc: Rc<Inner>,
    node: usize,
}

impl FakeElement {
    pub fn node(&self) -> usize {
        self.node
    }
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc) && self.node == other.node
    }
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FakeElement({})", self.node)
    }
}

impl SearchContext for FakeElement {
    type Handle = FakeElement;

    fn find_element(&self, by: By, value: &str) -> Result<FakeElement> {
        first(self.find_elements(by, value)?, by, value)
    }

    fn find_elements(&self, by: By, value: &str) -> Result<Vec<FakeElement>> {
        let found = self.doc.query(self.node, by, value)?;
        Ok(found
            .into_iter()
            .map(|node| FakeElement { doc: Rc::clone(&self.doc), node })
            .collect())
    }
}

impl ElementHandle for FakeElement {
    fn tag_name(&self) -> Result<String> {
        self.doc.check_live(self.node)?;
        Ok(self.doc.nodes.borrow()[self.node].tag.clone())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.doc.check_live(self.node)?;
        Ok(self.doc.attribute_of(self.node, name))
    }

    fn text(&self) -> Result<String> {
        self.doc.check_live(self.node)?;
        Ok(self.doc.nodes.borrow()[self.node].text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(found: &[FakeElement]) -> Vec<usize> {
        found.iter().map(FakeElement::node).collect()
    }

    #[test]
    fn test_native_lookups_in_document_order() {
        let doc = FakeDocument::new();
        let body = doc.add(0, "body", &[], "");
        let a = doc.add(body, "div", &[("class", "x y")], "");
        let b = doc.add(a, "div", &[("class", "y")], "");

        assert_eq!(nodes(&doc.find_elements(By::ClassName, "y").unwrap()), vec![a, b]);
        assert_eq!(nodes(&doc.element(a).find_elements(By::XPath, ".//div").unwrap()), vec![b]);
        assert_eq!(doc.call_count(), 2);
    }

    #[test]
    fn test_unstubbed_query_is_an_error() {
        let doc = FakeDocument::new();
        assert!(matches!(doc.find_elements(By::Css, "div.x"), Err(BrowserError::Driver(_))));

        doc.stub(By::Css, "div.x", &[]);
        assert!(matches!(doc.find_element(By::Css, "div.x"), Err(BrowserError::NoSuchElement(_))));
    }

    #[test]
    fn test_stale_handle() {
        let doc = FakeDocument::new();
        let node = doc.add(0, "p", &[], "hi");
        doc.make_stale(node);
        assert!(doc.element(node).text().unwrap_err().is_not_found());
    }
}
