use crate::browser::config::LocatorOptions;
use crate::error::{BrowserError, Result};
use crate::locator::builder::{QueryBuilder, QueryStrategy};
use crate::locator::collection::ElementCollection;
use crate::locator::driver::{By, ElementHandle, SearchContext};
use crate::locator::element::LazyElement;
use crate::locator::kind::ElementKind;
use crate::locator::label::{self, LabelResolution};
use crate::locator::literal;
use crate::locator::normalizer::{canonical_name, normalize};
use crate::locator::selector::{Key, NormalizedSelector, Selector, SelectorValue};
use crate::locator::validator::{fetch_value, matches_patterns, validate_element, validate_tag};

/// Keys that are only meaningful as a lone, driver-native criterion
const LINK_KEYS: &[&str] = &["link", "link_text", "partial_link_text"];

/// Position of `index` in a sequence of `len`; negative indices count from the end
pub(crate) fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = len as i64;
    let position = if index < 0 { len + index } else { index };
    if position < 0 || position >= len {
        return None;
    }
    Some(position as usize)
}

/// Element at `index` of `elements`
pub(crate) fn pick<T>(mut elements: Vec<T>, index: i64) -> Option<T> {
    let position = resolve_index(elements.len(), index)?;
    Some(elements.swap_remove(position))
}

/// Resolves selectors to elements under one search context
pub struct Finder<'a, C: SearchContext> {
    context: &'a C,
    kind: &'a ElementKind,
    options: LocatorOptions,
}

impl<C: SearchContext> Clone for Finder<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: SearchContext> Copy for Finder<'_, C> {}

impl<'a, C> Finder<'a, C>
where
    C: SearchContext,
    C::Handle: ElementHandle,
{
    pub fn new(context: &'a C, kind: &'a ElementKind, options: LocatorOptions) -> Self {
        Self { context, kind, options }
    }

    pub fn kind(&self) -> &'a ElementKind {
        self.kind
    }

    pub fn options(&self) -> LocatorOptions {
        self.options
    }

    fn builder(&self) -> QueryBuilder<'a> {
        QueryBuilder::new(self.kind, self.options)
    }

    /// First element matching `selector`, or `None`
    ///
    /// Not-found and stale-reference errors from the driver are absorbed
    /// here; selector errors and other driver failures propagate.
    pub fn find(&self, selector: &Selector) -> Result<Option<C::Handle>> {
        let normalized = normalize(selector, self.kind)?;

        let found = self
            .locate_first(selector, normalized)
            .and_then(|element| match element {
                Some(element) => validate_element(element, selector),
                None => Ok(None),
            });

        match found {
            Err(e) if e.is_not_found() => {
                log::debug!("no element for {}: {}", selector, e);
                Ok(None)
            }
            other => other,
        }
    }

    /// Every element matching `selector`, in document order
    pub fn find_all(&self, selector: &Selector) -> Result<Vec<C::Handle>> {
        let normalized = normalize(selector, self.kind)?;
        if normalized.contains(&Key::Index) {
            return Err(BrowserError::IndexNotSupportedForAll);
        }

        if let Some((by, name, value)) = self.native_criterion(selector) {
            return self.find_all_by_one(by, name, value);
        }

        self.find_all_by_multiple(normalized)
    }

    /// Lazy collection over `find_all(selector)`
    pub fn collection(&self, selector: Selector) -> ElementCollection<'a, C> {
        ElementCollection::new(*self, selector)
    }

    /// Unresolved reference to the first element matching `selector`
    pub fn element(&self, selector: Selector) -> LazyElement<'a, C> {
        LazyElement::pending(*self, selector)
    }

    fn locate_first(&self, selector: &Selector, normalized: NormalizedSelector) -> Result<Option<C::Handle>> {
        if let Some(found) = self.by_id(selector) {
            return found;
        }

        if let Some((by, name, value)) = self.native_criterion(selector) {
            return self.find_first_by_one(by, name, value);
        }

        self.find_first_by_multiple(normalized)
    }

    /// `{id: "x"}` or `{id: "x", tag_name: ...}` as a single id lookup
    ///
    /// Returns `None` when the selector doesn't have that shape.
    fn by_id(&self, selector: &Selector) -> Option<Result<Option<C::Handle>>> {
        let id = selector.get("id")?.as_str()?;
        let has_tag = selector.contains_key("tag_name");
        let expected_len = if has_tag { 2 } else { 1 };
        if selector.len() != expected_len {
            return None;
        }

        log::debug!("locating {} by id fast path", selector);
        let found = self.context.find_element(By::Id, id).and_then(|element| {
            if has_tag && !validate_tag(&element, selector)? {
                return Ok(None);
            }
            Ok(Some(element))
        });
        Some(found)
    }

    /// The lone criterion of `selector`, when the driver supports it natively
    fn native_criterion<'s>(&self, selector: &'s Selector) -> Option<(By, &'s str, &'s SelectorValue)> {
        if selector.len() != 1 {
            return None;
        }
        let (name, value) = selector.iter().next()?;
        if !matches!(value, SelectorValue::Str(_) | SelectorValue::Pattern(_)) {
            return None;
        }
        By::for_key(name).map(|by| (by, name.as_str(), value))
    }

    /// Key whose fetched value a native criterion is compared against
    fn fetch_key(name: &str) -> Key {
        if LINK_KEYS.contains(&name) {
            Key::Text
        } else {
            Key::from_name(canonical_name(name))
        }
    }

    fn find_first_by_one(&self, by: By, name: &str, value: &SelectorValue) -> Result<Option<C::Handle>> {
        match value {
            SelectorValue::Str(s) => {
                log::debug!("locating by {} {:?}", by, s);
                self.context.find_element(by, s).map(Some)
            }
            SelectorValue::Pattern(pattern) => {
                let key = Self::fetch_key(name);
                for element in self.all_elements()? {
                    if fetch_value(&element, &key)?.is_some_and(|v| pattern.is_match(&v)) {
                        return Ok(Some(element));
                    }
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn find_all_by_one(&self, by: By, name: &str, value: &SelectorValue) -> Result<Vec<C::Handle>> {
        match value {
            SelectorValue::Str(s) => {
                log::debug!("locating all by {} {:?}", by, s);
                self.context.find_elements(by, s)
            }
            SelectorValue::Pattern(pattern) => {
                let key = Self::fetch_key(name);
                let mut matched = Vec::new();
                for element in self.all_elements()? {
                    if fetch_value(&element, &key)?.is_some_and(|v| pattern.is_match(&v)) {
                        matched.push(element);
                    }
                }
                Ok(matched)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn all_elements(&self) -> Result<Vec<C::Handle>> {
        self.context.find_elements(By::XPath, ".//*")
    }

    fn reject_link_keys(&self, selector: &NormalizedSelector) -> Result<()> {
        if let Some(key) = selector.keys().find(|k| LINK_KEYS.contains(&k.name())) {
            return Err(BrowserError::UnsupportedAttribute {
                attribute: key.name().to_string(),
                kind: self.kind.tag().to_string(),
            });
        }
        Ok(())
    }

    fn find_first_by_multiple(&self, mut selector: NormalizedSelector) -> Result<Option<C::Handle>> {
        self.reject_link_keys(&selector)?;
        let index = selector.take_index();

        match self.builder().build(&selector)? {
            QueryStrategy::Exact(query) => {
                log::debug!("locating {} via {} {:?}", selector, query.by, query.value);
                match index {
                    Some(i) => Ok(pick(self.context.find_elements(query.by, &query.value)?, i)),
                    None => self.context.find_element(query.by, &query.value).map(Some),
                }
            }
            QueryStrategy::Unbuildable => {
                let matched = self.find_by_patterns(selector, index.is_none())?;
                Ok(pick(matched, index.unwrap_or(0)))
            }
        }
    }

    fn find_all_by_multiple(&self, selector: NormalizedSelector) -> Result<Vec<C::Handle>> {
        self.reject_link_keys(&selector)?;

        match self.builder().build(&selector)? {
            QueryStrategy::Exact(query) => {
                log::debug!("locating all {} via {} {:?}", selector, query.by, query.value);
                self.context.find_elements(query.by, &query.value)
            }
            QueryStrategy::Unbuildable => self.find_by_patterns(selector, false),
        }
    }

    /// Broad query over the non-pattern residue, then exact client-side filtering
    fn find_by_patterns(&self, mut selector: NormalizedSelector, first_only: bool) -> Result<Vec<C::Handle>> {
        let mut patterns = selector.take_patterns();
        let mut label_root = None;

        if !self.kind.has_native_label() {
            if let Some(position) = patterns.iter().position(|(key, _)| *key == Key::Label) {
                let (_, pattern) = patterns.remove(position);
                match label::resolve(self.context, &pattern)? {
                    LabelResolution::Id(id) => {
                        selector.insert(Key::Attribute("id".to_string()), SelectorValue::Str(id));
                    }
                    LabelResolution::Root(label) => label_root = Some(label),
                    LabelResolution::NotFound => return Ok(Vec::new()),
                }
            }
        }

        let base = self.builder().build_exact(&selector)?;
        let query = literal::narrow(&base, &patterns, self.kind);
        log::debug!("broad query {} {:?} for {} pattern(s)", query.by, query.value, patterns.len());

        let root: &dyn SearchContext<Handle = C::Handle> = match &label_root {
            Some(label) => label,
            None => self.context,
        };

        let mut matched = Vec::new();
        for candidate in root.find_elements(query.by, &query.value)? {
            if matches_patterns(&candidate, &patterns)? {
                matched.push(candidate);
                if first_only {
                    break;
                }
            }
        }
        Ok(matched)
    }
}
