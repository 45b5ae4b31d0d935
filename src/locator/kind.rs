use std::collections::{HashMap, HashSet};

/// Attributes every HTML element accepts
const GLOBAL_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "title",
    "lang",
    "dir",
    "style",
    "hidden",
    "tabindex",
    "accesskey",
    "draggable",
    "contenteditable",
    "spellcheck",
    "translate",
    "role",
    "name",
];

/// Free-form attribute families accepted on every element kind
const WILDCARD_PREFIXES: &[&str] = &["data_", "aria_"];

/// Tag name used for the catch-all kind
pub const GENERIC_KIND: &str = "element";

/// The set of selector attributes recognized for one element category
#[derive(Debug, Clone, PartialEq)]
pub struct ElementKind {
    tag: String,
    attributes: HashSet<String>,
    /// Accept any attribute name (used by the catch-all kind)
    open: bool,
}

impl ElementKind {
    /// Create a kind that accepts the global attributes plus `extra`
    pub fn new(tag: impl Into<String>, extra: &[&str]) -> Self {
        let attributes = GLOBAL_ATTRIBUTES
            .iter()
            .chain(extra.iter())
            .map(|a| a.to_string())
            .collect();

        Self { tag: tag.into(), attributes, open: false }
    }

    /// The catch-all kind, which accepts any attribute
    pub fn generic() -> Self {
        let mut kind = Self::new(GENERIC_KIND, &[]);
        kind.open = true;
        kind
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Builder method: accept another attribute
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into());
        self
    }

    /// Whether `name` (symbolic spelling, e.g. `data_id`) is allowed
    pub fn is_valid_attribute(&self, name: &str) -> bool {
        self.open || self.attributes.contains(name) || is_wildcard_attribute(name)
    }

    /// Whether `label` is a real attribute of this kind rather than a `<label>` element
    pub fn has_native_label(&self) -> bool {
        self.attributes.contains("label")
    }
}

/// `data_*` and `aria_*` attributes are always accepted
pub fn is_wildcard_attribute(name: &str) -> bool {
    WILDCARD_PREFIXES
        .iter()
        .any(|prefix| name.len() > prefix.len() && name.starts_with(prefix))
}

/// Registry of element kinds, keyed by tag name
#[derive(Debug, Clone)]
pub struct ElementRegistry {
    kinds: HashMap<String, ElementKind>,
    generic: ElementKind,
}

impl ElementRegistry {
    /// Create an empty registry holding only the catch-all kind
    pub fn new() -> Self {
        Self { kinds: HashMap::new(), generic: ElementKind::generic() }
    }

    /// Create a registry with the built-in HTML kinds
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(ElementKind::new("a", &["href", "target", "rel", "download", "hreflang", "type"]));
        registry.register(ElementKind::new(
            "button",
            &["type", "value", "disabled", "form", "autofocus"],
        ));
        registry.register(ElementKind::new(
            "input",
            &[
                "type",
                "value",
                "disabled",
                "checked",
                "placeholder",
                "readonly",
                "required",
                "maxlength",
                "min",
                "max",
                "step",
                "pattern",
                "size",
                "src",
                "alt",
                "multiple",
                "accept",
                "autocomplete",
                "form",
            ],
        ));
        registry.register(ElementKind::new("label", &["for", "form"]));
        registry.register(ElementKind::new("option", &["value", "label", "selected", "disabled"]));
        registry.register(ElementKind::new("optgroup", &["label", "disabled"]));
        registry.register(ElementKind::new("track", &["kind", "src", "srclang", "label", "default"]));
        registry.register(ElementKind::new("select", &["multiple", "size", "disabled", "required"]));
        registry.register(ElementKind::new(
            "textarea",
            &["rows", "cols", "placeholder", "disabled", "readonly", "required", "maxlength", "wrap"],
        ));
        registry.register(ElementKind::new("img", &["src", "alt", "width", "height"]));
        registry.register(ElementKind::new("form", &["action", "method", "enctype", "target"]));
        registry.register(ElementKind::new("div", &[]));
        registry.register(ElementKind::new("span", &[]));

        registry
    }

    /// Register a kind, replacing any existing kind with the same tag
    pub fn register(&mut self, kind: ElementKind) {
        self.kinds.insert(kind.tag.clone(), kind);
    }

    /// Look up a kind by tag name
    pub fn get(&self, tag: &str) -> Option<&ElementKind> {
        self.kinds.get(tag)
    }

    /// Kind for `tag`, or the catch-all kind when `tag` is unknown
    pub fn kind_for(&self, tag: &str) -> &ElementKind {
        self.kinds.get(tag).unwrap_or(&self.generic)
    }

    pub fn generic(&self) -> &ElementKind {
        &self.generic
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
