use crate::browser::config::LocatorOptions;
use crate::error::{BrowserError, Result};
use crate::locator::driver::By;
use crate::locator::kind::ElementKind;
use crate::locator::selector::{Key, NormalizedSelector, SelectorValue};
use crate::locator::xpath;
use regex::Regex;
use std::sync::LazyLock;

/// Class tokens that can be written as `.token` in CSS
static CSS_CLASS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[_a-zA-Z]+[_a-zA-Z0-9-]*$").expect("class token grammar is valid")
});

/// A query the remote driver can run directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Either `By::Css` or `By::XPath`
    pub by: By,
    pub value: String,
}

impl Query {
    pub fn css(value: impl Into<String>) -> Self {
        Self { by: By::Css, value: value.into() }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self { by: By::XPath, value: value.into() }
    }
}

/// Outcome of query synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStrategy {
    /// Selects precisely the matching set
    Exact(Query),
    /// Pattern criteria prevent a single exact query
    Unbuildable,
}

/// Compiles normalized selectors into CSS or XPath
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'k> {
    kind: &'k ElementKind,
    prefer_css: bool,
}

impl<'k> QueryBuilder<'k> {
    pub fn new(kind: &'k ElementKind, options: LocatorOptions) -> Self {
        Self { kind, prefer_css: options.prefer_css }
    }

    pub fn kind(&self) -> &'k ElementKind {
        self.kind
    }

    /// Synthesize a strategy for a selector whose `index` was already removed
    pub fn build(&self, selector: &NormalizedSelector) -> Result<QueryStrategy> {
        if selector.contains(&Key::Index) {
            return Err(BrowserError::InternalBuildFailure(selector.to_string()));
        }

        if let Some(query) = given_xpath_or_css(selector)? {
            return Ok(QueryStrategy::Exact(query));
        }

        if selector.has_pattern() {
            return Ok(QueryStrategy::Unbuildable);
        }

        self.build_exact(selector).map(QueryStrategy::Exact)
    }

    /// Synthesize a query for a selector free of patterns and `index`
    pub fn build_exact(&self, selector: &NormalizedSelector) -> Result<Query> {
        if selector.contains(&Key::Index) || selector.has_pattern() {
            return Err(BrowserError::InternalBuildFailure(selector.to_string()));
        }

        if self.prefer_css {
            if let Some(css) = build_css(selector) {
                log::trace!("built css {:?} from {}", css, selector);
                return Ok(Query::css(css));
            }
        }

        let query = self.build_xpath(selector);
        log::trace!("built xpath {:?} from {}", query, selector);
        Ok(Query::xpath(query))
    }

    fn build_xpath(&self, selector: &NormalizedSelector) -> String {
        let tag = match selector.get(&Key::TagName) {
            Some(SelectorValue::Str(tag)) => tag.as_str(),
            _ => "*",
        };

        let predicates: Vec<String> = selector
            .iter()
            .filter(|(key, value)| !(**key == Key::TagName && matches!(value, SelectorValue::Str(_))))
            .map(|(key, value)| self.predicate(key, value))
            .collect();

        if predicates.is_empty() {
            format!(".//{}", tag)
        } else {
            format!(".//{}[{}]", tag, predicates.join(" and "))
        }
    }

    fn predicate(&self, key: &Key, value: &SelectorValue) -> String {
        match value {
            SelectorValue::List(items) if items.is_empty() => "false()".to_string(),
            SelectorValue::List(items) => {
                let alternatives: Vec<String> = items.iter().map(|item| self.equality(key, item)).collect();
                format!("({})", alternatives.join(" or "))
            }
            SelectorValue::Str(s) => self.equality(key, s),
            // patterns and indices never reach here; build_exact rejects them
            SelectorValue::Pattern(_) | SelectorValue::Index(_) => "false()".to_string(),
        }
    }

    fn equality(&self, key: &Key, value: &str) -> String {
        match key {
            Key::Class => format!("contains(concat(' ', @class, ' '), {})", xpath::escape(&format!(" {} ", value))),
            Key::Label if !self.kind.has_native_label() => {
                let text = xpath::escape(value);
                format!(
                    "(@id = //label[normalize-space() = {text}]/@for or parent::label[normalize-space() = {text}])"
                )
            }
            Key::Attribute(name) if name == "type" => {
                format!("{} = {}", xpath::lhs_for(key, self.kind), xpath::escape(&value.to_lowercase()))
            }
            _ => format!("{} = {}", xpath::lhs_for(key, self.kind), xpath::escape(value)),
        }
    }
}

/// Pick out an explicit `xpath`/`css` criterion, enforcing which keys may accompany it
pub fn given_xpath_or_css(selector: &NormalizedSelector) -> Result<Option<Query>> {
    let xpath = selector.get(&Key::XPath).and_then(SelectorValue::as_str);
    let css = selector.get(&Key::Css).and_then(SelectorValue::as_str);

    let query = match (xpath, css) {
        (None, None) => return Ok(None),
        (Some(_), Some(_)) => {
            return Err(BrowserError::ConflictingStrategy(format!(
                "xpath and css cannot be combined ({})",
                selector
            )));
        }
        (Some(x), None) => Query::xpath(x),
        (None, Some(c)) => Query::css(c),
    };

    let rest: Vec<&Key> = selector
        .keys()
        .filter(|k| !matches!(k, Key::XPath | Key::Css))
        .collect();

    if !rest.is_empty() && !can_combine_with_query(selector, &rest) {
        return Err(BrowserError::ConflictingStrategy(format!(
            "{} cannot be combined with other selectors ({})",
            query.by, selector
        )));
    }

    Ok(Some(query))
}

fn can_combine_with_query(selector: &NormalizedSelector, rest: &[&Key]) -> bool {
    match rest {
        [Key::TagName] => true,
        [a, b] => {
            let is_input = selector.get(&Key::TagName).and_then(SelectorValue::as_str) == Some("input");
            let pair = (*a == &Key::TagName && b.is_attribute("type"))
                || (a.is_attribute("type") && *b == &Key::TagName);
            is_input && pair
        }
        _ => false,
    }
}

/// CSS rendition of `selector`, or `None` when CSS can't express it exactly
fn build_css(selector: &NormalizedSelector) -> Option<String> {
    if selector.contains(&Key::Text) || selector.contains(&Key::Label) || selector.contains(&Key::Index) {
        return None;
    }

    let tag = match selector.get(&Key::TagName) {
        None => None,
        Some(SelectorValue::Str(tag)) => Some(tag.as_str()),
        Some(_) => return None,
    };

    if tag == Some("input") && selector.keys().any(|k| k.is_attribute("type")) {
        return None;
    }

    let mut css = tag.unwrap_or("*").to_string();

    if let Some(class) = selector.get(&Key::Class) {
        match class {
            SelectorValue::Str(token) if CSS_CLASS_TOKEN.is_match(token) => {
                css.push('.');
                css.push_str(token);
            }
            _ => return None,
        }
    }

    if let Some(href) = selector.get(&Key::Attribute("href".to_string())) {
        let href = href.as_str()?;
        css.push_str(&format!("[href~=\"{}\"]", escape_css(href)));
    }

    for (key, value) in selector.iter() {
        let Key::Attribute(name) = key else { continue };
        if name == "href" {
            continue;
        }
        let value = value.as_str()?;
        css.push_str(&format!("[{}=\"{}\"]", key.html_name(), escape_css(value)));
    }

    Some(css)
}

fn escape_css(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::kind::ElementRegistry;
    use crate::locator::selector::Pattern;

    fn options(prefer_css: bool) -> LocatorOptions {
        LocatorOptions { prefer_css }
    }

    fn build(tag: &str, selector: NormalizedSelector, prefer_css: bool) -> QueryStrategy {
        let registry = ElementRegistry::with_defaults();
        QueryBuilder::new(registry.kind_for(tag), options(prefer_css))
            .build(&selector)
            .unwrap()
    }

    #[test]
    fn test_multi_token_class_uses_xpath() {
        let selector = NormalizedSelector::new()
            .with(Key::TagName, "div")
            .with(Key::Class, "a b");

        assert_eq!(
            build("div", selector, true),
            QueryStrategy::Exact(Query::xpath(".//div[contains(concat(' ', @class, ' '), ' a b ')]"))
        );
    }

    #[test]
    fn test_single_token_class_uses_css_when_preferred() {
        let selector = NormalizedSelector::new()
            .with(Key::TagName, "div")
            .with(Key::Class, "foo")
            .with(Key::from_name("data_role"), "main");

        assert_eq!(
            build("div", selector.clone(), true),
            QueryStrategy::Exact(Query::css("div.foo[data-role=\"main\"]"))
        );
        assert_eq!(
            build("div", selector, false),
            QueryStrategy::Exact(Query::xpath(
                ".//div[contains(concat(' ', @class, ' '), ' foo ') and @data-role = 'main']"
            ))
        );
    }

    #[test]
    fn test_css_href_uses_word_match() {
        let selector = NormalizedSelector::new()
            .with(Key::TagName, "a")
            .with(Key::from_name("href"), "/home");

        assert_eq!(
            build("a", selector, true),
            QueryStrategy::Exact(Query::css("a[href~=\"/home\"]"))
        );
    }

    #[test]
    fn test_css_ineligible_cases_fall_back_to_xpath() {
        let with_text = NormalizedSelector::new().with(Key::TagName, "span").with(Key::Text, "Hi");
        let input_type = NormalizedSelector::new()
            .with(Key::TagName, "input")
            .with(Key::from_name("type"), "radio");
        let bad_class = NormalizedSelector::new().with(Key::Class, "1st");
        let list = NormalizedSelector::new().with(Key::from_name("name"), vec!["a", "b"]);

        for (tag, selector) in [("span", with_text), ("input", input_type), ("div", bad_class), ("div", list)] {
            match build(tag, selector, true) {
                QueryStrategy::Exact(query) => assert_eq!(query.by, By::XPath),
                other => panic!("expected exact xpath, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_xpath_predicates() {
        let selector = NormalizedSelector::new()
            .with(Key::TagName, "input")
            .with(Key::from_name("type"), "Radio")
            .with(Key::from_name("name"), vec!["a", "b"]);

        let QueryStrategy::Exact(query) = build("input", selector, false) else {
            panic!("expected exact query");
        };
        assert_eq!(
            query.value,
            ".//input[translate(@type, 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz') = 'radio' \
             and (@name = 'a' or @name = 'b')]"
        );
    }

    #[test]
    fn test_text_and_href_normalize_space() {
        let selector = NormalizedSelector::new()
            .with(Key::TagName, "a")
            .with(Key::Text, "Home")
            .with(Key::from_name("href"), "/");

        assert_eq!(
            build("a", selector, false),
            QueryStrategy::Exact(Query::xpath(".//a[normalize-space() = 'Home' and normalize-space(@href) = '/']"))
        );
    }

    #[test]
    fn test_label_predicate_depends_on_kind() {
        let selector = NormalizedSelector::new().with(Key::Label, "Email");

        assert_eq!(
            build("input", selector.clone(), false),
            QueryStrategy::Exact(Query::xpath(
                ".//*[(@id = //label[normalize-space() = 'Email']/@for or parent::label[normalize-space() = 'Email'])]"
            ))
        );
        assert_eq!(
            build("option", selector, false),
            QueryStrategy::Exact(Query::xpath(".//*[@label = 'Email']"))
        );
    }

    #[test]
    fn test_tag_list() {
        let selector = NormalizedSelector::new().with(Key::TagName, vec!["input", "textarea"]);
        assert_eq!(
            build("input", selector, true),
            QueryStrategy::Exact(Query::xpath(".//*[(local-name() = 'input' or local-name() = 'textarea')]"))
        );
    }

    #[test]
    fn test_empty_selector() {
        assert_eq!(
            build("div", NormalizedSelector::new(), false),
            QueryStrategy::Exact(Query::xpath(".//*"))
        );
        assert_eq!(
            build("div", NormalizedSelector::new(), true),
            QueryStrategy::Exact(Query::css("*"))
        );
    }

    #[test]
    fn test_pattern_is_unbuildable() {
        let selector = NormalizedSelector::new()
            .with(Key::TagName, "div")
            .with(Key::Text, Pattern::new("^Save$").unwrap());
        assert_eq!(build("div", selector, true), QueryStrategy::Unbuildable);
    }

    #[test]
    fn test_index_is_internal_failure() {
        let registry = ElementRegistry::with_defaults();
        let builder = QueryBuilder::new(registry.generic(), options(false));
        let selector = NormalizedSelector::new().with(Key::Index, 1i64);

        assert!(matches!(builder.build(&selector), Err(BrowserError::InternalBuildFailure(_))));
        let patterned = NormalizedSelector::new().with(Key::Text, Pattern::new("x").unwrap());
        assert!(matches!(builder.build_exact(&patterned), Err(BrowserError::InternalBuildFailure(_))));
    }

    #[test]
    fn test_given_xpath_combinations() {
        let ok = NormalizedSelector::new()
            .with(Key::XPath, "//input")
            .with(Key::TagName, "input")
            .with(Key::from_name("type"), "radio");
        assert_eq!(given_xpath_or_css(&ok).unwrap(), Some(Query::xpath("//input")));

        let tag_only = NormalizedSelector::new().with(Key::Css, "p > a").with(Key::TagName, "a");
        assert_eq!(given_xpath_or_css(&tag_only).unwrap(), Some(Query::css("p > a")));

        let with_class = NormalizedSelector::new().with(Key::XPath, "//div").with(Key::Class, "y");
        assert!(matches!(given_xpath_or_css(&with_class), Err(BrowserError::ConflictingStrategy(_))));

        let both = NormalizedSelector::new().with(Key::XPath, "//div").with(Key::Css, "div");
        assert!(matches!(given_xpath_or_css(&both), Err(BrowserError::ConflictingStrategy(_))));

        let type_not_input = NormalizedSelector::new()
            .with(Key::XPath, "//button")
            .with(Key::TagName, "button")
            .with(Key::from_name("type"), "submit");
        assert!(given_xpath_or_css(&type_not_input).is_err());
    }

    #[test]
    fn test_given_xpath_wins_over_patterns() {
        let selector = NormalizedSelector::new()
            .with(Key::XPath, "//div")
            .with(Key::TagName, Pattern::new("^d").unwrap());
        assert_eq!(build("div", selector, false), QueryStrategy::Exact(Query::xpath("//div")));
    }

    #[test]
    fn test_escaping() {
        let selector = NormalizedSelector::new().with(Key::from_name("title"), "it's \"ok\"");
        assert_eq!(
            build("div", selector.clone(), false),
            QueryStrategy::Exact(Query::xpath(".//*[@title = concat('it', \"'\", 's \"ok\"')]"))
        );
        assert_eq!(
            build("div", selector, true),
            QueryStrategy::Exact(Query::css("*[title=\"it's \\\"ok\\\"\"]"))
        );
    }
}
