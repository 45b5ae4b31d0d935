//! Selector compilation and element lookup
//!
//! A [`Selector`] is an ordered map of criteria (`tag_name`, `text`, `class`,
//! `label`, attributes, `index`, or a raw `xpath`/`css`). The [`Finder`]
//! validates it against an [`ElementKind`], compiles it into one exact CSS or
//! XPath query where it can, and otherwise issues a broad query whose
//! candidates are filtered client-side against the pattern criteria.
//!
//! - [`selector`]: selector model and patterns
//! - [`normalizer`]: alias rewriting and attribute validation
//! - [`builder`]: exact query synthesis
//! - [`literal`]: narrowing broad queries with literals taken from patterns
//! - [`label`]: resolving `label` patterns through `<label>` elements
//! - [`finder`]: lookup orchestration
//! - [`collection`]: lazily materialized result sets

pub mod builder;
pub mod collection;
pub mod driver;
pub mod element;
pub mod finder;
pub mod kind;
pub mod label;
pub mod literal;
pub mod normalizer;
pub mod selector;
pub mod validator;
pub mod xpath;

#[cfg(test)]
pub(crate) mod fake;

pub use builder::{Query, QueryBuilder, QueryStrategy};
pub use collection::ElementCollection;
pub use driver::{By, ElementHandle, SearchContext};
pub use element::LazyElement;
pub use finder::Finder;
pub use kind::{ElementKind, ElementRegistry};
pub use selector::{Key, NormalizedSelector, Pattern, Selector, SelectorValue, pattern};
