//! # element-locator
//!
//! Turns attribute-based element selectors into CSS/XPath queries for browser
//! automation over the Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Exact query synthesis**: selectors made of plain values compile to a single XPath (or CSS) query
//! - **Pattern criteria**: regex values fall back to a broad query plus exact client-side matching,
//!   with literal fragments of the regex pushed into the query to shrink the candidate set
//! - **Label resolution**: `label` criteria are resolved through `<label for=...>` or wrapping labels
//! - **Lazy collections**: result sets are fetched once and indexed with placeholder semantics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use element_locator::{BrowserSession, LaunchOptions, Pattern, Selector};
//!
//! # fn main() -> element_locator::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://example.com")?;
//! let tab = session.tab()?;
//!
//! // Exact: compiled to .//a[normalize-space(@href) = '/about']
//! let about = session.locate(&tab, &Selector::new().with("href", "/about"), "a")?;
//!
//! // Pattern: broad query, then matched against the regex
//! let buttons = session.locate_all(
//!     &tab,
//!     &Selector::new().with("tag_name", "button").with("text", Pattern::new("^Save")?),
//!     "button",
//! )?;
//! println!("{:?} / {} buttons", about, buttons.len());
//! # Ok(())
//! # }
//! ```
//!
//! Selectors also travel as JSON:
//!
//! ```rust
//! use element_locator::Selector;
//!
//! let selector = Selector::from_json(r#"{"tag_name": "div", "class": {"pattern": "^a"}, "index": 2}"#).unwrap();
//! assert_eq!(selector.len(), 3);
//! ```
//!
//! ## Module Overview
//!
//! - [`locator`]: selector model, query compilation and lookup (start here)
//! - [`browser`]: browser session, configuration and the headless Chrome adapter
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod error;
pub mod locator;

pub use browser::{BrowserSession, ChromeElement, ConnectionOptions, LaunchOptions, LocatorOptions, TabContext};
pub use error::{BrowserError, Result};
pub use locator::{By, ElementCollection, ElementHandle, ElementKind, ElementRegistry, Finder, LazyElement, Pattern,
                  SearchContext, Selector, SelectorValue};
