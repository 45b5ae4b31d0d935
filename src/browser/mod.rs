//! Browser session management and the headless Chrome driver adapter

pub mod chrome;
pub mod config;
pub mod session;

pub use chrome::{ChromeElement, NativeQuery, TabContext};
pub use config::{ConnectionOptions, LaunchOptions, LocatorOptions, prefer_css, set_prefer_css};
pub use session::BrowserSession;
