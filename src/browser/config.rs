use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide default for [`LocatorOptions::prefer_css`]
static PREFER_CSS: AtomicBool = AtomicBool::new(false);

/// Set the process-wide CSS preference picked up by `LocatorOptions::default()`
pub fn set_prefer_css(prefer: bool) {
    PREFER_CSS.store(prefer, Ordering::Relaxed);
}

/// Current process-wide CSS preference
pub fn prefer_css() -> bool {
    PREFER_CSS.load(Ordering::Relaxed)
}

/// Options controlling how selectors are compiled into queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Attempt CSS synthesis before XPath; when false every exact query is XPath
    pub prefer_css: bool,
}

impl LocatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set CSS preference
    pub fn prefer_css(mut self, prefer: bool) -> Self {
        self.prefer_css = prefer;
        self
    }
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self { prefer_css: prefer_css() }
    }
}

/// Options for launching a new browser
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,

    pub window_width: u32,

    pub window_height: u32,

    /// Chrome/Chromium binary; auto-detected when unset
    pub chrome_path: Option<PathBuf>,

    pub user_data_dir: Option<PathBuf>,

    pub sandbox: bool,
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set Chrome binary path
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set user data directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: set sandbox mode
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 800,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

/// Options for connecting to a running browser
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// DevTools WebSocket URL
    pub ws_url: String,

    /// Connection timeout in milliseconds
    pub timeout: u64,
}

impl ConnectionOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self { ws_url: ws_url.into(), timeout: 30_000 }
    }

    /// Builder method: set timeout
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_options_builder() {
        let opts = LocatorOptions { prefer_css: false }.prefer_css(true);
        assert!(opts.prefer_css);
    }

    #[test]
    fn test_launch_options_defaults() {
        let opts = LaunchOptions::default();
        assert!(opts.headless);
        assert!(opts.sandbox);
        assert!(opts.chrome_path.is_none());
    }

    #[test]
    fn test_launch_options_builder() {
        let opts = LaunchOptions::new()
            .headless(false)
            .window_size(800, 600)
            .chrome_path("/usr/bin/chromium")
            .sandbox(false);

        assert!(!opts.headless);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 600);
        assert_eq!(opts.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(!opts.sandbox);
    }

    #[test]
    fn test_connection_options() {
        let opts = ConnectionOptions::new("ws://localhost:9222").timeout(5000);
        assert_eq!(opts.ws_url, "ws://localhost:9222");
        assert_eq!(opts.timeout, 5000);
    }
}
