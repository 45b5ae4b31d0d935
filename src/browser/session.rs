use crate::{browser::chrome::{ChromeElement, TabContext},
            browser::config::{ConnectionOptions, LaunchOptions, LocatorOptions},
            error::{BrowserError, Result},
            locator::{ElementRegistry, Finder, Selector}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Element kinds consulted when validating selector attributes
    registry: ElementRegistry,

    /// Query options handed to every finder built by this session
    locator_options: LocatorOptions,
}

impl BrowserSession {
    fn with_browser(browser: Browser) -> Self {
        Self { browser, registry: ElementRegistry::with_defaults(), locator_options: LocatorOptions::default() }
    }

    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // The default 30 second idle timeout closes sessions between slow lookups
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = options.chrome_path;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::debug!("launched browser (headless: {})", options.headless);
        Ok(Self::with_browser(browser))
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Self::with_browser(browser))
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Create a new tab
    pub fn new_tab(&mut self) -> Result<Arc<Tab>> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;
        Ok(tab)
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab, preferring a visible and focused one
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for check in ["document.visibilityState === 'visible' && document.hasFocus()", "document.visibilityState === 'visible'"] {
            for tab in &tabs {
                match tab.evaluate(check, false) {
                    Ok(remote_object) => {
                        if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                            return Ok(tab.clone());
                        }
                    }
                    Err(e) => log::debug!("Failed to check tab status: {}", e),
                }
            }
        }

        // A fresh headless browser may report no visible tab at all
        tabs.into_iter()
            .next()
            .ok_or_else(|| BrowserError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Register custom element kinds here
    pub fn registry_mut(&mut self) -> &mut ElementRegistry {
        &mut self.registry
    }

    pub fn locator_options(&self) -> LocatorOptions {
        self.locator_options
    }

    pub fn set_locator_options(&mut self, options: LocatorOptions) {
        self.locator_options = options;
    }

    /// First element in `tab` matching `selector`, validated against the `kind` element kind
    pub fn locate<'t>(&self, tab: &'t Tab, selector: &Selector, kind: &str) -> Result<Option<ChromeElement<'t>>> {
        let context = TabContext::new(tab);
        Finder::new(&context, self.registry.kind_for(kind), self.locator_options).find(selector)
    }

    /// Every element in `tab` matching `selector`, in document order
    pub fn locate_all<'t>(&self, tab: &'t Tab, selector: &Selector, kind: &str) -> Result<Vec<ChromeElement<'t>>> {
        let context = TabContext::new(tab);
        Finder::new(&context, self.registry.kind_for(kind), self.locator_options).find_all(selector)
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        // headless_chrome closes the browser when `Browser` is dropped; closing
        // every tab is the closest explicit shutdown
        let tabs = self.get_tabs()?;
        for tab in tabs {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab: {}", e);
            }
        }
        Ok(())
    }
}
