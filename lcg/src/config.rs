//! Page configuration.

use std::time::Duration;

use url::Url;

/// Scroll position and size of the browser window, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_x: 0,
            scroll_y: 0,
            width: 1024,
            height: 768,
        }
    }
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            scroll_x: 0,
            scroll_y: 0,
            width,
            height,
        }
    }

    pub const fn scrolled(mut self, x: i32, y: i32) -> Self {
        self.scroll_x = x;
        self.scroll_y = y;
        self
    }

    /// Page coordinate of the bottom edge of the visible area.
    pub const fn bottom(&self) -> i32 {
        self.scroll_y + self.height
    }

    /// Page coordinate of the right edge of the visible area.
    pub const fn right(&self) -> i32 {
        self.scroll_x + self.width
    }
}

/// Per-page configuration.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Address of the document. Relative link targets resolve against it and
    /// its fragment selects the initial notebook tab.
    pub location: Option<Url>,

    pub viewport: Viewport,

    /// Cookie path, `/` when unset.
    pub cookie_path: Option<String>,
    pub cookie_domain: Option<String>,
    /// `document.cookie` at load time.
    pub initial_cookies: Option<String>,

    /// Id of the element receiving focus when a tree is quit with Escape.
    pub main_heading_id: String,

    /// Duration of popup slide animations.
    pub transition_duration: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            location: None,
            viewport: Viewport::default(),
            cookie_path: None,
            cookie_domain: None,
            initial_cookies: None,
            main_heading_id: "main-heading".to_string(),
            transition_duration: Duration::from_millis(200),
        }
    }
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document location.
    pub fn location(mut self, location: Url) -> Self {
        self.location = Some(location);
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Restrict written cookies to `path`.
    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = Some(path.into());
        self
    }

    pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// Seed the cookie jar, e.g. `"lcg_last_notebook_tab=tabs%3Apage-2"`.
    pub fn cookies(mut self, cookies: impl Into<String>) -> Self {
        self.initial_cookies = Some(cookies.into());
        self
    }

    pub fn main_heading_id(mut self, id: impl Into<String>) -> Self {
        self.main_heading_id = id.into();
        self
    }

    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }
}
