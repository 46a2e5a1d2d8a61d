//! The browser driver boundary
//!
//! `Driver` is the whole surface the computer-use tool needs; keeping
//! it narrow lets tests run against an in-memory fake. The real
//! implementation talks WebDriver to a chromedriver endpoint.

use async_trait::async_trait;
use fantoccini::actions::{
    InputSource, MouseActions, PointerAction, MOUSE_BUTTON_LEFT, MOUSE_BUTTON_MIDDLE,
    MOUSE_BUTTON_RIGHT,
};
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Mouse buttons the executor can press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    fn code(self) -> u64 {
        match self {
            Self::Left => MOUSE_BUTTON_LEFT,
            Self::Middle => MOUSE_BUTTON_MIDDLE,
            Self::Right => MOUSE_BUTTON_RIGHT,
        }
    }
}

/// Narrow browser interface driven by the computer-use tool
#[async_trait]
pub trait Driver: Send + Sync {
    /// Load a URL and install the pointer-position listener
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Move the pointer by a relative offset
    async fn move_pointer_by(&self, dx: i64, dy: i64) -> Result<()>;

    /// Click at the current pointer position
    async fn click(&self, button: MouseButton) -> Result<()>;

    /// Double-click at the current pointer position
    async fn double_click(&self) -> Result<()>;

    /// Resolve the topmost element at a viewport point, move to its
    /// center, and left-click it
    async fn click_element_at(&self, x: u32, y: u32) -> Result<()>;

    /// Send a key sequence to the focused element
    async fn send_keys_to_active(&self, text: &str) -> Result<()>;

    /// Clear the focused element's content
    async fn clear_active(&self) -> Result<()>;

    /// Whether the focused element accepts text input
    async fn active_element_accepts_text(&self) -> Result<bool>;

    /// Pointer position as seen by the in-page listener
    async fn tracked_pointer_position(&self) -> Result<(i64, i64)>;

    /// Capture the viewport as a PNG
    async fn screenshot_png(&self) -> Result<Vec<u8>>;

    /// Viewport size in CSS pixels
    async fn viewport_size(&self) -> Result<(u32, u32)>;

    /// End the session
    async fn close(&self) -> Result<()>;
}

/// How to reach and configure the browser
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// chromedriver endpoint
    pub webdriver_url: String,
    pub headless: bool,
    /// Requested window size (width, height)
    pub window_size: (u32, u32),
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            window_size: (1280, 800),
        }
    }
}

/// Records the pointer position from inside the page. Installed once
/// per navigation; `cursor_position` reads it back.
const POINTER_LISTENER: &str = r#"
if (!window.__probe_pointer) {
    window.__probe_pointer = { x: 0, y: 0 };
    document.addEventListener('mousemove', function (e) {
        window.__probe_pointer = { x: e.clientX, y: e.clientY };
    }, true);
}
"#;

/// A live WebDriver session over fantoccini
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connect to chromedriver with the original headless Chrome flags
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        let (width, height) = config.window_size;
        let mut args = vec![
            "--force-device-scale-factor=1".to_string(),
            "--high-dpi-support=1".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            format!("--window-size={width},{height}"),
        ];
        if config.headless {
            args.insert(0, "--headless=new".to_string());
        }

        let mut chrome_options = Map::new();
        chrome_options.insert("args".to_string(), json!(args));
        let mut capabilities = Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            Value::Object(chrome_options),
        );

        let mut builder = ClientBuilder::rustls().map_err(|e| Error::Tls(Box::new(e)))?;
        builder.capabilities(capabilities);
        let client = builder.connect(&config.webdriver_url).await?;
        tracing::info!(url = %config.webdriver_url, headless = config.headless, "session started");
        Ok(Self { client })
    }

    async fn perform(&self, actions: MouseActions) -> Result<()> {
        self.client.perform_actions(actions).await?;
        Ok(())
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.client.goto(url).await?;
        self.client.execute(POINTER_LISTENER, vec![]).await?;
        tracing::debug!(%url, "navigated");
        Ok(())
    }

    async fn move_pointer_by(&self, dx: i64, dy: i64) -> Result<()> {
        let actions = MouseActions::new("mouse".to_string()).then(PointerAction::MoveBy {
            duration: None,
            x: dx as f64,
            y: dy as f64,
        });
        self.perform(actions).await
    }

    async fn click(&self, button: MouseButton) -> Result<()> {
        let code = button.code();
        let actions = MouseActions::new("mouse".to_string())
            .then(PointerAction::Down { button: code })
            .then(PointerAction::Up { button: code });
        self.perform(actions).await
    }

    async fn double_click(&self) -> Result<()> {
        let code = MouseButton::Left.code();
        let actions = MouseActions::new("mouse".to_string())
            .then(PointerAction::Down { button: code })
            .then(PointerAction::Up { button: code })
            .then(PointerAction::Down { button: code })
            .then(PointerAction::Up { button: code });
        self.perform(actions).await
    }

    async fn click_element_at(&self, x: u32, y: u32) -> Result<()> {
        // elementFromPoint gives the topmost element, which
        // disambiguates overlapping targets.
        let center = self
            .client
            .execute(
                r#"
                const el = document.elementFromPoint(arguments[0], arguments[1]);
                if (!el) return null;
                const r = el.getBoundingClientRect();
                return { x: r.left + r.width / 2, y: r.top + r.height / 2 };
                "#,
                vec![json!(x), json!(y)],
            )
            .await?;
        if center.is_null() {
            return Err(Error::Script(format!("no element at ({x}, {y})")));
        }
        let read = |key: &str| -> Result<f64> {
            center
                .get(key)
                .and_then(Value::as_f64)
                .ok_or_else(|| Error::Script(format!("element center missing '{key}'")))
        };
        let (cx, cy) = (read("x")?, read("y")?);

        let code = MouseButton::Left.code();
        let actions = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveTo {
                duration: None,
                x: cx,
                y: cy,
            })
            .then(PointerAction::Down { button: code })
            .then(PointerAction::Up { button: code });
        self.perform(actions).await
    }

    async fn send_keys_to_active(&self, text: &str) -> Result<()> {
        let element = self.client.active_element().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn clear_active(&self) -> Result<()> {
        let element = self.client.active_element().await?;
        element.clear().await?;
        Ok(())
    }

    async fn active_element_accepts_text(&self) -> Result<bool> {
        let value = self
            .client
            .execute(
                r#"
                const el = document.activeElement;
                if (!el) return false;
                const tag = el.tagName.toLowerCase();
                if (tag === 'textarea' || el.isContentEditable) return true;
                if (tag !== 'input') return false;
                const type = (el.type || 'text').toLowerCase();
                return !['button', 'checkbox', 'color', 'file', 'image',
                         'radio', 'range', 'reset', 'submit'].includes(type);
                "#,
                vec![],
            )
            .await?;
        value
            .as_bool()
            .ok_or_else(|| Error::Script(format!("expected a boolean, got {value}")))
    }

    async fn tracked_pointer_position(&self) -> Result<(i64, i64)> {
        let value = self
            .client
            .execute(
                "return window.__probe_pointer || { x: 0, y: 0 };",
                vec![],
            )
            .await?;
        let read = |key: &str| -> Result<i64> {
            value
                .get(key)
                .and_then(Value::as_f64)
                .map(|v| v.round() as i64)
                .ok_or_else(|| Error::Script(format!("pointer position missing '{key}'")))
        };
        Ok((read("x")?, read("y")?))
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }

    async fn viewport_size(&self) -> Result<(u32, u32)> {
        let value = self
            .client
            .execute(
                "return { width: window.innerWidth, height: window.innerHeight };",
                vec![],
            )
            .await?;
        let read = |key: &str| -> Result<u32> {
            value
                .get(key)
                .and_then(Value::as_u64)
                .map(|v| v as u32)
                .ok_or_else(|| Error::Script(format!("viewport size missing '{key}'")))
        };
        Ok((read("width")?, read("height")?))
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().close().await?;
        Ok(())
    }
}
