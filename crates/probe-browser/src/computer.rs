//! The computer-use tool
//!
//! Executes parsed actions against a `Driver`, tracking the cursor
//! position between relative pointer moves. Optionally captures a
//! follow-up screenshot after every non-screenshot action so the model
//! gets visual feedback without asking for it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use probe_agent::{Tool, ToolError, ToolOutcome};
use probe_ai::ToolSpec;
use uuid::Uuid;

use crate::action::{webdriver_key, Action};
use crate::cursor::CursorTracker;
use crate::driver::{Driver, MouseButton};

/// Tool behavior knobs
#[derive(Debug, Clone)]
pub struct ComputerConfig {
    /// Where captured PNGs land; stale files are removed at startup
    pub screenshot_dir: PathBuf,
    /// Settle delay before an explicit screenshot capture
    pub screenshot_delay: Duration,
    /// Capture a follow-up screenshot after every non-screenshot action
    pub audit_screenshots: bool,
}

impl Default for ComputerConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from("screenshots"),
            screenshot_delay: Duration::from_secs(2),
            audit_screenshots: true,
        }
    }
}

/// Screen, keyboard, and mouse access for the model
pub struct ComputerTool {
    driver: Arc<dyn Driver>,
    tracker: CursorTracker,
    config: ComputerConfig,
    display: (u32, u32),
}

impl ComputerTool {
    /// Build the tool over a live driver.
    ///
    /// Reads the real viewport size for the capability declaration and
    /// clears stale screenshots from earlier runs.
    pub async fn new(driver: Arc<dyn Driver>, config: ComputerConfig) -> crate::Result<Self> {
        let display = driver.viewport_size().await?;
        clear_stale_screenshots(&config.screenshot_dir)?;
        Ok(Self {
            driver,
            tracker: CursorTracker::new(),
            config,
            display,
        })
    }

    /// Viewport size declared to the model
    pub fn display_size(&self) -> (u32, u32) {
        self.display
    }

    async fn execute(&self, action: &Action) -> Result<ToolOutcome, ToolError> {
        match action {
            Action::MouseMove { x, y } => {
                // WebDriver moves are relative, so convert from the
                // tracked absolute position. Moves clamped at the
                // viewport edge can drift the tracked position; there
                // is no feedback channel to correct it.
                let (cx, cy) = self.tracker.position();
                let dx = i64::from(*x) - i64::from(cx);
                let dy = i64::from(*y) - i64::from(cy);
                self.driver.move_pointer_by(dx, dy).await?;
                self.tracker.set(*x, *y);
                Ok(ToolOutcome::Empty)
            }
            Action::LeftClick => {
                let (x, y) = self.tracker.position();
                self.driver.click_element_at(x, y).await?;
                Ok(ToolOutcome::output("Left click performed"))
            }
            Action::RightClick => {
                self.driver.click(MouseButton::Right).await?;
                Ok(ToolOutcome::output("Right click performed"))
            }
            Action::MiddleClick => {
                self.driver.click(MouseButton::Middle).await?;
                Ok(ToolOutcome::output("Middle click performed"))
            }
            Action::DoubleClick => {
                self.driver.double_click().await?;
                Ok(ToolOutcome::output("Double click performed"))
            }
            Action::Key { text } => {
                self.driver
                    .send_keys_to_active(&webdriver_key(text))
                    .await?;
                Ok(ToolOutcome::output("Key pressed"))
            }
            Action::Type { text } => {
                if !self.driver.active_element_accepts_text().await? {
                    return Err(ToolError::UnsupportedTarget(
                        "focused element does not accept text input".to_string(),
                    ));
                }
                self.driver.clear_active().await?;
                self.driver.send_keys_to_active(text).await?;
                Ok(ToolOutcome::output("Text inputted"))
            }
            Action::Screenshot => {
                // Let async UI settle before capturing.
                tokio::time::sleep(self.config.screenshot_delay).await;
                let image = self.capture("screenshot").await?;
                Ok(ToolOutcome::image(image))
            }
            Action::CursorPosition => {
                let (x, y) = self.driver.tracked_pointer_position().await?;
                Ok(ToolOutcome::output(format!("X={x},Y={y}")))
            }
        }
    }

    /// Capture a PNG, persist it under a unique name, return base64
    async fn capture(&self, label: &str) -> crate::Result<String> {
        let png = self.driver.screenshot_png().await?;
        let path = self
            .config
            .screenshot_dir
            .join(format!("{}-{label}.png", Uuid::new_v4()));
        std::fs::write(&path, &png)?;
        tracing::debug!(path = %path.display(), "screenshot saved");
        Ok(BASE64.encode(&png))
    }
}

#[async_trait]
impl Tool for ComputerTool {
    fn name(&self) -> &str {
        "computer"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::computer(self.display.0, self.display.1)
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let action = Action::parse(&input)?;
        tracing::debug!(action = action.name(), "executing");
        let result = self.execute(&action).await;

        if matches!(action, Action::Screenshot) || !self.config.audit_screenshots {
            return result;
        }

        match result {
            Ok(outcome) => match self.capture(action.name()).await {
                Ok(image) => Ok(outcome.combine(ToolOutcome::image(image))),
                Err(e) => {
                    tracing::warn!(error = %e, "audit screenshot failed");
                    Ok(outcome)
                }
            },
            Err(e) => {
                // Keep a capture on disk for post-mortem; the failure
                // result itself stays image-free.
                if let Err(cap) = self.capture(action.name()).await {
                    tracing::warn!(error = %cap, "audit screenshot failed");
                }
                Err(e)
            }
        }
    }
}

fn clear_stale_screenshots(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
