//! Browser boundary for probe.
//!
//! `Driver` is the narrow interface the computer-use tool drives;
//! `WebDriverSession` implements it over a chromedriver endpoint with
//! fantoccini. `ComputerTool` translates the model's structured
//! actions into driver commands and tracks the cursor position in
//! between.

pub mod action;
pub mod computer;
pub mod cursor;
pub mod driver;
pub mod error;

pub use action::Action;
pub use computer::{ComputerConfig, ComputerTool};
pub use cursor::CursorTracker;
pub use driver::{Driver, MouseButton, SessionConfig, WebDriverSession};
pub use error::{Error, Result};
