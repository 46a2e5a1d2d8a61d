//! Cursor position tracking
//!
//! The WebDriver protocol moves the pointer by relative offsets, so
//! the tool keeps the last known absolute position itself. The tracker
//! is pure state: it is updated only after a move actually succeeds.

use parking_lot::Mutex;

/// Last known on-screen cursor position, starting at the origin
#[derive(Debug, Default)]
pub struct CursorTracker {
    pos: Mutex<(u32, u32)>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tracked position
    pub fn position(&self) -> (u32, u32) {
        *self.pos.lock()
    }

    /// Record a new position
    pub fn set(&self, x: u32, y: u32) {
        *self.pos.lock() = (x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_origin() {
        let tracker = CursorTracker::new();
        assert_eq!(tracker.position(), (0, 0));
    }

    #[test]
    fn test_set_overwrites_prior_position() {
        let tracker = CursorTracker::new();
        tracker.set(640, 400);
        tracker.set(12, 7);
        assert_eq!(tracker.position(), (12, 7));
    }
}
