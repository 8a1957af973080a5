//! Construction options
//!
//! Options are fixed when a tree is parsed and travel with every view
//! derived from it.

use crate::error::LookupError;

/// Bit of the diagnostic mask that enables lookup-miss notices
pub const NOTICE: i32 = 1;

/// Options for building a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Trim whitespace around text leaves and fetched text
    pub auto_trim: bool,
    /// Mask deciding whether lookup misses are reported.
    /// `None` leaves it to the installed tracing subscriber.
    pub diagnostic_level: Option<i32>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_trim(mut self, auto_trim: bool) -> Self {
        self.auto_trim = auto_trim;
        self
    }

    pub fn with_diagnostic_level(mut self, level: Option<i32>) -> Self {
        self.diagnostic_level = level;
        self
    }

    /// Whether lookup misses should emit a notice
    pub fn notices_enabled(&self) -> bool {
        match self.diagnostic_level {
            None => true,
            Some(mask) => mask & NOTICE != 0,
        }
    }

    /// Emit a notice for a lookup miss, if enabled
    pub fn report(&self, error: &LookupError) {
        if self.notices_enabled() {
            tracing::warn!(target: "xmlarray", %error, "xml lookup missed");
        }
    }
}
