//! Timing helpers for the command line tool.

use std::time::{Duration, Instant};

/// Logs how long a scope took when dropped.
///
/// ```
/// use s2_edge_query::util::Timed;
///
/// let t = Timed::debug("query");
/// // ... run the query ...
/// assert!(t.elapsed().as_secs() < 60);
/// ```
pub struct Timed {
    label: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    pub fn info(label: &'static str) -> Self {
        Self::at_level(label, log::Level::Info)
    }

    pub fn debug(label: &'static str) -> Self {
        Self::at_level(label, log::Level::Debug)
    }

    fn at_level(label: &'static str, level: log::Level) -> Self {
        log::trace!("{label} started");
        Self {
            label,
            start: Instant::now(),
            level,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{} took {:.3?}", self.label, self.start.elapsed());
    }
}
