//! Transient notices shown when a guarded chat operation is rejected.

use std::time::Duration;
use tokio::time::Instant;

/// Text shown when the user acts while a reply is still pending.
pub const PLEASE_WAIT_TEXT: &str = "Please wait for response";

/// Default lifetime of an advisory.
pub const ADVISORY_DURATION: Duration = Duration::from_secs(2);

/// A dismissible notice with an expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub message: String,
    pub expires_at: Instant,
}

impl Advisory {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Holds at most one advisory and drops it once it expires.
///
/// Posting while a notice is visible replaces it and restarts the expiry.
#[derive(Debug, Clone)]
pub struct AdvisoryBoard {
    lifetime: Duration,
    current: Option<Advisory>,
}

impl Default for AdvisoryBoard {
    fn default() -> Self {
        Self::new(ADVISORY_DURATION)
    }
}

impl AdvisoryBoard {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            current: None,
        }
    }

    /// Shows `message` until `now + lifetime`.
    pub fn post(&mut self, message: impl Into<String>, now: Instant) -> &Advisory {
        self.current.insert(Advisory {
            message: message.into(),
            expires_at: now + self.lifetime,
        })
    }

    /// Shows the "please wait" notice.
    pub fn post_please_wait(&mut self, now: Instant) -> &Advisory {
        self.post(PLEASE_WAIT_TEXT, now)
    }

    /// The visible advisory, if any. Expired notices are dismissed here.
    pub fn current(&mut self, now: Instant) -> Option<&Advisory> {
        if self.current.as_ref().is_some_and(|a| a.is_expired(now)) {
            self.current = None;
        }
        self.current.as_ref()
    }

    /// When the visible advisory disappears.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.current.as_ref().map(|a| a.expires_at)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
