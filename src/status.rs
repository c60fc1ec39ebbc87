//! Single-line transient status text.
//!
//! Every completed action writes one message; it disappears
//! [`STATUS_TIMEOUT`] after it was set.  A newer message restarts the timer.

use std::time::{Duration, Instant};

/// How long a status message stays visible.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
pub struct StatusLine {
    message: Option<(String, Instant)>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.set_at(message, Instant::now());
    }

    pub fn set_at(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        log::info!("status: {}", message.replace('\n', " | "));
        self.message = Some((message, now));
    }

    /// Message visible at `now`, dropping it once it has expired.
    pub fn current_at(&mut self, now: Instant) -> Option<&str> {
        if let Some((_, set_at)) = &self.message {
            if now.saturating_duration_since(*set_at) >= STATUS_TIMEOUT {
                self.message = None;
            }
        }
        self.message.as_ref().map(|(m, _)| m.as_str())
    }

    pub fn current(&mut self) -> Option<&str> {
        self.current_at(Instant::now())
    }

    /// Time left before the visible message clears.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.message
            .as_ref()
            .map(|(_, set_at)| STATUS_TIMEOUT.saturating_sub(now.saturating_duration_since(*set_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_clears_after_timeout() {
        let start = Instant::now();
        let mut status = StatusLine::new();
        status.set_at("Success", start);

        assert_eq!(status.current_at(start + Duration::from_secs(4)), Some("Success"));
        assert_eq!(status.current_at(start + STATUS_TIMEOUT), None);
        assert_eq!(status.current_at(start), None);
    }

    #[test]
    fn newer_message_restarts_the_timer() {
        let start = Instant::now();
        let mut status = StatusLine::new();
        status.set_at("first", start);
        status.set_at("second", start + Duration::from_secs(4));

        assert_eq!(status.current_at(start + Duration::from_secs(6)), Some("second"));
        assert_eq!(
            status.remaining_at(start + Duration::from_secs(6)),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn empty_by_default() {
        let mut status = StatusLine::new();
        assert!(status.current().is_none());
        assert!(status.remaining_at(Instant::now()).is_none());
    }
}
