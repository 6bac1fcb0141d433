//! Short-lived status messages
//!
//! A single slot: `none -> active -> none`. Showing a notification replaces
//! whatever is active; it reads as cleared once the timeout has elapsed or
//! after an explicit [`NotificationRelay::clear`], whichever comes first.
//!
//! Expiry is evaluated against `tokio::time::Instant`, so paused test clocks
//! drive it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// How long a notification stays visible
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(3000);

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    /// Nothing to show; serialized as an empty string
    #[default]
    #[serde(rename = "")]
    None,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::None => "",
        }
    }
}

/// A user-facing status message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    /// The cleared state: `{type: '', message: ''}`
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.kind == NotificationKind::None
    }
}

/// Holds at most one active notification
#[derive(Debug, Clone)]
pub struct NotificationRelay {
    active: Option<(Notification, Instant)>,
    timeout: Duration,
}

impl Default for NotificationRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationRelay {
    pub fn new() -> Self {
        Self::with_timeout(NOTIFICATION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            active: None,
            timeout,
        }
    }

    /// Show a notification, replacing any active one
    pub fn show(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            kind,
            message: message.into(),
        };
        if notification.is_none() {
            self.active = None;
        } else {
            self.active = Some((notification, Instant::now()));
        }
    }

    /// Dismiss the active notification
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The visible notification, or the cleared state
    pub fn current(&self) -> Notification {
        match self.active {
            Some((ref notification, shown_at)) if shown_at.elapsed() < self.timeout => {
                notification.clone()
            }
            _ => Notification::none(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.current().is_none()
    }

    /// Time left before the active notification clears itself
    pub fn remaining(&self) -> Option<Duration> {
        let (_, shown_at) = self.active.as_ref()?;
        self.timeout.checked_sub(shown_at.elapsed()).filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_auto_clear_after_timeout() {
        let mut relay = NotificationRelay::new();
        relay.show(NotificationKind::Success, "Saved");
        assert_eq!(relay.current(), Notification::success("Saved"));

        advance(Duration::from_millis(2999)).await;
        assert!(relay.is_active());

        advance(Duration::from_millis(1)).await;
        assert_eq!(relay.current(), Notification::none());
        assert_eq!(relay.current().kind.as_str(), "");
        assert_eq!(relay.current().message, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_clear_wins() {
        let mut relay = NotificationRelay::new();
        relay.show(NotificationKind::Success, "Saved");
        advance(Duration::from_millis(10)).await;

        relay.clear();
        assert!(relay.current().is_none());
        assert!(relay.remaining().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_wins_and_restarts_timer() {
        let mut relay = NotificationRelay::new();
        relay.show(NotificationKind::Success, "first");
        advance(Duration::from_millis(2000)).await;

        relay.show(NotificationKind::Error, "second");
        assert_eq!(relay.current(), Notification::error("second"));

        advance(Duration::from_millis(2000)).await;
        assert_eq!(relay.current(), Notification::error("second"));
        assert_eq!(relay.remaining(), Some(Duration::from_millis(1000)));

        advance(Duration::from_millis(1000)).await;
        assert!(relay.current().is_none());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(Notification::none()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "", "message": ""}));

        let json = serde_json::to_value(Notification::error("Theme not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "error", "message": "Theme not found"})
        );
    }
}
