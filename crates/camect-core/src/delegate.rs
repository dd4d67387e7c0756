// ── Session notifications ──
//
// The host learns about a hub exclusively through a `SessionDelegate`.
// Callbacks run on the session's supervisor task, never on the caller's.

use serde::Serialize;
use strum::Display;
use tokio::sync::mpsc;

/// Coarse hub status reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HubStatus {
    Started,
    Connected,
    Disconnected,
    Stopped,
    Error,
}

/// Receiver for everything a session reports.
///
/// Implementations must not block: they run inline on the supervisor task
/// and a slow callback delays the next frame.
pub trait SessionDelegate: Send + Sync + 'static {
    fn on_status(&self, hub_id: &str, status: HubStatus);

    fn on_error(&self, hub_id: &str, detail: &str);

    /// One raw event payload, in the order the hub sent it.
    fn on_message(&self, hub_id: &str, payload: String);
}

/// A delegate callback captured as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HubNotification {
    Status { hub_id: String, status: HubStatus },
    Error { hub_id: String, detail: String },
    Message { hub_id: String, payload: String },
}

impl HubNotification {
    pub fn hub_id(&self) -> &str {
        match self {
            Self::Status { hub_id, .. } | Self::Error { hub_id, .. } | Self::Message { hub_id, .. } => {
                hub_id
            }
        }
    }
}

/// Delegate that forwards every callback into an unbounded channel,
/// preserving order.
///
/// Unbounded so the supervisor never waits on the consumer. Notifications
/// sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelDelegate {
    tx: mpsc::UnboundedSender<HubNotification>,
}

impl ChannelDelegate {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HubNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, notification: HubNotification) {
        // Receiver gone means the host stopped listening.
        let _ = self.tx.send(notification);
    }
}

impl SessionDelegate for ChannelDelegate {
    fn on_status(&self, hub_id: &str, status: HubStatus) {
        self.send(HubNotification::Status {
            hub_id: hub_id.to_owned(),
            status,
        });
    }

    fn on_error(&self, hub_id: &str, detail: &str) {
        self.send(HubNotification::Error {
            hub_id: hub_id.to_owned(),
            detail: detail.to_owned(),
        });
    }

    fn on_message(&self, hub_id: &str, payload: String) {
        self.send(HubNotification::Message {
            hub_id: hub_id.to_owned(),
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(HubStatus::Connected.to_string(), "connected");
        assert_eq!(HubStatus::Error.to_string(), "error");
    }

    #[test]
    fn channel_delegate_preserves_order() {
        let (delegate, mut rx) = ChannelDelegate::new();
        delegate.on_status("hub", HubStatus::Started);
        delegate.on_message("hub", "A".into());
        delegate.on_error("hub", "boom");

        assert_eq!(
            rx.try_recv().ok(),
            Some(HubNotification::Status {
                hub_id: "hub".into(),
                status: HubStatus::Started
            })
        );
        assert!(matches!(rx.try_recv(), Ok(HubNotification::Message { ref payload, .. }) if payload == "A"));
        assert!(matches!(rx.try_recv(), Ok(HubNotification::Error { ref detail, .. }) if detail == "boom"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_after_receiver_dropped_is_ignored() {
        let (delegate, rx) = ChannelDelegate::new();
        drop(rx);
        delegate.on_status("hub", HubStatus::Stopped);
    }
}
