//! View cache invalidation.
//!
//! Mutations mark view routes stale; whatever renders those routes
//! subscribes and refetches. Marking never waits for subscribers, and
//! having no audience is fine.

use tokio::sync::broadcast;

/// Route whose cached rendering shows the exercise history.
pub const ROOT_VIEW: &str = "/";

/// Broadcasts stale route paths to interested renderers.
#[derive(Debug, Clone)]
pub struct Revalidator {
    sender: broadcast::Sender<String>,
}

impl Revalidator {
    pub fn new() -> Self {
        // Buffer of 16 notifications; slow subscribers drop old ones
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// Subscribes to stale-route notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Marks a route stale.
    pub fn mark_stale(&self, path: &str) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(path.to_string());
    }
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_then_mark_stale() {
        let hub = Revalidator::new();
        let mut rx = hub.subscribe();

        hub.mark_stale(ROOT_VIEW);

        assert_eq!(rx.try_recv().unwrap(), "/");
    }

    #[tokio::test]
    async fn test_mark_stale_without_subscribers() {
        let hub = Revalidator::new();

        // Must not panic or block
        hub.mark_stale(ROOT_VIEW);
    }

    #[tokio::test]
    async fn test_every_subscriber_is_notified() {
        let hub = Revalidator::new();
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();

        hub.mark_stale(ROOT_VIEW);

        assert_eq!(rx1.try_recv().unwrap(), "/");
        assert_eq!(rx2.try_recv().unwrap(), "/");
    }

    #[tokio::test]
    async fn test_clones_share_the_channel() {
        let hub = Revalidator::new();
        let mut rx = hub.subscribe();

        hub.clone().mark_stale(ROOT_VIEW);

        assert_eq!(rx.try_recv().unwrap(), "/");
    }
}
