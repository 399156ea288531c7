use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::models::notification::Notification;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Fans notifications out to every current subscriber. Notifications raised
/// while nobody listens are dropped.
#[derive(Clone)]
pub struct BroadcastNotificationSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotificationSink {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer_size);
        Self { tx }
    }

    pub fn subscribe(&self) -> BroadcastStream<Notification> {
        BroadcastStream::new(self.tx.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl NotificationSink for BroadcastNotificationSink {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}
