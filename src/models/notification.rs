use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::cargo::TrackingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Misdirected,
    Arrived,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Misdirected => "misdirected",
            NotificationKind::Arrived => "arrived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub tracking_id: TrackingId,
    pub timestamp: DateTime<Utc>,
}
