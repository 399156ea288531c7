use std::time::Instant;

use tracing::{debug, info};

use crate::error::AppError;
use crate::models::cargo::TrackingId;
use crate::models::delivery::Delivery;
use crate::models::notification::{Notification, NotificationKind};
use crate::state::AppState;

pub async fn inspect_cargo(
    state: &AppState,
    tracking_id: &TrackingId,
) -> Result<Vec<Notification>, AppError> {
    let start = Instant::now();
    let result = inspect_locked(state, tracking_id).await;

    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .inspection_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());

    result
}

async fn inspect_locked(
    state: &AppState,
    tracking_id: &TrackingId,
) -> Result<Vec<Notification>, AppError> {
    let (_guard, mut cargo) = state.lock_cargo(tracking_id).await?;
    let history = state
        .handling_events
        .lookup_handling_history_of_cargo(tracking_id)?;

    let previous = cargo.delivery().clone();
    cargo.derive_delivery_progress(&history);
    let notifications = transition_notifications(tracking_id, &previous, cargo.delivery());

    debug!(
        tracking_id = %tracking_id,
        events = history.len(),
        transport_status = ?cargo.delivery().transport_status,
        routing_status = ?cargo.delivery().routing_status,
        misdirected = cargo.delivery().misdirected,
        "delivery re-derived"
    );

    state.cargos.store(cargo)?;
    raise_notifications(state, &notifications);

    Ok(notifications)
}

// Call only after the cargo carrying the new delivery is stored.
pub(crate) fn raise_notifications(state: &AppState, notifications: &[Notification]) {
    for notification in notifications {
        match notification.kind {
            NotificationKind::Misdirected => {
                info!(tracking_id = %notification.tracking_id, "cargo was misdirected")
            }
            NotificationKind::Arrived => {
                info!(tracking_id = %notification.tracking_id, "cargo has arrived")
            }
        }
        state
            .metrics
            .notifications_total
            .with_label_values(&[notification.kind.as_str()])
            .inc();
        state.notifications.notify(notification.clone());
    }
}

/// Notifications fire on the rising edge only, so re-deriving without new
/// information never repeats one.
pub fn transition_notifications(
    tracking_id: &TrackingId,
    previous: &Delivery,
    current: &Delivery,
) -> Vec<Notification> {
    let mut notifications = Vec::new();

    if current.misdirected && !previous.misdirected {
        notifications.push(Notification {
            kind: NotificationKind::Misdirected,
            tracking_id: tracking_id.clone(),
            timestamp: current.last_updated_on,
        });
    }

    if current.unloaded_at_destination && !previous.unloaded_at_destination {
        notifications.push(Notification {
            kind: NotificationKind::Arrived,
            tracking_id: tracking_id.clone(),
            timestamp: current.last_updated_on,
        });
    }

    notifications
}
