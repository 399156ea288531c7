use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::inspection::inspect_cargo;
use crate::error::AppError;
use crate::models::handling::{HandlingEvent, HandlingEventRegistrationAttempt};
use crate::state::AppState;

pub async fn run_handling_engine(
    state: Arc<AppState>,
    mut attempt_rx: mpsc::Receiver<HandlingEventRegistrationAttempt>,
) {
    info!("handling engine started");

    while let Some(attempt) = attempt_rx.recv().await {
        state.metrics.registration_attempts_in_queue.dec();

        let tracking_id = attempt.tracking_id.clone();
        match register_handling_event(&state, attempt).await {
            Ok(_) => {
                state
                    .metrics
                    .registration_attempts_total
                    .with_label_values(&["registered"])
                    .inc();
            }
            Err(err) => {
                state
                    .metrics
                    .registration_attempts_total
                    .with_label_values(&["rejected"])
                    .inc();
                warn!(
                    tracking_id = %tracking_id,
                    error = %err,
                    "rejected handling event registration attempt"
                );
            }
        }
    }

    warn!("handling engine stopped: registration queue closed");
}

pub async fn register_handling_event(
    state: &AppState,
    attempt: HandlingEventRegistrationAttempt,
) -> Result<HandlingEvent, AppError> {
    let event = create_handling_event(state, &attempt)?;

    state.handling_events.store(event.clone())?;
    state
        .metrics
        .handling_events_total
        .with_label_values(&[event.event_type.as_str()])
        .inc();

    info!(
        tracking_id = %event.tracking_id,
        event_type = event.event_type.as_str(),
        location = %event.location.un_locode,
        "registered handling event"
    );

    inspect_cargo(state, &event.tracking_id).await?;

    Ok(event)
}

pub fn create_handling_event(
    state: &AppState,
    attempt: &HandlingEventRegistrationAttempt,
) -> Result<HandlingEvent, AppError> {
    if state.cargos.find(&attempt.tracking_id)?.is_none() {
        return Err(AppError::UnknownCargo(attempt.tracking_id.clone()));
    }

    let voyage = match &attempt.voyage_number {
        Some(number) => Some(
            state
                .voyages
                .find(number)?
                .ok_or_else(|| AppError::UnknownVoyage(number.clone()))?,
        ),
        None => None,
    };

    let location = state
        .locations
        .find(&attempt.un_locode)?
        .ok_or_else(|| AppError::UnknownLocation(attempt.un_locode.clone()))?;

    HandlingEvent::new(
        attempt.tracking_id.clone(),
        attempt.event_type,
        location,
        voyage,
        attempt.completion_time,
        attempt.registration_time,
    )
}
