use crate::error::AppError;
use crate::models::handling::HandlingEventRegistrationAttempt;
use crate::state::AppState;

pub async fn enqueue_attempt(
    state: &AppState,
    attempt: HandlingEventRegistrationAttempt,
) -> Result<(), AppError> {
    state.metrics.registration_attempts_in_queue.inc();

    if let Err(err) = state.attempt_tx.send(attempt).await {
        state.metrics.registration_attempts_in_queue.dec();
        return Err(AppError::Internal(format!(
            "registration queue send failed: {err}"
        )));
    }

    Ok(())
}
