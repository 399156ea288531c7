use thiserror::Error;

use crate::models::cargo::TrackingId;
use crate::models::location::UnLocode;
use crate::models::voyage::VoyageNumber;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid UN/LOCODE: {0}")]
    InvalidUnLocode(String),

    #[error("invalid tracking id: {0}")]
    InvalidTrackingId(String),

    #[error("invalid voyage number: {0}")]
    InvalidVoyageNumber(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid route specification: {0}")]
    InvalidRouteSpecification(String),

    #[error("invalid leg: {0}")]
    InvalidLeg(String),

    #[error("malformed itinerary: {0}")]
    MalformedItinerary(String),

    #[error("invalid handling event: {0}")]
    InvalidHandlingEvent(String),

    #[error("unknown cargo: {0}")]
    UnknownCargo(TrackingId),

    #[error("unknown location: {0}")]
    UnknownLocation(UnLocode),

    #[error("unknown voyage: {0}")]
    UnknownVoyage(VoyageNumber),

    #[error("routing failed: {0}")]
    Routing(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidUnLocode(_)
                | AppError::InvalidTrackingId(_)
                | AppError::InvalidVoyageNumber(_)
                | AppError::InvalidSchedule(_)
                | AppError::InvalidRouteSpecification(_)
                | AppError::InvalidLeg(_)
                | AppError::MalformedItinerary(_)
                | AppError::InvalidHandlingEvent(_)
        )
    }
}
