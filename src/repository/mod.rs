pub mod memory;

use crate::error::AppError;
use crate::models::cargo::{Cargo, TrackingId};
use crate::models::handling::{HandlingEvent, HandlingHistory};
use crate::models::location::{Location, UnLocode};
use crate::models::voyage::{Voyage, VoyageNumber};

pub use memory::{
    InMemoryCargoRepository, InMemoryHandlingEventRepository, InMemoryLocationRepository,
    InMemoryVoyageRepository,
};

pub trait CargoRepository: Send + Sync {
    fn find(&self, tracking_id: &TrackingId) -> Result<Option<Cargo>, AppError>;

    fn store(&self, cargo: Cargo) -> Result<(), AppError>;

    fn next_tracking_id(&self) -> Result<TrackingId, AppError>;

    fn find_all(&self) -> Result<Vec<Cargo>, AppError>;

    /// Grows every time a cargo is stored.
    fn version(&self) -> u64;
}

pub trait HandlingEventRepository: Send + Sync {
    fn store(&self, event: HandlingEvent) -> Result<(), AppError>;

    fn lookup_handling_history_of_cargo(
        &self,
        tracking_id: &TrackingId,
    ) -> Result<HandlingHistory, AppError>;
}

pub trait LocationRepository: Send + Sync {
    fn find(&self, un_locode: &UnLocode) -> Result<Option<Location>, AppError>;

    fn store(&self, location: Location) -> Result<(), AppError>;
}

pub trait VoyageRepository: Send + Sync {
    fn find(&self, voyage_number: &VoyageNumber) -> Result<Option<Voyage>, AppError>;

    fn store(&self, voyage: Voyage) -> Result<(), AppError>;
}
