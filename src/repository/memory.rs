use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::AppError;
use crate::models::cargo::{Cargo, TrackingId};
use crate::models::handling::{HandlingEvent, HandlingHistory};
use crate::models::location::{Location, UnLocode};
use crate::models::voyage::{Voyage, VoyageNumber};
use crate::repository::{
    CargoRepository, HandlingEventRepository, LocationRepository, VoyageRepository,
};

#[derive(Default)]
pub struct InMemoryCargoRepository {
    cargos: DashMap<TrackingId, Cargo>,
    version: AtomicU64,
}

impl InMemoryCargoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CargoRepository for InMemoryCargoRepository {
    fn find(&self, tracking_id: &TrackingId) -> Result<Option<Cargo>, AppError> {
        Ok(self
            .cargos
            .get(tracking_id)
            .map(|entry| entry.value().clone()))
    }

    fn store(&self, cargo: Cargo) -> Result<(), AppError> {
        self.cargos.insert(cargo.tracking_id().clone(), cargo);
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn next_tracking_id(&self) -> Result<TrackingId, AppError> {
        loop {
            let candidate = TrackingId::generate();
            if !self.cargos.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
    }

    fn find_all(&self) -> Result<Vec<Cargo>, AppError> {
        Ok(self
            .cargos
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

#[derive(Default)]
pub struct InMemoryHandlingEventRepository {
    events: DashMap<TrackingId, Vec<HandlingEvent>>,
}

impl InMemoryHandlingEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandlingEventRepository for InMemoryHandlingEventRepository {
    fn store(&self, event: HandlingEvent) -> Result<(), AppError> {
        self.events
            .entry(event.tracking_id.clone())
            .or_default()
            .push(event);
        Ok(())
    }

    fn lookup_handling_history_of_cargo(
        &self,
        tracking_id: &TrackingId,
    ) -> Result<HandlingHistory, AppError> {
        let events = self
            .events
            .get(tracking_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        Ok(HandlingHistory::build(events))
    }
}

#[derive(Default)]
pub struct InMemoryLocationRepository {
    locations: DashMap<UnLocode, Location>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationRepository for InMemoryLocationRepository {
    fn find(&self, un_locode: &UnLocode) -> Result<Option<Location>, AppError> {
        Ok(self
            .locations
            .get(un_locode)
            .map(|entry| entry.value().clone()))
    }

    fn store(&self, location: Location) -> Result<(), AppError> {
        self.locations.insert(location.un_locode.clone(), location);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryVoyageRepository {
    voyages: DashMap<VoyageNumber, Voyage>,
}

impl InMemoryVoyageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VoyageRepository for InMemoryVoyageRepository {
    fn find(&self, voyage_number: &VoyageNumber) -> Result<Option<Voyage>, AppError> {
        Ok(self
            .voyages
            .get(voyage_number)
            .map(|entry| entry.value().clone()))
    }

    fn store(&self, voyage: Voyage) -> Result<(), AppError> {
        self.voyages.insert(voyage.number.clone(), voyage);
        Ok(())
    }
}
