use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};

use crate::config::Config;
use crate::error::AppError;
use crate::models::cargo::{Cargo, TrackingId};
use crate::models::handling::HandlingEventRegistrationAttempt;
use crate::notification::NotificationSink;
use crate::observability::metrics::Metrics;
use crate::repository::{
    CargoRepository, HandlingEventRepository, InMemoryCargoRepository,
    InMemoryHandlingEventRepository, InMemoryLocationRepository, InMemoryVoyageRepository,
    LocationRepository, VoyageRepository,
};
use crate::routing::RoutingService;

#[derive(Clone)]
pub struct Repositories {
    pub cargos: Arc<dyn CargoRepository>,
    pub handling_events: Arc<dyn HandlingEventRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub voyages: Arc<dyn VoyageRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            cargos: Arc::new(InMemoryCargoRepository::new()),
            handling_events: Arc::new(InMemoryHandlingEventRepository::new()),
            locations: Arc::new(InMemoryLocationRepository::new()),
            voyages: Arc::new(InMemoryVoyageRepository::new()),
        }
    }
}

pub struct AppState {
    pub cargos: Arc<dyn CargoRepository>,
    pub handling_events: Arc<dyn HandlingEventRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub voyages: Arc<dyn VoyageRepository>,
    pub routing: Arc<dyn RoutingService>,
    pub notifications: Arc<dyn NotificationSink>,
    pub attempt_tx: mpsc::Sender<HandlingEventRegistrationAttempt>,
    pub routing_timeout: Duration,
    pub metrics: Metrics,
    cargo_locks: DashMap<TrackingId, Arc<Mutex<()>>>,
}

impl AppState {
    pub fn new(
        config: &Config,
        repositories: Repositories,
        routing: Arc<dyn RoutingService>,
        notifications: Arc<dyn NotificationSink>,
    ) -> (Self, mpsc::Receiver<HandlingEventRegistrationAttempt>) {
        let (attempt_tx, attempt_rx) = mpsc::channel(config.registration_queue_size);

        (
            Self {
                cargos: repositories.cargos,
                handling_events: repositories.handling_events,
                locations: repositories.locations,
                voyages: repositories.voyages,
                routing,
                notifications,
                attempt_tx,
                routing_timeout: config.routing_timeout(),
                metrics: Metrics::new(),
                cargo_locks: DashMap::new(),
            },
            attempt_rx,
        )
    }

    /// Returns the cargo as stored once its lock is held. Only booked cargos
    /// get a lock entry.
    pub async fn lock_cargo(
        &self,
        tracking_id: &TrackingId,
    ) -> Result<(OwnedMutexGuard<()>, Cargo), AppError> {
        if self.cargos.find(tracking_id)?.is_none() {
            return Err(AppError::UnknownCargo(tracking_id.clone()));
        }

        let lock = self
            .cargo_locks
            .entry(tracking_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let guard = lock.lock_owned().await;

        let cargo = self
            .cargos
            .find(tracking_id)?
            .ok_or_else(|| AppError::UnknownCargo(tracking_id.clone()))?;

        Ok((guard, cargo))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::{AppState, Repositories};
    use crate::config::Config;
    use crate::error::AppError;
    use crate::models::cargo::{Cargo, TrackingId};
    use crate::models::fixtures::{hamburg, tokyo, tracking_id};
    use crate::models::location::UnLocode;
    use crate::models::route::RouteSpecification;
    use crate::notification::BroadcastNotificationSink;
    use crate::routing::{ExternalRoutingService, GraphTraversal, TransitPath};

    struct NoPaths;

    #[async_trait::async_trait]
    impl GraphTraversal for NoPaths {
        async fn find_shortest_path(
            &self,
            _origin: &UnLocode,
            _destination: &UnLocode,
        ) -> Result<Vec<TransitPath>, AppError> {
            Ok(Vec::new())
        }
    }

    fn state() -> AppState {
        let repositories = Repositories::in_memory();
        let routing = ExternalRoutingService::new(
            NoPaths,
            repositories.locations.clone(),
            repositories.voyages.clone(),
        );
        let (state, _rx) = AppState::new(
            &Config::default(),
            repositories,
            Arc::new(routing),
            Arc::new(BroadcastNotificationSink::new(8)),
        );
        state
    }

    #[tokio::test]
    async fn unknown_cargo_gets_no_lock_entry() {
        let state = state();

        for n in 0..50 {
            let id = TrackingId::new(format!("GHOST{n}")).unwrap();
            let result = state.lock_cargo(&id).await;
            assert!(matches!(result, Err(AppError::UnknownCargo(_))));
        }

        assert!(state.cargo_locks.is_empty());
    }

    #[tokio::test]
    async fn booked_cargo_is_returned_under_its_lock() {
        let state = state();
        let spec = RouteSpecification::new(
            hamburg(),
            tokyo(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
        .unwrap();
        state
            .cargos
            .store(Cargo::new(tracking_id(), spec))
            .unwrap();

        let (guard, cargo) = state.lock_cargo(&tracking_id()).await.unwrap();
        assert_eq!(cargo.tracking_id(), &tracking_id());
        drop(guard);

        state.lock_cargo(&tracking_id()).await.unwrap();
        assert_eq!(state.cargo_locks.len(), 1);
    }
}
