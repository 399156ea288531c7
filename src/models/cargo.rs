use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::Delivery;
use crate::models::handling::HandlingHistory;
use crate::models::itinerary::Itinerary;
use crate::models::location::Location;
use crate::models::route::RouteSpecification;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingId(String);

impl TrackingId {
    pub fn new(id: impl Into<String>) -> Result<Self, AppError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::InvalidTrackingId(
                "tracking id cannot be empty".to_string(),
            ));
        }

        Ok(Self(id))
    }

    /// Random eight character id, e.g. `3F2A9C1B`.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..8].to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TrackingId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrackingId> for String {
    fn from(value: TrackingId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cargo {
    tracking_id: TrackingId,
    route_specification: RouteSpecification,
    itinerary: Option<Itinerary>,
    delivery: Delivery,
}

impl Cargo {
    pub fn new(tracking_id: TrackingId, route_specification: RouteSpecification) -> Self {
        let delivery =
            Delivery::derived_from(&route_specification, None, &HandlingHistory::empty());

        Self {
            tracking_id,
            route_specification,
            itinerary: None,
            delivery,
        }
    }

    pub fn tracking_id(&self) -> &TrackingId {
        &self.tracking_id
    }

    pub fn origin(&self) -> &Location {
        self.route_specification.origin()
    }

    pub fn route_specification(&self) -> &RouteSpecification {
        &self.route_specification
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.itinerary.as_ref()
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// Accepts any itinerary; one that does not satisfy the route
    /// specification leaves the cargo misrouted.
    pub fn assign_to_route(&mut self, itinerary: Itinerary) {
        self.itinerary = Some(itinerary);
        self.rederive();
    }

    pub fn specify_new_route(&mut self, route_specification: RouteSpecification) {
        self.route_specification = route_specification;
        self.rederive();
    }

    pub fn derive_delivery_progress(&mut self, history: &HandlingHistory) {
        self.delivery =
            Delivery::derived_from(&self.route_specification, self.itinerary.as_ref(), history);
    }

    fn rederive(&mut self) {
        let last_event = self.delivery.last_event.take();
        self.delivery = Delivery::derive(
            &self.route_specification,
            self.itinerary.as_ref(),
            last_event.as_ref(),
            Utc::now(),
        );
    }
}
