use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::itinerary::Itinerary;
use crate::models::location::Location;

/// What the shipper asked for: get the cargo from `origin` to `destination`
/// no later than `arrival_deadline`.
///
/// Immutable. Changing the destination or the deadline produces a new
/// specification that replaces the old one on the cargo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpecification {
    origin: Location,
    destination: Location,
    arrival_deadline: NaiveDate,
}

impl RouteSpecification {
    pub fn new(
        origin: Location,
        destination: Location,
        arrival_deadline: NaiveDate,
    ) -> Result<Self, AppError> {
        if origin == destination {
            return Err(AppError::InvalidRouteSpecification(format!(
                "origin and destination are both {}",
                origin.un_locode
            )));
        }

        Ok(Self {
            origin,
            destination,
            arrival_deadline,
        })
    }

    pub fn origin(&self) -> &Location {
        &self.origin
    }

    pub fn destination(&self) -> &Location {
        &self.destination
    }

    pub fn arrival_deadline(&self) -> NaiveDate {
        self.arrival_deadline
    }

    pub fn with_destination(&self, destination: Location) -> Result<Self, AppError> {
        Self::new(self.origin.clone(), destination, self.arrival_deadline)
    }

    pub fn with_arrival_deadline(&self, arrival_deadline: NaiveDate) -> Result<Self, AppError> {
        Self::new(self.origin.clone(), self.destination.clone(), arrival_deadline)
    }

    pub fn is_satisfied_by(&self, itinerary: &Itinerary) -> bool {
        *itinerary.initial_departure_location() == self.origin
            && *itinerary.final_arrival_location() == self.destination
            && itinerary.final_arrival_date().date_naive() <= self.arrival_deadline
    }
}
