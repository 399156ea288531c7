use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::location::Location;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoyageNumber(String);

impl VoyageNumber {
    pub fn new(number: impl Into<String>) -> Result<Self, AppError> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(AppError::InvalidVoyageNumber(
                "voyage number cannot be empty".to_string(),
            ));
        }

        Ok(Self(number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoyageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VoyageNumber {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VoyageNumber> for String {
    fn from(value: VoyageNumber) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierMovement {
    pub departure_location: Location,
    pub arrival_location: Location,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    movements: Vec<CarrierMovement>,
}

impl Schedule {
    pub fn new(movements: Vec<CarrierMovement>) -> Result<Self, AppError> {
        if movements.is_empty() {
            return Err(AppError::InvalidSchedule(
                "a schedule needs at least one carrier movement".to_string(),
            ));
        }

        for movement in &movements {
            if movement.departure_time >= movement.arrival_time {
                return Err(AppError::InvalidSchedule(format!(
                    "movement from {} departs at {} but arrives at {}",
                    movement.departure_location,
                    movement.departure_time,
                    movement.arrival_time
                )));
            }
        }

        for pair in movements.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if current.arrival_location != next.departure_location {
                return Err(AppError::InvalidSchedule(format!(
                    "movement arrives at {} but the next one departs from {}",
                    current.arrival_location, next.departure_location
                )));
            }
            if current.arrival_time > next.departure_time {
                return Err(AppError::InvalidSchedule(format!(
                    "departure from {} precedes arrival there",
                    next.departure_location
                )));
            }
        }

        Ok(Self { movements })
    }

    pub fn movements(&self) -> &[CarrierMovement] {
        &self.movements
    }

    pub fn calls(&self) -> impl Iterator<Item = &Location> {
        self.movements
            .first()
            .map(|movement| &movement.departure_location)
            .into_iter()
            .chain(self.movements.iter().map(|movement| &movement.arrival_location))
    }
}

/// A scheduled carrier voyage. Identity is the voyage number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voyage {
    pub number: VoyageNumber,
    pub schedule: Schedule,
}

impl Voyage {
    pub fn new(number: VoyageNumber, schedule: Schedule) -> Self {
        Self { number, schedule }
    }

    pub fn calls_at(&self, location: &Location) -> bool {
        self.schedule.calls().any(|call| call == location)
    }

    /// True when the voyage calls at `from` and later calls at `to`.
    pub fn serves(&self, from: &Location, to: &Location) -> bool {
        let calls: Vec<&Location> = self.schedule.calls().collect();
        let first_from = calls.iter().position(|call| *call == from);
        let last_to = calls.iter().rposition(|call| *call == to);

        matches!((first_from, last_to), (Some(from_idx), Some(to_idx)) if from_idx < to_idx)
    }
}

impl PartialEq for Voyage {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for Voyage {}

impl Hash for Voyage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number.hash(state);
    }
}

pub struct VoyageBuilder {
    number: VoyageNumber,
    next_departure: Location,
    movements: Vec<CarrierMovement>,
}

impl VoyageBuilder {
    pub fn new(number: VoyageNumber, departure_location: Location) -> Self {
        Self {
            number,
            next_departure: departure_location,
            movements: Vec::new(),
        }
    }

    pub fn add_movement(
        mut self,
        arrival_location: Location,
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
    ) -> Self {
        let departure_location =
            std::mem::replace(&mut self.next_departure, arrival_location.clone());
        self.movements.push(CarrierMovement {
            departure_location,
            arrival_location,
            departure_time,
            arrival_time,
        });
        self
    }

    pub fn build(self) -> Result<Voyage, AppError> {
        Ok(Voyage::new(self.number, Schedule::new(self.movements)?))
    }
}
