use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::handling::{HandlingActivity, HandlingEvent, HandlingEventType};
use crate::models::location::Location;
use crate::models::voyage::Voyage;

/// One voyage segment of an itinerary. Deserializing goes through
/// [`Leg::new`], so a stored leg is re-checked against its voyage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LegFields")]
pub struct Leg {
    voyage: Voyage,
    load_location: Location,
    unload_location: Location,
    load_time: DateTime<Utc>,
    unload_time: DateTime<Utc>,
}

#[derive(Deserialize)]
struct LegFields {
    voyage: Voyage,
    load_location: Location,
    unload_location: Location,
    load_time: DateTime<Utc>,
    unload_time: DateTime<Utc>,
}

impl TryFrom<LegFields> for Leg {
    type Error = AppError;

    fn try_from(fields: LegFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.voyage,
            fields.load_location,
            fields.unload_location,
            fields.load_time,
            fields.unload_time,
        )
    }
}

impl Leg {
    pub fn new(
        voyage: Voyage,
        load_location: Location,
        unload_location: Location,
        load_time: DateTime<Utc>,
        unload_time: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        if load_time >= unload_time {
            return Err(AppError::InvalidLeg(format!(
                "load at {load_time} is not before unload at {unload_time}"
            )));
        }

        if !voyage.serves(&load_location, &unload_location) {
            return Err(AppError::InvalidLeg(format!(
                "voyage {} does not call at {} and then {}",
                voyage.number, load_location.un_locode, unload_location.un_locode
            )));
        }

        Ok(Self {
            voyage,
            load_location,
            unload_location,
            load_time,
            unload_time,
        })
    }

    pub fn voyage(&self) -> &Voyage {
        &self.voyage
    }

    pub fn load_location(&self) -> &Location {
        &self.load_location
    }

    pub fn unload_location(&self) -> &Location {
        &self.unload_location
    }

    pub fn load_time(&self) -> DateTime<Utc> {
        self.load_time
    }

    pub fn unload_time(&self) -> DateTime<Utc> {
        self.unload_time
    }

    fn is_loaded_by(&self, event: &HandlingEvent) -> bool {
        event.location == self.load_location && event.voyage.as_ref() == Some(&self.voyage)
    }

    fn is_unloaded_by(&self, event: &HandlingEvent) -> bool {
        event.location == self.unload_location && event.voyage.as_ref() == Some(&self.voyage)
    }
}

/// A transport plan: a non-empty chain of legs where each leg starts where
/// and after the previous one ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Leg>", into = "Vec<Leg>")]
pub struct Itinerary {
    legs: Vec<Leg>,
}

impl Itinerary {
    pub fn new(legs: Vec<Leg>) -> Result<Self, AppError> {
        if legs.is_empty() {
            return Err(AppError::MalformedItinerary(
                "an itinerary needs at least one leg".to_string(),
            ));
        }

        for (idx, leg) in legs.iter().enumerate() {
            if leg.load_time >= leg.unload_time {
                return Err(AppError::MalformedItinerary(format!(
                    "leg {idx} is unloaded before it is loaded"
                )));
            }
        }

        for (idx, pair) in legs.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            if current.unload_location != next.load_location {
                return Err(AppError::MalformedItinerary(format!(
                    "leg {idx} ends at {} but leg {} starts at {}",
                    current.unload_location.un_locode,
                    idx + 1,
                    next.load_location.un_locode
                )));
            }
            if current.unload_time > next.load_time {
                return Err(AppError::MalformedItinerary(format!(
                    "leg {} is loaded before leg {idx} is unloaded",
                    idx + 1
                )));
            }
        }

        Ok(Self { legs })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    fn first_leg(&self) -> &Leg {
        &self.legs[0]
    }

    fn last_leg(&self) -> &Leg {
        &self.legs[self.legs.len() - 1]
    }

    pub fn initial_departure_location(&self) -> &Location {
        &self.first_leg().load_location
    }

    pub fn final_arrival_location(&self) -> &Location {
        &self.last_leg().unload_location
    }

    pub fn final_arrival_date(&self) -> DateTime<Utc> {
        self.last_leg().unload_time
    }

    /// Whether `event` is something this plan foresees. Customs is not part of
    /// the plan and never counts against it.
    pub fn is_expected_event(&self, event: &HandlingEvent) -> bool {
        match event.event_type {
            HandlingEventType::Receive => event.location == *self.initial_departure_location(),
            HandlingEventType::Load => self.legs.iter().any(|leg| leg.is_loaded_by(event)),
            HandlingEventType::Unload => self.legs.iter().any(|leg| leg.is_unloaded_by(event)),
            HandlingEventType::Customs => true,
            HandlingEventType::Claim => event.location == *self.final_arrival_location(),
        }
    }

    /// The activity the plan predicts after `last_event`, or after booking
    /// when nothing has been handled yet.
    pub fn next_expected_activity(
        &self,
        last_event: Option<&HandlingEvent>,
    ) -> Option<HandlingActivity> {
        let Some(event) = last_event else {
            return Some(HandlingActivity::new(
                HandlingEventType::Receive,
                self.initial_departure_location().clone(),
                None,
            ));
        };

        if !self.is_expected_event(event) {
            return None;
        }

        match event.event_type {
            HandlingEventType::Receive => {
                let leg = self.first_leg();
                Some(HandlingActivity::new(
                    HandlingEventType::Load,
                    leg.load_location.clone(),
                    Some(leg.voyage.clone()),
                ))
            }
            HandlingEventType::Load => self
                .legs
                .iter()
                .find(|leg| leg.is_loaded_by(event))
                .map(|leg| {
                    HandlingActivity::new(
                        HandlingEventType::Unload,
                        leg.unload_location.clone(),
                        Some(leg.voyage.clone()),
                    )
                }),
            HandlingEventType::Unload => {
                let idx = self.legs.iter().position(|leg| leg.is_unloaded_by(event))?;
                match self.legs.get(idx + 1) {
                    Some(next) => Some(HandlingActivity::new(
                        HandlingEventType::Load,
                        next.load_location.clone(),
                        Some(next.voyage.clone()),
                    )),
                    None => Some(HandlingActivity::new(
                        HandlingEventType::Claim,
                        self.final_arrival_location().clone(),
                        None,
                    )),
                }
            }
            HandlingEventType::Customs | HandlingEventType::Claim => None,
        }
    }
}

impl TryFrom<Vec<Leg>> for Itinerary {
    type Error = AppError;

    fn try_from(legs: Vec<Leg>) -> Result<Self, Self::Error> {
        Self::new(legs)
    }
}

impl From<Itinerary> for Vec<Leg> {
    fn from(itinerary: Itinerary) -> Self {
        itinerary.legs
    }
}
