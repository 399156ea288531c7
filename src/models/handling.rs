use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::cargo::TrackingId;
use crate::models::location::{Location, UnLocode};
use crate::models::voyage::{Voyage, VoyageNumber};

/// Declaration order doubles as the last tie-break when ordering history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandlingEventType {
    Receive,
    Load,
    Unload,
    Customs,
    Claim,
}

impl HandlingEventType {
    pub fn requires_voyage(self) -> bool {
        matches!(self, HandlingEventType::Load | HandlingEventType::Unload)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandlingEventType::Receive => "RECEIVE",
            HandlingEventType::Load => "LOAD",
            HandlingEventType::Unload => "UNLOAD",
            HandlingEventType::Customs => "CUSTOMS",
            HandlingEventType::Claim => "CLAIM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlingEvent {
    pub tracking_id: TrackingId,
    pub event_type: HandlingEventType,
    pub location: Location,
    pub voyage: Option<Voyage>,
    pub completion_time: DateTime<Utc>,
    pub registration_time: DateTime<Utc>,
}

impl HandlingEvent {
    pub fn new(
        tracking_id: TrackingId,
        event_type: HandlingEventType,
        location: Location,
        voyage: Option<Voyage>,
        completion_time: DateTime<Utc>,
        registration_time: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        match (event_type.requires_voyage(), &voyage) {
            (true, None) => {
                return Err(AppError::InvalidHandlingEvent(format!(
                    "{} requires a voyage",
                    event_type.as_str()
                )));
            }
            (false, Some(voyage)) => {
                return Err(AppError::InvalidHandlingEvent(format!(
                    "{} cannot carry voyage {}",
                    event_type.as_str(),
                    voyage.number
                )));
            }
            _ => {}
        }

        Ok(Self {
            tracking_id,
            event_type,
            location,
            voyage,
            completion_time,
            registration_time,
        })
    }

    fn voyage_number(&self) -> Option<&VoyageNumber> {
        self.voyage.as_ref().map(|voyage| &voyage.number)
    }

    fn history_order_key(
        &self,
    ) -> (
        DateTime<Utc>,
        DateTime<Utc>,
        HandlingEventType,
        &UnLocode,
        Option<&VoyageNumber>,
    ) {
        (
            self.completion_time,
            self.registration_time,
            self.event_type,
            &self.location.un_locode,
            self.voyage_number(),
        )
    }

    fn identity_key(&self) -> (HandlingEventType, UnLocode, Option<VoyageNumber>, DateTime<Utc>) {
        (
            self.event_type,
            self.location.un_locode.clone(),
            self.voyage_number().cloned(),
            self.completion_time,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlingActivity {
    pub event_type: HandlingEventType,
    pub location: Location,
    pub voyage: Option<Voyage>,
}

impl HandlingActivity {
    pub fn new(event_type: HandlingEventType, location: Location, voyage: Option<Voyage>) -> Self {
        Self {
            event_type,
            location,
            voyage,
        }
    }
}

/// Raw handling report as received from a terminal, before its codes have
/// been resolved against known cargos, voyages and locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlingEventRegistrationAttempt {
    pub registration_time: DateTime<Utc>,
    pub completion_time: DateTime<Utc>,
    pub tracking_id: TrackingId,
    pub voyage_number: Option<VoyageNumber>,
    pub event_type: HandlingEventType,
    pub un_locode: UnLocode,
}

/// Deduplicated handling events of one cargo ordered by completion time, then
/// registration time, then event type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlingHistory {
    events: Vec<HandlingEvent>,
}

impl HandlingHistory {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the history of record from events in any order. Identical events
    /// (same type, location, voyage and completion time) collapse into the one
    /// registered first.
    pub fn build(events: impl IntoIterator<Item = HandlingEvent>) -> Self {
        let mut sorted: Vec<HandlingEvent> = events.into_iter().collect();
        sorted.sort_by(|a, b| a.history_order_key().cmp(&b.history_order_key()));

        let mut seen = HashSet::new();
        sorted.retain(|event| seen.insert(event.identity_key()));

        Self { events: sorted }
    }

    pub fn events(&self) -> &[HandlingEvent] {
        &self.events
    }

    pub fn most_recently_completed_event(&self) -> Option<&HandlingEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{HandlingEvent, HandlingEventType, HandlingHistory};
    use crate::error::AppError;
    use crate::models::fixtures::*;

    #[test]
    fn load_without_voyage_is_rejected() {
        let result = HandlingEvent::new(
            tracking_id(),
            HandlingEventType::Load,
            hamburg(),
            None,
            at(2024, 4, 1),
            at(2024, 4, 1),
        );
        assert!(matches!(result, Err(AppError::InvalidHandlingEvent(_))));
    }

    #[test]
    fn receive_with_voyage_is_rejected() {
        let result = HandlingEvent::new(
            tracking_id(),
            HandlingEventType::Receive,
            hamburg(),
            Some(v100()),
            at(2024, 4, 1),
            at(2024, 4, 1),
        );
        assert!(matches!(result, Err(AppError::InvalidHandlingEvent(_))));
    }

    #[test]
    fn history_is_ordered_by_completion_time() {
        let received = receive_at(hamburg(), at(2024, 3, 30));
        let loaded = load_at(hamburg(), v100(), at(2024, 4, 1));
        let unloaded = unload_at(shanghai(), v100(), at(2024, 4, 28));

        let history = HandlingHistory::build(vec![unloaded.clone(), received.clone(), loaded.clone()]);

        assert_eq!(history.events(), &[received, loaded, unloaded.clone()]);
        assert_eq!(history.most_recently_completed_event(), Some(&unloaded));
    }

    #[test]
    fn late_registration_does_not_move_event_in_history() {
        let unloaded = unload_at(shanghai(), v100(), at(2024, 4, 28));
        let mut customs = customs_at(shanghai(), at(2024, 4, 27));
        customs.registration_time = at(2024, 4, 30);

        let history = HandlingHistory::build(vec![unloaded.clone(), customs]);
        assert_eq!(history.most_recently_completed_event(), Some(&unloaded));
    }

    #[test]
    fn ties_break_on_registration_time_then_type() {
        let completed = at(2024, 4, 1);
        let mut first = receive_at(hamburg(), completed);
        first.registration_time = completed + Duration::minutes(5);
        let mut second = customs_at(hamburg(), completed);
        second.registration_time = completed + Duration::minutes(10);

        let history = HandlingHistory::build(vec![second.clone(), first.clone()]);
        assert_eq!(history.events(), &[first.clone(), second.clone()]);

        let mut same_registration = second.clone();
        same_registration.registration_time = first.registration_time;
        let history = HandlingHistory::build(vec![same_registration.clone(), first.clone()]);
        assert_eq!(history.events(), &[first, same_registration]);
    }

    #[test]
    fn duplicates_collapse_to_earliest_registration() {
        let original = load_at(hamburg(), v100(), at(2024, 4, 1));
        let mut resent = original.clone();
        resent.registration_time = original.registration_time + Duration::hours(3);

        let history = HandlingHistory::build(vec![resent, original.clone(), original.clone()]);

        assert_eq!(history.len(), 1);
        assert_eq!(history.events()[0], original);
    }

    #[test]
    fn build_is_idempotent_and_order_independent() {
        let events = vec![
            receive_at(hamburg(), at(2024, 3, 30)),
            load_at(hamburg(), v100(), at(2024, 4, 1)),
            customs_at(shanghai(), at(2024, 4, 28)),
            unload_at(shanghai(), v100(), at(2024, 4, 28)),
        ];

        let forward = HandlingHistory::build(events.clone());
        let backward = HandlingHistory::build(events.iter().rev().cloned());
        let rebuilt = HandlingHistory::build(forward.events().to_vec());

        assert_eq!(forward, backward);
        assert_eq!(forward, rebuilt);
    }

    #[test]
    fn empty_history_has_no_last_event() {
        let history = HandlingHistory::empty();
        assert!(history.is_empty());
        assert!(history.most_recently_completed_event().is_none());
    }
}
