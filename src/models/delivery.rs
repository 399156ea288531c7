use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::handling::{HandlingActivity, HandlingEvent, HandlingEventType, HandlingHistory};
use crate::models::itinerary::Itinerary;
use crate::models::location::Location;
use crate::models::route::RouteSpecification;
use crate::models::voyage::Voyage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportStatus {
    NotReceived,
    InPort,
    OnboardCarrier,
    Claimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStatus {
    NotRouted,
    Routed,
    Misrouted,
}

/// Snapshot of where a cargo stands, derived from its route specification,
/// itinerary and handling history. Always rebuilt as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub transport_status: TransportStatus,
    pub routing_status: RoutingStatus,
    pub misdirected: bool,
    pub last_known_location: Option<Location>,
    pub current_voyage: Option<Voyage>,
    pub eta: Option<DateTime<Utc>>,
    pub next_expected_activity: Option<HandlingActivity>,
    pub unloaded_at_destination: bool,
    pub last_event: Option<HandlingEvent>,
    pub last_updated_on: DateTime<Utc>,
}

impl Delivery {
    pub fn derived_from(
        route_specification: &RouteSpecification,
        itinerary: Option<&Itinerary>,
        history: &HandlingHistory,
    ) -> Self {
        Self::derive(
            route_specification,
            itinerary,
            history.most_recently_completed_event(),
            Utc::now(),
        )
    }

    /// Only the most recently completed event matters for the snapshot, which
    /// is why it is kept on the delivery: re-routing can recompute without the
    /// full history.
    pub fn derive(
        route_specification: &RouteSpecification,
        itinerary: Option<&Itinerary>,
        last_event: Option<&HandlingEvent>,
        now: DateTime<Utc>,
    ) -> Self {
        let routing_status = match itinerary {
            None => RoutingStatus::NotRouted,
            Some(itinerary) if !route_specification.is_satisfied_by(itinerary) => {
                RoutingStatus::Misrouted
            }
            Some(_) => RoutingStatus::Routed,
        };

        let (transport_status, misdirected, last_known_location, current_voyage, unloaded) =
            match last_event {
                None => (TransportStatus::NotReceived, false, None, None, false),
                Some(event) => {
                    let misdirected =
                        itinerary.is_none_or(|itinerary| !itinerary.is_expected_event(event));
                    let current_voyage = match event.event_type {
                        HandlingEventType::Load => event.voyage.clone(),
                        _ => None,
                    };
                    let unloaded = event.event_type == HandlingEventType::Unload
                        && itinerary
                            .is_some_and(|itinerary| event.location == *itinerary.final_arrival_location());

                    (
                        transport_status_after(event.event_type),
                        misdirected,
                        Some(event.location.clone()),
                        current_voyage,
                        unloaded,
                    )
                }
            };

        Self {
            transport_status,
            routing_status,
            misdirected,
            last_known_location,
            current_voyage,
            eta: itinerary.map(Itinerary::final_arrival_date),
            next_expected_activity: itinerary
                .and_then(|itinerary| itinerary.next_expected_activity(last_event)),
            unloaded_at_destination: unloaded,
            last_event: last_event.cloned(),
            last_updated_on: now,
        }
    }

    pub fn is_on_track(&self) -> bool {
        self.routing_status == RoutingStatus::Routed && !self.misdirected
    }
}

fn transport_status_after(event_type: HandlingEventType) -> TransportStatus {
    match event_type {
        HandlingEventType::Receive => TransportStatus::InPort,
        HandlingEventType::Load => TransportStatus::OnboardCarrier,
        HandlingEventType::Unload => TransportStatus::InPort,
        HandlingEventType::Customs => TransportStatus::InPort,
        HandlingEventType::Claim => TransportStatus::Claimed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Delivery, RoutingStatus, TransportStatus};
    use crate::models::fixtures::*;
    use crate::models::handling::{HandlingEventType, HandlingHistory};
    use crate::models::route::RouteSpecification;

    fn spec_to(destination: crate::models::location::Location) -> RouteSpecification {
        RouteSpecification::new(
            hamburg(),
            destination,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn unrouted_and_unhandled_cargo() {
        let delivery = Delivery::derive(&spec_to(tokyo()), None, None, at(2024, 3, 1));

        assert_eq!(delivery.routing_status, RoutingStatus::NotRouted);
        assert_eq!(delivery.transport_status, TransportStatus::NotReceived);
        assert!(!delivery.misdirected);
        assert!(delivery.last_known_location.is_none());
        assert!(delivery.current_voyage.is_none());
        assert!(delivery.eta.is_none());
        assert!(delivery.next_expected_activity.is_none());
        assert!(!delivery.unloaded_at_destination);
    }

    #[test]
    fn routed_but_not_received_expects_receive_at_origin() {
        let itinerary = hamburg_to_tokyo();
        let delivery = Delivery::derive(&spec_to(tokyo()), Some(&itinerary), None, at(2024, 3, 1));

        assert_eq!(delivery.routing_status, RoutingStatus::Routed);
        assert_eq!(delivery.transport_status, TransportStatus::NotReceived);
        assert_eq!(delivery.eta, Some(at(2024, 5, 20)));
        let next = delivery.next_expected_activity.unwrap();
        assert_eq!(next.event_type, HandlingEventType::Receive);
        assert_eq!(next.location, hamburg());
    }

    #[test]
    fn itinerary_not_matching_spec_is_misrouted() {
        let itinerary = hamburg_to_tokyo();
        let delivery = Delivery::derive(&spec_to(osaka()), Some(&itinerary), None, at(2024, 3, 1));

        assert_eq!(delivery.routing_status, RoutingStatus::Misrouted);
    }

    #[test]
    fn load_puts_cargo_onboard_with_current_voyage() {
        let itinerary = hamburg_to_tokyo();
        let loaded = load_at(hamburg(), v100(), at(2024, 4, 1));
        let delivery =
            Delivery::derive(&spec_to(tokyo()), Some(&itinerary), Some(&loaded), at(2024, 4, 1));

        assert_eq!(delivery.transport_status, TransportStatus::OnboardCarrier);
        assert_eq!(delivery.current_voyage, Some(v100()));
        assert_eq!(delivery.last_known_location, Some(hamburg()));
        assert!(!delivery.misdirected);
    }

    #[test]
    fn unload_clears_current_voyage() {
        let itinerary = hamburg_to_tokyo();
        let unloaded = unload_at(shanghai(), v100(), at(2024, 4, 28));
        let delivery =
            Delivery::derive(&spec_to(tokyo()), Some(&itinerary), Some(&unloaded), at(2024, 4, 28));

        assert_eq!(delivery.transport_status, TransportStatus::InPort);
        assert!(delivery.current_voyage.is_none());
        assert!(!delivery.unloaded_at_destination);
    }

    #[test]
    fn off_plan_load_is_misdirected_with_nothing_expected() {
        let itinerary = hamburg_to_tokyo();
        let stray = load_at(rotterdam(), v900(), at(2024, 4, 1));
        let delivery =
            Delivery::derive(&spec_to(tokyo()), Some(&itinerary), Some(&stray), at(2024, 4, 1));

        assert!(delivery.misdirected);
        assert_eq!(delivery.transport_status, TransportStatus::OnboardCarrier);
        assert!(delivery.next_expected_activity.is_none());
        assert!(!delivery.is_on_track());
    }

    #[test]
    fn handled_cargo_without_itinerary_is_misdirected() {
        let received = receive_at(hamburg(), at(2024, 3, 30));
        let delivery = Delivery::derive(&spec_to(tokyo()), None, Some(&received), at(2024, 3, 30));

        assert!(delivery.misdirected);
        assert_eq!(delivery.transport_status, TransportStatus::InPort);
    }

    #[test]
    fn unload_at_final_destination_marks_arrival() {
        let itinerary = hamburg_to_tokyo();
        let arrived = unload_at(tokyo(), v200(), at(2024, 5, 20));
        let delivery =
            Delivery::derive(&spec_to(tokyo()), Some(&itinerary), Some(&arrived), at(2024, 5, 20));

        assert!(delivery.unloaded_at_destination);
        let next = delivery.next_expected_activity.unwrap();
        assert_eq!(next.event_type, HandlingEventType::Claim);
    }

    #[test]
    fn claim_is_terminal() {
        let itinerary = hamburg_to_tokyo();
        let claimed = claim_at(tokyo(), at(2024, 5, 22));
        let delivery =
            Delivery::derive(&spec_to(tokyo()), Some(&itinerary), Some(&claimed), at(2024, 5, 22));

        assert_eq!(delivery.transport_status, TransportStatus::Claimed);
        assert!(delivery.next_expected_activity.is_none());
        assert!(!delivery.unloaded_at_destination);
    }

    #[test]
    fn customs_keeps_cargo_in_port() {
        let itinerary = hamburg_to_tokyo();
        let customs = customs_at(tokyo(), at(2024, 5, 21));
        let delivery =
            Delivery::derive(&spec_to(tokyo()), Some(&itinerary), Some(&customs), at(2024, 5, 21));

        assert_eq!(delivery.transport_status, TransportStatus::InPort);
        assert!(!delivery.misdirected);
    }

    #[test]
    fn derivation_ignores_event_arrival_order() {
        let itinerary = hamburg_to_tokyo();
        let events = vec![
            receive_at(hamburg(), at(2024, 3, 30)),
            load_at(hamburg(), v100(), at(2024, 4, 1)),
            unload_at(shanghai(), v100(), at(2024, 4, 28)),
        ];
        let now = at(2024, 4, 29);

        let forward = HandlingHistory::build(events.clone());
        let shuffled = HandlingHistory::build(vec![
            events[2].clone(),
            events[0].clone(),
            events[1].clone(),
        ]);

        let a = Delivery::derive(
            &spec_to(tokyo()),
            Some(&itinerary),
            forward.most_recently_completed_event(),
            now,
        );
        let b = Delivery::derive(
            &spec_to(tokyo()),
            Some(&itinerary),
            shuffled.most_recently_completed_event(),
            now,
        );

        assert_eq!(a, b);
    }
}
