use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::models::itinerary::{Itinerary, Leg};
use crate::models::location::{Location, UnLocode};
use crate::models::route::RouteSpecification;
use crate::models::voyage::VoyageNumber;
use crate::repository::{LocationRepository, VoyageRepository};
use crate::routing::RoutingService;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitEdge {
    pub voyage_number: String,
    pub from_un_locode: String,
    pub to_un_locode: String,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitPath {
    pub edges: Vec<TransitEdge>,
}

/// The path finding service, which speaks plain codes rather than our model.
#[async_trait]
pub trait GraphTraversal: Send + Sync {
    async fn find_shortest_path(
        &self,
        origin: &UnLocode,
        destination: &UnLocode,
    ) -> Result<Vec<TransitPath>, AppError>;
}

pub struct ExternalRoutingService<G> {
    graph: G,
    locations: Arc<dyn LocationRepository>,
    voyages: Arc<dyn VoyageRepository>,
}

impl<G: GraphTraversal> ExternalRoutingService<G> {
    pub fn new(
        graph: G,
        locations: Arc<dyn LocationRepository>,
        voyages: Arc<dyn VoyageRepository>,
    ) -> Self {
        Self {
            graph,
            locations,
            voyages,
        }
    }

    fn to_itinerary(&self, path: &TransitPath) -> Result<Itinerary, AppError> {
        let legs = path
            .edges
            .iter()
            .map(|edge| self.to_leg(edge))
            .collect::<Result<Vec<_>, _>>()?;

        Itinerary::new(legs)
    }

    fn to_leg(&self, edge: &TransitEdge) -> Result<Leg, AppError> {
        let number = VoyageNumber::new(edge.voyage_number.clone())?;
        let voyage = self
            .voyages
            .find(&number)?
            .ok_or(AppError::UnknownVoyage(number))?;

        Leg::new(
            voyage,
            self.location(&edge.from_un_locode)?,
            self.location(&edge.to_un_locode)?,
            edge.from_date,
            edge.to_date,
        )
    }

    fn location(&self, code: &str) -> Result<Location, AppError> {
        let un_locode = UnLocode::new(code)?;
        self.locations
            .find(&un_locode)?
            .ok_or(AppError::UnknownLocation(un_locode))
    }
}

#[async_trait]
impl<G: GraphTraversal> RoutingService for ExternalRoutingService<G> {
    async fn fetch_routes_for_specification(
        &self,
        route_specification: &RouteSpecification,
    ) -> Result<Vec<Itinerary>, AppError> {
        let paths = self
            .graph
            .find_shortest_path(
                &route_specification.origin().un_locode,
                &route_specification.destination().un_locode,
            )
            .await?;

        let mut itineraries = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.to_itinerary(path) {
                Ok(itinerary) if route_specification.is_satisfied_by(&itinerary) => {
                    itineraries.push(itinerary)
                }
                Ok(_) => {
                    debug!("received itinerary that did not satisfy the route specification")
                }
                Err(err) => debug!(error = %err, "dropped untranslatable transit path"),
            }
        }

        Ok(itineraries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::{ExternalRoutingService, GraphTraversal, TransitEdge, TransitPath};
    use crate::error::AppError;
    use crate::models::fixtures::*;
    use crate::models::location::UnLocode;
    use crate::models::route::RouteSpecification;
    use crate::repository::{
        InMemoryLocationRepository, InMemoryVoyageRepository, LocationRepository,
        VoyageRepository,
    };
    use crate::routing::RoutingService;

    struct CannedGraph(Vec<TransitPath>);

    #[async_trait]
    impl GraphTraversal for CannedGraph {
        async fn find_shortest_path(
            &self,
            _origin: &UnLocode,
            _destination: &UnLocode,
        ) -> Result<Vec<TransitPath>, AppError> {
            Ok(self.0.clone())
        }
    }

    fn edge(voyage: &str, from: &str, to: &str, from_day: (u32, u32), to_day: (u32, u32)) -> TransitEdge {
        TransitEdge {
            voyage_number: voyage.to_string(),
            from_un_locode: from.to_string(),
            to_un_locode: to.to_string(),
            from_date: at(2024, from_day.0, from_day.1),
            to_date: at(2024, to_day.0, to_day.1),
        }
    }

    fn service(paths: Vec<TransitPath>) -> ExternalRoutingService<CannedGraph> {
        let locations = Arc::new(InMemoryLocationRepository::new());
        for location in [hamburg(), rotterdam(), shanghai(), tokyo(), osaka()] {
            locations.store(location).unwrap();
        }
        let voyages = Arc::new(InMemoryVoyageRepository::new());
        for voyage in [v100(), v200(), v900()] {
            voyages.store(voyage).unwrap();
        }

        ExternalRoutingService::new(CannedGraph(paths), locations, voyages)
    }

    fn spec(deadline: NaiveDate) -> RouteSpecification {
        RouteSpecification::new(hamburg(), tokyo(), deadline).unwrap()
    }

    #[tokio::test]
    async fn translates_transit_paths_into_itineraries() {
        let paths = vec![TransitPath {
            edges: vec![
                edge("V100", "DEHAM", "CNSHA", (4, 1), (4, 28)),
                edge("V200", "CNSHA", "JPTYO", (5, 2), (5, 20)),
            ],
        }];

        let itineraries = service(paths)
            .fetch_routes_for_specification(&spec(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()))
            .await
            .unwrap();

        assert_eq!(itineraries, vec![hamburg_to_tokyo()]);
    }

    #[tokio::test]
    async fn drops_paths_that_miss_the_deadline_or_cannot_be_translated() {
        let paths = vec![
            TransitPath {
                edges: vec![
                    edge("V100", "DEHAM", "CNSHA", (4, 1), (4, 28)),
                    edge("V200", "CNSHA", "JPTYO", (5, 2), (5, 20)),
                ],
            },
            TransitPath {
                edges: vec![edge("V404", "DEHAM", "JPTYO", (4, 1), (4, 28))],
            },
            TransitPath {
                edges: vec![
                    edge("V100", "DEHAM", "CNSHA", (4, 1), (4, 28)),
                    edge("V900", "NLRTM", "JPOSA", (5, 2), (5, 20)),
                ],
            },
        ];

        let itineraries = service(paths)
            .fetch_routes_for_specification(&spec(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
            .await
            .unwrap();

        assert!(itineraries.is_empty());
    }
}
