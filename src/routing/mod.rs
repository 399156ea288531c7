pub mod external;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::itinerary::Itinerary;
use crate::models::route::RouteSpecification;

pub use external::{ExternalRoutingService, GraphTraversal, TransitEdge, TransitPath};

#[async_trait]
pub trait RoutingService: Send + Sync {
    async fn fetch_routes_for_specification(
        &self,
        route_specification: &RouteSpecification,
    ) -> Result<Vec<Itinerary>, AppError>;
}
