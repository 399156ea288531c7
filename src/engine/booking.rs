use chrono::{NaiveDate, Utc};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::engine::inspection::{raise_notifications, transition_notifications};
use crate::error::AppError;
use crate::models::cargo::{Cargo, TrackingId};
use crate::models::delivery::Delivery;
use crate::models::itinerary::Itinerary;
use crate::models::location::{Location, UnLocode};
use crate::models::route::RouteSpecification;
use crate::state::AppState;

pub fn book_new_cargo(
    state: &AppState,
    origin: &UnLocode,
    destination: &UnLocode,
    arrival_deadline: NaiveDate,
) -> Result<TrackingId, AppError> {
    ensure_in_future(arrival_deadline)?;

    let route_specification = RouteSpecification::new(
        find_location(state, origin)?,
        find_location(state, destination)?,
        arrival_deadline,
    )?;
    let tracking_id = state.cargos.next_tracking_id()?;

    state
        .cargos
        .store(Cargo::new(tracking_id.clone(), route_specification))?;
    state.metrics.cargos_booked_total.inc();

    info!(
        tracking_id = %tracking_id,
        origin = %origin,
        destination = %destination,
        %arrival_deadline,
        "booked new cargo"
    );

    Ok(tracking_id)
}

pub async fn request_possible_routes_for_cargo(
    state: &AppState,
    tracking_id: &TrackingId,
) -> Result<Vec<Itinerary>, AppError> {
    let cargo = find_cargo(state, tracking_id)?;
    let route_specification = cargo.route_specification();

    let candidates = timeout(
        state.routing_timeout,
        state
            .routing
            .fetch_routes_for_specification(route_specification),
    )
    .await
    .map_err(|_| {
        AppError::Routing(format!(
            "no answer within {} ms",
            state.routing_timeout.as_millis()
        ))
    })??;

    let offered = candidates.len();
    let itineraries: Vec<Itinerary> = candidates
        .into_iter()
        .filter(|itinerary| route_specification.is_satisfied_by(itinerary))
        .collect();

    debug!(
        tracking_id = %tracking_id,
        offered,
        accepted = itineraries.len(),
        "fetched route candidates"
    );

    Ok(itineraries)
}

pub async fn assign_cargo_to_route(
    state: &AppState,
    tracking_id: &TrackingId,
    itinerary: Itinerary,
) -> Result<Delivery, AppError> {
    let delivery = update_cargo(state, tracking_id, |cargo| {
        cargo.assign_to_route(itinerary);
        Ok(())
    })
    .await?;

    info!(
        tracking_id = %tracking_id,
        routing_status = ?delivery.routing_status,
        "assigned cargo to route"
    );

    Ok(delivery)
}

pub async fn change_destination(
    state: &AppState,
    tracking_id: &TrackingId,
    destination: &UnLocode,
) -> Result<Delivery, AppError> {
    let destination = find_location(state, destination)?;

    let delivery = update_cargo(state, tracking_id, |cargo| {
        let route_specification = cargo.route_specification().with_destination(destination)?;
        cargo.specify_new_route(route_specification);
        Ok(())
    })
    .await?;

    info!(
        tracking_id = %tracking_id,
        routing_status = ?delivery.routing_status,
        "changed destination"
    );

    Ok(delivery)
}

pub async fn change_deadline(
    state: &AppState,
    tracking_id: &TrackingId,
    arrival_deadline: NaiveDate,
) -> Result<Delivery, AppError> {
    ensure_in_future(arrival_deadline)?;

    let delivery = update_cargo(state, tracking_id, |cargo| {
        let route_specification = cargo
            .route_specification()
            .with_arrival_deadline(arrival_deadline)?;
        cargo.specify_new_route(route_specification);
        Ok(())
    })
    .await?;

    info!(
        tracking_id = %tracking_id,
        %arrival_deadline,
        routing_status = ?delivery.routing_status,
        "changed arrival deadline"
    );

    Ok(delivery)
}

/// Applies `change` under the cargo's lock, stores the result and raises the
/// notifications the re-derived delivery calls for. A new plan can make the
/// last event unexpected, or turn its unload into an arrival.
async fn update_cargo<F>(
    state: &AppState,
    tracking_id: &TrackingId,
    change: F,
) -> Result<Delivery, AppError>
where
    F: FnOnce(&mut Cargo) -> Result<(), AppError>,
{
    let (_guard, mut cargo) = state.lock_cargo(tracking_id).await?;

    let previous = cargo.delivery().clone();
    change(&mut cargo)?;
    let delivery = cargo.delivery().clone();
    let notifications = transition_notifications(tracking_id, &previous, &delivery);

    state.cargos.store(cargo)?;
    raise_notifications(state, &notifications);

    Ok(delivery)
}

fn find_cargo(state: &AppState, tracking_id: &TrackingId) -> Result<Cargo, AppError> {
    state
        .cargos
        .find(tracking_id)?
        .ok_or_else(|| AppError::UnknownCargo(tracking_id.clone()))
}

fn find_location(state: &AppState, un_locode: &UnLocode) -> Result<Location, AppError> {
    state
        .locations
        .find(un_locode)?
        .ok_or_else(|| AppError::UnknownLocation(un_locode.clone()))
}

fn ensure_in_future(arrival_deadline: NaiveDate) -> Result<(), AppError> {
    if arrival_deadline <= Utc::now().date_naive() {
        return Err(AppError::InvalidRouteSpecification(format!(
            "arrival deadline {arrival_deadline} must be in the future"
        )));
    }
    Ok(())
}
