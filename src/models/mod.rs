pub mod cargo;
pub mod delivery;
pub mod handling;
pub mod itinerary;
pub mod location;
pub mod notification;
pub mod route;
pub mod voyage;
