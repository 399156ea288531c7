pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod notification;
pub mod observability;
pub mod repository;
pub mod routing;
pub mod state;
