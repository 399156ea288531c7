pub mod booking;
pub mod handling;
pub mod inspection;
pub mod queue;
pub mod summary;
