pub mod attendance;
pub mod booking;
pub mod health;
pub mod instant_booking;
pub mod schedule;
