pub mod attendance;
pub mod availability;
pub mod booking;
pub mod user;
