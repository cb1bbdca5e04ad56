pub mod attendance_service;
pub mod availability_service;
pub mod booking_service;
pub mod conflict;
pub mod instant_booking;
pub mod signature;
pub mod slot_label;
