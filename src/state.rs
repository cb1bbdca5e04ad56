use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    AttendanceRepository, AvailabilityRepository, BookingRepository, Clock, SignatureStore,
    UserRepository,
};
use crate::domain::services::{
    attendance_service::AttendanceService, availability_service::AvailabilityService,
    booking_service::BookingService, conflict::ConflictDetector,
    instant_booking::InstantBookingService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub signature_store: Arc<dyn SignatureStore>,
    pub clock: Arc<dyn Clock>,
    pub conflicts: Arc<ConflictDetector>,
    pub booking_service: Arc<BookingService>,
    pub instant_booking_service: Arc<InstantBookingService>,
    pub availability_service: Arc<AvailabilityService>,
    pub attendance_service: Arc<AttendanceService>,
}

impl AppState {
    /// Wires the engine services on top of the given adapters.
    pub fn new(
        config: Config,
        booking_repo: Arc<dyn BookingRepository>,
        availability_repo: Arc<dyn AvailabilityRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
        user_repo: Arc<dyn UserRepository>,
        signature_store: Arc<dyn SignatureStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let conflicts = Arc::new(ConflictDetector::new(booking_repo.clone()));

        let booking_service = Arc::new(BookingService::new(
            booking_repo.clone(),
            availability_repo.clone(),
            conflicts.clone(),
            clock.clone(),
            config.approval_conflict_policy,
        ));
        let instant_booking_service = Arc::new(InstantBookingService::new(
            booking_repo.clone(),
            conflicts.clone(),
            clock.clone(),
        ));
        let availability_service = Arc::new(AvailabilityService::new(availability_repo.clone(), clock.clone()));
        let attendance_service = Arc::new(AttendanceService::new(
            attendance_repo.clone(),
            booking_repo.clone(),
            user_repo.clone(),
            signature_store.clone(),
            clock.clone(),
            config.max_signature_bytes,
        ));

        Self {
            config,
            booking_repo,
            availability_repo,
            attendance_repo,
            user_repo,
            signature_store,
            clock,
            conflicts,
            booking_service,
            instant_booking_service,
            availability_service,
            attendance_service,
        }
    }
}
