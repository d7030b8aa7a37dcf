// libs/scheduling-cell/src/services/mod.rs
pub mod availability;
pub mod catalog;
pub mod conflict;
pub mod lifecycle;

pub use availability::AvailabilityService;
pub use catalog::ServiceCatalog;
pub use conflict::ConflictChecker;
pub use lifecycle::AppointmentLifecycleService;
