// libs/scheduling-cell/src/lib.rs
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;
pub mod state;

pub use models::{
    Actor, ActorRole, Appointment, AppointmentSearchQuery, AppointmentStatus, AvailabilitySlot,
    BookAppointmentRequest, CreateServiceRequest, SchedulingError, Service, UpdateServiceRequest,
};
pub use repository::{
    AppointmentRepository, InMemoryAppointmentRepository, InMemoryServiceRepository,
    ServiceRepository,
};
pub use router::{appointment_routes, availability_routes, service_routes};
pub use services::{AppointmentLifecycleService, AvailabilityService, ConflictChecker, ServiceCatalog};
pub use state::SchedulingState;
