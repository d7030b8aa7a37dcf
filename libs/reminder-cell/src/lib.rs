pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod service;

pub use error::ReminderError;
pub use models::*;
pub use repository::{InMemoryReminderRepository, ReminderRepository};
pub use router::reminder_routes;
pub use service::ReminderService;
