use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Reminder not found: {0}")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}
