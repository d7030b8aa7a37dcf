use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::service::ReminderService;

pub fn reminder_routes(service: Arc<ReminderService>) -> Router {
    Router::new()
        .route("/", post(handlers::create_manual_reminder))
        .route("/due", get(handlers::get_due_reminders))
        .route("/{reminder_id}/sent", post(handlers::mark_reminder_sent))
        .route("/{reminder_id}", delete(handlers::delete_reminder))
        .with_state(service)
}
