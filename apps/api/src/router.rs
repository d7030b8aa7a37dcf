use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use reminder_cell::{router::reminder_routes, ReminderService};
use scheduling_cell::{
    router::{appointment_routes, availability_routes, service_routes},
    SchedulingState,
};

pub fn create_router(
    scheduling: Arc<SchedulingState>,
    reminders: Arc<ReminderService>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "PawCal scheduling API is running!" }))
        .nest("/services", service_routes(scheduling.clone()))
        .nest("/availability", availability_routes(scheduling.clone()))
        .nest("/appointments", appointment_routes(scheduling))
        .nest("/reminders", reminder_routes(reminders))
}
