// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers;
use crate::state::SchedulingState;

pub fn service_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_service))
        .route("/", get(handlers::list_services))
        .route("/{service_id}", get(handlers::get_service))
        .route("/{service_id}", put(handlers::update_service))
        .with_state(state)
}

pub fn availability_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", get(handlers::get_availability))
        .with_state(state)
}

pub fn appointment_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/search", get(handlers::search_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/refuse", post(handlers::refuse_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route(
            "/{appointment_id}/reschedule",
            patch(handlers::reschedule_appointment),
        )
        .route(
            "/{appointment_id}/status",
            put(handlers::update_appointment_status),
        )
        .with_state(state)
}
