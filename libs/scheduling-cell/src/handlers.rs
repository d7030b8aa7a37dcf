// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AppointmentSearchQuery, AppointmentStatus, BookAppointmentRequest, CancelAppointmentRequest,
    ConfirmAppointmentRequest, CreateServiceRequest, RefuseAppointmentRequest,
    RescheduleAppointmentRequest, SchedulingError, UpdateServiceRequest, UpdateStatusRequest,
};
use crate::state::SchedulingState;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub service_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ServiceListQuery {
    pub active_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentQueryParams {
    pub client_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from_date: Option<chrono::DateTime<chrono::Utc>>,
    pub to_date: Option<chrono::DateTime<chrono::Utc>>,
}

// ==============================================================================
// SERVICE CATALOG HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = state
        .catalog
        .create(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "service": service,
        "message": "Service created successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<SchedulingState>>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = state
        .catalog
        .get(service_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<SchedulingState>>,
    Query(params): Query<ServiceListQuery>,
) -> Result<Json<Value>, AppError> {
    let services = state
        .catalog
        .list(params.active_only.unwrap_or(true))
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "total": services.len(),
        "services": services
    })))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<SchedulingState>>,
    Path(service_id): Path<Uuid>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = state
        .catalog
        .update(service_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "service": service,
        "message": "Service updated successfully"
    })))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<SchedulingState>>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state
        .availability
        .available_slots(params.service_id, params.date)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "service_id": params.service_id,
        "date": params.date,
        "total": slots.len(),
        "slots": slots
    })))
}

// ==============================================================================
// APPOINTMENT LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .lifecycle
        .create(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .lifecycle
        .get(appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<SchedulingState>>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<Value>, AppError> {
    let appointments = state
        .lifecycle
        .search(AppointmentSearchQuery {
            client_id: params.client_id,
            service_id: params.service_id,
            status: params.status,
            from_date: params.from_date,
            to_date: params.to_date,
        })
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "total": appointments.len(),
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<ConfirmAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .lifecycle
        .confirm(appointment_id, request.actor)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment confirmed"
    })))
}

#[axum::debug_handler]
pub async fn refuse_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RefuseAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .lifecycle
        .refuse(appointment_id, request.actor, request.reason)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment refused"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .lifecycle
        .cancel(appointment_id, request.actor, request.reason)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .lifecycle
        .reschedule(appointment_id, request.actor, request.new_start_time)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled"
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .lifecycle
        .update_status(appointment_id, request.actor, &request.status)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment status updated"
    })))
}

// ==============================================================================
// ERROR MAPPING
// ==============================================================================

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::ServiceNotFound(_) | SchedulingError::AppointmentNotFound(_) => {
            AppError::NotFound(e.to_string())
        }
        SchedulingError::SlotUnavailable => AppError::Conflict(e.to_string()),
        SchedulingError::Unauthorized => AppError::Forbidden(e.to_string()),
        SchedulingError::InvalidTransition { .. }
        | SchedulingError::InvalidStatus(_)
        | SchedulingError::CancellationWindowExpired
        | SchedulingError::AlreadyCompleted
        | SchedulingError::ValidationError(_) => AppError::BadRequest(e.to_string()),
        SchedulingError::RepositoryError(_) => AppError::Internal(e.to_string()),
    }
}
