use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::error::ReminderError;
use crate::models::CreateManualReminderRequest;
use crate::service::ReminderService;

#[derive(Debug, Deserialize)]
pub struct DueQueryParams {
    pub before: Option<DateTime<Utc>>,
}

pub async fn create_manual_reminder(
    State(service): State<Arc<ReminderService>>,
    Json(request): Json<CreateManualReminderRequest>,
) -> Result<Json<Value>, AppError> {
    let reminder = service
        .create_manual(request)
        .await
        .map_err(map_reminder_error)?;

    Ok(Json(json!({
        "success": true,
        "reminder": reminder
    })))
}

pub async fn get_due_reminders(
    State(service): State<Arc<ReminderService>>,
    Query(params): Query<DueQueryParams>,
) -> Result<Json<Value>, AppError> {
    let cutoff = params.before.unwrap_or_else(Utc::now);
    let due = service.due_before(cutoff).await.map_err(map_reminder_error)?;

    Ok(Json(json!({
        "total": due.len(),
        "due_reminders": due,
        "cutoff": cutoff
    })))
}

pub async fn mark_reminder_sent(
    State(service): State<Arc<ReminderService>>,
    Path(reminder_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let reminder = service
        .mark_sent(reminder_id)
        .await
        .map_err(map_reminder_error)?;

    Ok(Json(json!({
        "success": true,
        "reminder": reminder
    })))
}

pub async fn delete_reminder(
    State(service): State<Arc<ReminderService>>,
    Path(reminder_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    service
        .delete(reminder_id)
        .await
        .map_err(map_reminder_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Reminder deleted"
    })))
}

fn map_reminder_error(e: ReminderError) -> AppError {
    match e {
        ReminderError::NotFound(id) => AppError::NotFound(format!("Reminder {} not found", id)),
        ReminderError::ValidationError(msg) => AppError::BadRequest(msg),
        ReminderError::RepositoryError(msg) => AppError::Internal(msg),
    }
}
