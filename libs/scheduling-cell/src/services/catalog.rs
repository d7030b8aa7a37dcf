// libs/scheduling-cell/src/services/catalog.rs
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use chrono::Utc;

use crate::models::{
    CreateServiceRequest, SchedulingError, Service, UpdateServiceRequest,
    MIN_SERVICE_DURATION_MINUTES,
};
use crate::repository::ServiceRepository;

/// Manages the catalog of bookable services.
pub struct ServiceCatalog {
    repository: Arc<dyn ServiceRepository>,
}

impl ServiceCatalog {
    pub fn new(repository: Arc<dyn ServiceRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, request: CreateServiceRequest) -> Result<Service, SchedulingError> {
        debug!("Creating service '{}'", request.title);
        validate_title(&request.title)?;
        validate_duration(request.duration_minutes)?;
        validate_price(request.price_cents)?;

        let now = Utc::now();
        let service = self
            .repository
            .insert(Service {
                id: Uuid::new_v4(),
                title: request.title,
                duration_minutes: request.duration_minutes,
                price_cents: request.price_cents,
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!("Service {} ('{}') created", service.id, service.title);
        Ok(service)
    }

    pub async fn get(&self, service_id: Uuid) -> Result<Service, SchedulingError> {
        self.repository
            .find_by_id(service_id)
            .await?
            .ok_or(SchedulingError::ServiceNotFound(service_id))
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Service>, SchedulingError> {
        self.repository.list(active_only).await
    }

    /// Partial update; absent fields keep their current value.
    pub async fn update(
        &self,
        service_id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<Service, SchedulingError> {
        let mut service = self.get(service_id).await?;

        if let Some(title) = request.title {
            validate_title(&title)?;
            service.title = title;
        }
        if let Some(duration_minutes) = request.duration_minutes {
            validate_duration(duration_minutes)?;
            service.duration_minutes = duration_minutes;
        }
        if let Some(price_cents) = request.price_cents {
            validate_price(price_cents)?;
            service.price_cents = price_cents;
        }
        if let Some(active) = request.active {
            service.active = active;
        }
        service.updated_at = Utc::now();

        let service = self.repository.update(service).await?;
        info!("Service {} updated", service.id);
        Ok(service)
    }
}

fn validate_title(title: &str) -> Result<(), SchedulingError> {
    if title.trim().is_empty() {
        return Err(SchedulingError::ValidationError(
            "Service title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_duration(duration_minutes: i64) -> Result<(), SchedulingError> {
    if duration_minutes < MIN_SERVICE_DURATION_MINUTES {
        return Err(SchedulingError::ValidationError(format!(
            "Service duration must be at least {} minutes",
            MIN_SERVICE_DURATION_MINUTES
        )));
    }
    Ok(())
}

fn validate_price(price_cents: i64) -> Result<(), SchedulingError> {
    if price_cents < 0 {
        return Err(SchedulingError::ValidationError(
            "Service price cannot be negative".to_string(),
        ));
    }
    Ok(())
}
