use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentSearchQuery, Service, SchedulingError};
use crate::services::conflict;

/// Catalog of bookable treatments.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn insert(&self, service: Service) -> Result<Service, SchedulingError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, SchedulingError>;
    async fn list(&self, active_only: bool) -> Result<Vec<Service>, SchedulingError>;
    async fn update(&self, service: Service) -> Result<Service, SchedulingError>;
}

/// The practice calendar. Callers that gate on conflicts must hold the
/// lifecycle service's booking guard across the read-then-write sequence;
/// the repository itself only answers queries.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, SchedulingError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, SchedulingError>;
    async fn update(&self, appointment: Appointment) -> Result<Appointment, SchedulingError>;
    /// Non-cancelled appointments for a service whose interval overlaps
    /// `[window_start, window_end)`, ordered by start time.
    async fn find_blocking_in_window(
        &self,
        service_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, SchedulingError>;
    async fn search(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError>;
}

#[derive(Default)]
pub struct InMemoryServiceRepository {
    services: RwLock<HashMap<Uuid, Service>>,
}

impl InMemoryServiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceRepository for InMemoryServiceRepository {
    async fn insert(&self, service: Service) -> Result<Service, SchedulingError> {
        let mut services = self.services.write().await;
        services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, SchedulingError> {
        let services = self.services.read().await;
        Ok(services.get(&id).cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Service>, SchedulingError> {
        let services = self.services.read().await;
        let mut listed: Vec<Service> = services
            .values()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(listed)
    }

    async fn update(&self, service: Service) -> Result<Service, SchedulingError> {
        let mut services = self.services.write().await;
        if !services.contains_key(&service.id) {
            return Err(SchedulingError::ServiceNotFound(service.id));
        }
        services.insert(service.id, service.clone());
        Ok(service)
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, SchedulingError> {
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, SchedulingError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.get(&id).cloned())
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, SchedulingError> {
        let mut appointments = self.appointments.write().await;
        if !appointments.contains_key(&appointment.id) {
            return Err(SchedulingError::AppointmentNotFound(appointment.id));
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_blocking_in_window(
        &self,
        service_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let appointments = self.appointments.read().await;
        let mut blocking: Vec<Appointment> = appointments
            .values()
            .filter(|apt| apt.service_id == service_id)
            .filter(|apt| apt.blocks_calendar())
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .filter(|apt| {
                conflict::overlaps(apt.start_time, apt.end_time, window_start, window_end)
            })
            .cloned()
            .collect();
        blocking.sort_by_key(|apt| apt.start_time);
        Ok(blocking)
    }

    async fn search(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let appointments = self.appointments.read().await;
        let mut found: Vec<Appointment> = appointments
            .values()
            .filter(|apt| query.client_id.map_or(true, |id| apt.client_id == id))
            .filter(|apt| query.service_id.map_or(true, |id| apt.service_id == id))
            .filter(|apt| query.status.map_or(true, |status| apt.status == status))
            .filter(|apt| query.from_date.map_or(true, |from| apt.start_time >= from))
            .filter(|apt| query.to_date.map_or(true, |to| apt.start_time <= to))
            .cloned()
            .collect();
        found.sort_by_key(|apt| apt.start_time);
        Ok(found)
    }
}
