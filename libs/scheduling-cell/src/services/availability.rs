// libs/scheduling-cell/src/services/availability.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_config::SchedulingConfig;

use crate::models::{AvailabilitySlot, SchedulingError};
use crate::repository::{AppointmentRepository, ServiceRepository};
use crate::services::conflict;

/// Read-only calendar view: for a service and a date, the bookable slots
/// on the configured business-hours grid. Recomputed fresh on every call;
/// nothing is cached.
pub struct AvailabilityService {
    services: Arc<dyn ServiceRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    config: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            services,
            appointments,
            config,
        }
    }

    pub async fn available_slots(
        &self,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, SchedulingError> {
        debug!("Calculating available slots for service {} on {}", service_id, date);

        let service = self
            .services
            .find_by_id(service_id)
            .await?
            .ok_or(SchedulingError::ServiceNotFound(service_id))?;

        let day_start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| SchedulingError::ValidationError("Invalid date".to_string()))?
            .and_utc();
        let day_end = day_start + Duration::days(1);

        let blocking = self
            .appointments
            .find_blocking_in_window(service_id, day_start, day_end, None)
            .await?;
        let busy: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocking
            .iter()
            .map(|apt| (apt.start_time, apt.end_time))
            .collect();

        let slots = slot_grid(&self.config, date, Utc::now(), service.duration(), &busy);
        debug!("Found {} available slots", slots.len());
        Ok(slots)
    }
}

/// Walk the business-hours grid and keep every candidate that fits.
///
/// A candidate is discarded when its start is already in the past (only
/// relevant when `date` is today), when its end would run past closing,
/// or when it overlaps a busy window. An empty result is a valid outcome,
/// not an error.
pub fn slot_grid(
    config: &SchedulingConfig,
    date: NaiveDate,
    now: DateTime<Utc>,
    duration: Duration,
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Vec<AvailabilitySlot> {
    let Some(open) = date.and_hms_opt(config.open_hour, 0, 0) else {
        return Vec::new();
    };
    let open = open.and_utc();
    // An inverted window yields close == open, so the walk emits nothing.
    let open_hours = config.close_hour.saturating_sub(config.open_hour);
    let close = open + Duration::hours(i64::from(open_hours));

    let is_today = date == now.date_naive();
    let interval = Duration::minutes(config.slot_interval_minutes);

    let mut slots = Vec::new();
    let mut current = open;
    while current < close {
        let candidate_end = current + duration;

        let in_the_past = is_today && current < now;
        let past_closing = candidate_end > close;
        let conflicting = conflict::has_conflict(busy, current, candidate_end);

        if !in_the_past && !past_closing && !conflicting {
            slots.push(AvailabilitySlot {
                start_time: current,
                end_time: candidate_end,
                available: true,
            });
        }

        current += interval;
    }

    slots
}
