// libs/scheduling-cell/src/services/conflict.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::SchedulingError;
use crate::repository::AppointmentRepository;

/// Two half-open intervals `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`. An appointment ending exactly when another
/// starts does not conflict.
pub fn overlaps(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

/// True iff any existing interval overlaps the candidate.
pub fn has_conflict(
    existing: &[(DateTime<Utc>, DateTime<Utc>)],
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
) -> bool {
    existing
        .iter()
        .any(|&(start, end)| overlaps(start, end, candidate_start, candidate_end))
}

/// Repository-backed gate over the pure predicate. The caller scopes the
/// check to one service's calendar and may exclude the appointment being
/// moved during a reschedule.
pub struct ConflictChecker {
    appointments: Arc<dyn AppointmentRepository>,
}

impl ConflictChecker {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    pub async fn check(
        &self,
        service_id: Uuid,
        candidate_start: DateTime<Utc>,
        candidate_end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<bool, SchedulingError> {
        debug!(
            "Checking conflicts for service {} from {} to {}",
            service_id, candidate_start, candidate_end
        );

        let blocking = self
            .appointments
            .find_blocking_in_window(
                service_id,
                candidate_start,
                candidate_end,
                exclude_appointment_id,
            )
            .await?;

        let windows: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocking
            .iter()
            .map(|apt| (apt.start_time, apt.end_time))
            .collect();

        let conflicting = has_conflict(&windows, candidate_start, candidate_end);
        if conflicting {
            warn!(
                "Conflict detected for service {} - {} blocking appointments",
                service_id,
                windows.len()
            );
        }

        Ok(conflicting)
    }
}
