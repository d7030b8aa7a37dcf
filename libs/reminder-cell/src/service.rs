use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ReminderError;
use crate::models::{
    CreateManualReminderRequest, Reminder, ReminderKind, ReminderStatus,
    CANCELLATION_FOLLOW_UP_DELAY_HOURS,
};
use crate::repository::ReminderRepository;

/// Computes and persists reminder records. Actually firing a notification
/// at `remind_at` belongs to an external dispatcher; this service only
/// maintains the schedule and the delivery state.
pub struct ReminderService {
    repository: Arc<dyn ReminderRepository>,
}

impl ReminderService {
    pub fn new(repository: Arc<dyn ReminderRepository>) -> Self {
        Self { repository }
    }

    /// Derive the confirmation and day-of reminders for a freshly booked
    /// appointment.
    pub async fn derive_for_booking(
        &self,
        appointment_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<Vec<Reminder>, ReminderError> {
        debug!("Deriving booking reminders for appointment {}", appointment_id);

        let confirmation = self
            .create_derived(
                appointment_id,
                ReminderKind::Confirmation,
                start_time,
                format!(
                    "Please confirm the appointment scheduled for {}",
                    start_time.to_rfc3339()
                ),
            )
            .await?;

        let reminder = self
            .create_derived(
                appointment_id,
                ReminderKind::Reminder,
                start_time,
                format!(
                    "Upcoming appointment at {} - see you soon",
                    start_time.to_rfc3339()
                ),
            )
            .await?;

        info!("Derived 2 reminders for appointment {}", appointment_id);
        Ok(vec![confirmation, reminder])
    }

    /// Neutralize every pending reminder attached to an appointment.
    /// Returns how many reminders were moved to `Cancelled`.
    pub async fn cancel_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<usize, ReminderError> {
        debug!("Cancelling pending reminders for appointment {}", appointment_id);

        let now = Utc::now();
        let mut cancelled = 0;
        for mut reminder in self.repository.find_by_appointment(appointment_id).await? {
            if !reminder.is_pending() {
                continue;
            }
            reminder.status = ReminderStatus::Cancelled;
            reminder.updated_at = now;
            self.repository.update(reminder).await?;
            cancelled += 1;
        }

        info!(
            "Cancelled {} pending reminders for appointment {}",
            cancelled, appointment_id
        );
        Ok(cancelled)
    }

    /// Create the staff-attention follow-up entry after a cancellation,
    /// due 24 hours later.
    pub async fn follow_up_after_cancellation(
        &self,
        appointment_id: Uuid,
        cancelled_at: DateTime<Utc>,
        summary: String,
    ) -> Result<Reminder, ReminderError> {
        let now = Utc::now();
        let reminder = Reminder {
            id: Uuid::new_v4(),
            kind: ReminderKind::FollowUp,
            message: summary,
            remind_at: cancelled_at + Duration::hours(CANCELLATION_FOLLOW_UP_DELAY_HOURS),
            appointment_id: Some(appointment_id),
            status: ReminderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.repository.insert(reminder).await
    }

    /// Move every reminder attached to a rescheduled appointment onto the
    /// new start time, using the same fixed offsets as creation, and reset
    /// it to `Pending`. Manual reminders keep their own schedule.
    pub async fn recompute_for_reschedule(
        &self,
        appointment_id: Uuid,
        new_start_time: DateTime<Utc>,
    ) -> Result<usize, ReminderError> {
        debug!(
            "Recomputing reminders for rescheduled appointment {}",
            appointment_id
        );

        let now = Utc::now();
        let mut recomputed = 0;
        for mut reminder in self.repository.find_by_appointment(appointment_id).await? {
            let Some(offset) = Reminder::offset_from_start(reminder.kind) else {
                continue;
            };
            reminder.remind_at = new_start_time + offset;
            reminder.status = ReminderStatus::Pending;
            reminder.updated_at = now;
            self.repository.update(reminder).await?;
            recomputed += 1;
        }

        info!(
            "Recomputed {} reminders for appointment {}",
            recomputed, appointment_id
        );
        Ok(recomputed)
    }

    pub async fn create_manual(
        &self,
        request: CreateManualReminderRequest,
    ) -> Result<Reminder, ReminderError> {
        if request.message.trim().is_empty() {
            return Err(ReminderError::ValidationError(
                "Reminder message must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let reminder = Reminder {
            id: Uuid::new_v4(),
            kind: ReminderKind::Manual,
            message: request.message,
            remind_at: request.remind_at,
            appointment_id: request.appointment_id,
            status: ReminderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        info!("Manual reminder {} created", reminder.id);
        self.repository.insert(reminder).await
    }

    /// The dispatcher's read: pending reminders due at or before `cutoff`.
    pub async fn due_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Reminder>, ReminderError> {
        self.repository.find_pending_due_before(cutoff).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Reminder, ReminderError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ReminderError::NotFound(id))
    }

    pub async fn for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<Reminder>, ReminderError> {
        self.repository.find_by_appointment(appointment_id).await
    }

    pub async fn mark_sent(&self, id: Uuid) -> Result<Reminder, ReminderError> {
        let mut reminder = self.get(id).await?;
        reminder.status = ReminderStatus::Sent;
        reminder.updated_at = Utc::now();
        self.repository.update(reminder).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ReminderError> {
        self.repository.delete(id).await
    }

    async fn create_derived(
        &self,
        appointment_id: Uuid,
        kind: ReminderKind,
        start_time: DateTime<Utc>,
        message: String,
    ) -> Result<Reminder, ReminderError> {
        // Derived kinds always carry an offset; Manual never reaches here.
        let offset = Reminder::offset_from_start(kind)
            .ok_or_else(|| ReminderError::ValidationError("Manual reminders are not derived".to_string()))?;

        let now = Utc::now();
        let reminder = Reminder {
            id: Uuid::new_v4(),
            kind,
            message,
            remind_at: start_time + offset,
            appointment_id: Some(appointment_id),
            status: ReminderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.repository.insert(reminder).await
    }
}
