// libs/scheduling-cell/src/services/lifecycle.rs
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use reminder_cell::ReminderService;
use shared_config::SchedulingConfig;

use crate::models::{
    Actor, ActorRole, Appointment, AppointmentSearchQuery, AppointmentStatus,
    BookAppointmentRequest, SchedulingError,
};
use crate::repository::{AppointmentRepository, ServiceRepository};
use crate::services::conflict::ConflictChecker;

/// Governs appointment state and its derived reminders. Reminder upkeep is
/// best-effort by design: a booking is never lost because the reminder
/// subsystem hiccuped.
pub struct AppointmentLifecycleService {
    services: Arc<dyn ServiceRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    conflict_checker: ConflictChecker,
    reminders: Arc<ReminderService>,
    config: SchedulingConfig,
    /// Serializes every check-then-write sequence on the practice
    /// calendar, so two overlapping bookings cannot both pass the
    /// conflict gate.
    booking_guard: Mutex<()>,
}

impl AppointmentLifecycleService {
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        reminders: Arc<ReminderService>,
        config: SchedulingConfig,
    ) -> Self {
        let conflict_checker = ConflictChecker::new(Arc::clone(&appointments));
        Self {
            services,
            appointments,
            conflict_checker,
            reminders,
            config,
            booking_guard: Mutex::new(()),
        }
    }

    /// Book a new appointment in state `Scheduled` and derive its
    /// confirmation and day-of reminders.
    pub async fn create(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for client {} (service {})",
            request.client_id, request.service_id
        );

        let service = self
            .services
            .find_by_id(request.service_id)
            .await?
            .ok_or(SchedulingError::ServiceNotFound(request.service_id))?;

        if !service.active {
            return Err(SchedulingError::ValidationError(format!(
                "Service '{}' is not currently bookable",
                service.title
            )));
        }

        let end_time = request.start_time + service.duration();

        let appointment = {
            let _guard = self.booking_guard.lock().await;

            if self
                .conflict_checker
                .check(request.service_id, request.start_time, end_time, None)
                .await?
            {
                return Err(SchedulingError::SlotUnavailable);
            }

            let now = Utc::now();
            self.appointments
                .insert(Appointment {
                    id: Uuid::new_v4(),
                    client_id: request.client_id,
                    animal_id: request.animal_id,
                    service_id: request.service_id,
                    start_time: request.start_time,
                    end_time,
                    status: AppointmentStatus::Scheduled,
                    notes: request.notes,
                    created_at: now,
                    updated_at: now,
                })
                .await?
        };

        // Best-effort side effect: the booking stands even if reminder
        // derivation fails.
        if let Err(e) = self
            .reminders
            .derive_for_booking(appointment.id, appointment.start_time)
            .await
        {
            warn!(
                "Reminder derivation failed for appointment {}: {}",
                appointment.id, e
            );
        }

        info!("Appointment {} booked successfully", appointment.id);
        Ok(appointment)
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(appointment_id))
    }

    pub async fn search(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.appointments.search(query).await
    }

    /// Staff accepts a scheduled appointment.
    pub async fn confirm(
        &self,
        appointment_id: Uuid,
        actor: Actor,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Confirming appointment {}", appointment_id);
        self.require_staff(&actor)?;

        let mut appointment = self.get(appointment_id).await?;
        validate_transition(appointment.status, AppointmentStatus::Confirmed)?;

        appointment.status = AppointmentStatus::Confirmed;
        appointment.updated_at = Utc::now();
        let appointment = self.appointments.update(appointment).await?;

        info!("Appointment {} confirmed by {}", appointment_id, actor.role);
        Ok(appointment)
    }

    /// Staff declines an appointment; lands in `Cancelled`.
    pub async fn refuse(
        &self,
        appointment_id: Uuid,
        actor: Actor,
        reason: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Refusing appointment {}", appointment_id);
        self.require_staff(&actor)?;

        let mut appointment = self.get(appointment_id).await?;
        validate_transition(appointment.status, AppointmentStatus::Cancelled)?;

        appointment.status = AppointmentStatus::Cancelled;
        if let Some(reason) = &reason {
            appointment.append_note(&format!("Refused by {}: {}", actor.role, reason));
        }
        appointment.updated_at = Utc::now();
        let appointment = self.appointments.update(appointment).await?;

        self.neutralize_reminders(appointment_id).await;

        info!("Appointment {} refused by {}", appointment_id, actor.role);
        Ok(appointment)
    }

    /// Cancel an appointment. Clients may only cancel their own, and only
    /// outside the configured notice window; staff may cancel any.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        actor: Actor,
        reason: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Cancelling appointment {}", appointment_id);

        let mut appointment = self.get(appointment_id).await?;
        self.require_owner_or_staff(&actor, &appointment)?;

        if appointment.status == AppointmentStatus::Completed {
            return Err(SchedulingError::AlreadyCompleted);
        }
        validate_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let now = Utc::now();
        if actor.role == ActorRole::Client {
            let notice = Duration::hours(self.config.client_cancellation_notice_hours);
            if appointment.start_time - now < notice {
                return Err(SchedulingError::CancellationWindowExpired);
            }
        }

        appointment.status = AppointmentStatus::Cancelled;
        let note = match &reason {
            Some(reason) => format!("Cancelled by {}: {}", actor.role, reason),
            None => format!("Cancelled by {}", actor.role),
        };
        appointment.append_note(&note);
        appointment.updated_at = now;
        let appointment = self.appointments.update(appointment).await?;

        self.neutralize_reminders(appointment_id).await;
        if let Err(e) = self
            .reminders
            .follow_up_after_cancellation(
                appointment_id,
                now,
                format!(
                    "Appointment {} ({}) was cancelled by {}; consider reaching out",
                    appointment_id,
                    appointment.start_time.to_rfc3339(),
                    actor.role
                ),
            )
            .await
        {
            warn!(
                "Follow-up reminder creation failed for appointment {}: {}",
                appointment_id, e
            );
        }

        info!("Appointment {} cancelled by {}", appointment_id, actor.role);
        Ok(appointment)
    }

    /// Administrative override: overwrites the status without consulting
    /// the transition graph. Unknown status values are rejected.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        actor: Actor,
        new_status: &str,
    ) -> Result<Appointment, SchedulingError> {
        self.require_staff(&actor)?;

        let parsed: AppointmentStatus = new_status.parse()?;

        let mut appointment = self.get(appointment_id).await?;
        let previous = appointment.status;
        appointment.status = parsed;
        appointment.updated_at = Utc::now();
        let appointment = self.appointments.update(appointment).await?;

        info!(
            "Appointment {} status overridden {} -> {} by {}",
            appointment_id, previous, parsed, actor.role
        );
        Ok(appointment)
    }

    /// Move an appointment to a new start time. The end is recomputed
    /// from the service's current duration, the status resets to
    /// `Scheduled`, and every derived reminder is recomputed and
    /// re-armed.
    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        actor: Actor,
        new_start_time: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        debug!(
            "Rescheduling appointment {} to {}",
            appointment_id, new_start_time
        );

        let mut appointment = self.get(appointment_id).await?;
        self.require_owner_or_staff(&actor, &appointment)?;

        let service = self
            .services
            .find_by_id(appointment.service_id)
            .await?
            .ok_or(SchedulingError::ServiceNotFound(appointment.service_id))?;
        let new_end_time = new_start_time + service.duration();

        let appointment = {
            let _guard = self.booking_guard.lock().await;

            if self
                .conflict_checker
                .check(
                    appointment.service_id,
                    new_start_time,
                    new_end_time,
                    Some(appointment_id),
                )
                .await?
            {
                return Err(SchedulingError::SlotUnavailable);
            }

            appointment.start_time = new_start_time;
            appointment.end_time = new_end_time;
            appointment.status = AppointmentStatus::Scheduled;
            appointment.updated_at = Utc::now();
            self.appointments.update(appointment).await?
        };

        if let Err(e) = self
            .reminders
            .recompute_for_reschedule(appointment_id, new_start_time)
            .await
        {
            warn!(
                "Reminder recomputation failed for appointment {}: {}",
                appointment_id, e
            );
        }

        info!(
            "Appointment {} rescheduled to {}",
            appointment_id, new_start_time
        );
        Ok(appointment)
    }

    fn require_staff(&self, actor: &Actor) -> Result<(), SchedulingError> {
        if actor.role.is_staff() {
            Ok(())
        } else {
            Err(SchedulingError::Unauthorized)
        }
    }

    fn require_owner_or_staff(
        &self,
        actor: &Actor,
        appointment: &Appointment,
    ) -> Result<(), SchedulingError> {
        if actor.role.is_staff() || (actor.role == ActorRole::Client && actor.id == appointment.client_id)
        {
            Ok(())
        } else {
            Err(SchedulingError::Unauthorized)
        }
    }

    async fn neutralize_reminders(&self, appointment_id: Uuid) {
        if let Err(e) = self.reminders.cancel_for_appointment(appointment_id).await {
            warn!(
                "Reminder neutralization failed for appointment {}: {}",
                appointment_id, e
            );
        }
    }
}

/// All valid next statuses for a given current status. `Completed` and
/// `Cancelled` are terminal.
pub fn valid_transitions(current: AppointmentStatus) -> Vec<AppointmentStatus> {
    match current {
        AppointmentStatus::Scheduled => vec![
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
        ],
        AppointmentStatus::Confirmed => vec![
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ],
        AppointmentStatus::Completed => vec![],
        AppointmentStatus::Cancelled => vec![],
    }
}

pub fn validate_transition(
    current: AppointmentStatus,
    new: AppointmentStatus,
) -> Result<(), SchedulingError> {
    if valid_transitions(current).contains(&new) {
        Ok(())
    } else {
        warn!("Invalid status transition attempted: {} -> {}", current, new);
        Err(SchedulingError::InvalidTransition {
            from: current,
            to: new,
        })
    }
}
