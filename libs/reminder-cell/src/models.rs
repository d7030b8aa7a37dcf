use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lead time before an appointment for the confirmation notice.
pub const CONFIRMATION_LEAD_HOURS: i64 = 24;
/// Lead time before an appointment for the day-of reminder.
pub const REMINDER_LEAD_HOURS: i64 = 2;
/// Delay after an appointment for its follow-up check-in.
pub const FOLLOW_UP_DELAY_DAYS: i64 = 7;
/// Delay after a cancellation before staff review the follow-up entry.
pub const CANCELLATION_FOLLOW_UP_DELAY_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub kind: ReminderKind,
    pub message: String,
    pub remind_at: DateTime<Utc>,
    /// Manual reminders may be unattached to any appointment.
    pub appointment_id: Option<Uuid>,
    pub status: ReminderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    pub fn is_pending(&self) -> bool {
        self.status == ReminderStatus::Pending
    }

    /// The fixed offset this reminder keeps relative to its appointment's
    /// start time. Manual reminders float free of the appointment.
    pub fn offset_from_start(kind: ReminderKind) -> Option<Duration> {
        match kind {
            ReminderKind::Confirmation => Some(-Duration::hours(CONFIRMATION_LEAD_HOURS)),
            ReminderKind::Reminder => Some(-Duration::hours(REMINDER_LEAD_HOURS)),
            ReminderKind::FollowUp => Some(Duration::days(FOLLOW_UP_DELAY_DAYS)),
            ReminderKind::Manual => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Confirmation,
    Reminder,
    FollowUp,
    Manual,
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderKind::Confirmation => write!(f, "confirmation"),
            ReminderKind::Reminder => write!(f, "reminder"),
            ReminderKind::FollowUp => write!(f, "follow_up"),
            ReminderKind::Manual => write!(f, "manual"),
        }
    }
}

/// Delivery state of a reminder. `Cancelled` means the reminder was
/// neutralized (its parent appointment went away), not delivered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManualReminderRequest {
    pub message: String,
    pub remind_at: DateTime<Utc>,
    pub appointment_id: Option<Uuid>,
}
