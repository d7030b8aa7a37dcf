use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ReminderError;
use crate::models::{Reminder, ReminderStatus};

/// Persistence seam for reminders. The lifecycle manager and the external
/// dispatcher both go through this contract.
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    async fn insert(&self, reminder: Reminder) -> Result<Reminder, ReminderError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reminder>, ReminderError>;
    async fn find_by_appointment(&self, appointment_id: Uuid)
        -> Result<Vec<Reminder>, ReminderError>;
    /// Pending reminders due at or before `cutoff`, ordered by `remind_at`.
    async fn find_pending_due_before(&self, cutoff: DateTime<Utc>)
        -> Result<Vec<Reminder>, ReminderError>;
    async fn update(&self, reminder: Reminder) -> Result<Reminder, ReminderError>;
    async fn delete(&self, id: Uuid) -> Result<(), ReminderError>;
}

#[derive(Default)]
pub struct InMemoryReminderRepository {
    reminders: RwLock<HashMap<Uuid, Reminder>>,
}

impl InMemoryReminderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderRepository for InMemoryReminderRepository {
    async fn insert(&self, reminder: Reminder) -> Result<Reminder, ReminderError> {
        let mut reminders = self.reminders.write().await;
        reminders.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reminder>, ReminderError> {
        let reminders = self.reminders.read().await;
        Ok(reminders.get(&id).cloned())
    }

    async fn find_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<Reminder>, ReminderError> {
        let reminders = self.reminders.read().await;
        let mut matching: Vec<Reminder> = reminders
            .values()
            .filter(|r| r.appointment_id == Some(appointment_id))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.remind_at);
        Ok(matching)
    }

    async fn find_pending_due_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Reminder>, ReminderError> {
        let reminders = self.reminders.read().await;
        let mut due: Vec<Reminder> = reminders
            .values()
            .filter(|r| r.status == ReminderStatus::Pending && r.remind_at <= cutoff)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.remind_at);
        Ok(due)
    }

    async fn update(&self, reminder: Reminder) -> Result<Reminder, ReminderError> {
        let mut reminders = self.reminders.write().await;
        if !reminders.contains_key(&reminder.id) {
            return Err(ReminderError::NotFound(reminder.id));
        }
        reminders.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ReminderError> {
        let mut reminders = self.reminders.write().await;
        reminders
            .remove(&id)
            .map(|_| ())
            .ok_or(ReminderError::NotFound(id))
    }
}
