// libs/scheduling-cell/src/state.rs
use std::sync::Arc;

use reminder_cell::ReminderService;
use shared_config::SchedulingConfig;

use crate::repository::{AppointmentRepository, ServiceRepository};
use crate::services::{AppointmentLifecycleService, AvailabilityService, ServiceCatalog};

/// Shared handler state wiring the scheduling services over one pair
/// of repositories.
pub struct SchedulingState {
    pub catalog: ServiceCatalog,
    pub availability: AvailabilityService,
    pub lifecycle: AppointmentLifecycleService,
}

impl SchedulingState {
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        reminders: Arc<ReminderService>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            catalog: ServiceCatalog::new(Arc::clone(&services)),
            availability: AvailabilityService::new(
                Arc::clone(&services),
                Arc::clone(&appointments),
                config.clone(),
            ),
            lifecycle: AppointmentLifecycleService::new(
                services,
                appointments,
                reminders,
                config,
            ),
        }
    }
}
