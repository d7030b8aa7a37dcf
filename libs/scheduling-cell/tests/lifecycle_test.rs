use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use reminder_cell::{
    InMemoryReminderRepository, ReminderKind, ReminderService, ReminderStatus,
};
use scheduling_cell::models::{
    Actor, ActorRole, AppointmentSearchQuery, AppointmentStatus, BookAppointmentRequest,
    CreateServiceRequest, SchedulingError,
};
use scheduling_cell::repository::{InMemoryAppointmentRepository, InMemoryServiceRepository};
use scheduling_cell::services::{AppointmentLifecycleService, ServiceCatalog};
use shared_config::SchedulingConfig;

struct TestHarness {
    catalog: ServiceCatalog,
    lifecycle: Arc<AppointmentLifecycleService>,
    reminders: Arc<ReminderService>,
}

fn harness() -> TestHarness {
    let services: Arc<InMemoryServiceRepository> = Arc::new(InMemoryServiceRepository::new());
    let appointments = Arc::new(InMemoryAppointmentRepository::new());
    let reminders = Arc::new(ReminderService::new(Arc::new(
        InMemoryReminderRepository::new(),
    )));

    TestHarness {
        catalog: ServiceCatalog::new(services.clone()),
        lifecycle: Arc::new(AppointmentLifecycleService::new(
            services,
            appointments,
            Arc::clone(&reminders),
            SchedulingConfig::default(),
        )),
        reminders,
    }
}

async fn checkup_service(harness: &TestHarness) -> Uuid {
    harness
        .catalog
        .create(CreateServiceRequest {
            title: "Annual checkup".to_string(),
            duration_minutes: 60,
            price_cents: 4500,
        })
        .await
        .unwrap()
        .id
}

fn booking(service_id: Uuid, start: chrono::DateTime<Utc>) -> BookAppointmentRequest {
    BookAppointmentRequest {
        client_id: Uuid::new_v4(),
        animal_id: Uuid::new_v4(),
        service_id,
        start_time: start,
        notes: None,
    }
}

fn admin() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: ActorRole::Admin,
    }
}

fn client(id: Uuid) -> Actor {
    Actor {
        id,
        role: ActorRole::Client,
    }
}

#[tokio::test]
async fn booking_derives_confirmation_and_reminder() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(7);

    let appointment = h.lifecycle.create(booking(service_id, start)).await.unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.end_time, start + Duration::minutes(60));

    let mut derived = h.reminders.for_appointment(appointment.id).await.unwrap();
    derived.sort_by_key(|r| r.remind_at);
    assert_eq!(derived.len(), 2);
    assert_eq!(derived[0].kind, ReminderKind::Confirmation);
    assert_eq!(derived[0].remind_at, start - Duration::hours(24));
    assert_eq!(derived[1].kind, ReminderKind::Reminder);
    assert_eq!(derived[1].remind_at, start - Duration::hours(2));
    assert!(derived.iter().all(|r| r.status == ReminderStatus::Pending));
}

#[tokio::test]
async fn overlapping_booking_is_rejected_but_back_to_back_is_not() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(3);

    h.lifecycle.create(booking(service_id, start)).await.unwrap();

    // Half an hour in: overlaps the one-hour appointment.
    let overlapping = h
        .lifecycle
        .create(booking(service_id, start + Duration::minutes(30)))
        .await;
    assert_matches!(overlapping, Err(SchedulingError::SlotUnavailable));

    // Starts exactly when the first ends: no overlap.
    let back_to_back = h
        .lifecycle
        .create(booking(service_id, start + Duration::minutes(60)))
        .await;
    assert!(back_to_back.is_ok());
}

#[tokio::test]
async fn cancelled_appointments_release_their_slot() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(3);

    let first = h.lifecycle.create(booking(service_id, start)).await.unwrap();
    h.lifecycle.cancel(first.id, admin(), None).await.unwrap();

    let rebooked = h.lifecycle.create(booking(service_id, start)).await;
    assert!(rebooked.is_ok());
}

#[tokio::test]
async fn confirming_twice_is_an_invalid_transition() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(3);

    let appointment = h.lifecycle.create(booking(service_id, start)).await.unwrap();
    let confirmed = h.lifecycle.confirm(appointment.id, admin()).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let again = h.lifecycle.confirm(appointment.id, admin()).await;
    assert_matches!(
        again,
        Err(SchedulingError::InvalidTransition {
            from: AppointmentStatus::Confirmed,
            to: AppointmentStatus::Confirmed,
        })
    );
}

#[tokio::test]
async fn clients_cannot_confirm_or_override_status() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(3);

    let request = booking(service_id, start);
    let client_actor = client(request.client_id);
    let appointment = h.lifecycle.create(request).await.unwrap();

    assert_matches!(
        h.lifecycle.confirm(appointment.id, client_actor.clone()).await,
        Err(SchedulingError::Unauthorized)
    );
    assert_matches!(
        h.lifecycle
            .update_status(appointment.id, client_actor, "completed")
            .await,
        Err(SchedulingError::Unauthorized)
    );
}

#[tokio::test]
async fn client_cancellation_inside_notice_window_is_rejected() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    // One hour out, inside the default two-hour notice window.
    let start = Utc::now() + Duration::hours(1);

    let request = booking(service_id, start);
    let client_actor = client(request.client_id);
    let appointment = h.lifecycle.create(request).await.unwrap();

    assert_matches!(
        h.lifecycle
            .cancel(appointment.id, client_actor, None)
            .await,
        Err(SchedulingError::CancellationWindowExpired)
    );

    // Staff are not bound by the notice window.
    let cancelled = h.lifecycle.cancel(appointment.id, admin(), None).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn client_can_cancel_own_appointment_with_enough_notice() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(2);

    let request = booking(service_id, start);
    let owner = client(request.client_id);
    let appointment = h.lifecycle.create(request).await.unwrap();

    // A different client cannot touch it.
    assert_matches!(
        h.lifecycle
            .cancel(appointment.id, client(Uuid::new_v4()), None)
            .await,
        Err(SchedulingError::Unauthorized)
    );

    let cancelled = h
        .lifecycle
        .cancel(appointment.id, owner, Some("schedule clash".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert!(cancelled.notes.unwrap().contains("schedule clash"));
}

#[tokio::test]
async fn cancelling_a_completed_appointment_is_rejected() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(2);

    let appointment = h.lifecycle.create(booking(service_id, start)).await.unwrap();
    h.lifecycle
        .update_status(appointment.id, admin(), "completed")
        .await
        .unwrap();

    assert_matches!(
        h.lifecycle.cancel(appointment.id, admin(), None).await,
        Err(SchedulingError::AlreadyCompleted)
    );
}

#[tokio::test]
async fn completed_appointment_rejects_even_the_owning_client() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    // Far enough out that the notice window cannot be the reason.
    let start = Utc::now() + Duration::days(4);

    let request = booking(service_id, start);
    let owner = client(request.client_id);
    let appointment = h.lifecycle.create(request).await.unwrap();
    h.lifecycle
        .update_status(appointment.id, admin(), "completed")
        .await
        .unwrap();

    assert_matches!(
        h.lifecycle.cancel(appointment.id, owner, None).await,
        Err(SchedulingError::AlreadyCompleted)
    );
}

#[tokio::test]
async fn cancellation_neutralizes_reminders_and_schedules_follow_up() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(2);

    let appointment = h.lifecycle.create(booking(service_id, start)).await.unwrap();
    h.lifecycle.cancel(appointment.id, admin(), None).await.unwrap();

    let reminders = h.reminders.for_appointment(appointment.id).await.unwrap();
    assert_eq!(reminders.len(), 3);

    let follow_ups: Vec<_> = reminders
        .iter()
        .filter(|r| r.kind == ReminderKind::FollowUp)
        .collect();
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].status, ReminderStatus::Pending);

    assert!(reminders
        .iter()
        .filter(|r| r.kind != ReminderKind::FollowUp)
        .all(|r| r.status == ReminderStatus::Cancelled));
}

#[tokio::test]
async fn refusal_cancels_the_appointment_and_its_reminders() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(2);

    let appointment = h.lifecycle.create(booking(service_id, start)).await.unwrap();
    let refused = h
        .lifecycle
        .refuse(appointment.id, admin(), Some("no availability".to_string()))
        .await
        .unwrap();

    assert_eq!(refused.status, AppointmentStatus::Cancelled);
    assert!(refused.notes.unwrap().contains("no availability"));

    let reminders = h.reminders.for_appointment(appointment.id).await.unwrap();
    assert!(reminders
        .iter()
        .filter(|r| r.kind != ReminderKind::FollowUp)
        .all(|r| r.status == ReminderStatus::Cancelled));
}

#[tokio::test]
async fn reschedule_resets_status_and_recomputes_reminders() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(3);
    let new_start = Utc::now() + Duration::days(5);

    let request = booking(service_id, start);
    let owner = client(request.client_id);
    let appointment = h.lifecycle.create(request).await.unwrap();
    h.lifecycle.confirm(appointment.id, admin()).await.unwrap();

    let moved = h
        .lifecycle
        .reschedule(appointment.id, owner, new_start)
        .await
        .unwrap();
    assert_eq!(moved.status, AppointmentStatus::Scheduled);
    assert_eq!(moved.start_time, new_start);
    assert_eq!(moved.end_time, new_start + Duration::minutes(60));

    let mut reminders = h.reminders.for_appointment(appointment.id).await.unwrap();
    reminders.sort_by_key(|r| r.remind_at);
    assert_eq!(reminders[0].remind_at, new_start - Duration::hours(24));
    assert_eq!(reminders[1].remind_at, new_start - Duration::hours(2));
    assert!(reminders.iter().all(|r| r.status == ReminderStatus::Pending));
}

#[tokio::test]
async fn reschedule_round_trip_returns_to_the_original_slot() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let original = Utc::now() + Duration::days(3);
    let alternate = Utc::now() + Duration::days(5);

    let appointment = h
        .lifecycle
        .create(booking(service_id, original))
        .await
        .unwrap();
    h.lifecycle.confirm(appointment.id, admin()).await.unwrap();

    let moved = h
        .lifecycle
        .reschedule(appointment.id, admin(), alternate)
        .await
        .unwrap();
    assert_eq!(moved.start_time, alternate);

    // The original slot was freed by the first move.
    let back = h
        .lifecycle
        .reschedule(appointment.id, admin(), original)
        .await
        .unwrap();
    assert_eq!(back.start_time, original);
    assert_eq!(back.end_time, original + Duration::minutes(60));
    assert_eq!(back.status, AppointmentStatus::Scheduled);
}

#[tokio::test]
async fn reschedule_ignores_the_appointment_itself_but_not_others() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(3);

    let first = h.lifecycle.create(booking(service_id, start)).await.unwrap();
    let second = h
        .lifecycle
        .create(booking(service_id, start + Duration::hours(2)))
        .await
        .unwrap();

    // Shifting within its own original window is fine.
    let nudged = h
        .lifecycle
        .reschedule(first.id, admin(), start + Duration::minutes(30))
        .await;
    assert!(nudged.is_ok());

    // Landing on the second appointment is not.
    let clash = h
        .lifecycle
        .reschedule(first.id, admin(), second.start_time)
        .await;
    assert_matches!(clash, Err(SchedulingError::SlotUnavailable));
}

#[tokio::test]
async fn status_override_skips_the_transition_graph() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(2);

    let appointment = h.lifecycle.create(booking(service_id, start)).await.unwrap();

    // Scheduled -> Completed is not a graph edge, but the override allows it.
    let completed = h
        .lifecycle
        .update_status(appointment.id, admin(), "completed")
        .await
        .unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);

    let unknown = h
        .lifecycle
        .update_status(appointment.id, admin(), "teleported")
        .await;
    assert_matches!(unknown, Err(SchedulingError::InvalidStatus(_)));
}

#[tokio::test]
async fn concurrent_bookings_for_the_same_slot_admit_exactly_one() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(4);

    let lifecycle = Arc::clone(&h.lifecycle);
    let first = tokio::spawn({
        let lifecycle = Arc::clone(&lifecycle);
        async move { lifecycle.create(booking(service_id, start)).await }
    });
    let second = tokio::spawn({
        let lifecycle = Arc::clone(&lifecycle);
        async move { lifecycle.create(booking(service_id, start)).await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(SchedulingError::SlotUnavailable))));
}

#[tokio::test]
async fn search_filters_by_client_and_status() {
    let h = harness();
    let service_id = checkup_service(&h).await;
    let start = Utc::now() + Duration::days(2);

    let request = booking(service_id, start);
    let client_id = request.client_id;
    let appointment = h.lifecycle.create(request).await.unwrap();
    h.lifecycle
        .create(booking(service_id, start + Duration::hours(3)))
        .await
        .unwrap();

    let mine = h
        .lifecycle
        .search(AppointmentSearchQuery {
            client_id: Some(client_id),
            service_id: None,
            status: Some(AppointmentStatus::Scheduled),
            from_date: None,
            to_date: None,
        })
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, appointment.id);
}

#[tokio::test]
async fn booking_an_inactive_service_is_rejected() {
    let h = harness();
    let service = h
        .catalog
        .create(CreateServiceRequest {
            title: "Retired service".to_string(),
            duration_minutes: 30,
            price_cents: 1000,
        })
        .await
        .unwrap();
    h.catalog
        .update(
            service.id,
            scheduling_cell::models::UpdateServiceRequest {
                title: None,
                duration_minutes: None,
                price_cents: None,
                active: Some(false),
            },
        )
        .await
        .unwrap();

    let result = h
        .lifecycle
        .create(booking(service.id, Utc::now() + Duration::days(1)))
        .await;
    assert_matches!(result, Err(SchedulingError::ValidationError(_)));
}

#[tokio::test]
async fn booking_an_unknown_service_is_rejected() {
    let h = harness();
    let missing = Uuid::new_v4();
    let result = h
        .lifecycle
        .create(booking(missing, Utc::now() + Duration::days(1)))
        .await;
    assert_matches!(result, Err(SchedulingError::ServiceNotFound(id)) if id == missing);
}
