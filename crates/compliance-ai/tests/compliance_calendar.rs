//! Calendar materialization against the standard template catalog: due-date
//! rules, applicability filtering, idempotence, and reminder staging.

mod common;

use common::{build_scheduler, build_scheduler_with, ca_llc, date};

use compliance_ai::workflows::compliance::deadline::DueDateRule;
use compliance_ai::workflows::compliance::domain::{
    BusinessEntity, EntityId, EntityType, NotificationChannel, NotificationStatus,
};
use compliance_ai::workflows::compliance::store::StoreError;
use compliance_ai::workflows::compliance::{
    ComplianceCatalog, RuleOverride, RuleOverrides, ScheduleError,
};

#[test]
fn materialize_is_idempotent_across_repeat_runs() {
    let fixture = build_scheduler();
    fixture.directory.register(ca_llc());
    let entity_id = ca_llc().id;
    let today = date(2025, 2, 1);

    let first = fixture
        .scheduler
        .materialize(&entity_id, today)
        .expect("first materialization");
    assert!(!first.is_empty());
    let count_after_first = fixture.calendar.all().len();

    let second = fixture
        .scheduler
        .materialize(&entity_id, today)
        .expect("second materialization");
    assert!(second.is_empty(), "repeat run must create nothing");
    assert_eq!(fixture.calendar.all().len(), count_after_first);
}

#[test]
fn unknown_entity_fails_before_any_write() {
    let fixture = build_scheduler();

    let result = fixture
        .scheduler
        .materialize(&EntityId("biz-missing".to_string()), date(2025, 2, 1));

    match result {
        Err(ScheduleError::Store(StoreError::NotFound)) => {}
        other => panic!("expected not-found error, got {other:?}"),
    }
    assert!(fixture.calendar.all().is_empty());
    assert!(fixture.notifications.all().is_empty());
}

#[test]
fn quarterly_template_yields_statutory_installments() {
    let fixture = build_scheduler();
    fixture.directory.register(ca_llc());

    let created = fixture
        .scheduler
        .materialize(&ca_llc().id, date(2025, 2, 1))
        .expect("materialize");

    let mut installments: Vec<_> = created
        .iter()
        .filter(|entry| entry.event_type == "quarterly_estimated_tax")
        .map(|entry| entry.due_date)
        .collect();
    installments.sort();
    assert_eq!(
        installments,
        vec![
            date(2025, 4, 15),
            date(2025, 6, 15),
            date(2025, 9, 15),
            date(2026, 1, 15),
        ]
    );
}

#[test]
fn ca_franchise_tax_falls_on_the_statutory_date() {
    let fixture = build_scheduler();
    fixture.directory.register(ca_llc());

    let created = fixture
        .scheduler
        .materialize(&ca_llc().id, date(2025, 2, 1))
        .expect("materialize");

    let franchise = created
        .iter()
        .find(|entry| entry.event_type == "ca_franchise_tax")
        .expect("franchise tax entry");
    assert_eq!(franchise.due_date, date(2025, 4, 15));
}

#[test]
fn elapsed_cycle_dates_are_dropped_not_backfilled() {
    let fixture = build_scheduler();
    fixture.directory.register(ca_llc());

    // Formed 2024-01-10: the January-anniversary filings for 2025 have
    // already passed by February, so no entries appear for them this cycle.
    let created = fixture
        .scheduler
        .materialize(&ca_llc().id, date(2025, 2, 1))
        .expect("materialize");

    assert!(!created.iter().any(|entry| entry.event_type == "annual_report"));
    assert!(!created
        .iter()
        .any(|entry| entry.event_type == "business_license_renewal"));
}

#[test]
fn override_lead_times_stage_exact_fire_dates() {
    let mut overrides = RuleOverrides::default();
    overrides.insert(
        "WA",
        EntityType::Llc,
        "annual_report",
        RuleOverride {
            due: DueDateRule::FixedDate { month: 3, day: 15 },
            lead_times: Some(vec![90, 30, 14, 7, 1]),
        },
    );
    let fixture = build_scheduler_with(ComplianceCatalog::standard().with_overrides(overrides));

    let entity = BusinessEntity {
        id: EntityId("biz-wa-llc".to_string()),
        legal_name: "Rainier Outfitters LLC".to_string(),
        entity_type: EntityType::Llc,
        state: "WA".to_string(),
        formation_date: date(2024, 6, 5),
        contact_email: Some("owner@rainier.example".to_string()),
        contact_phone: None,
    };
    fixture.directory.register(entity.clone());

    let created = fixture
        .scheduler
        .materialize(&entity.id, date(2025, 1, 1))
        .expect("materialize");
    let annual = created
        .iter()
        .find(|entry| entry.event_type == "annual_report")
        .expect("overridden annual report entry");
    assert_eq!(annual.due_date, date(2025, 3, 15));

    let mut fire_dates: Vec<_> = fixture
        .scheduler
        .reminders_for(&annual.id)
        .expect("reminders")
        .into_iter()
        .filter(|notification| notification.channel == NotificationChannel::Email)
        .map(|notification| notification.scheduled_for)
        .collect();
    fire_dates.sort();
    assert_eq!(
        fire_dates,
        vec![
            date(2024, 12, 15),
            date(2025, 2, 13),
            date(2025, 3, 1),
            date(2025, 3, 8),
            date(2025, 3, 14),
        ]
    );
}

#[test]
fn past_fire_dates_are_created_for_the_next_sweep() {
    let fixture = build_scheduler();
    let entity = BusinessEntity {
        id: EntityId("biz-late-llc".to_string()),
        legal_name: "Eleventh Hour Holdings LLC".to_string(),
        entity_type: EntityType::Llc,
        state: "CA".to_string(),
        formation_date: date(2024, 11, 1),
        contact_email: Some("owner@eleventh.example".to_string()),
        contact_phone: None,
    };
    fixture.directory.register(entity.clone());
    let today = date(2025, 1, 20);

    let created = fixture
        .scheduler
        .materialize(&entity.id, today)
        .expect("materialize");
    let boir = created
        .iter()
        .find(|entry| entry.event_type == "boir_filing")
        .expect("ownership report entry");
    assert_eq!(boir.due_date, date(2025, 1, 30), "offset beats the floor");

    let overdue_reminders: Vec<_> = fixture
        .scheduler
        .reminders_for(&boir.id)
        .expect("reminders")
        .into_iter()
        .filter(|notification| notification.scheduled_for < today)
        .collect();
    assert!(
        !overdue_reminders.is_empty(),
        "reminders behind schedule are still staged"
    );
    assert!(overdue_reminders
        .iter()
        .all(|notification| notification.status == NotificationStatus::Pending));
}
