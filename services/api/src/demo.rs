use crate::infra::{
    demo_entities, parse_date, parse_entity_type, CalendarLedger, EntityDirectory, FeedLog,
    NotificationLedger,
};
use chrono::{Local, Months, NaiveDate};
use clap::Args;
use compliance_ai::error::AppError;
use compliance_ai::workflows::compliance::channel::{ChannelError, DeliveryReceipt, SendChannel};
use compliance_ai::workflows::compliance::domain::{BusinessEntity, EntityId, EntityType};
use compliance_ai::workflows::compliance::policy::EnginePolicy;
use compliance_ai::workflows::compliance::report::views::{
    ComplianceInsights, ComplianceReportSummary,
};
use compliance_ai::workflows::compliance::{
    ComplianceCatalog, ComplianceScheduler, NotificationDispatcher, OutboundMessage,
};
use std::sync::{Arc, Mutex};

type DemoScheduler = ComplianceScheduler<EntityDirectory, CalendarLedger, NotificationLedger>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct CalendarReportArgs {
    /// Legal name for the reported entity
    #[arg(long, default_value = "Demo Filing Co LLC")]
    pub(crate) legal_name: String,
    /// Entity type (llc, c_corporation, s_corporation, partnership, sole_proprietorship)
    #[arg(long, default_value = "llc", value_parser = parse_entity_type)]
    pub(crate) entity_type: EntityType,
    /// Two-letter formation state
    #[arg(long, default_value = "CA")]
    pub(crate) state: String,
    /// Formation date (YYYY-MM-DD). Defaults to thirteen months ago.
    #[arg(long, value_parser = parse_date)]
    pub(crate) formation_date: Option<NaiveDate>,
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Delivery channel that records outbound reminders so the walkthrough can
/// print what would have gone to the provider.
#[derive(Debug, Default, Clone)]
struct RecordingChannel {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingChannel {
    fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("channel mutex poisoned").clone()
    }
}

impl SendChannel for RecordingChannel {
    fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, ChannelError> {
        self.sent
            .lock()
            .expect("channel mutex poisoned")
            .push(message.clone());
        Ok(DeliveryReceipt { provider_ref: None })
    }
}

fn build_scheduler(
    directory: &Arc<EntityDirectory>,
    calendar: &Arc<CalendarLedger>,
    notifications: &Arc<NotificationLedger>,
) -> Arc<DemoScheduler> {
    Arc::new(ComplianceScheduler::new(
        directory.clone(),
        calendar.clone(),
        notifications.clone(),
        Arc::new(ComplianceCatalog::standard()),
        EnginePolicy::default(),
    ))
}

pub(crate) fn run_calendar_report(args: CalendarReportArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let formation_date = args.formation_date.unwrap_or_else(|| {
        today
            .checked_sub_months(Months::new(13))
            .unwrap_or(today)
    });

    let directory = Arc::new(EntityDirectory::default());
    let calendar = Arc::new(CalendarLedger::default());
    let notifications = Arc::new(NotificationLedger::default());
    let scheduler = build_scheduler(&directory, &calendar, &notifications);

    let entity = BusinessEntity {
        id: EntityId("biz-report".to_string()),
        legal_name: args.legal_name,
        entity_type: args.entity_type,
        state: args.state,
        formation_date,
        contact_email: Some("owner@reported.example".to_string()),
        contact_phone: None,
    };
    directory
        .register(entity.clone())
        .map_err(compliance_ai::workflows::compliance::ScheduleError::from)?;

    let created = scheduler.materialize(&entity.id, today)?;
    println!(
        "Materialized {} obligation(s) for {} ({}, {})",
        created.len(),
        entity.legal_name,
        entity.entity_type.label(),
        entity.state
    );
    for entry in &created {
        println!(
            "- {} due {} [{}]",
            entry.title,
            entry.due_date,
            entry.priority.label()
        );
    }

    let report = scheduler.report(&entity.id, today)?;
    let summary = report.summary();
    let insights = summary.insights(&report.entity, today, &scheduler.policy().regulatory);
    render_compliance_report(&summary, &insights);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let directory = Arc::new(EntityDirectory::default());
    let calendar = Arc::new(CalendarLedger::default());
    let notifications = Arc::new(NotificationLedger::default());
    let feed = Arc::new(FeedLog::default());
    let scheduler = build_scheduler(&directory, &calendar, &notifications);

    println!("Compliance deadline engine demo");
    println!("Evaluation date: {today}");

    let entities = demo_entities();
    println!("\nRegistered entities");
    for entity in &entities {
        directory
            .register(entity.clone())
            .map_err(compliance_ai::workflows::compliance::ScheduleError::from)?;
        println!(
            "- {} ({}, {}) formed {}",
            entity.legal_name,
            entity.entity_type.label(),
            entity.state,
            entity.formation_date
        );
    }

    println!("\nMaterialized obligations");
    let mut primary_created = Vec::new();
    for (index, entity) in entities.iter().enumerate() {
        let created = scheduler.materialize(&entity.id, today)?;
        println!("{} -> {} new entries", entity.legal_name, created.len());
        for entry in &created {
            println!(
                "  - {} due {} [{}]",
                entry.title,
                entry.due_date,
                entry.priority.label()
            );
        }
        if index == 0 {
            primary_created = created;
        }
    }
    let primary = &entities[0];

    let email = RecordingChannel::default();
    let sms = RecordingChannel::default();
    let dispatcher = NotificationDispatcher::new(
        directory.clone(),
        calendar.clone(),
        notifications.clone(),
        feed.clone(),
        Box::new(email.clone()),
        Box::new(sms.clone()),
        scheduler.policy().retry_cap,
    );

    let sweep = dispatcher.dispatch_due(today)?;
    println!("\nReminder sweep");
    println!(
        "- swept {} | sent {} | retrying {} | failed {} | dashboard records {}",
        sweep.swept, sweep.sent, sweep.retrying, sweep.failed, sweep.dashboard_records
    );
    let email_sent = email.sent();
    if email_sent.is_empty() {
        println!("- email deliveries: none due yet");
    } else {
        println!("- email deliveries:");
        for message in &email_sent {
            println!("  - {} -> {}", message.subject, message.recipient);
        }
    }
    let sms_sent = sms.sent();
    if !sms_sent.is_empty() {
        println!("- sms deliveries:");
        for message in &sms_sent {
            println!("  - {} -> {}", message.subject, message.recipient);
        }
    }

    println!("\nCompletion and roll-forward");
    let recurring = primary_created
        .iter()
        .filter(|entry| entry.recurrence.is_some())
        .min_by_key(|entry| entry.due_date);
    match recurring {
        Some(entry) => {
            let outcome = scheduler.complete(&entry.id, today)?;
            println!(
                "- completed {} (was due {}) on {}",
                outcome.entry.title, outcome.entry.due_date, today
            );
            match outcome.rolled {
                Some(rolled) => println!(
                    "- next occurrence scheduled for {} with fresh reminders",
                    rolled.due_date
                ),
                None => println!("- next occurrence was already on the calendar"),
            }
        }
        None => println!("- no recurring entries materialized for {}", primary.legal_name),
    }

    let report = scheduler.report(&primary.id, today)?;
    let summary = report.summary();
    let insights = summary.insights(&report.entity, today, &scheduler.policy().regulatory);
    render_compliance_report(&summary, &insights);

    let items = feed.items();
    println!("\nDashboard feed ({} record(s))", items.len());
    for item in &items {
        println!("- [{}] {}", item.urgency.label(), item.title);
    }

    Ok(())
}

pub(crate) fn render_compliance_report(
    summary: &ComplianceReportSummary,
    insights: &ComplianceInsights,
) {
    println!(
        "\nCompliance report for {} (generated {})",
        summary.legal_name, summary.generated_on
    );

    println!("\nCategory progress");
    for entry in &summary.category_progress {
        println!(
            "- {}: {}/{} completed, {} overdue",
            entry.category_label, entry.completed, entry.total, entry.overdue
        );
    }

    println!("\nPriority load");
    for load in &summary.priority_load {
        println!(
            "- {}: {} open, {} overdue",
            load.priority_label, load.open, load.overdue
        );
    }

    if summary.overdue_entries.is_empty() {
        println!("\nOverdue obligations: none");
    } else {
        println!("\nOverdue obligations");
        for entry in &summary.overdue_entries {
            println!(
                "- {} ({}) due {}, {} day(s) past",
                entry.title,
                entry.category_label,
                entry.due_date,
                -entry.days_until_due
            );
        }
    }

    if !summary.upcoming_entries.is_empty() {
        println!("\nUpcoming obligations");
        for entry in &summary.upcoming_entries {
            println!(
                "- {} due {} (in {} day(s))",
                entry.title, entry.due_date, entry.days_until_due
            );
        }
    }

    println!(
        "\nReminders: {} pending | {} sent | {} failed | {} cancelled",
        summary.reminder_stats.pending,
        summary.reminder_stats.sent,
        summary.reminder_stats.failed,
        summary.reminder_stats.cancelled
    );

    println!(
        "\nStanding: {}% ({})",
        insights.standing_score,
        insights.standing_level.label()
    );
    if let Some(category) = insights.focus_category {
        println!("Focus category: {category}");
    }

    if !insights.observations.is_empty() {
        println!("\nObservations");
        for note in &insights.observations {
            println!("- {note}");
        }
    }

    if !insights.recommended_actions.is_empty() {
        println!("\nRecommended actions");
        for action in &insights.recommended_actions {
            println!("- {action}");
        }
    }

    if !insights.automation_triggers.is_empty() {
        println!("\nAutomation triggers");
        for trigger in &insights.automation_triggers {
            println!("- {trigger}");
        }
    }
}
