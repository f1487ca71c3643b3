use chrono::{Duration, Months, NaiveDate};

use super::super::domain::{BusinessEntity, EntityType, EventCategory, EventPriority};
use super::super::policy::RegulatoryWindows;
use super::views::{ComplianceInsights, ComplianceReportSummary, StandingLevel};

pub(crate) fn generate_insights(
    summary: &ComplianceReportSummary,
    entity: &BusinessEntity,
    today: NaiveDate,
    regulatory: &RegulatoryWindows,
) -> ComplianceInsights {
    let total: usize = summary
        .category_progress
        .iter()
        .map(|entry| entry.total)
        .sum();
    let completed: usize = summary
        .category_progress
        .iter()
        .map(|entry| entry.completed)
        .sum();
    let cancelled: usize = summary
        .category_progress
        .iter()
        .map(|entry| entry.cancelled)
        .sum();
    let open_obligations = total.saturating_sub(completed + cancelled);
    let overdue_obligations = summary.overdue_entries.len();
    let failed_reminders = summary.reminder_stats.failed;

    let mut penalty = 0u32;
    for snapshot in &summary.overdue_entries {
        penalty += match snapshot.priority {
            EventPriority::High => 20,
            EventPriority::Medium => 12,
            EventPriority::Low => 6,
        };
    }
    penalty += failed_reminders as u32 * 5;
    let standing_score = 100u32.saturating_sub(penalty).min(100) as u8;

    let standing_level = if standing_score >= 90 && overdue_obligations == 0 {
        StandingLevel::GoodStanding
    } else if standing_score >= 70 {
        StandingLevel::Monitor
    } else if standing_score >= 40 {
        StandingLevel::AtRisk
    } else {
        StandingLevel::Delinquent
    };

    let focus_category = summary
        .category_progress
        .iter()
        .filter(|entry| entry.total > entry.completed + entry.cancelled)
        .max_by_key(|entry| entry.total - entry.completed - entry.cancelled);
    let focus_category_label = focus_category.map(|entry| entry.category_label);

    let next_deadline = summary.upcoming_entries.first();
    let election_gap = overdue_election(summary, entity);
    let relief_deadline = late_election_relief_deadline(entity.formation_date, regulatory);

    let mut observations = Vec::new();
    if total > 0 {
        observations.push(format!(
            "{completed} of {total} obligations completed, {open_obligations} open"
        ));
    }

    if overdue_obligations > 0 {
        if let Some(oldest) = summary.overdue_entries.first() {
            observations.push(format!(
                "{} obligation(s) overdue, oldest due {}",
                overdue_obligations, oldest.due_date
            ));
        }
    }

    if failed_reminders > 0 {
        observations.push(format!(
            "{failed_reminders} reminder(s) exhausted their delivery attempts"
        ));
    }

    if let Some(entry) = next_deadline {
        observations.push(format!(
            "Next deadline: {} on {}",
            entry.title, entry.due_date
        ));
    }

    if election_gap {
        if let Some(deadline) = relief_deadline {
            if today <= deadline {
                observations.push(format!(
                    "The S corporation election window has passed; late election relief \
                     remains open until {} ({} years and {} days from formation)",
                    deadline,
                    regulatory.late_election_relief_years,
                    regulatory.late_election_relief_days
                ));
            } else {
                observations.push(format!(
                    "The late election relief window closed on {deadline}; a private letter \
                     ruling is now required"
                ));
            }
        }
    }

    let mut recommended_actions = Vec::new();
    if let Some(entry) = focus_category {
        let outstanding = entry.total - entry.completed - entry.cancelled;
        recommended_actions.push(format!(
            "Concentrate on {} ({} open filing{})",
            entry.category_label,
            outstanding,
            if outstanding == 1 { "" } else { "s" }
        ));

        match entry.category {
            EventCategory::Tax => {
                recommended_actions.push(
                    "Confirm estimated payment amounts with the accountant before the \
                     installment date"
                        .to_string(),
                );
            }
            EventCategory::StateFiling => {
                recommended_actions.push(
                    "Prepare the state filing packet and confirm registered agent details"
                        .to_string(),
                );
            }
            EventCategory::FederalFiling => {
                recommended_actions.push(
                    "Gather ownership and election documents ahead of the federal submission"
                        .to_string(),
                );
            }
            EventCategory::Licensing => {
                recommended_actions.push(
                    "Audit license renewals against current operating locations".to_string(),
                );
            }
            EventCategory::Governance => {
                recommended_actions.push(
                    "Schedule the governance review and refresh corporate records".to_string(),
                );
            }
        }
    }

    if overdue_obligations > 0 {
        recommended_actions
            .push("Escalate overdue filings to the compliance lead with a catch-up plan".to_string());
    }

    if failed_reminders > 0 {
        recommended_actions.push(format!(
            "Verify contact details on file; {failed_reminders} reminder(s) could not be \
             delivered"
        ));
    }

    if election_gap && relief_deadline.map(|deadline| today <= deadline).unwrap_or(false) {
        recommended_actions.push(
            "File Form 2553 with a reasonable cause statement under the late election relief \
             procedure"
                .to_string(),
        );
    }

    let mut automation_triggers = Vec::new();
    for entry in &summary.category_progress {
        let outstanding = entry.total.saturating_sub(entry.completed + entry.cancelled);
        if outstanding > 0 {
            automation_triggers.push(format!(
                "Auto-remind {} owners of {} open filing{}",
                entry.category_label,
                outstanding,
                if outstanding == 1 { "" } else { "s" }
            ));
        }
    }

    if overdue_obligations > 0 {
        automation_triggers
            .push("Escalate reminder urgency for overdue filings across channels".to_string());
    }

    if observations.is_empty() {
        observations.push("No compliance gaps detected; maintain the current cadence".to_string());
    }

    ComplianceInsights {
        standing_score,
        standing_level,
        open_obligations,
        overdue_obligations,
        next_deadline: next_deadline.map(|entry| entry.due_date),
        next_deadline_title: next_deadline.map(|entry| entry.title.clone()),
        focus_category: focus_category_label,
        observations,
        recommended_actions,
        automation_triggers,
    }
}

fn overdue_election(summary: &ComplianceReportSummary, entity: &BusinessEntity) -> bool {
    entity.entity_type == EntityType::SCorporation
        && summary
            .overdue_entries
            .iter()
            .any(|entry| entry.event_type == "s_corp_election")
}

fn late_election_relief_deadline(
    formation: NaiveDate,
    regulatory: &RegulatoryWindows,
) -> Option<NaiveDate> {
    let years = u32::try_from(regulatory.late_election_relief_years).ok()?;
    formation
        .checked_add_months(Months::new(years * 12))
        .map(|date| date + Duration::days(regulatory.late_election_relief_days))
}
