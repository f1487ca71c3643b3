use std::fmt::Write as _;

use super::domain::{CalendarEntry, ReminderUrgency};

/// Channel-agnostic reminder payload. Channels decide transport; the copy is
/// composed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Compose the reminder copy for one notification. The urgency tier colors
/// the tone only; it never decides whether the reminder goes out.
pub(crate) fn compose(
    entry: &CalendarEntry,
    legal_name: &str,
    recipient: &str,
    urgency: ReminderUrgency,
    days_until_due: i64,
) -> OutboundMessage {
    let due_phrase = due_phrase(days_until_due);
    let subject = match urgency {
        ReminderUrgency::Urgent => format!("URGENT: {} due {}", entry.title, due_phrase),
        ReminderUrgency::High => format!("Action needed: {} due {}", entry.title, due_phrase),
        ReminderUrgency::Medium => {
            format!("Upcoming deadline: {} due {}", entry.title, due_phrase)
        }
        ReminderUrgency::Low => format!("Reminder: {} due {}", entry.title, due_phrase),
    };

    let mut body = String::new();
    writeln!(
        &mut body,
        "{} has a compliance deadline {}.",
        legal_name, due_phrase
    )
    .expect("write opening line");
    writeln!(
        &mut body,
        "{} ({}) is due on {}.",
        entry.title,
        entry.category.label(),
        entry.due_date.format("%B %d, %Y")
    )
    .expect("write deadline line");
    writeln!(&mut body, "Priority: {}.", entry.priority.label()).expect("write priority line");

    let closing = match urgency {
        ReminderUrgency::Urgent => {
            "This filing is due within one day. Complete it now to avoid late penalties."
        }
        ReminderUrgency::High => "Complete this filing this week to stay in good standing.",
        ReminderUrgency::Medium => "Plan time over the next two weeks to complete this filing.",
        ReminderUrgency::Low => "No immediate action required; the deadline is on your calendar.",
    };
    writeln!(&mut body, "{closing}").expect("write closing line");

    OutboundMessage {
        recipient: recipient.to_string(),
        subject,
        body,
    }
}

fn due_phrase(days_until_due: i64) -> String {
    match days_until_due {
        d if d < -1 => format!("{} days ago", -d),
        -1 => "yesterday".to_string(),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d => format!("in {d} days"),
    }
}
