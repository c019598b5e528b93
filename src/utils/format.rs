use chrono::NaiveTime;

use crate::models::Reminder;

/// Parse an "HH:MM" time-of-day argument.
pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| anyhow::anyhow!("Bad time '{}' (expected HH:MM): {}", s, e))
}

/// Human description of a reminder schedule: "daily at 09:00",
/// "weekly on Friday at 18:30", or "off".
pub fn format_schedule(reminder: &Reminder) -> String {
    let time = reminder.time.as_deref().unwrap_or("?");
    match (reminder.kind, reminder.day_of_week) {
        (Some(kind), Some(day)) => format!("{} on {} at {}", kind, day, time),
        (Some(kind), None) => format!("{} at {}", kind, time),
        (None, _) => "off".to_string(),
    }
}

/// First characters of a server id, enough to address records from the CLI.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
