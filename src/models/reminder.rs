use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::Prayer;
use crate::store::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Daily,
    Weekly,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Daily => "daily",
            ReminderKind::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(ReminderKind::Daily),
            "weekly" => Ok(ReminderKind::Weekly),
            _ => Err(anyhow::anyhow!("Unknown reminder kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for DayOfWeek {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" | "mon" => Ok(DayOfWeek::Monday),
            "tuesday" | "tue" => Ok(DayOfWeek::Tuesday),
            "wednesday" | "wed" => Ok(DayOfWeek::Wednesday),
            "thursday" | "thu" => Ok(DayOfWeek::Thursday),
            "friday" | "fri" => Ok(DayOfWeek::Friday),
            "saturday" | "sat" => Ok(DayOfWeek::Saturday),
            "sunday" | "sun" => Ok(DayOfWeek::Sunday),
            _ => Err(anyhow::anyhow!("Unknown day of week: {}", s)),
        }
    }
}

/// A reminder row. `kind = None` means the prayer shows on the reminders
/// screen but has no schedule configured; in that state `time` is also None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub prayer_id: String,
    #[serde(rename = "type")]
    pub kind: Option<ReminderKind>,
    pub day_of_week: Option<DayOfWeek>,
    pub time: Option<String>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A reminder joined with a denormalized copy of its prayer, which is what
/// the reminders listing renders. Keeping the prayer copy in sync with the
/// prayers store is the job of `store::mirror`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderWithPrayer {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub prayer: Prayer,
}

/// Schedule fields of a reminder, without the prayer binding. Also serves as
/// the optimistic patch applied to the reminders store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub kind: Option<ReminderKind>,
    pub time: Option<String>,
    pub day_of_week: Option<DayOfWeek>,
    pub enabled: bool,
}

impl Schedule {
    /// Reject impossible schedules before any gateway traffic.
    pub fn validate(&self) -> Result<(), String> {
        if self.kind == Some(ReminderKind::Weekly) && self.day_of_week.is_none() {
            return Err("weekly reminders require a day of week".to_string());
        }
        if self.kind.is_none() && self.time.is_some() {
            return Err("a reminder with no schedule cannot have a time".to_string());
        }
        Ok(())
    }

    pub fn off() -> Self {
        Self::default()
    }

    pub fn for_prayer(self, prayer_id: impl Into<String>) -> ReminderSchedule {
        ReminderSchedule {
            prayer_id: prayer_id.into(),
            schedule: self,
        }
    }
}

/// What `Gateway::set_reminder` consumes: a schedule bound to one prayer.
/// Upsert semantics on the backend keep at most one reminder per prayer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSchedule {
    pub prayer_id: String,
    pub schedule: Schedule,
}

impl ReminderSchedule {
    pub fn validate(&self) -> Result<(), String> {
        self.schedule.validate()
    }
}

impl Entity for ReminderWithPrayer {
    type Patch = Schedule;

    fn id(&self) -> &str {
        &self.reminder.id
    }

    fn apply(&mut self, patch: &Schedule) {
        self.reminder.kind = patch.kind;
        self.reminder.time = patch.time.clone();
        self.reminder.day_of_week = patch.day_of_week;
        self.reminder.enabled = patch.enabled;
    }
}
