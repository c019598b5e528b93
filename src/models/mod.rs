pub mod journal;
pub mod prayer;
pub mod profile;
pub mod reminder;
pub mod tag;

pub use journal::{Journal, JournalPatch, NewJournal};
pub use prayer::{NewPrayer, Prayer, PrayerPatch};
pub use profile::{Profile, ProfilePatch};
pub use reminder::{
    DayOfWeek, Reminder, ReminderKind, ReminderSchedule, ReminderWithPrayer, Schedule,
};
pub use tag::Tag;
