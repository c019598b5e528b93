pub mod http;
#[cfg(test)]
pub mod mock;

use thiserror::Error;

use crate::models::{
    Journal, JournalPatch, NewJournal, NewPrayer, Prayer, PrayerPatch, Profile, ProfilePatch,
    Reminder, ReminderSchedule, ReminderWithPrayer, Tag,
};

pub use http::HttpGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("backend returned no data")]
    EmptyReply,
    #[error("could not decode backend reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The remote CRUD surface this client consumes. The backend owns durable
/// state and per-owner authorization; every call here is already scoped to
/// the configured owner.
///
/// Deleting a prayer cascades to its reminder row on the backend. Journal
/// links to prayers are advisory and do not cascade.
pub trait Gateway {
    /// Fetch the owner's prayers, newest first. `tag` scopes the query
    /// server-side; `None` fetches the full collection.
    fn fetch_prayers(&self, tag: Option<&str>) -> Result<Vec<Prayer>, GatewayError>;
    fn create_prayer(&self, new: &NewPrayer) -> Result<Prayer, GatewayError>;
    fn update_prayer(&self, id: &str, patch: &PrayerPatch) -> Result<Prayer, GatewayError>;
    fn delete_prayer(&self, id: &str) -> Result<(), GatewayError>;

    fn fetch_journals(&self) -> Result<Vec<Journal>, GatewayError>;
    fn create_journal(&self, new: &NewJournal) -> Result<Journal, GatewayError>;
    fn update_journal(&self, id: &str, patch: &JournalPatch) -> Result<Journal, GatewayError>;
    fn delete_journal(&self, id: &str) -> Result<(), GatewayError>;

    /// Fetch reminders with their prayer embedded, newest first.
    fn fetch_reminders(&self) -> Result<Vec<ReminderWithPrayer>, GatewayError>;
    /// Create or update the one reminder for a prayer. At most one reminder
    /// per prayer is enforced by this call, not by a visible constraint.
    fn set_reminder(&self, schedule: &ReminderSchedule) -> Result<Reminder, GatewayError>;

    fn fetch_profile(&self) -> Result<Profile, GatewayError>;
    fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, GatewayError>;

    fn fetch_tags(&self) -> Result<Vec<Tag>, GatewayError>;
}
