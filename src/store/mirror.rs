//! Cross-store denormalization, made explicit.
//!
//! The reminders store keeps a copy of each reminder's prayer so the
//! reminders listing can render titles and tags without a second fetch.
//! Every write path that touches a Prayer must also update those copies,
//! and this module is the one place that knows about them. A new store that
//! caches Prayer fields gets its sync function added here, nowhere else.

use crate::models::{PrayerPatch, ReminderWithPrayer};
use crate::store::{Entity, EntityStore};

/// Merge a prayer update into every denormalized copy of that prayer.
/// Returns the number of copies touched.
pub fn patch_prayer_copies(
    reminders: &mut EntityStore<ReminderWithPrayer>,
    prayer_id: &str,
    patch: &PrayerPatch,
) -> usize {
    reminders.update_by(
        |r| r.prayer.id == prayer_id,
        |r| r.prayer.apply(patch),
    )
}

/// Drop every reminder entry that references a deleted prayer. Mirrors the
/// backend's cascade so both stores change in the same synchronous pass.
pub fn drop_prayer_copies(
    reminders: &mut EntityStore<ReminderWithPrayer>,
    prayer_id: &str,
) -> usize {
    reminders.delete_by(|r| r.reminder.prayer_id == prayer_id)
}
