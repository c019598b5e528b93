use log::debug;

use crate::gateway::Gateway;
use crate::models::{Prayer, ReminderWithPrayer, Schedule};
use crate::store::{Entity, EntityStore};

use super::{ActionError, load_into, revert};

pub fn load(gateway: &dyn Gateway, reminders: &mut EntityStore<ReminderWithPrayer>) {
    load_into(reminders, || gateway.fetch_reminders());
}

/// Create or update the schedule of the one reminder a prayer can have.
/// Invariants (weekly needs a day, no schedule means no time) are checked
/// before any gateway traffic. The optimistic path updates an existing
/// entry in place; when none exists yet, the server reply is inserted with
/// the prayer copied from the prayers store.
pub fn set(
    gateway: &dyn Gateway,
    reminders: &mut EntityStore<ReminderWithPrayer>,
    prayers: &EntityStore<Prayer>,
    prayer_id: &str,
    schedule: Schedule,
) -> Result<(), ActionError> {
    schedule.validate().map_err(ActionError::Invariant)?;

    let had_entry = reminders.update_by(
        |r| r.reminder.prayer_id == prayer_id,
        |r| r.apply(&schedule),
    ) > 0;

    match gateway.set_reminder(&schedule.for_prayer(prayer_id)) {
        Ok(reminder) => {
            if !had_entry {
                match prayers.get(prayer_id) {
                    Some(prayer) => reminders.create_local(ReminderWithPrayer {
                        reminder,
                        prayer: prayer.clone(),
                    }),
                    // no local prayer to embed; the next refetch fills it in
                    None => debug!("no cached prayer {} for new reminder", prayer_id),
                }
            }
            Ok(())
        }
        Err(err) => {
            revert(reminders, || gateway.fetch_reminders());
            Err(ActionError::Mutation(err))
        }
    }
}

/// Turn a prayer's reminder off (no schedule, no time, disabled).
pub fn clear(
    gateway: &dyn Gateway,
    reminders: &mut EntityStore<ReminderWithPrayer>,
    prayers: &EntityStore<Prayer>,
    prayer_id: &str,
) -> Result<(), ActionError> {
    set(gateway, reminders, prayers, prayer_id, Schedule::off())
}
