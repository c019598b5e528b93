use crate::gateway::Gateway;
use crate::models::{NewPrayer, Prayer, PrayerPatch, ReminderWithPrayer, Schedule};
use crate::store::{EntityStore, mirror};

use super::{ActionError, load_into, revert};

/// Record counts below this are filtered client-side over the fetched set;
/// at or above it, a tag change goes back to the server with a scoped query.
pub const TAG_FILTER_THRESHOLD: usize = 100;

/// Client/server tag-filtering switch. The unfiltered total is refreshed
/// only when an unfiltered fetch happens, so the mode can flip only on
/// those refreshes, not as records trickle in.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    total: usize,
    selected: Option<String>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn server_side(&self) -> bool {
        self.total >= TAG_FILTER_THRESHOLD
    }

    fn note_unfiltered_total(&mut self, total: usize) {
        self.total = total;
    }
}

/// Full (unfiltered) fetch. Refreshes the filter's total on success.
pub fn load(gateway: &dyn Gateway, prayers: &mut EntityStore<Prayer>, filter: &mut TagFilter) {
    load_into(prayers, || gateway.fetch_prayers(None));
    if prayers.is_ready() {
        filter.note_unfiltered_total(prayers.len());
    }
}

/// Change the selected tag. Below the threshold this touches no network —
/// the in-memory set is filtered by [`visible`]. At or above it, the store
/// is refilled with a server-scoped fetch.
pub fn select_tag(
    gateway: &dyn Gateway,
    prayers: &mut EntityStore<Prayer>,
    filter: &mut TagFilter,
    tag: Option<String>,
) {
    filter.selected = tag;
    if !filter.server_side() {
        return;
    }
    match filter.selected.clone() {
        Some(tag_id) => load_into(prayers, || gateway.fetch_prayers(Some(&tag_id))),
        None => {
            load_into(prayers, || gateway.fetch_prayers(None));
            if prayers.is_ready() {
                filter.note_unfiltered_total(prayers.len());
            }
        }
    }
}

/// The prayers the current filter exposes. In server mode the store already
/// holds the scoped set; in client mode the predicate runs here.
pub fn visible<'a>(prayers: &'a EntityStore<Prayer>, filter: &TagFilter) -> Vec<&'a Prayer> {
    match (filter.server_side(), filter.selected()) {
        (false, Some(tag_id)) => prayers
            .items()
            .iter()
            .filter(|p| p.tag_id.as_deref() == Some(tag_id))
            .collect(),
        _ => prayers.items().iter().collect(),
    }
}

/// Create a prayer, optionally with a reminder schedule. The gateway call
/// comes first because the server assigns the id the reminder references;
/// the optimistic insert follows immediately. A failed reminder call is
/// treated as a failed compound operation: both stores revert.
pub fn create(
    gateway: &dyn Gateway,
    prayers: &mut EntityStore<Prayer>,
    reminders: &mut EntityStore<ReminderWithPrayer>,
    new: NewPrayer,
    schedule: Option<Schedule>,
) -> Result<Prayer, ActionError> {
    if let Some(schedule) = &schedule {
        schedule.validate().map_err(ActionError::Invariant)?;
    }

    let prayer = gateway.create_prayer(&new).map_err(ActionError::Mutation)?;
    prayers.create_local(prayer.clone());

    if let Some(schedule) = schedule {
        match gateway.set_reminder(&schedule.for_prayer(&prayer.id)) {
            Ok(reminder) => {
                reminders.create_local(ReminderWithPrayer {
                    reminder,
                    prayer: prayer.clone(),
                });
            }
            Err(err) => {
                revert(prayers, || gateway.fetch_prayers(None));
                revert(reminders, || gateway.fetch_reminders());
                return Err(ActionError::Mutation(err));
            }
        }
    }

    Ok(prayer)
}

/// Update a prayer's fields, keeping the reminders store's denormalized
/// copy in step so both list views stay consistent without a refetch.
pub fn update(
    gateway: &dyn Gateway,
    prayers: &mut EntityStore<Prayer>,
    reminders: &mut EntityStore<ReminderWithPrayer>,
    id: &str,
    patch: &PrayerPatch,
) -> Result<Prayer, ActionError> {
    prayers.update_local(id, patch);
    mirror::patch_prayer_copies(reminders, id, patch);

    match gateway.update_prayer(id, patch) {
        Ok(prayer) => Ok(prayer),
        Err(err) => {
            revert(prayers, || gateway.fetch_prayers(None));
            revert(reminders, || gateway.fetch_reminders());
            Err(ActionError::Mutation(err))
        }
    }
}

/// Delete a prayer. Both stores lose their entries in the same synchronous
/// pass, before the gateway call resolves; the backend cascades the
/// reminder row on its side.
pub fn delete(
    gateway: &dyn Gateway,
    prayers: &mut EntityStore<Prayer>,
    reminders: &mut EntityStore<ReminderWithPrayer>,
    id: &str,
) -> Result<(), ActionError> {
    prayers.delete_local(id);
    mirror::drop_prayer_copies(reminders, id);

    if let Err(err) = gateway.delete_prayer(id) {
        revert(prayers, || gateway.fetch_prayers(None));
        revert(reminders, || gateway.fetch_reminders());
        return Err(ActionError::Mutation(err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::reminders as reminder_actions;
    use crate::gateway::mock::MockGateway;
    use crate::models::ReminderKind;

    fn new_prayer(title: &str) -> NewPrayer {
        NewPrayer {
            title: title.to_string(),
            ..NewPrayer::default()
        }
    }

    fn loaded_stores(
        gateway: &MockGateway,
    ) -> (
        EntityStore<Prayer>,
        EntityStore<ReminderWithPrayer>,
        TagFilter,
    ) {
        let mut prayers = EntityStore::new();
        let mut reminders = EntityStore::new();
        let mut filter = TagFilter::new();
        load(gateway, &mut prayers, &mut filter);
        reminder_actions::load(gateway, &mut reminders);
        (prayers, reminders, filter)
    }

    #[test]
    fn create_makes_the_prayer_visible_without_a_refetch() {
        let gateway = MockGateway::new();
        let (mut prayers, mut reminders, _) = loaded_stores(&gateway);
        let fetches_before = gateway.prayer_fetches().len();

        let created = create(&gateway, &mut prayers, &mut reminders, new_prayer("Test"), None)
            .expect("create should succeed");

        assert_eq!(prayers.items()[0].title, "Test");
        assert_eq!(prayers.get(&created.id).unwrap().title, "Test");
        assert_eq!(gateway.prayer_fetches().len(), fetches_before);
    }

    #[test]
    fn failed_delete_reverts_to_server_truth() {
        // The spec's walk-through scenario: create "Test", then a delete
        // the backend refuses; the optimistic removal must snap back.
        let gateway = MockGateway::new();
        let (mut prayers, mut reminders, _) = loaded_stores(&gateway);
        let created = create(&gateway, &mut prayers, &mut reminders, new_prayer("Test"), None)
            .expect("create should succeed");
        assert_eq!(prayers.len(), 1);

        gateway.fail_next("delete_prayer");
        let result = delete(&gateway, &mut prayers, &mut reminders, &created.id);

        assert!(matches!(result, Err(ActionError::Mutation(_))));
        assert_eq!(prayers.len(), 1);
        assert_eq!(prayers.items()[0].title, "Test");
        assert_eq!(prayers.items(), gateway.server_prayers().as_slice());
    }

    #[test]
    fn delete_clears_both_stores_in_the_same_pass() {
        let gateway = MockGateway::new();
        let prayer = gateway.seed_prayer("Guidance");
        let (mut prayers, mut reminders, _) = loaded_stores(&gateway);
        assert_eq!(reminders.len(), 1);
        let prayer_fetches = gateway.prayer_fetches().len();
        let reminder_fetches = gateway.reminder_fetches();

        delete(&gateway, &mut prayers, &mut reminders, &prayer.id)
            .expect("delete should succeed");

        assert!(prayers.is_empty());
        assert!(reminders.is_empty());
        // a successful delete never refetches either store
        assert_eq!(gateway.prayer_fetches().len(), prayer_fetches);
        assert_eq!(gateway.reminder_fetches(), reminder_fetches);
    }

    #[test]
    fn update_keeps_the_denormalized_reminder_copy_in_step() {
        let gateway = MockGateway::new();
        let prayer = gateway.seed_prayer("old title");
        let (mut prayers, mut reminders, _) = loaded_stores(&gateway);

        let patch = PrayerPatch {
            title: Some("new title".to_string()),
            ..PrayerPatch::default()
        };
        update(&gateway, &mut prayers, &mut reminders, &prayer.id, &patch)
            .expect("update should succeed");

        assert_eq!(prayers.get(&prayer.id).unwrap().title, "new title");
        assert_eq!(reminders.items()[0].prayer.title, "new title");
    }

    #[test]
    fn failed_update_reverts_both_stores() {
        let gateway = MockGateway::new();
        let prayer = gateway.seed_prayer("old title");
        let (mut prayers, mut reminders, _) = loaded_stores(&gateway);

        gateway.fail_next("update_prayer");
        let patch = PrayerPatch {
            title: Some("new title".to_string()),
            ..PrayerPatch::default()
        };
        let result = update(&gateway, &mut prayers, &mut reminders, &prayer.id, &patch);

        assert!(matches!(result, Err(ActionError::Mutation(_))));
        assert_eq!(prayers.get(&prayer.id).unwrap().title, "old title");
        assert_eq!(reminders.items()[0].prayer.title, "old title");
    }

    #[test]
    fn failed_reminder_during_create_reverts_the_compound_operation() {
        let gateway = MockGateway::new();
        let (mut prayers, mut reminders, _) = loaded_stores(&gateway);

        gateway.fail_next("set_reminder");
        let schedule = Schedule {
            kind: Some(ReminderKind::Daily),
            time: Some("09:00".to_string()),
            day_of_week: None,
            enabled: true,
        };
        let result = create(
            &gateway,
            &mut prayers,
            &mut reminders,
            new_prayer("Test"),
            Some(schedule),
        );

        assert!(matches!(result, Err(ActionError::Mutation(_))));
        // both stores were refilled from server truth (the prayer itself
        // committed before the reminder call failed)
        assert_eq!(prayers.items(), gateway.server_prayers().as_slice());
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders.items()[0].reminder.kind, None);
    }

    #[test]
    fn below_threshold_tag_changes_filter_in_memory() {
        let gateway = MockGateway::new();
        gateway.seed_tagged_prayers(98, "t1");
        gateway.seed_prayer("untagged");
        let mut prayers = EntityStore::new();
        let mut filter = TagFilter::new();
        load(&gateway, &mut prayers, &mut filter);
        assert_eq!(prayers.len(), 99);
        assert!(!filter.server_side());

        select_tag(&gateway, &mut prayers, &mut filter, Some("t1".to_string()));

        assert_eq!(gateway.prayer_fetches().len(), 1);
        assert_eq!(visible(&prayers, &filter).len(), 98);
        // the full set stays cached; clearing the tag needs no fetch either
        select_tag(&gateway, &mut prayers, &mut filter, None);
        assert_eq!(gateway.prayer_fetches().len(), 1);
        assert_eq!(visible(&prayers, &filter).len(), 99);
    }

    #[test]
    fn at_threshold_tag_changes_fetch_server_side() {
        let gateway = MockGateway::new();
        gateway.seed_tagged_prayers(100, "t1");
        let mut prayers = EntityStore::new();
        let mut filter = TagFilter::new();
        load(&gateway, &mut prayers, &mut filter);
        assert!(filter.server_side());

        select_tag(&gateway, &mut prayers, &mut filter, Some("t1".to_string()));

        let fetches = gateway.prayer_fetches();
        assert_eq!(fetches.len(), 2);
        assert_eq!(fetches[1].as_deref(), Some("t1"));
        assert_eq!(visible(&prayers, &filter).len(), 100);

        // clearing the tag in server mode refetches unfiltered and
        // refreshes the total
        select_tag(&gateway, &mut prayers, &mut filter, None);
        assert_eq!(gateway.prayer_fetches().len(), 3);
        assert_eq!(gateway.prayer_fetches()[2], None);
    }
}
