use crate::gateway::Gateway;
use crate::models::{Journal, JournalPatch, NewJournal};
use crate::store::EntityStore;

use super::{ActionError, load_into, revert};

pub fn load(gateway: &dyn Gateway, journals: &mut EntityStore<Journal>) {
    load_into(journals, || gateway.fetch_journals());
}

/// Create an entry. The gateway call comes first (the server assigns the
/// id); nothing optimistic happens before it, so a failure here has nothing
/// to revert.
pub fn create(
    gateway: &dyn Gateway,
    journals: &mut EntityStore<Journal>,
    new: NewJournal,
) -> Result<Journal, ActionError> {
    let journal = gateway.create_journal(&new).map_err(ActionError::Mutation)?;
    journals.create_local(journal.clone());
    Ok(journal)
}

pub fn update(
    gateway: &dyn Gateway,
    journals: &mut EntityStore<Journal>,
    id: &str,
    patch: &JournalPatch,
) -> Result<Journal, ActionError> {
    journals.update_local(id, patch);
    match gateway.update_journal(id, patch) {
        Ok(journal) => Ok(journal),
        Err(err) => {
            revert(journals, || gateway.fetch_journals());
            Err(ActionError::Mutation(err))
        }
    }
}

pub fn delete(
    gateway: &dyn Gateway,
    journals: &mut EntityStore<Journal>,
    id: &str,
) -> Result<(), ActionError> {
    journals.delete_local(id);
    if let Err(err) = gateway.delete_journal(id) {
        revert(journals, || gateway.fetch_journals());
        return Err(ActionError::Mutation(err));
    }
    Ok(())
}

/// Entries linked to a prayer. The link is advisory: a deleted prayer
/// leaves its entries (and their dangling link) behind.
pub fn linked_to<'a>(journals: &'a EntityStore<Journal>, prayer_id: &str) -> Vec<&'a Journal> {
    journals
        .items()
        .iter()
        .filter(|j| j.linked_prayer_id.as_deref() == Some(prayer_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;

    fn entry(content: &str, prayer: Option<&str>) -> NewJournal {
        NewJournal {
            content: content.to_string(),
            date: "2025-06-01".to_string(),
            linked_prayer_id: prayer.map(|p| p.to_string()),
        }
    }

    #[test]
    fn created_entry_is_visible_immediately() {
        let gateway = MockGateway::new();
        let mut journals = EntityStore::new();
        load(&gateway, &mut journals);

        create(&gateway, &mut journals, entry("grateful today", None))
            .expect("create should succeed");

        assert_eq!(journals.len(), 1);
        assert_eq!(journals.items()[0].content, "grateful today");
    }

    #[test]
    fn failed_update_reverts_to_server_truth() {
        let gateway = MockGateway::new();
        let mut journals = EntityStore::new();
        load(&gateway, &mut journals);
        let journal = create(&gateway, &mut journals, entry("first draft", None))
            .expect("create should succeed");

        gateway.fail_next("update_journal");
        let patch = JournalPatch {
            content: Some("second draft".to_string()),
            ..JournalPatch::default()
        };
        let result = update(&gateway, &mut journals, &journal.id, &patch);

        assert!(matches!(result, Err(ActionError::Mutation(_))));
        assert_eq!(journals.items()[0].content, "first draft");
    }

    #[test]
    fn failed_delete_restores_the_entry() {
        let gateway = MockGateway::new();
        let mut journals = EntityStore::new();
        load(&gateway, &mut journals);
        let journal = create(&gateway, &mut journals, entry("keep me", None))
            .expect("create should succeed");

        gateway.fail_next("delete_journal");
        let result = delete(&gateway, &mut journals, &journal.id);

        assert!(matches!(result, Err(ActionError::Mutation(_))));
        assert_eq!(journals.len(), 1);
    }

    #[test]
    fn prayer_links_are_advisory_and_survive_prayer_deletion() {
        let gateway = MockGateway::new();
        let prayer = gateway.seed_prayer("Guidance");
        let mut journals = EntityStore::new();
        load(&gateway, &mut journals);
        create(&gateway, &mut journals, entry("linked", Some(&prayer.id)))
            .expect("create should succeed");
        gateway
            .delete_prayer(&prayer.id)
            .expect("delete should succeed");

        // the entry keeps its dangling link; nothing cleans it up
        let linked = linked_to(&journals, &prayer.id);
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].content, "linked");
    }
}
