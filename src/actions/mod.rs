//! Action handlers: the one place that sequences "mutate the store, call
//! the gateway, revert on failure". Stores are passed in by reference (one
//! shared instance per entity type for the session); they never talk to the
//! network themselves.

pub mod journal;
pub mod prayers;
pub mod profile;
pub mod reminders;

use log::{debug, warn};
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::store::{Entity, EntityStore};

#[derive(Debug, Error)]
pub enum ActionError {
    /// Rejected before any gateway traffic happened.
    #[error("invariant violation: {0}")]
    Invariant(String),
    /// The backend refused a mutation after the optimistic change was
    /// already applied. Every store the action touched has been reverted
    /// to server truth before this error reaches the caller.
    #[error("mutation failed, local changes were reverted")]
    Mutation(#[source] GatewayError),
}

/// Fetch a collection into a store. Failures become store-level error state
/// (the previous, possibly stale items stay visible) rather than an `Err`,
/// since loads happen outside user-initiated mutations.
pub fn load_into<T, F>(store: &mut EntityStore<T>, fetch: F)
where
    T: Entity,
    F: FnOnce() -> Result<Vec<T>, GatewayError>,
{
    let issued = store.version();
    store.mark_loading();
    match fetch() {
        Ok(items) => {
            if !store.replace_if_unchanged_since(issued, items) {
                debug!("dropping fetch result issued against a stale store version");
            }
        }
        Err(err) => {
            warn!("fetch failed: {}", err);
            store.mark_failed(err.to_string());
        }
    }
}

/// Discard local state and refill from server truth. Same machinery as a
/// load; the version guard means a revert issued against an old state will
/// not clobber local edits applied after it.
pub fn revert<T, F>(store: &mut EntityStore<T>, fetch: F)
where
    T: Entity,
    F: FnOnce() -> Result<Vec<T>, GatewayError>,
{
    load_into(store, fetch);
}
