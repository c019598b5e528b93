use crate::gateway::Gateway;
use crate::models::{Profile, ProfilePatch};
use crate::store::EntityStore;

use super::{ActionError, load_into, revert};

/// The profile store holds at most one record (the owner's).
pub fn load(gateway: &dyn Gateway, profile: &mut EntityStore<Profile>) {
    load_into(profile, || gateway.fetch_profile().map(|p| vec![p]));
}

pub fn current(profile: &EntityStore<Profile>) -> Option<&Profile> {
    profile.items().first()
}

pub fn update(
    gateway: &dyn Gateway,
    profile: &mut EntityStore<Profile>,
    patch: &ProfilePatch,
) -> Result<Profile, ActionError> {
    profile.update_by(|_| true, |p| crate::store::Entity::apply(p, patch));
    match gateway.update_profile(patch) {
        Ok(updated) => Ok(updated),
        Err(err) => {
            revert(profile, || gateway.fetch_profile().map(|p| vec![p]));
            Err(ActionError::Mutation(err))
        }
    }
}
