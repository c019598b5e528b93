pub mod mirror;

/// Something an [`EntityStore`] can hold: identified by a server-assigned
/// string id, patchable with a partial-update type.
pub trait Entity {
    type Patch;

    fn id(&self) -> &str;

    /// Merge a partial update into this entity.
    fn apply(&mut self, patch: &Self::Patch);
}

/// Fetch lifecycle of a store. A failed fetch keeps whatever items were
/// already cached — stale-but-present beats blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// An in-memory, owner-scoped cache of one entity collection, ordered
/// newest first. Mutations are synchronous and immediately visible; the
/// store performs no network I/O and has no idea whether the backend
/// accepted a change. Sequencing ("mutate, call the gateway, revert on
/// failure") is the caller's job — see the `actions` module.
///
/// Every content mutation bumps a monotonic version. Refetch results are
/// applied through [`EntityStore::replace_if_unchanged_since`], so a fill
/// issued against an older state can never clobber a newer optimistic
/// mutation.
pub struct EntityStore<T: Entity> {
    items: Vec<T>,
    state: LoadState,
    version: u64,
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
            version: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Version of the current contents. Captured before a fetch is issued,
    /// checked when the result comes back.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Record a fetch failure. Existing items stay visible.
    pub fn mark_failed(&mut self, message: String) {
        self.state = LoadState::Failed(message);
    }

    /// Replace the whole collection with a fresh fetch result.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.state = LoadState::Ready;
        self.version += 1;
    }

    /// Apply a fetch result only if nothing mutated the store since the
    /// fetch was issued. Returns false when the fill was stale and dropped.
    pub fn replace_if_unchanged_since(&mut self, issued: u64, items: Vec<T>) -> bool {
        if self.version != issued {
            return false;
        }
        self.replace_all(items);
        true
    }

    /// Optimistically prepend a freshly created entity (newest first).
    pub fn create_local(&mut self, item: T) {
        self.items.insert(0, item);
        self.version += 1;
    }

    /// Optimistically merge a partial update into the entity with the given
    /// id. No-op (returns false) when the id is absent.
    pub fn update_local(&mut self, id: &str, patch: &T::Patch) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.apply(patch);
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Optimistically remove the entity with the given id.
    pub fn delete_local(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.items.len() != before {
            self.version += 1;
            true
        } else {
            false
        }
    }

    /// Mutate every entity matching a predicate. Used where a store is
    /// keyed by something other than the entity id (the reminders store is
    /// addressed by prayer id in several flows). Returns the match count.
    pub fn update_by<P, F>(&mut self, mut pred: P, mut f: F) -> usize
    where
        P: FnMut(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut touched = 0;
        for item in self.items.iter_mut().filter(|item| pred(item)) {
            f(item);
            touched += 1;
        }
        if touched > 0 {
            self.version += 1;
        }
        touched
    }

    /// Remove every entity matching a predicate. Returns the removed count.
    pub fn delete_by<P>(&mut self, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        let removed = before - self.items.len();
        if removed > 0 {
            self.version += 1;
        }
        removed
    }
}
