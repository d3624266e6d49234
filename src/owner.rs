use std::{
    num::NonZeroU64,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of a builder session.
///
/// A node stamped with an owner may be mutated in place by the builder that
/// holds the same owner. Owners are never reused, so stamps left in nodes of
/// a built map can not match any later session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Owner(NonZeroU64);

impl Owner {
    pub fn new() -> Self {
        let id = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);

        Self(NonZeroU64::new(id).unwrap_or_else(|| unreachable!("owner ids exhausted")))
    }

    pub fn id(&self) -> u64 {
        self.0.get()
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trie parts that a builder can take over for in-place edits.
pub trait Owned: Clone {
    fn owner(&self) -> Option<Owner>;
    fn cloned_for(&self, owner: Owner) -> Self;

    fn ensure_owned_by(&self, owner: Owner) {
        if self.owner() != Some(owner) {
            panic!("node not owned by builder {}", owner.id());
        }
    }

    /// Returns a mutable reference to a part owned by `owner`, cloning the
    /// shared part into a stamped copy the first time.
    fn make_mut_for(this: &mut Arc<Self>, owner: Owner) -> &mut Self {
        if this.owner() != Some(owner) {
            *this = Arc::new(this.cloned_for(owner));
        }

        match Arc::get_mut(this) {
            Some(part) => part,
            None => panic!("node owned by builder {} is shared", owner.id()),
        }
    }
}
