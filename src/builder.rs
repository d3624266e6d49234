use crate::{
    iterator::{Iter, Keys, Values},
    map::Map,
    node::Node,
    owner::{Owned, Owner},
    utilities::hash_key,
};
use log::trace;
use std::{
    borrow::Borrow,
    fmt::{self, Debug, Formatter},
    hash::Hash,
    sync::Arc,
};

/// Builder of a map which edits nodes in place.
///
/// A builder copies each shared node at most once and mutates its own
/// copies afterwards, so that a batch of edits costs far fewer allocations
/// than the same edits on a map. A builder is not meant to be shared; it
/// is consumed by [`Builder::build`].
pub struct Builder<K, V> {
    owner: Owner,
    size: usize,
    root: Arc<Node<K, V>>,
}

impl<K: Clone + Hash + Eq, V: Clone> Builder<K, V> {
    /// Creates a builder of an empty map.
    pub fn new() -> Self {
        Map::new().into()
    }

    /// Returns a size of a map being built.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if a map being built is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Finds a value corresponding to a key.
    pub fn get<Q: Hash + Eq + ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        self.root.get(hash_key(key), key, 0)
    }

    /// Checks if a key is contained in a map being built.
    pub fn contains_key<Q: Hash + Eq + ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.get(key).is_some()
    }

    /// Returns key-value pairs in a map being built.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.size)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Inserts a key-value pair and returns a previous value if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash_key(&key);
        let previous = Node::make_mut_for(&mut self.root, self.owner)
            .insert_mut(hash, key, value, 0, self.owner);

        if previous.is_none() {
            self.size += 1;
        }

        previous
    }

    /// Removes a key and returns its value if any.
    pub fn remove<Q: Hash + Eq + ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
    {
        self.remove_if(key, &|_| true)
    }

    /// Removes a key only if it is bound to a given value.
    pub fn remove_matching<Q: Hash + Eq + ?Sized>(&mut self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        V: PartialEq,
    {
        self.remove_if(key, &|other| other == value).is_some()
    }

    fn remove_if<Q: Hash + Eq + ?Sized>(
        &mut self,
        key: &Q,
        predicate: &impl Fn(&V) -> bool,
    ) -> Option<V>
    where
        K: Borrow<Q>,
    {
        let hash = hash_key(key);

        // Nodes on the path are copied only if there is something to remove.
        if !self.root.get(hash, key, 0).is_some_and(predicate) {
            return None;
        }

        let value = Node::make_mut_for(&mut self.root, self.owner)
            .remove_mut(hash, key, 0, self.owner, predicate)?;

        self.size -= 1;

        Some(value)
    }

    /// Finishes a builder into a map.
    pub fn build(self) -> Map<K, V> {
        trace!("builder {} closed with {} entries", self.owner.id(), self.size);

        Map::from_parts(self.size, self.root)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Default for Builder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<Map<K, V>> for Builder<K, V> {
    fn from(map: Map<K, V>) -> Self {
        let owner = Owner::new();
        let (size, root) = map.into_parts();

        trace!("builder {} opened with {} entries", owner.id(), size);

        Self { owner, size, root }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Extend<(K, V)> for Builder<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterator: I) {
        for (key, value) in iterator {
            self.insert(key, value);
        }
    }
}

impl<K: Debug, V: Debug> Debug for Builder<K, V> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter
            .debug_map()
            .entries(Iter::new(&self.root, self.size))
            .finish()
    }
}
