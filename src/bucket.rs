use crate::{
    key_value::KeyValue,
    owner::{Owned, Owner},
    trie::{Modification, Removal},
};
use std::borrow::Borrow;

/// Collision bucket below the deepest compact level.
///
/// Keys in a bucket share their whole 32-bit hash and are told apart by
/// equality only.
#[derive(Clone, Debug)]
pub struct Bucket<K, V> {
    entries: Vec<KeyValue<K, V>>,
    owner: Option<Owner>,
}

impl<K, V> Bucket<K, V> {
    pub fn new(first: KeyValue<K, V>, second: KeyValue<K, V>, owner: Option<Owner>) -> Self {
        Self {
            entries: vec![first, second],
            owner,
        }
    }

    pub fn entries(&self) -> &[KeyValue<K, V>] {
        &self.entries
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn single_entry(&self) -> Option<&KeyValue<K, V>> {
        match self.entries.as_slice() {
            [entry] => Some(entry),
            _ => None,
        }
    }

    pub fn take_single_entry(&mut self) -> Option<KeyValue<K, V>> {
        if self.entries.len() == 1 {
            self.entries.pop()
        } else {
            None
        }
    }
}

impl<K: Eq, V> Bucket<K, V> {
    fn find_index<Q: Eq + ?Sized>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
    {
        self.entries
            .iter()
            .position(|entry| entry.key().borrow() == key)
    }

    pub fn get<Q: Eq + ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        self.find_index(key).map(|index| self.entries[index].value())
    }
}

impl<K: Clone + Eq, V: Clone> Bucket<K, V> {
    fn with_entries(entries: Vec<KeyValue<K, V>>) -> Self {
        Self {
            entries,
            owner: None,
        }
    }

    pub fn insert(&self, key: K, value: V) -> Option<(Self, Modification)>
    where
        V: PartialEq,
    {
        match self.find_index(&key) {
            Some(index) => {
                if self.entries[index].value() == &value {
                    return None;
                }

                let mut entries = self.entries.clone();
                entries[index].replace_value(value);

                Some((Self::with_entries(entries), Modification::UpdateValue))
            }
            None => {
                let mut entries = Vec::with_capacity(self.entries.len() + 1);
                entries.extend_from_slice(&self.entries);
                entries.push(KeyValue::new(key, value));

                Some((Self::with_entries(entries), Modification::PutKeyValue))
            }
        }
    }

    pub fn remove_if<Q: Eq + ?Sized>(
        &self,
        key: &Q,
        predicate: &impl Fn(&V) -> bool,
    ) -> Removal<Self>
    where
        K: Borrow<Q>,
    {
        match self.find_index(key) {
            Some(index) if predicate(self.entries[index].value()) => {
                if self.entries.len() == 1 {
                    Removal::Emptied
                } else {
                    let mut entries = self.entries.clone();
                    entries.swap_remove(index);

                    Removal::Shrunk(Self::with_entries(entries))
                }
            }
            _ => Removal::Absent,
        }
    }

    pub fn insert_mut(&mut self, key: K, value: V, owner: Owner) -> Option<V> {
        self.ensure_owned_by(owner);

        match self.find_index(&key) {
            Some(index) => Some(self.entries[index].replace_value(value)),
            None => {
                self.entries.push(KeyValue::new(key, value));
                None
            }
        }
    }

    pub fn remove_mut<Q: Eq + ?Sized>(
        &mut self,
        key: &Q,
        owner: Owner,
        predicate: &impl Fn(&V) -> bool,
    ) -> Option<V>
    where
        K: Borrow<Q>,
    {
        self.ensure_owned_by(owner);

        match self.find_index(key) {
            Some(index) if predicate(self.entries[index].value()) => {
                Some(self.entries.swap_remove(index).into_pair().1)
            }
            _ => None,
        }
    }
}

impl<K: Clone, V: Clone> Owned for Bucket<K, V> {
    fn owner(&self) -> Option<Owner> {
        self.owner
    }

    fn cloned_for(&self, owner: Owner) -> Self {
        Self {
            entries: self.entries.clone(),
            owner: Some(owner),
        }
    }
}
