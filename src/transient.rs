//! In-place trie algorithms for builders.
//!
//! A builder edits only nodes stamped with its owner. Any other node on the
//! way is cloned once, stamped, and linked into its already owned parent.

use crate::{
    config::{digit, LOG_BRANCHING_FACTOR},
    key_value::KeyValue,
    node::{ChildMut, Node},
    owner::{Owned, Owner},
    trie::make_child,
    utilities::hash_key,
};
use std::{borrow::Borrow, hash::Hash};

impl<K: Clone + Hash + Eq, V: Clone> Node<K, V> {
    /// Inserts an entry and returns a previous value if any.
    pub fn insert_mut(
        &mut self,
        hash: u32,
        key: K,
        value: V,
        shift: u32,
        owner: Owner,
    ) -> Option<V> {
        self.ensure_owned_by(owner);

        let digit = digit(hash, shift);

        if self.has_entry_at(digit) {
            if self.entry_at(digit).key() == &key {
                return Some(self.replace_value(digit, value));
            }

            let stored_hash = hash_key(self.entry_at(digit).key());

            self.move_entry_to_child(digit, |stored| {
                make_child(
                    shift + LOG_BRANCHING_FACTOR,
                    stored_hash,
                    stored,
                    hash,
                    KeyValue::new(key, value),
                    Some(owner),
                )
            });

            None
        } else if self.has_child_at(digit) {
            match self.child_at_mut(digit).make_mut_for(owner) {
                ChildMut::Node(node) => {
                    node.insert_mut(hash, key, value, shift + LOG_BRANCHING_FACTOR, owner)
                }
                ChildMut::Bucket(bucket) => bucket.insert_mut(key, value, owner),
            }
        } else {
            self.insert_entry(digit, KeyValue::new(key, value));

            None
        }
    }

    /// Removes an entry whose value satisfies `predicate` and returns its
    /// value.
    pub fn remove_mut<Q: Eq + ?Sized>(
        &mut self,
        hash: u32,
        key: &Q,
        shift: u32,
        owner: Owner,
        predicate: &impl Fn(&V) -> bool,
    ) -> Option<V>
    where
        K: Borrow<Q>,
    {
        self.ensure_owned_by(owner);

        let digit = digit(hash, shift);

        if self.has_entry_at(digit) {
            let entry = self.entry_at(digit);

            if entry.key().borrow() == key && predicate(entry.value()) {
                Some(self.remove_entry(digit).into_pair().1)
            } else {
                None
            }
        } else if self.has_child_at(digit) {
            let value = match self.child_at_mut(digit).make_mut_for(owner) {
                ChildMut::Node(node) => {
                    node.remove_mut(hash, key, shift + LOG_BRANCHING_FACTOR, owner, predicate)
                }
                ChildMut::Bucket(bucket) => bucket.remove_mut(key, owner, predicate),
            }?;

            self.normalize_child(digit, owner);

            Some(value)
        } else {
            None
        }
    }

    /// Drops an empty child or inlines a child holding a single entry.
    fn normalize_child(&mut self, digit: u32, owner: Owner) {
        let child = self.child_at_mut(digit);

        if child.is_empty() {
            self.remove_child(digit);
        } else if let Some(entry) = child.take_single_entry(owner) {
            self.move_child_to_entry(digit, entry);
        }
    }
}
