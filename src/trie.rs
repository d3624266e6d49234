//! Persistent trie algorithms.
//!
//! Every operation copies the nodes on the path from a root to the edited
//! slot and shares everything else. An operation that changes nothing
//! returns no node at all so that callers keep their original.

use crate::{
    bitmap::Bitmap,
    bucket::Bucket,
    config::{digit, LOG_BRANCHING_FACTOR, MAX_SHIFT},
    key_value::KeyValue,
    node::{Child, Node, Slot},
    owner::Owner,
    utilities::hash_key,
};
use log::trace;
use std::{borrow::Borrow, hash::Hash};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Modification {
    UpdateValue,
    PutKeyValue,
}

#[derive(Debug)]
pub enum Removal<T> {
    Absent,
    /// Nothing would be left; the parent drops its reference.
    Emptied,
    Shrunk(T),
}

impl<T> Removal<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Removal<U> {
        match self {
            Self::Absent => Removal::Absent,
            Self::Emptied => Removal::Emptied,
            Self::Shrunk(value) => Removal::Shrunk(f(value)),
        }
    }
}

/// Builds the smallest subtree at `shift` holding two entries with
/// different keys.
pub fn make_child<K, V>(
    shift: u32,
    first_hash: u32,
    first: KeyValue<K, V>,
    second_hash: u32,
    second: KeyValue<K, V>,
    owner: Option<Owner>,
) -> Child<K, V> {
    if shift > MAX_SHIFT {
        trace!("collision bucket for hash {first_hash:#010x}");

        return Child::Bucket(Bucket::new(first, second, owner).into());
    }

    let first_digit = digit(first_hash, shift);
    let second_digit = digit(second_hash, shift);

    Child::Node(
        if first_digit == second_digit {
            let child = make_child(
                shift + LOG_BRANCHING_FACTOR,
                first_hash,
                first,
                second_hash,
                second,
                owner,
            );

            Node::from_parts(
                Bitmap::new(),
                Bitmap::new().set(first_digit),
                vec![Slot::Child(child)],
                owner,
            )
        } else {
            let data_map = Bitmap::new().set(first_digit).set(second_digit);
            let slots = if first_digit < second_digit {
                vec![Slot::Entry(first), Slot::Entry(second)]
            } else {
                vec![Slot::Entry(second), Slot::Entry(first)]
            };

            Node::from_parts(data_map, Bitmap::new(), slots, owner)
        }
        .into(),
    )
}

impl<K: Eq, V> Node<K, V> {
    pub fn get<Q: Eq + ?Sized>(&self, hash: u32, key: &Q, shift: u32) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        let digit = digit(hash, shift);

        if self.has_entry_at(digit) {
            let entry = self.entry_at(digit);

            if entry.key().borrow() == key {
                Some(entry.value())
            } else {
                None
            }
        } else if self.has_child_at(digit) {
            match self.child_at(digit) {
                Child::Node(node) => node.get(hash, key, shift + LOG_BRANCHING_FACTOR),
                Child::Bucket(bucket) => bucket.get(key),
            }
        } else {
            None
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Node<K, V> {
    #[must_use]
    pub fn insert(&self, hash: u32, key: K, value: V, shift: u32) -> Option<(Self, Modification)>
    where
        V: PartialEq,
    {
        let digit = digit(hash, shift);

        if self.has_entry_at(digit) {
            let entry = self.entry_at(digit);

            if entry.key() == &key {
                if entry.value() == &value {
                    None
                } else {
                    Some((
                        self.with_value_replaced(digit, value),
                        Modification::UpdateValue,
                    ))
                }
            } else {
                let stored_hash = hash_key(entry.key());

                Some((
                    self.with_entry_moved_to_child(digit, |stored| {
                        make_child(
                            shift + LOG_BRANCHING_FACTOR,
                            stored_hash,
                            stored,
                            hash,
                            KeyValue::new(key, value),
                            None,
                        )
                    }),
                    Modification::PutKeyValue,
                ))
            }
        } else if self.has_child_at(digit) {
            let (child, modification) = match self.child_at(digit) {
                Child::Node(node) => {
                    let (node, modification) =
                        node.insert(hash, key, value, shift + LOG_BRANCHING_FACTOR)?;

                    (Child::Node(node.into()), modification)
                }
                Child::Bucket(bucket) => {
                    let (bucket, modification) = bucket.insert(key, value)?;

                    (Child::Bucket(bucket.into()), modification)
                }
            };

            Some((self.with_child_replaced(digit, child), modification))
        } else {
            Some((
                self.with_entry_inserted(digit, KeyValue::new(key, value)),
                Modification::PutKeyValue,
            ))
        }
    }

    /// Removes an entry whose key equals `key` and whose value satisfies
    /// `predicate`.
    ///
    /// A child left with a single entry is inlined into its parent so that a
    /// set of entries has exactly one trie shape.
    #[must_use]
    pub fn remove_if<Q: Eq + ?Sized>(
        &self,
        hash: u32,
        key: &Q,
        shift: u32,
        predicate: &impl Fn(&V) -> bool,
    ) -> Removal<Self>
    where
        K: Borrow<Q>,
    {
        let digit = digit(hash, shift);

        if self.has_entry_at(digit) {
            let entry = self.entry_at(digit);

            if entry.key().borrow() != key || !predicate(entry.value()) {
                Removal::Absent
            } else if self.slots().len() == 1 {
                Removal::Emptied
            } else {
                Removal::Shrunk(self.with_entry_removed(digit))
            }
        } else if self.has_child_at(digit) {
            let removal = match self.child_at(digit) {
                Child::Node(node) => node
                    .remove_if(hash, key, shift + LOG_BRANCHING_FACTOR, predicate)
                    .map(|node| Child::Node(node.into())),
                Child::Bucket(bucket) => bucket
                    .remove_if(key, predicate)
                    .map(|bucket| Child::Bucket(bucket.into())),
            };

            match removal {
                Removal::Absent => Removal::Absent,
                Removal::Emptied if self.slots().len() == 1 => Removal::Emptied,
                Removal::Emptied => Removal::Shrunk(self.with_child_removed(digit)),
                Removal::Shrunk(child) => Removal::Shrunk(match child.single_entry() {
                    Some(entry) => self.with_child_moved_to_entry(digit, entry.clone()),
                    None => self.with_child_replaced(digit, child),
                }),
            }
        } else {
            Removal::Absent
        }
    }
}
