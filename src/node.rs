use crate::{
    bitmap::Bitmap,
    bucket::Bucket,
    key_value::KeyValue,
    owner::{Owned, Owner},
};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum Child<K, V> {
    Node(Arc<Node<K, V>>),
    Bucket(Arc<Bucket<K, V>>),
}

pub enum ChildMut<'a, K, V> {
    Node(&'a mut Node<K, V>),
    Bucket(&'a mut Bucket<K, V>),
}

impl<K, V> Child<K, V> {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Node(node) => node.is_empty(),
            Self::Bucket(bucket) => bucket.is_empty(),
        }
    }

    pub fn single_entry(&self) -> Option<&KeyValue<K, V>> {
        match self {
            Self::Node(node) => node.single_entry(),
            Self::Bucket(bucket) => bucket.single_entry(),
        }
    }
}

impl<K: Clone, V: Clone> Child<K, V> {
    pub fn make_mut_for(&mut self, owner: Owner) -> ChildMut<'_, K, V> {
        match self {
            Self::Node(node) => ChildMut::Node(Node::make_mut_for(node, owner)),
            Self::Bucket(bucket) => ChildMut::Bucket(Bucket::make_mut_for(bucket, owner)),
        }
    }

    pub fn take_single_entry(&mut self, owner: Owner) -> Option<KeyValue<K, V>> {
        self.single_entry()?;

        match self.make_mut_for(owner) {
            ChildMut::Node(node) => node.take_single_entry(),
            ChildMut::Bucket(bucket) => bucket.take_single_entry(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Slot<K, V> {
    Entry(KeyValue<K, V>),
    Child(Child<K, V>),
}

/// Bitmap-indexed trie node.
///
/// Slots hold inline entries first, in ascending digit order, followed by
/// children in descending digit order. The child of rank `r` therefore lives
/// at `slots.len() - 1 - r` and both groups shift by one slot at most when a
/// digit is added or removed.
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    data_map: Bitmap,
    node_map: Bitmap,
    slots: Vec<Slot<K, V>>,
    owner: Option<Owner>,
}

impl<K, V> Default for Node<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Node<K, V> {
    pub fn new() -> Self {
        Self {
            data_map: Bitmap::new(),
            node_map: Bitmap::new(),
            slots: vec![],
            owner: None,
        }
    }

    pub fn from_parts(
        data_map: Bitmap,
        node_map: Bitmap,
        slots: Vec<Slot<K, V>>,
        owner: Option<Owner>,
    ) -> Self {
        debug_assert!(data_map.is_disjoint(node_map));
        debug_assert_eq!(data_map.size() + node_map.size(), slots.len());

        Self {
            data_map,
            node_map,
            slots,
            owner,
        }
    }

    pub fn data_map(&self) -> Bitmap {
        self.data_map
    }

    pub fn node_map(&self) -> Bitmap {
        self.node_map
    }

    pub fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.data_map().is_empty() && self.node_map().is_empty()
    }

    pub fn has_entry_at(&self, digit: u32) -> bool {
        self.data_map.get(digit)
    }

    pub fn has_child_at(&self, digit: u32) -> bool {
        self.node_map.get(digit)
    }

    fn entry_index(&self, digit: u32) -> usize {
        self.data_map.rank(digit)
    }

    fn child_index(&self, digit: u32) -> usize {
        self.slots.len() - 1 - self.node_map.rank(digit)
    }

    pub fn entry_at(&self, digit: u32) -> &KeyValue<K, V> {
        match &self.slots[self.entry_index(digit)] {
            Slot::Entry(entry) => entry,
            Slot::Child(_) => unreachable!("child in entry slot"),
        }
    }

    pub fn child_at(&self, digit: u32) -> &Child<K, V> {
        match &self.slots[self.child_index(digit)] {
            Slot::Child(child) => child,
            Slot::Entry(_) => unreachable!("entry in child slot"),
        }
    }

    pub fn child_at_mut(&mut self, digit: u32) -> &mut Child<K, V> {
        let index = self.child_index(digit);

        match &mut self.slots[index] {
            Slot::Child(child) => child,
            Slot::Entry(_) => unreachable!("entry in child slot"),
        }
    }

    /// Returns an entry if it is the only thing in a node.
    pub fn single_entry(&self) -> Option<&KeyValue<K, V>> {
        match self.slots.as_slice() {
            [Slot::Entry(entry)] => Some(entry),
            _ => None,
        }
    }

    pub fn take_single_entry(&mut self) -> Option<KeyValue<K, V>> {
        self.single_entry()?;
        self.data_map = Bitmap::new();

        match self.slots.pop() {
            Some(Slot::Entry(entry)) => Some(entry),
            _ => unreachable!("single entry vanished"),
        }
    }

    pub fn insert_entry(&mut self, digit: u32, entry: KeyValue<K, V>) {
        debug_assert!(!self.has_entry_at(digit) && !self.has_child_at(digit));

        let index = self.entry_index(digit);

        self.slots.insert(index, Slot::Entry(entry));
        self.data_map = self.data_map.set(digit);
    }

    pub fn replace_value(&mut self, digit: u32, value: V) -> V {
        let index = self.entry_index(digit);

        match &mut self.slots[index] {
            Slot::Entry(entry) => entry.replace_value(value),
            Slot::Child(_) => unreachable!("child in entry slot"),
        }
    }

    pub fn remove_entry(&mut self, digit: u32) -> KeyValue<K, V> {
        debug_assert!(self.has_entry_at(digit));

        let index = self.entry_index(digit);
        let slot = self.slots.remove(index);
        self.data_map = self.data_map.unset(digit);

        match slot {
            Slot::Entry(entry) => entry,
            Slot::Child(_) => unreachable!("child in entry slot"),
        }
    }

    pub fn replace_child(&mut self, digit: u32, child: Child<K, V>) {
        *self.child_at_mut(digit) = child;
    }

    pub fn remove_child(&mut self, digit: u32) {
        debug_assert!(self.has_child_at(digit));

        let index = self.child_index(digit);

        self.slots.remove(index);
        self.node_map = self.node_map.unset(digit);
    }

    /// Replaces an inline entry with a child built from it.
    pub fn move_entry_to_child(
        &mut self,
        digit: u32,
        make_child: impl FnOnce(KeyValue<K, V>) -> Child<K, V>,
    ) {
        let entry = self.remove_entry(digit);
        let index = self.slots.len() - self.node_map.rank(digit);

        self.slots.insert(index, Slot::Child(make_child(entry)));
        self.node_map = self.node_map.set(digit);
    }

    pub fn move_child_to_entry(&mut self, digit: u32, entry: KeyValue<K, V>) {
        self.remove_child(digit);
        self.insert_entry(digit, entry);
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    /// Copies a node into a fresh unowned buffer with room for one more slot.
    fn copied(&self) -> Self {
        let mut slots = Vec::with_capacity(self.slots.len() + 1);
        slots.extend_from_slice(&self.slots);

        Self {
            data_map: self.data_map,
            node_map: self.node_map,
            slots,
            owner: None,
        }
    }

    fn edited(&self, edit: impl FnOnce(&mut Self)) -> Self {
        let mut node = self.copied();
        edit(&mut node);
        node
    }

    pub fn with_entry_inserted(&self, digit: u32, entry: KeyValue<K, V>) -> Self {
        self.edited(|node| node.insert_entry(digit, entry))
    }

    pub fn with_value_replaced(&self, digit: u32, value: V) -> Self {
        self.edited(|node| {
            node.replace_value(digit, value);
        })
    }

    pub fn with_entry_removed(&self, digit: u32) -> Self {
        self.edited(|node| {
            node.remove_entry(digit);
        })
    }

    pub fn with_child_replaced(&self, digit: u32, child: Child<K, V>) -> Self {
        self.edited(|node| node.replace_child(digit, child))
    }

    pub fn with_child_removed(&self, digit: u32) -> Self {
        self.edited(|node| node.remove_child(digit))
    }

    pub fn with_entry_moved_to_child(
        &self,
        digit: u32,
        make_child: impl FnOnce(KeyValue<K, V>) -> Child<K, V>,
    ) -> Self {
        self.edited(|node| node.move_entry_to_child(digit, make_child))
    }

    pub fn with_child_moved_to_entry(&self, digit: u32, entry: KeyValue<K, V>) -> Self {
        self.edited(|node| node.move_child_to_entry(digit, entry))
    }
}

impl<K: Clone, V: Clone> Owned for Node<K, V> {
    fn owner(&self) -> Option<Owner> {
        self.owner
    }

    fn cloned_for(&self, owner: Owner) -> Self {
        Self {
            owner: Some(owner),
            ..self.clone()
        }
    }
}
