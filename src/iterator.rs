use crate::{
    bucket::Bucket,
    config::MAX_DEPTH,
    key_value::KeyValue,
    node::{Child, Node, Slot},
};
use std::{iter::FusedIterator, slice, sync::Arc};

#[derive(Debug)]
enum Cursor<'a, K, V> {
    Node(slice::Iter<'a, Slot<K, V>>),
    Bucket(slice::Iter<'a, KeyValue<K, V>>),
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Node(slots) => Self::Node(slots.clone()),
            Self::Bucket(entries) => Self::Bucket(entries.clone()),
        }
    }
}

impl<'a, K, V> From<&'a Child<K, V>> for Cursor<'a, K, V> {
    fn from(child: &'a Child<K, V>) -> Self {
        match child {
            Child::Node(node) => Self::Node(node.slots().iter()),
            Child::Bucket(bucket) => Self::Bucket(bucket.entries().iter()),
        }
    }
}

/// Depth-first iterator over the entries of a trie.
///
/// Entries of a node come before the entries of its children.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    path: [Option<Cursor<'a, K, V>>; MAX_DEPTH],
    depth: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>, size: usize) -> Self {
        let mut path = std::array::from_fn(|_| None);
        path[0] = Some(Cursor::Node(root.slots().iter()));

        Self {
            path,
            depth: 1,
            remaining: size,
        }
    }

    fn push(&mut self, cursor: Cursor<'a, K, V>) {
        debug_assert!(self.depth < MAX_DEPTH, "trie deeper than its hash");

        self.path[self.depth] = Some(cursor);
        self.depth += 1;
    }

    fn pop(&mut self) {
        self.depth -= 1;
        self.path[self.depth] = None;
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            depth: self.depth,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.depth > 0 {
            let next = match &mut self.path[self.depth - 1] {
                Some(Cursor::Node(slots)) => match slots.next() {
                    Some(Slot::Entry(entry)) => Ok(entry),
                    Some(Slot::Child(child)) => Err(Some(Cursor::from(child))),
                    None => Err(None),
                },
                Some(Cursor::Bucket(entries)) => entries.next().ok_or(None),
                None => unreachable!("missing cursor"),
            };

            match next {
                Ok(entry) => {
                    self.remaining -= 1;
                    return Some(entry.as_pair());
                }
                Err(Some(cursor)) => self.push(cursor),
                Err(None) => self.pop(),
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

#[derive(Clone, Debug)]
pub struct Keys<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

#[derive(Clone, Debug)]
pub struct Values<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

#[derive(Debug)]
enum OwnedCursor<K, V> {
    Node(Arc<Node<K, V>>, usize),
    Bucket(Arc<Bucket<K, V>>, usize),
}

/// Iterator cloning entries out of shared nodes.
#[derive(Debug)]
pub struct IntoIter<K, V> {
    path: Vec<OwnedCursor<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(root: Arc<Node<K, V>>, size: usize) -> Self {
        let mut path = Vec::with_capacity(MAX_DEPTH);
        path.push(OwnedCursor::Node(root, 0));

        Self {
            path,
            remaining: size,
        }
    }
}

impl<K: Clone, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let child = match self.path.last_mut()? {
                OwnedCursor::Node(node, index) => match node.slots().get(*index) {
                    Some(slot) => {
                        *index += 1;

                        match slot {
                            Slot::Entry(entry) => {
                                self.remaining -= 1;
                                return Some(entry.clone().into_pair());
                            }
                            Slot::Child(Child::Node(node)) => OwnedCursor::Node(node.clone(), 0),
                            Slot::Child(Child::Bucket(bucket)) => {
                                OwnedCursor::Bucket(bucket.clone(), 0)
                            }
                        }
                    }
                    None => {
                        self.path.pop();
                        continue;
                    }
                },
                OwnedCursor::Bucket(bucket, index) => match bucket.entries().get(*index) {
                    Some(entry) => {
                        *index += 1;
                        self.remaining -= 1;
                        return Some(entry.clone().into_pair());
                    }
                    None => {
                        self.path.pop();
                        continue;
                    }
                },
            };

            self.path.push(child);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for IntoIter<K, V> {}

impl<K: Clone, V: Clone> FusedIterator for IntoIter<K, V> {}
