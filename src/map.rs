use crate::{
    builder::Builder,
    iterator::{IntoIter, Iter, Keys, Values},
    node::Node,
    trie::{Modification, Removal},
    utilities::hash_key,
};
use std::{
    borrow::Borrow,
    fmt::{self, Debug, Formatter},
    hash::Hash,
    ops::Index,
    sync::Arc,
};

/// Persistent hash map.
///
/// Note that every method does not modify the original map but creates a new
/// one if necessary. Maps created from each other share their unchanged
/// sub-trees, and can be sent and read across threads freely.
#[derive(Clone)]
pub struct Map<K, V> {
    size: usize,
    root: Arc<Node<K, V>>,
}

impl<K, V> Map<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            size: 0,
            root: Node::new().into(),
        }
    }

    pub(crate) fn from_parts(size: usize, root: Arc<Node<K, V>>) -> Self {
        if size == 0 {
            return Self::new();
        }

        Self { size, root }
    }

    pub(crate) fn into_parts(self) -> (usize, Arc<Node<K, V>>) {
        (self.size, self.root)
    }

    /// Returns an empty map.
    ///
    /// This is the same as [`Map::new`]; the original map is left as it is.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::new()
    }

    /// Returns a size of a map.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if a map is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns key-value pairs in a map.
    ///
    /// The order is unspecified but stable for a given map.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.size)
    }

    /// Returns keys in a map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Returns values in a map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Returns true if two maps share the same root.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl<K: Hash + Eq, V> Map<K, V> {
    /// Finds a value corresponding to a key.
    pub fn get<Q: Hash + Eq + ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        self.root.get(hash_key(key), key, 0)
    }

    /// Checks if a key is contained in a map.
    pub fn contains_key<Q: Hash + Eq + ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.get(key).is_some()
    }

    /// Checks if a value is contained in a map.
    ///
    /// This visits every entry.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|other| other == value)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Map<K, V> {
    /// Inserts a key-value pair into a map.
    ///
    /// A map is returned as it is if a key is already bound to an equal
    /// value.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self
    where
        V: PartialEq,
    {
        match self.root.insert(hash_key(&key), key, value, 0) {
            Some((root, modification)) => Self {
                size: self.size + (modification == Modification::PutKeyValue) as usize,
                root: root.into(),
            },
            None => self.clone(),
        }
    }

    /// Removes a key from a map if any.
    #[must_use]
    pub fn remove<Q: Hash + Eq + ?Sized>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
    {
        self.remove_if(key, &|_| true)
    }

    /// Removes a key from a map only if it is bound to a given value.
    #[must_use]
    pub fn remove_matching<Q: Hash + Eq + ?Sized>(&self, key: &Q, value: &V) -> Self
    where
        K: Borrow<Q>,
        V: PartialEq,
    {
        self.remove_if(key, &|other| other == value)
    }

    fn remove_if<Q: Hash + Eq + ?Sized>(&self, key: &Q, predicate: &impl Fn(&V) -> bool) -> Self
    where
        K: Borrow<Q>,
    {
        match self.root.remove_if(hash_key(key), key, 0, predicate) {
            Removal::Absent => self.clone(),
            Removal::Emptied => Self::new(),
            Removal::Shrunk(root) => Self {
                size: self.size - 1,
                root: root.into(),
            },
        }
    }

    /// Creates a builder to edit a copy of a map in place.
    pub fn builder(&self) -> Builder<K, V> {
        Builder::from(self.clone())
    }

    /// Applies edits to a builder and returns the resulting map.
    #[must_use]
    pub fn mutate(&self, edit: impl FnOnce(&mut Builder<K, V>)) -> Self {
        let mut builder = self.builder();
        edit(&mut builder);
        builder.build()
    }

    /// Extends a map with an iterator of key-value pairs.
    #[must_use]
    pub fn extend(&self, iterator: impl IntoIterator<Item = (K, V)>) -> Self {
        self.mutate(|builder| builder.extend(iterator))
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || self.size == other.size
                && self
                    .iter()
                    .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Hash + Eq, V: Eq> Eq for Map<K, V> {}

impl<K: Debug, V: Debug> Debug for Map<K, V> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq + Borrow<Q>, Q: Hash + Eq + ?Sized, V> Index<&Q> for Map<K, V> {
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in map"),
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterator: I) -> Self {
        let mut builder = Builder::new();
        builder.extend(iterator);
        builder.build()
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone> IntoIterator for Map<K, V> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.size)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trie::tests::validate;
    use rand::{random, rng, seq::SliceRandom};
    use std::{collections::HashMap, thread::spawn};

    const ITERATION_COUNT: usize = 1 << 12;

    #[test]
    fn new() {
        Map::<usize, usize>::new();
    }

    #[test]
    fn insert() {
        let map = Map::new();

        assert_eq!(map.len(), 0);
        assert_eq!(map.insert(0, 0).len(), 1);
        assert_eq!(map.insert(0, 0).insert(0, 1).len(), 1);
        assert_eq!(map.insert(0, 0).insert(1, 0).len(), 2);
    }

    #[test]
    fn insert_same_value() {
        let map = Map::new().insert(0, 0);

        assert!(map.insert(0, 0).ptr_eq(&map));
        assert!(!map.insert(0, 1).ptr_eq(&map));
    }

    #[test]
    fn get() {
        let map = Map::new();

        assert_eq!(map.insert(0, 0).get(&0), Some(&0));
        assert_eq!(map.insert(0, 0).get(&1), None);
        assert_eq!(map.insert(0, 0).insert(0, 1).get(&0), Some(&1));
        assert_eq!(map.insert(0, 0).insert(1, 1).get(&1), Some(&1));
    }

    #[test]
    fn get_borrowed() {
        let map = Map::new().insert(String::from("foo"), 42);

        assert_eq!(map.get("foo"), Some(&42));
        assert_eq!(map["foo"], 42);
        assert!(map.contains_key("foo"));
        assert!(!map.contains_key("bar"));
    }

    #[test]
    #[should_panic]
    fn index_missing_key() {
        let _ = Map::<usize, usize>::new()[&0];
    }

    #[test]
    fn contains_value() {
        let map = Map::new().insert(0, 1).insert(2, 3);

        assert!(map.contains_value(&1));
        assert!(map.contains_value(&3));
        assert!(!map.contains_value(&0));
    }

    #[test]
    fn persistence() {
        let map = (0..100).map(|key| (key, key)).collect::<Map<_, _>>();
        let other = map.insert(0, 42).insert(1000, 0).remove(&1);

        for key in 0..100 {
            assert_eq!(map.get(&key), Some(&key));
        }

        assert_eq!(map.get(&1000), None);
        assert_eq!(map.len(), 100);
        assert_eq!(other.get(&0), Some(&42));
        assert_eq!(other.get(&1), None);
        assert_eq!(other.len(), 100);
    }

    #[test]
    fn remove() {
        let map = Map::new();

        assert_eq!(map.insert(0, 0).remove(&0), map);
        assert_eq!(map.insert(0, 0).remove(&1), map.insert(0, 0));
        assert_eq!(map.insert(0, 0).insert(1, 0).remove(&0), map.insert(1, 0));
        assert_eq!(map.insert(0, 0).insert(1, 0).remove(&1), map.insert(0, 0));
        assert_eq!(map.insert(0, 0).insert(1, 0).remove(&2).len(), 2);
    }

    #[test]
    fn clear() {
        let map = (0..100).map(|key| (key, key)).collect::<Map<_, _>>();
        let other = map.clear();

        assert!(other.is_empty());
        assert_eq!(other, Map::new());
        assert_eq!(map.len(), 100);
        assert_eq!(other.insert(0, 0).get(&0), Some(&0));
    }

    #[test]
    fn remove_twice() {
        let map = (0..100).map(|key| (key, key)).collect::<Map<_, _>>();
        let other = map.remove(&42);

        assert!(other.remove(&42).ptr_eq(&other));
        assert_eq!(other.remove(&42), map.remove(&42));
        assert_eq!(other.len(), 99);
    }

    #[test]
    fn remove_matching() {
        let map = Map::new().insert(0, 1);

        assert!(map.remove_matching(&0, &0).ptr_eq(&map));
        assert!(map.remove_matching(&0, &1).is_empty());
        assert!(map.remove_matching(&1, &1).ptr_eq(&map));
    }

    #[test]
    fn insert_remove_many() {
        let mut map: Map<i16, i16> = Map::new();
        let mut other = HashMap::new();

        for _ in 0..ITERATION_COUNT {
            let key = random();
            let size = map.len();
            let found = map.contains_key(&key);

            if random() {
                let value = random();
                map = map.insert(key, value);
                other.insert(key, value);

                assert_eq!(map.len(), if found { size } else { size + 1 });
                assert_eq!(map.get(&key), Some(&value));
            } else {
                map = map.remove(&key);
                other.remove(&key);

                assert_eq!(map.len(), if found { size - 1 } else { size });
                assert_eq!(map.get(&key), None);
            }
        }

        assert_eq!(validate(&map.root), map.len());
        assert_eq!(map.iter().count(), map.len());
        assert_eq!(map.clone().into_iter().collect::<HashMap<_, _>>(), other);
    }

    #[test]
    fn insert_thousand_keys() {
        let mut map = Map::new();

        for key in 0..1000 {
            map = map.insert(key, format!("v{key}"));
        }

        assert_eq!(map.get(&500).map(String::as_str), Some("v500"));

        let map = map.remove(&500);

        assert_eq!(map.get(&500), None);
        assert_eq!(map.len(), 999);
    }

    #[test]
    fn remove_all() {
        let mut keys = (0..ITERATION_COUNT).collect::<Vec<_>>();
        let mut map = keys.iter().map(|&key| (key, key)).collect::<Map<_, _>>();

        keys.shuffle(&mut rng());

        for key in &keys {
            map = map.remove(key);
        }

        assert!(map.is_empty());
        assert_eq!(map, Map::new());
        assert!(map.root.is_empty());
        assert_eq!(map.iter().next(), None);
    }

    #[test]
    fn equality() {
        for _ in 0..8 {
            let mut maps: [Map<i16, i16>; 2] = [Map::new(), Map::new()];
            let mut inserted_keys: Vec<i16> = (0..ITERATION_COUNT).map(|_| random()).collect();
            let mut deleted_keys: Vec<i16> = (0..ITERATION_COUNT).map(|_| random()).collect();

            for map in maps.iter_mut() {
                inserted_keys.shuffle(&mut rng());
                deleted_keys.shuffle(&mut rng());

                for key in &inserted_keys {
                    *map = map.insert(*key, *key);
                }

                for key in &deleted_keys {
                    *map = map.remove(key);
                }
            }

            assert_eq!(maps[0], maps[1]);
            assert_eq!(validate(&maps[0].root), validate(&maps[1].root));
        }
    }

    #[test]
    fn send_and_sync() {
        let map: Map<usize, usize> = Map::new();
        spawn(move || map);

        let map: Map<String, String> = Map::new();
        spawn(move || map);
    }

    #[test]
    fn share_over_threads() {
        let map = (0..ITERATION_COUNT).map(|key| (key, key)).collect::<Map<_, _>>();

        let handles = (0..4)
            .map(|index| {
                let map = map.clone();

                spawn(move || {
                    let map = map.insert(ITERATION_COUNT + index, index);

                    (0..ITERATION_COUNT).all(|key| map.get(&key) == Some(&key))
                        && map.len() == ITERATION_COUNT + 1
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert!(handle.join().unwrap());
        }

        assert_eq!(map.len(), ITERATION_COUNT);
    }

    #[test]
    fn extend() {
        assert_eq!(Map::new().insert(0, 0), Map::new().extend([(0, 0)]));
        assert_eq!(
            Map::new().insert(0, 0).extend([(0, 1), (1, 1)]),
            Map::new().insert(0, 1).insert(1, 1)
        );
    }

    #[test]
    fn mutate() {
        let map = Map::new().insert(0, 0);
        let other = map.mutate(|builder| {
            builder.insert(1, 1);
            builder.remove(&0);
        });

        assert_eq!(map, Map::new().insert(0, 0));
        assert_eq!(other, Map::new().insert(1, 1));
    }

    #[test]
    fn debug() {
        assert_eq!(format!("{:?}", Map::new().insert(0, 1)), "{0: 1}");
    }

    mod into_iterator {
        use super::*;

        #[test]
        fn iterate() {
            for _ in Map::<usize, usize>::new() {}
        }

        #[test]
        fn iterate_borrowed() {
            for _ in &Map::<usize, usize>::new() {}
        }

        #[test]
        fn iterate_keys_and_values() {
            let map = Map::new().insert(0, 1).insert(2, 3);
            let mut keys = map.keys().copied().collect::<Vec<_>>();
            let mut values = map.values().copied().collect::<Vec<_>>();

            keys.sort();
            values.sort();

            assert_eq!(keys, vec![0, 2]);
            assert_eq!(values, vec![1, 3]);
            assert_eq!(map.keys().len(), 2);
        }

        #[test]
        fn iterate_snapshot() {
            let map = (0..100).map(|key| (key, key)).collect::<Map<_, _>>();
            let iterator = map.iter();
            let _other = map.insert(1000, 0).remove(&0);

            assert_eq!(iterator.count(), 100);
        }
    }

    mod from_iterator {
        use super::*;

        #[test]
        fn collect_empty() {
            assert_eq!(Map::<usize, usize>::new(), [].into_iter().collect());
        }

        #[test]
        fn collect_one_element() {
            assert_eq!(Map::new().insert(0, 0), [(0, 0)].into_iter().collect());
        }

        #[test]
        fn collect_duplicate_keys() {
            assert_eq!(Map::new().insert(0, 1), [(0, 0), (0, 1)].into_iter().collect());
        }

        #[test]
        fn collect_many_elements() {
            let mut map = Map::new();

            for key in 0..100 {
                map = map.insert(key, key);
            }

            assert_eq!(map, (0..100).map(|key| (key, key)).collect());
        }
    }
}
