use super::*;

use crate::trie::tests::validate;
use proptest::prelude::*;
use std::{
    collections::HashMap,
    fmt::Debug,
    hash::{Hash, Hasher},
};

// Keys whose hash depends only on their first field.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Colliding(u8, u8);

impl Hash for Colliding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[derive(Clone, Debug)]
enum Op<K> {
    Insert(K, u16),
    Remove(K),
    RemoveMatching(K, u16),
    Get(K),
}

fn ops_strategy<K: Clone + Debug + 'static>(
    key: impl Strategy<Value = K> + Clone + 'static,
) -> impl Strategy<Value = Vec<Op<K>>> {
    let value = 0u16..4;
    let op = prop_oneof![
        50 => (key.clone(), value.clone()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        5 => (key.clone(), value).prop_map(|(k, v)| Op::RemoveMatching(k, v)),
        20 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn integer_ops() -> impl Strategy<Value = Vec<Op<u16>>> {
    ops_strategy(0u16..2048)
}

fn colliding_ops() -> impl Strategy<Value = Vec<Op<Colliding>>> {
    ops_strategy((0u8..8, 0u8..8).prop_map(|(h, k)| Colliding(h, k)))
}

fn check_map<K: Clone + Debug + Hash + Eq>(ops: Vec<Op<K>>) -> Result<(), TestCaseError> {
    let mut t: Map<K, u16> = Map::new();
    let mut m: HashMap<K, u16> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let old = t.clone();
                t = t.insert(key.clone(), value);
                let old_m = m.insert(key, value);
                prop_assert_eq!(t.ptr_eq(&old), old_m == Some(value));
            }
            Op::Remove(key) => {
                let old = t.clone();
                t = t.remove(&key);
                let old_m = m.remove(&key);
                prop_assert_eq!(t.ptr_eq(&old), old_m.is_none());
            }
            Op::RemoveMatching(key, value) => {
                t = t.remove_matching(&key, &value);

                if m.get(&key) == Some(&value) {
                    m.remove(&key);
                }
            }
            Op::Get(key) => {
                prop_assert_eq!(t.get(&key), m.get(&key));
            }
        }

        prop_assert_eq!(t.len(), m.len());
    }

    prop_assert_eq!(validate(&t.clone().into_parts().1), m.len());
    prop_assert_eq!(t.into_iter().collect::<HashMap<_, _>>(), m);

    Ok(())
}

fn check_builder<K: Clone + Debug + Hash + Eq>(ops: Vec<Op<K>>) -> Result<(), TestCaseError> {
    let source: Map<K, u16> = Map::new();
    let mut t = source.builder();
    let mut m: HashMap<K, u16> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                prop_assert_eq!(t.insert(key.clone(), value), m.insert(key, value));
            }
            Op::Remove(key) => {
                prop_assert_eq!(t.remove(&key), m.remove(&key));
            }
            Op::RemoveMatching(key, value) => {
                let matched = m.get(&key) == Some(&value);

                if matched {
                    m.remove(&key);
                }

                prop_assert_eq!(t.remove_matching(&key, &value), matched);
            }
            Op::Get(key) => {
                prop_assert_eq!(t.get(&key), m.get(&key));
            }
        }

        prop_assert_eq!(t.len(), m.len());
    }

    let t = t.build();

    prop_assert!(source.is_empty());
    prop_assert_eq!(validate(&t.clone().into_parts().1), m.len());
    prop_assert_eq!(t.into_iter().collect::<HashMap<_, _>>(), m);

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_map_equivalence(ops in integer_ops()) {
        check_map(ops)?;
    }

    #[test]
    fn prop_map_equivalence_colliding(ops in colliding_ops()) {
        check_map(ops)?;
    }

    #[test]
    fn prop_builder_equivalence(ops in integer_ops()) {
        check_builder(ops)?;
    }

    #[test]
    fn prop_builder_equivalence_colliding(ops in colliding_ops()) {
        check_builder(ops)?;
    }

    #[test]
    fn prop_builder_matches_map(
        keys in prop::collection::vec(0u16..2048, 0..=500),
        removed in prop::collection::vec(0u16..2048, 0..=500),
    ) {
        let mut map = Map::new();

        for key in &keys {
            map = map.insert(*key, *key);
        }

        let built = map.mutate(|builder| {
            for key in &removed {
                builder.remove(key);
            }
        });

        for key in &removed {
            map = map.remove(key);
        }

        prop_assert_eq!(&built, &map);
        prop_assert_eq!(validate(&built.into_parts().1), map.len());
    }

    #[test]
    fn prop_removal_restores_shape(
        keys in prop::collection::vec(0u16..2048, 1..=200),
        extra in prop::collection::vec(2048u16..4096, 0..=200),
    ) {
        let mut map = Map::new();

        for key in &keys {
            map = map.insert(*key, ());
        }

        let mut other = map.clone();

        for key in &extra {
            other = other.insert(*key, ());
        }

        for key in &extra {
            other = other.remove(key);
        }

        // Without full hash collisions, a canonical trie iterates in the same
        // order regardless of its history.
        prop_assert_eq!(
            map.keys().collect::<Vec<_>>(),
            other.keys().collect::<Vec<_>>()
        );
    }
}
