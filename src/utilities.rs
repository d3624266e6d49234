use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

pub fn hash_key(key: &(impl Hash + ?Sized)) -> u32 {
    let mut hasher = DefaultHasher::new();

    key.hash(&mut hasher);

    let hash = hasher.finish();

    (hash ^ (hash >> 32)) as u32
}
