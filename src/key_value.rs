#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyValue<K, V> {
    key: K,
    value: V,
}

impl<K, V> KeyValue<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn as_pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Replaces a value and returns the previous one.
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }
}
