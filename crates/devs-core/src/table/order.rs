//! Index permutation used for drag-to-reorder of columns and rows.

use std::collections::HashSet;
use std::hash::Hash;

/// An ordering over a set of keys, mutated by drag gestures.
///
/// Always a permutation of the keys it was built or reconciled from: moves never
/// lose or duplicate an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order<K> {
    keys: Vec<K>,
}

impl<K> Default for Order<K> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<K: Clone + Eq + Hash> Order<K> {
    /// Ordering equal to the input order.
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn position(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Removes the entry at `from` and reinserts it at `to`.
    /// Returns `false` (and changes nothing) for equal or out-of-range indices.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.keys.len() || to >= self.keys.len() {
            return false;
        }
        let key = self.keys.remove(from);
        self.keys.insert(to, key);
        true
    }

    /// Moves `active` to the current position of `over`.
    /// Returns `false` when either key is unknown or both are the same.
    pub fn move_key(&mut self, active: &K, over: &K) -> bool {
        match (self.position(active), self.position(over)) {
            (Some(from), Some(to)) => self.move_item(from, to),
            _ => false,
        }
    }

    /// Reconciles the ordering against the current key set: keys that disappeared
    /// are dropped, surviving keys keep their relative order, new keys are appended
    /// in input order.
    pub fn reconcile(&mut self, current: &[K]) {
        let present: HashSet<&K> = current.iter().collect();
        self.keys.retain(|k| present.contains(k));
        let known: HashSet<K> = self.keys.iter().cloned().collect();
        for key in current {
            if !known.contains(key) {
                self.keys.push(key.clone());
            }
        }
        // Duplicate input keys would otherwise survive as duplicates.
        let mut seen = HashSet::with_capacity(self.keys.len());
        self.keys.retain(|k| seen.insert(k.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_item_behaves_like_array_move() {
        let mut order = Order::new(["a", "b", "c", "d"]);
        assert!(order.move_item(0, 2));
        assert_eq!(order.keys(), &["b", "c", "a", "d"]);
        assert!(order.move_item(3, 0));
        assert_eq!(order.keys(), &["d", "b", "c", "a"]);
    }

    #[test]
    fn move_onto_itself_is_noop() {
        let mut order = Order::new(["a", "b", "c"]);
        assert!(!order.move_key(&"b", &"b"));
        assert!(!order.move_item(1, 7));
        assert_eq!(order.keys(), &["a", "b", "c"]);
    }

    #[test]
    fn many_moves_keep_a_permutation() {
        let original: Vec<u32> = (0..12).collect();
        let mut order = Order::new(original.clone());
        // Deterministic LCG so the sequence is reproducible.
        let mut seed: u64 = 0x9e37_79b9;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let from = (seed >> 33) as usize % original.len();
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let to = (seed >> 33) as usize % original.len();
            order.move_item(from, to);

            let mut sorted = order.keys().to_vec();
            sorted.sort();
            assert_eq!(sorted, original);
        }
    }

    #[test]
    fn reconcile_drops_removed_and_appends_new() {
        let mut order = Order::new(["a", "b", "c"]);
        order.move_item(2, 0); // c a b
        order.reconcile(&["a", "b", "d"]);
        assert_eq!(order.keys(), &["a", "b", "d"]);

        let mut order = Order::new(["x", "y"]);
        order.reconcile(&["y", "z", "z"]);
        assert_eq!(order.keys(), &["y", "z"]);
    }
}
