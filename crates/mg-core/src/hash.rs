//! Fx hash map and set aliases.
//!
//! Lookups in the resolver are keyed by property names and type names, short
//! strings where the Fx hash from `rustc-hash` outperforms SipHash. None of
//! these maps are exposed to untrusted input, so DoS resistance is not needed.
//!
//! Iteration order of these maps is unspecified; anything that feeds a
//! [`MappingResult`](crate::MappingResult) iterates a `Vec` instead.
//!
//! # Examples
//!
//! ```
//! use mg_core::{FxHashMap, fx_hash_map_with_capacity};
//!
//! let mut by_name: FxHashMap<&str, usize> = fx_hash_map_with_capacity(4);
//! by_name.insert("id", 0);
//! assert_eq!(by_name.get("id"), Some(&0));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates an [`FxHashMap`] able to hold `capacity` entries without
/// reallocating.
#[inline]
#[must_use]
pub fn fx_hash_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_with_capacity() {
        let map: FxHashMap<String, i32> = fx_hash_map_with_capacity(64);
        assert!(map.capacity() >= 64);
        assert!(map.is_empty());
    }

    #[test]
    fn test_fx_hash_set_dedup() {
        let mut set: FxHashSet<&str> = FxHashSet::default();
        assert!(set.insert("a"));
        assert!(!set.insert("a"));
        assert_eq!(set.len(), 1);
    }
}
