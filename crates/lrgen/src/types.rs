//! Utility types.
//!
//! Insertion-order iteration of these maps is what makes index assignment
//! and state numbering deterministic across runs.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
