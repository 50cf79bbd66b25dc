#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The error type shared by every container.
pub mod error;

/// A slot array whose empty slots only ever trail its live elements.
pub mod growable_array;

/// An amortized-growth array of `i32`.
pub mod int_array;

/// The chained hash table engine behind every key table.
///
/// This module provides [`HashTable`](hash_table::HashTable), which manages
/// entry indices and collision chains but stores no keys, plus the capability
/// traits key tables implement so the engine can rehash and sort them.
pub mod hash_table;

/// Key table for byte and character sequences.
pub mod sequence_table;

/// Key table for arbitrary `Hash + Eq` keys.
pub mod identity_table;

/// A sequence-keyed value map.
pub mod sequence_map;

/// A sequence-keyed `i32` map with an "absent" sentinel.
pub mod sequence_int_map;

/// A set of sequences.
pub mod sequence_set;

/// A bounded interning pool for sequences.
pub mod sequence_pool;

/// A value map over arbitrary keys.
///
/// This module provides an `IdentityMap` that pairs an `IdentityTable` with
/// a parallel value array and exposes an entry API.
pub mod identity_map;

/// A set over arbitrary keys.
pub mod identity_set;

/// A sequence-keyed map built on `hashbrown`.
pub mod slice_map;

pub use error::Error;
pub use error::Result;
pub use growable_array::GrowableArray;
pub use hash_table::HashTable;
pub use hash_table::Mode;
pub use identity_map::Entry;
pub use identity_map::IdentityMap;
pub use identity_set::IdentitySet;
pub use identity_table::DefaultHashBuilder;
pub use identity_table::IdentityTable;
pub use int_array::GrowableIntArray;
pub use sequence_int_map::SequenceIntMap;
pub use sequence_map::SequenceMap;
pub use sequence_pool::SequencePool;
pub use sequence_set::SequenceSet;
pub use sequence_table::SequenceTable;
pub use slice_map::SliceMap;
