//! open-addressing-map: a single-threaded hash map that stores entries
//! directly in one slot array, resolves collisions by linear probing, and
//! deletes lazily with tombstones.
//!
//! Internal Design:
//!
//! Summary
//! - `Slot<K, V>`: tagged three-state cell (`Empty`, `Occupied`,
//!   `Tombstone`). Lookup and insertion match on it exhaustively.
//! - `RawTable<K, V>`: the slot array plus `size` and `locations_used`.
//!   Works on precomputed `u64` hashes; probing, growth and tombstone
//!   bookkeeping live here.
//! - `OpenAddressingMap<K, V, S>`: public API. Hashes keys with `S`, guards
//!   entry points against reentrancy in debug builds, and delegates to
//!   `RawTable`.
//!
//! Probing
//! - Home index is the hash read as signed, reduced with `rem_euclid` over
//!   the table length, so negative hashes land in range.
//! - Lookups walk forward, wrapping at the end, past tombstones and other
//!   keys, and stop at the first empty slot or after one full lap.
//! - Inserts remember the first tombstone on the chain and reuse it when the
//!   key is absent; otherwise the terminating empty slot is taken.
//!
//! Growth
//! - `locations_used` rises when an insert claims a slot (empty or
//!   tombstoned) and falls on removal. Before a new key is placed, the table
//!   is rebuilt at `2n + 1` if `(locations_used + 1) / n` would exceed
//!   [`MAX_LOAD_FACTOR`]. Capacity therefore follows the live count, and
//!   insert/remove churn does not grow the table.
//! - Updates of present keys never grow the table.
//! - Rebuilding drops tombstones and reuses the stored hashes; `K: Hash` is
//!   not called again after insertion.
//! - Tombstones are not counted, so a table can run out of empty slots.
//!   Probes are bounded to one lap, so every operation still terminates.
//!
//! Constraints
//! - Single-threaded: the map is `!Send`/`!Sync` (reentrancy marker).
//! - Keys need `Eq` and a `Hash` consistent with it for as long as they are
//!   stored; breaking that gives unspecified lookup results, not UB.
//! - No iteration-order guarantee.
//!
//! Absent inputs
//! - The core methods take `K`/`V` by value or reference and so cannot
//!   receive an absent argument. The `try_*` methods accept `Option` inputs
//!   and fail with [`MapError::InvalidArgument`] on `None` before any state
//!   is touched.

mod error;
pub mod map;
mod map_proptest;
mod reentrancy;
mod slot;
mod table;

// Public surface
pub use error::MapError;
pub use map::{Iter, OpenAddressingMap};
pub use table::{INITIAL_CAPACITY, MAX_LOAD_FACTOR};
