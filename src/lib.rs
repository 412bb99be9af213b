//! chained-dict: a single-threaded, string-keyed dictionary built on
//! separate chaining with a seeded polynomial hash.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a self-contained associative array; no standard map type backs
//!   the storage.
//! - Layers:
//!   - `hash`: `HashSeed` and `StrHasher`, the polynomial string hash
//!     (`h = h * 17 + c`, wrapping `u64`).
//!   - `ChainedTable<V>`: bucket array, chain scan, insert/remove and
//!     quadratic growth. Each entry stores its hash.
//!   - `Dict<V>`: public API. Primitive operations return `Result` with
//!     `DictError::KeyNotFound`; convenience methods (`get_or_default`,
//!     `pop`, `set_default`, `update`, display) are built on them.
//!
//! Constraints
//! - Single-threaded; no internal locking. Iterators borrow the map, so
//!   mutation during iteration is rejected at compile time.
//! - Keys are `String`s and lookups take `&str`; values are opaque.
//! - At most one entry per key. Overwriting removes the old entry and
//!   appends the new one at the tail of its bucket.
//!
//! Hashing and seeds
//! - `Dict::new()` uses a process-wide seed derived once from wall-clock
//!   time, so hashes (and iteration order) differ between runs but are
//!   stable within one.
//! - `Dict::with_seed` injects a fixed seed for reproducible layouts.
//! - Arithmetic wraps at 64 bits. Distinct keys may share a hash; the scan
//!   compares keys whenever stored hashes match.
//!
//! Growth
//! - Before every insert, if `len / bucket_count >= 2/3`, the bucket count
//!   is squared (8, 64, 4096, ...). Entries are moved by their stored hash
//!   into a fully staged array which then replaces the old one.
//! - Amortized insert cost stays O(1), but resizes are rarer and larger
//!   than with doubling.
//! - Squaring overflow or a failed reservation surfaces as
//!   `DictError::CapacityOverflow` from `try_set`; `set` panics on it.
//!
//! Notes and non-goals
//! - No tree-ified chains: adversarial keys degrade a bucket to a linear scan.
//! - No shrinking; `clear` keeps the bucket count.

mod dict;
mod dict_proptest;
pub mod error;
pub mod hash;
pub mod table;

// Public surface
pub use dict::Dict;
pub use error::{DictError, Result};
pub use hash::{HashSeed, StrHasher};
