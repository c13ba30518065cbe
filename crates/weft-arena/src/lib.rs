//! Generational slot arena for Weft solver graphs.
//!
//! Variables and constraints refer to each other constantly: a variable
//! points at the constraint determining it, a constraint's enforcing
//! method points at its output variable. Rather than pointer cycles,
//! both live in an [`Arena`] and refer to each other by typed key.
//!
//! # Layout
//!
//! ```text
//! Arena<K, V>
//! ├── slots: Vec<Slot<V>>   (generation + optional value)
//! ├── free:  Vec<u32>       (vacant slot indices, LIFO reuse)
//! └── len                   (occupied slot count)
//! ```
//!
//! A key carries the slot index and the generation the slot had when
//! the value was inserted. Removing a value bumps the slot generation,
//! so every key to the removed value becomes stale in O(1) without a
//! lookup table.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod slab;

pub use error::ArenaError;
pub use handle::SlotKey;
pub use slab::Arena;
