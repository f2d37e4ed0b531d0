//! Knowledge base for Homie.
//!
//! Three pieces, composed linearly per request:
//!
//! 1. [`Category`] — the closed topic taxonomy and its external key table.
//! 2. [`KnowledgeStore`] — the fragment store. Copy-on-write: readers take
//!    an [`std::sync::Arc`] snapshot, administrative updates swap in a whole
//!    new set, so a read never observes a half-replaced category.
//! 3. [`select`] and [`compose`] — pure functions that turn a user query
//!    plus a snapshot into the system-channel text for the provider.

pub mod category;
pub mod compose;
pub mod selector;
pub mod store;

pub use category::Category;
pub use compose::{compose, RELEVANT_DATA_HEADER};
pub use selector::select;
pub use store::{FragmentSet, KnowledgeStore};
