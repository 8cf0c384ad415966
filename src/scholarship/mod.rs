//! The scholarship collection: document types, storage, loading, filtering
//! and per-session bookkeeping.

pub mod filter;
pub mod load;
pub mod session;
pub mod stats;
pub mod store;
pub mod types;

pub use filter::{ScholarshipFilter, SortOrder};
pub use types::{Criterion, ListKind, Scholarship};
