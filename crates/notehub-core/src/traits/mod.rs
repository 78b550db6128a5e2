//! Abstraction traits consumed by the engine.

pub mod clock;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use store::{BatchOp, DocumentStore, Filter, FilterOp, FilterValue, Query};
