//! Protected-area proximity: dataset loading plus the spatial index that
//! answers the single "near?" predicate.

mod dataset;
mod index;

pub use dataset::{load_protected_areas, ProtectedArea};
pub use index::{ProximityIndex, DEFAULT_BUFFER_DEGREES};
