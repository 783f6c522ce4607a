//! Laurel - protected-area proximity analysis
//!
//! Batch tool that geocodes a list of addresses and reports, for each one,
//! whether it lies within a fixed buffer of any protected ecological area.

pub mod config;
pub mod geocode;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod proximity;

pub use config::Config;
pub use geocode::{AddressResolver, GeocodeClient, ResolveError};
pub use models::{AddressRecord, Coordinate, ResolvedLocation, ResultRow};
pub use proximity::{ProtectedArea, ProximityIndex, DEFAULT_BUFFER_DEGREES};
