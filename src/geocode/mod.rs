//! Geocoding subsystem.
//!
//! Turns normalized addresses into coordinates through a local cache and
//! the Geoapify search API, and records failures in an error sink.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::GeocodeCache;
pub use providers::GeoapifyClient;
pub use resolver::GeocodeResolver;
pub use types::{
    Coordinates, CoordinateResolver, ErrorSink, FileErrorSink, GeocodeSource, ResolveFailure,
};
