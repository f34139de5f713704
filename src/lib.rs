//! Address Grouper: finds people who live at the same physical address.
//!
//! Raw `(Name, Address)` rows are transliterated and normalized, optionally
//! geocoded, then grouped under one of three policies (spatial range,
//! exact coordinate, fuzzy text).

pub mod error;
pub mod geocode;
pub mod grouping;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod table;
pub mod translit;

pub use error::{GroupingError, Result};
pub use geocode::{Coordinates, CoordinateResolver, ErrorSink, ResolveFailure};
pub use grouping::{GroupingConfig, GroupingEngine, GroupingPolicy};
pub use normalize::{AddressNormalizer, NormalizationTables};
pub use pipeline::{Pipeline, RunSummary};
pub use record::Record;
pub use table::{GroupedTable, InputTable};
pub use translit::Transliterator;
