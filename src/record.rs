use crate::geocode::Coordinates;

/// One input row and everything derived from it during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Position in the input table, used to keep grouping deterministic.
    pub index: usize,
    pub name: String,
    pub raw_address: String,
    pub normalized_address: String,
    pub coordinates: Option<Coordinates>,
    pub resolution_error: Option<String>,
}

impl Record {
    pub fn new(index: usize, name: impl Into<String>, raw_address: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            raw_address: raw_address.into(),
            normalized_address: String::new(),
            coordinates: None,
            resolution_error: None,
        }
    }

    /// Shorthand for tests and callers that already hold coordinates.
    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Some(Coordinates::new(lat, lon));
        self
    }

    pub fn with_normalized(mut self, normalized: impl Into<String>) -> Self {
        self.normalized_address = normalized.into();
        self
    }

    pub fn has_address(&self) -> bool {
        !self.raw_address.trim().is_empty()
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }
}
