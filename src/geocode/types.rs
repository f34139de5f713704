//! Core types for the geocoding subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A geocoded point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

/// Where a set of coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeocodeSource {
    Cache,
    Geoapify,
}

impl fmt::Display for GeocodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "Cache"),
            Self::Geoapify => write!(f, "Geoapify"),
        }
    }
}

/// Why an address could not be turned into coordinates.
///
/// The `Display` text is the failure reason stored on the record and
/// written to the error sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    #[error("{0}")]
    Network(String),
    #[error("Request failed with status code {0}")]
    Status(u16),
    #[error("No results for address \"{0}\"")]
    NoResults(String),
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
    #[error("Address \"{0}\" not cached and resolver is offline")]
    Offline(String),
}

/// Turns a normalized address into coordinates.
pub trait CoordinateResolver {
    fn resolve(&mut self, address: &str) -> Result<Coordinates, ResolveFailure>;
}

impl<R: CoordinateResolver + ?Sized> CoordinateResolver for &mut R {
    fn resolve(&mut self, address: &str) -> Result<Coordinates, ResolveFailure> {
        (**self).resolve(address)
    }
}

/// Append-only log of per-address resolution failures. Never fails.
pub trait ErrorSink {
    fn log(&mut self, message: &str);
}

impl ErrorSink for Vec<String> {
    fn log(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Appends every message as one line to a text file.
pub struct FileErrorSink {
    path: PathBuf,
}

impl FileErrorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ErrorSink for FileErrorSink {
    fn log(&mut self, message: &str) {
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{}", message));
        if let Err(e) = written {
            tracing::warn!(path = %self.path.display(), error = %e, "could not append to error log");
        }
    }
}
