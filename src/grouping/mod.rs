//! Grouping engine.
//!
//! Partitions records into groups of "same address" under one of three
//! policies:
//!
//! - spatial range: greedy, order-dependent coverage by ±δ boxes
//! - exact coordinate: equality of (lat, lon); a true partition
//! - fuzzy text: pairwise similarity of normalized addresses, one group
//!   per distinct sorted neighbor list
//!
//! Records are always visited in original input order. The spatial-range
//! and fuzzy-text results can overlap (one name in several groups); this
//! follows the historical output and is not collapsed.

pub mod similarity;

pub use similarity::{ratio, SimilarityEdge, SimilarityMatrix};

use crate::error::{GroupingError, Result};
use crate::geocode::Coordinates;
use crate::record::Record;

pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 50;

/// Knobs that select and parameterize the grouping policy.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingConfig {
    pub geocoding_enabled: bool,
    pub delta: Option<f64>,
    pub similarity_score_threshold: u8,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            geocoding_enabled: true,
            delta: None,
            similarity_score_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl GroupingConfig {
    /// Validate the knobs and pick the policy they describe.
    pub fn policy(&self) -> Result<GroupingPolicy> {
        if self.similarity_score_threshold > 100 {
            return Err(GroupingError::InvalidConfig(format!(
                "similarity threshold must be within 0..=100, got {}",
                self.similarity_score_threshold
            )));
        }
        if !self.geocoding_enabled {
            if self.delta.is_some() {
                tracing::warn!("delta is ignored when geocoding is disabled");
            }
            return Ok(GroupingPolicy::FuzzyText {
                threshold: self.similarity_score_threshold,
            });
        }
        match self.delta {
            None => Ok(GroupingPolicy::ExactCoordinate),
            Some(delta) if delta.is_finite() && delta > 0.0 => {
                Ok(GroupingPolicy::SpatialRange { delta })
            }
            Some(delta) => Err(GroupingError::InvalidConfig(format!(
                "delta must be a positive number, got {}",
                delta
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupingPolicy {
    SpatialRange { delta: f64 },
    ExactCoordinate,
    FuzzyText { threshold: u8 },
}

impl GroupingPolicy {
    pub fn uses_coordinates(&self) -> bool {
        !matches!(self, Self::FuzzyText { .. })
    }
}

/// Open box `(lat ± δ) × (lon ± δ)` around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Coordinates,
    pub max: Coordinates,
}

impl BoundingBox {
    pub fn around(center: Coordinates, delta: f64) -> Self {
        Self {
            min: Coordinates::new(center.lat - delta, center.lon - delta),
            max: Coordinates::new(center.lat + delta, center.lon + delta),
        }
    }

    /// Strict containment; points on the edge are outside.
    pub fn contains(&self, p: Coordinates) -> bool {
        self.min.lat < p.lat && p.lat < self.max.lat && self.min.lon < p.lon && p.lon < self.max.lon
    }
}

/// One emitted group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// `Record::index` of every member, in input order.
    pub members: Vec<usize>,
    /// Member names sorted and joined with `", "`.
    pub names: String,
    /// Point of the record that opened the group (coordinate policies).
    pub anchor: Option<Coordinates>,
    /// Lower corner of the opening box (spatial-range policy).
    pub key: Option<Coordinates>,
}

impl Group {
    fn from_members(members: &[&Record], anchor: Option<Coordinates>, key: Option<Coordinates>) -> Self {
        let mut names: Vec<&str> = members.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        Self {
            members: members.iter().map(|r| r.index).collect(),
            names: names.join(", "),
            anchor,
            key,
        }
    }
}

pub struct GroupingEngine {
    policy: GroupingPolicy,
}

impl GroupingEngine {
    pub fn new(policy: GroupingPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &GroupingConfig) -> Result<Self> {
        Ok(Self::new(config.policy()?))
    }

    pub fn policy(&self) -> GroupingPolicy {
        self.policy
    }

    /// Group `records`. Coordinate policies ignore unresolved records.
    pub fn group(&self, records: &[Record]) -> Vec<Group> {
        let mut ordered: Vec<&Record> = records.iter().collect();
        ordered.sort_by_key(|r| r.index);

        let groups = match self.policy {
            GroupingPolicy::SpatialRange { delta } => spatial_range(&ordered, delta),
            GroupingPolicy::ExactCoordinate => exact_coordinate(&ordered),
            GroupingPolicy::FuzzyText { threshold } => fuzzy_text(&ordered, threshold),
        };
        tracing::debug!(policy = ?self.policy, records = records.len(), groups = groups.len(), "grouping finished");
        groups
    }
}

fn resolved<'a>(records: &[&'a Record]) -> Vec<(&'a Record, Coordinates)> {
    records
        .iter()
        .filter_map(|r| r.coordinates.map(|c| (*r, c)))
        .collect()
}

/// A record is skipped when an already emitted group's anchor lies inside
/// its own box; otherwise it collects every resolved record inside its box.
fn spatial_range(records: &[&Record], delta: f64) -> Vec<Group> {
    let points = resolved(records);
    let mut groups: Vec<Group> = Vec::new();

    for (_, point) in &points {
        let bounds = BoundingBox::around(*point, delta);
        let covered = groups
            .iter()
            .filter_map(|g| g.anchor)
            .any(|anchor| bounds.contains(anchor));
        if covered {
            continue;
        }
        let members: Vec<&Record> = points
            .iter()
            .filter(|(_, p)| bounds.contains(*p))
            .map(|(r, _)| *r)
            .collect();
        groups.push(Group::from_members(&members, Some(*point), Some(bounds.min)));
    }
    groups
}

fn exact_coordinate(records: &[&Record]) -> Vec<Group> {
    let points = resolved(records);
    let mut groups: Vec<Group> = Vec::new();

    for (_, point) in &points {
        if groups.iter().any(|g| g.anchor == Some(*point)) {
            continue;
        }
        let members: Vec<&Record> = points
            .iter()
            .filter(|(_, p)| p == point)
            .map(|(r, _)| *r)
            .collect();
        groups.push(Group::from_members(&members, Some(*point), Some(*point)));
    }
    groups
}

/// Scores are computed over distinct normalized addresses. A candidate list
/// is dropped only when an identical list was already emitted, so groups
/// may share members.
fn fuzzy_text(records: &[&Record], threshold: u8) -> Vec<Group> {
    let mut addresses: Vec<&str> = Vec::new();
    for r in records {
        if !addresses.contains(&r.normalized_address.as_str()) {
            addresses.push(&r.normalized_address);
        }
    }

    let matrix = SimilarityMatrix::build(&addresses);
    let mut seen: Vec<Vec<&str>> = Vec::new();
    let mut groups = Vec::new();

    for (i, address) in addresses.iter().enumerate() {
        let mut candidates: Vec<&str> = matrix
            .neighbors_above(i, threshold)
            .into_iter()
            .map(|j| addresses[j])
            .collect();
        candidates.push(*address);
        candidates.sort_unstable();

        if seen.contains(&candidates) {
            continue;
        }
        let members: Vec<&Record> = records
            .iter()
            .filter(|r| candidates.binary_search(&r.normalized_address.as_str()).is_ok())
            .copied()
            .collect();
        groups.push(Group::from_members(&members, None, None));
        seen.push(candidates);
    }
    groups
}
