//! Batch pipeline: normalize → resolve (optional) → group → result table.

use crate::error::{GroupingError, Result};
use crate::geocode::{CoordinateResolver, ErrorSink};
use crate::grouping::{Group, GroupingConfig, GroupingEngine, GroupingPolicy};
use crate::normalize::AddressNormalizer;
use crate::record::Record;
use crate::table::{GroupedTable, InputTable};
use tracing::{debug, info};

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_read: usize,
    /// Rows with a blank address, never normalized or grouped.
    pub skipped: usize,
    pub resolved: usize,
    pub failed: usize,
    pub groups: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: GroupedTable,
    pub groups: Vec<Group>,
    /// Records that took part, with normalized address and resolution outcome.
    pub records: Vec<Record>,
    pub summary: RunSummary,
}

pub struct Pipeline {
    normalizer: AddressNormalizer,
    engine: GroupingEngine,
}

impl Pipeline {
    pub fn new(normalizer: AddressNormalizer, config: &GroupingConfig) -> Result<Self> {
        Ok(Self {
            normalizer,
            engine: GroupingEngine::from_config(config)?,
        })
    }

    pub fn policy(&self) -> GroupingPolicy {
        self.engine.policy()
    }

    /// Run one batch. A resolver is required whenever the policy groups by
    /// coordinates; it is never called otherwise.
    pub fn run(
        &self,
        table: InputTable,
        resolver: Option<&mut dyn CoordinateResolver>,
        sink: &mut dyn ErrorSink,
    ) -> Result<PipelineOutput> {
        let policy = self.engine.policy();
        let resolver = match (policy.uses_coordinates(), resolver) {
            (true, None) => {
                return Err(GroupingError::InvalidConfig(
                    "geocoding is enabled but no coordinate resolver was supplied".into(),
                ))
            }
            (true, Some(r)) => Some(r),
            (false, _) => None,
        };

        let mut summary = RunSummary {
            rows_read: table.len(),
            ..Default::default()
        };

        let mut records: Vec<Record> = Vec::with_capacity(table.len());
        for record in table.records {
            if record.has_address() {
                records.push(record);
            } else {
                debug!(index = record.index, name = %record.name, "skipping row without address");
                summary.skipped += 1;
            }
        }
        records.sort_by_key(|r| r.index);

        self.normalize(&mut records);

        if let Some(resolver) = resolver {
            let (resolved, failed) = resolve_all(&mut records, resolver, sink);
            summary.resolved = resolved;
            summary.failed = failed;
        }

        let groups = self.engine.group(&records);
        summary.groups = groups.len();
        let table = GroupedTable::from_groups(&groups);

        info!(
            rows = summary.rows_read,
            skipped = summary.skipped,
            resolved = summary.resolved,
            failed = summary.failed,
            groups = summary.groups,
            "batch finished"
        );

        Ok(PipelineOutput {
            table,
            groups,
            records,
            summary,
        })
    }

    pub fn normalize(&self, records: &mut [Record]) {
        for record in records.iter_mut() {
            let analysis = self.normalizer.analyze(&record.raw_address);
            for (kind, reason) in analysis.omitted() {
                debug!(index = record.index, section = %kind, ?reason, "section omitted");
            }
            record.normalized_address = analysis.text;
        }
    }
}

/// Resolve every record in order; failures are recorded on the record and
/// logged to `sink` without affecting other rows.
pub fn resolve_all(
    records: &mut [Record],
    resolver: &mut dyn CoordinateResolver,
    sink: &mut dyn ErrorSink,
) -> (usize, usize) {
    let (mut resolved, mut failed) = (0, 0);
    for record in records.iter_mut() {
        match resolver.resolve(&record.normalized_address) {
            Ok(coords) => {
                record.coordinates = Some(coords);
                record.resolution_error = None;
                resolved += 1;
            }
            Err(failure) => {
                let reason = failure.to_string();
                sink.log(&format!(
                    "Error in getting coordinates for index {} with address '{}' => message {}",
                    record.index, record.normalized_address, reason
                ));
                debug!(index = record.index, %reason, "resolution failed");
                record.coordinates = None;
                record.resolution_error = Some(reason);
                failed += 1;
            }
        }
    }
    (resolved, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{Coordinates, ResolveFailure};
    use std::collections::HashMap;

    /// In-memory resolver keyed by normalized address.
    #[derive(Default)]
    struct FixedResolver {
        known: HashMap<String, Coordinates>,
        calls: Vec<String>,
    }

    impl FixedResolver {
        fn with(mut self, address: &str, lat: f64, lon: f64) -> Self {
            self.known.insert(address.to_string(), Coordinates::new(lat, lon));
            self
        }
    }

    impl CoordinateResolver for FixedResolver {
        fn resolve(&mut self, address: &str) -> std::result::Result<Coordinates, ResolveFailure> {
            self.calls.push(address.to_string());
            self.known
                .get(address)
                .copied()
                .ok_or_else(|| ResolveFailure::NoResults(address.to_string()))
        }
    }

    fn table(rows: &[(&str, &str)]) -> InputTable {
        InputTable::from_rows(&["Name", "Address"], rows.iter().copied()).unwrap()
    }

    fn pipeline(config: GroupingConfig) -> Pipeline {
        Pipeline::new(AddressNormalizer::default(), &config).unwrap()
    }

    fn text_only() -> GroupingConfig {
        GroupingConfig {
            geocoding_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_fuzzy_scenario_main_street() {
        let input = table(&[("A", "123 Main St, Springfield"), ("B", "123 Main Street, Springfield")]);
        let mut sink: Vec<String> = Vec::new();
        let out = pipeline(text_only()).run(input, None, &mut sink).unwrap();
        assert_eq!(out.table.rows, vec!["A, B"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fuzzy_never_calls_resolver() {
        let input = table(&[("A", "1 x, y 2")]);
        let mut resolver = FixedResolver::default();
        let mut sink: Vec<String> = Vec::new();
        pipeline(text_only())
            .run(input, Some(&mut resolver), &mut sink)
            .unwrap();
        assert!(resolver.calls.is_empty());
    }

    #[test]
    fn test_spatial_scenario() {
        let input = table(&[("Y", "5 Elm Road, Sofia 1000"), ("X", "7 Oak Ave., Sofia 1000")]);
        let mut resolver = FixedResolver::default()
            .with("road elm 5, sofia 1000", 42.005, 23.005)
            .with("ave. oak 7, sofia 1000", 42.0, 23.0);
        let mut sink: Vec<String> = Vec::new();
        let config = GroupingConfig {
            delta: Some(0.01),
            ..Default::default()
        };
        let out = pipeline(config).run(input, Some(&mut resolver), &mut sink).unwrap();
        assert_eq!(out.table.rows, vec!["X, Y"]);
        assert_eq!(out.summary.resolved, 2);
    }

    #[test]
    fn test_resolution_failure_is_logged_and_excluded() {
        let input = table(&[
            ("Lost", "nonexistent place"),
            ("Ann", "1 Lane Way, Sofia 1000"),
            ("Bob", "1 Lane Way, Sofia 1000"),
        ]);
        let mut resolver = FixedResolver::default().with("lane way 1, sofia 1000", 42.0, 23.0);
        let mut sink: Vec<String> = Vec::new();
        let out = pipeline(GroupingConfig::default())
            .run(input, Some(&mut resolver), &mut sink)
            .unwrap();

        assert_eq!(out.table.rows, vec!["Ann, Bob"]);
        assert_eq!(out.summary.failed, 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink[0],
            "Error in getting coordinates for index 0 with address 'nonexistent place' \
             => message No results for address \"nonexistent place\""
        );
        let lost = &out.records[0];
        assert!(lost.coordinates.is_none());
        assert!(lost.resolution_error.is_some());
    }

    #[test]
    fn test_every_row_failing_still_completes() {
        let input = table(&[("A", "1 a, b 2"), ("B", "3 c, d 4")]);
        let mut resolver = FixedResolver::default();
        let mut sink: Vec<String> = Vec::new();
        let out = pipeline(GroupingConfig::default())
            .run(input, Some(&mut resolver), &mut sink)
            .unwrap();
        assert!(out.table.is_empty());
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_blank_addresses_are_skipped() {
        let input = table(&[("A", "   "), ("B", "9 Road X, Town 1")]);
        let mut sink: Vec<String> = Vec::new();
        let out = pipeline(text_only()).run(input, None, &mut sink).unwrap();
        assert_eq!(out.summary.skipped, 1);
        assert_eq!(out.table.rows, vec!["B"]);
    }

    #[test]
    fn test_missing_resolver_is_config_error() {
        let input = table(&[("A", "1 a")]);
        let mut sink: Vec<String> = Vec::new();
        let err = pipeline(GroupingConfig::default())
            .run(input, None, &mut sink)
            .unwrap_err();
        assert!(matches!(err, GroupingError::InvalidConfig(_)));
    }

    #[test]
    fn test_result_table_sorted() {
        let input = table(&[
            ("Zed", "1 Road A, Town 1"),
            ("Amy", "99 Parkway Q, Elsewhere 77777"),
            ("Kim", "1 Road A, Town 1"),
        ]);
        let mut sink: Vec<String> = Vec::new();
        let config = GroupingConfig {
            geocoding_enabled: false,
            similarity_score_threshold: 90,
            ..Default::default()
        };
        let out = pipeline(config).run(input, None, &mut sink).unwrap();
        assert_eq!(out.table.rows, vec!["Amy", "Kim, Zed"]);
    }
}
