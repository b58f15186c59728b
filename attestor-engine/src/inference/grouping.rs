//! Phase 3: grouping records by the pattern their path mapped to (§4.4).

use std::collections::BTreeMap;
use std::time::SystemTime;

use attestor_model::NormalizedRecord;
use rustc_hash::FxHashMap;

/// Per-operation (pattern, method) accumulator.
#[derive(Debug, Default)]
pub struct OperationAccumulator {
    pub sample_count: u64,
    pub first_seen: Option<SystemTime>,
    pub last_seen: Option<SystemTime>,
    pub status_codes: Vec<u16>,
    pub query_counts: FxHashMap<String, u64>,
    pub header_counts: FxHashMap<String, u64>,
}

impl OperationAccumulator {
    fn observe(&mut self, record: &NormalizedRecord) {
        self.sample_count += 1;
        self.status_codes.push(record.status);

        self.first_seen = Some(match self.first_seen {
            Some(existing) if existing <= record.timestamp => existing,
            _ => record.timestamp,
        });
        self.last_seen = Some(match self.last_seen {
            Some(existing) if existing >= record.timestamp => existing,
            _ => record.timestamp,
        });

        for key in record.query.keys() {
            *self.query_counts.entry(key.clone()).or_insert(0) += 1;
        }
        for key in record.headers.keys() {
            *self.header_counts.entry(key.to_lowercase()).or_insert(0) += 1;
        }
    }
}

/// Per-pattern accumulator across all observed methods.
#[derive(Debug, Default)]
pub struct EndpointAccumulator {
    pub operations: BTreeMap<String, OperationAccumulator>,
}

impl EndpointAccumulator {
    pub fn sample_count(&self) -> u64 {
        self.operations.values().map(|op| op.sample_count).sum()
    }
}

/// Bucket each well-formed record by the pattern its path mapped to
/// (§4.4 phase 3).
pub fn group<'a>(
    records: &[NormalizedRecord],
    pattern_of: impl Fn(&str) -> Option<&'a str>,
) -> BTreeMap<String, EndpointAccumulator> {
    let mut endpoints: BTreeMap<String, EndpointAccumulator> = BTreeMap::new();
    for record in records {
        let Some(pattern) = pattern_of(&record.path) else {
            continue;
        };
        let endpoint = endpoints.entry(pattern.to_string()).or_default();
        let op = endpoint.operations.entry(record.method.clone()).or_default();
        op.observe(record);
    }
    endpoints
}
