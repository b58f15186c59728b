//! Phase 1: segment analysis (§4.4). Keyed by `(segment_count, index)`
//! rather than a single corpus-wide index (SPEC_FULL §10.4), so paths of
//! different lengths never share statistics at "the same" position.

use rustc_hash::FxHashMap;

/// Per-position observation state. Once the distinct-value count would
/// exceed `max_unique_values`, the multiset is discarded and only the
/// running total is kept (§4.4 phase 1, "saturation").
#[derive(Debug, Default)]
pub struct PositionStats {
    pub total: u64,
    values: Option<FxHashMap<String, u64>>,
    saturated: bool,
}

impl PositionStats {
    fn record(&mut self, value: &str, max_unique_values: usize) {
        self.total += 1;
        if self.saturated {
            return;
        }
        let map = self.values.get_or_insert_with(FxHashMap::default);
        if !map.contains_key(value) && map.len() >= max_unique_values {
            self.saturated = true;
            self.values = None;
            return;
        }
        *map.entry(value.to_string()).or_insert(0) += 1;
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    pub fn unique_count(&self) -> usize {
        self.values.as_ref().map(|m| m.len()).unwrap_or(0)
    }

    pub fn values(&self) -> Option<&FxHashMap<String, u64>> {
        self.values.as_ref()
    }
}

/// The full per-position segment analysis over a corpus.
#[derive(Debug, Default)]
pub struct SegmentAnalysis {
    positions: FxHashMap<(usize, usize), PositionStats>,
}

impl SegmentAnalysis {
    pub fn record_path(&mut self, segments: &[&str], max_unique_values: usize) {
        let count = segments.len();
        for (idx, seg) in segments.iter().enumerate() {
            self.positions.entry((count, idx)).or_default().record(seg, max_unique_values);
        }
    }

    pub fn position(&self, segment_count: usize, index: usize) -> Option<&PositionStats> {
        self.positions.get(&(segment_count, index))
    }
}
