//! Status Aggregator (§4.3). Reduces an observed bag of HTTP status
//! codes to exact codes and/or class ranges under a chosen strategy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status aggregation strategy (part of `ResponseSpec.aggregation`, §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStrategy {
    Exact,
    Range,
    Auto,
}

impl Default for AggregationStrategy {
    fn default() -> Self {
        AggregationStrategy::Auto
    }
}

/// Standard-code tables used by `is_well_represented` (§4.3).
fn standard_codes(class: u8) -> &'static [u16] {
    match class {
        2 => &[200, 201, 204],
        3 => &[301, 302, 304],
        4 => &[400, 401, 403, 404],
        5 => &[500, 502, 503],
        _ => &[],
    }
}

/// The hundreds digit of a status code, or `None` if out of [100,599].
fn class_of(code: u16) -> Option<u8> {
    if (100..=599).contains(&code) {
        Some((code / 100) as u8)
    } else {
        None
    }
}

fn class_label(class: u8) -> String {
    format!("{class}xx")
}

/// True iff `code` is a member of any class's standard-code table.
fn is_standard_code(code: u16) -> bool {
    match class_of(code) {
        Some(class) => standard_codes(class).contains(&code),
        None => false,
    }
}

/// The observed bag is "well-represented" iff some class has >= 3
/// distinct observed codes, or at least two of the *observed* codes
/// (across the whole bag, any class) are members of their class's
/// standard-code table (§4.3, decided per SPEC_FULL §10.3: this is a
/// bag-wide check, not scoped per class — a class with only one
/// observed code can still contribute to the 2-standard-code count, but
/// cannot by itself reach the >=3-distinct branch).
fn is_well_represented(valid: &BTreeSet<u16>, classes: &std::collections::BTreeMap<u8, BTreeSet<u16>>) -> bool {
    if classes.values().any(|codes| codes.len() >= 3) {
        return true;
    }
    valid.iter().filter(|&&code| is_standard_code(code)).count() >= 2
}

/// Aggregation result: sorted unique exact codes, sorted unique class labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedStatus {
    pub codes: Vec<u16>,
    pub ranges: Vec<String>,
}

/// Reduce an unordered bag of status codes per the chosen strategy (§4.3).
pub fn aggregate(observed: &[u16], strategy: AggregationStrategy) -> AggregatedStatus {
    let valid: BTreeSet<u16> = observed.iter().copied().filter(|c| class_of(*c).is_some()).collect();

    if valid.is_empty() {
        return AggregatedStatus::default();
    }

    if valid.len() == 1 {
        return AggregatedStatus {
            codes: valid.into_iter().collect(),
            ranges: Vec::new(),
        };
    }

    match strategy {
        AggregationStrategy::Exact => AggregatedStatus {
            codes: valid.into_iter().collect(),
            ranges: Vec::new(),
        },
        AggregationStrategy::Range => AggregatedStatus {
            codes: Vec::new(),
            ranges: range_labels(&valid),
        },
        AggregationStrategy::Auto => aggregate_auto(&valid),
    }
}

fn by_class(valid: &BTreeSet<u16>) -> std::collections::BTreeMap<u8, BTreeSet<u16>> {
    let mut map: std::collections::BTreeMap<u8, BTreeSet<u16>> = std::collections::BTreeMap::new();
    for &code in valid {
        map.entry(class_of(code).expect("filtered to valid range")).or_default().insert(code);
    }
    map
}

fn range_labels(valid: &BTreeSet<u16>) -> Vec<String> {
    by_class(valid).keys().map(|c| class_label(*c)).collect()
}

fn aggregate_auto(valid: &BTreeSet<u16>) -> AggregatedStatus {
    let classes = by_class(valid);

    if classes.len() == 1 {
        return AggregatedStatus {
            codes: Vec::new(),
            ranges: range_labels(valid),
        };
    }

    if is_well_represented(valid, &classes) {
        AggregatedStatus {
            codes: Vec::new(),
            ranges: range_labels(valid),
        }
    } else {
        AggregatedStatus {
            codes: valid.iter().copied().collect(),
            ranges: Vec::new(),
        }
    }
}
