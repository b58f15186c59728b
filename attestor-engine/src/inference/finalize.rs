//! Phase 4: per-operation finalization (§4.4).

use attestor_model::status::{aggregate, AggregationStrategy};
use attestor_model::{Endpoint, FieldSet, Operation, ResponseSpec, Stats};

use super::grouping::{EndpointAccumulator, OperationAccumulator};

fn finalize_fields(counts: &rustc_hash::FxHashMap<String, u64>, sample_count: u64, threshold: f64) -> (Vec<String>, Vec<String>) {
    let mut required = Vec::new();
    let mut optional = Vec::new();
    for (key, count) in counts {
        let ratio = if sample_count == 0 { 0.0 } else { *count as f64 / sample_count as f64 };
        if ratio >= threshold {
            required.push(key.clone());
        } else {
            optional.push(key.clone());
        }
    }
    (required, optional)
}

/// Finalize one `(pattern, method)` accumulator into an `Operation`
/// (§4.4 phase 4): required/optional partitioning, status aggregation,
/// stable sort order.
pub fn finalize_operation(method: &str, acc: &OperationAccumulator, required_field_threshold: f64, status_strategy: AggregationStrategy) -> Operation {
    let (required_query, optional_query) = finalize_fields(&acc.query_counts, acc.sample_count, required_field_threshold);
    let (required_headers, optional_headers) = finalize_fields(&acc.header_counts, acc.sample_count, required_field_threshold);

    let aggregated = aggregate(&acc.status_codes, status_strategy);
    let responses = ResponseSpec {
        status_codes: (!aggregated.codes.is_empty()).then_some(aggregated.codes),
        status_ranges: (!aggregated.ranges.is_empty()).then_some(aggregated.ranges),
        aggregation: status_strategy,
    };

    let stats = match (acc.first_seen, acc.last_seen) {
        (Some(first), Some(last)) => Some(Stats::new(acc.sample_count, first, last)),
        _ => None,
    };

    Operation {
        method: method.to_string(),
        responses,
        required: FieldSet::new(required_query, required_headers),
        optional: FieldSet::new(optional_query, optional_headers),
        stats,
    }
}

/// Finalize one pattern's accumulator into an `Endpoint`: operations
/// sorted by method, endpoint stats = min/max across operations (§4.4 Output).
pub fn finalize_endpoint(path: &str, acc: &EndpointAccumulator, required_field_threshold: f64, status_strategy: AggregationStrategy) -> Endpoint {
    let mut operations: Vec<Operation> = acc
        .operations
        .iter()
        .map(|(method, op_acc)| finalize_operation(method, op_acc, required_field_threshold, status_strategy))
        .collect();
    operations.sort_by(|a, b| a.method.cmp(&b.method));

    let first_seen = operations.iter().filter_map(|o| o.stats.as_ref().map(|s| s.first_seen)).min();
    let last_seen = operations.iter().filter_map(|o| o.stats.as_ref().map(|s| s.last_seen)).max();
    let stats = match (first_seen, last_seen) {
        (Some(first), Some(last)) => Some(Stats::new(acc.sample_count(), first, last)),
        _ => None,
    };

    Endpoint {
        path: path.to_string(),
        operations,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn field_above_threshold_is_required() {
        let mut acc = OperationAccumulator::default();
        acc.sample_count = 100;
        acc.first_seen = Some(SystemTime::UNIX_EPOCH);
        acc.last_seen = Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1));
        acc.query_counts.insert("page".to_string(), 96);
        acc.query_counts.insert("sort".to_string(), 40);

        let op = finalize_operation("GET", &acc, 0.95, AggregationStrategy::Exact);
        assert_eq!(op.required.query, vec!["page".to_string()]);
        assert_eq!(op.optional.query, vec!["sort".to_string()]);
    }

    #[test]
    fn status_codes_sorted_ascending() {
        let mut acc = OperationAccumulator::default();
        acc.sample_count = 3;
        acc.first_seen = Some(SystemTime::UNIX_EPOCH);
        acc.last_seen = Some(SystemTime::UNIX_EPOCH);
        acc.status_codes = vec![404, 200, 201];

        let op = finalize_operation("GET", &acc, 0.95, AggregationStrategy::Exact);
        assert_eq!(op.responses.status_codes, Some(vec![200, 201, 404]));
    }
}
