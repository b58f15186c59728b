//! Black-box tests against the public `AlignmentEngine` API (§4.7
//! invariants 9 and 10, multi-contract ordering guarantee from §5).

use std::collections::BTreeMap;

use attestor_engine::alignment::{AlignmentEngine, AlignmentOptions, ValidationCategory};
use attestor_model::status::AggregationStrategy;
use attestor_model::{Contract, ContractMetadata, Endpoint, FieldSet, Operation, ResponseSpec, Span, SpanStatus, SpanStatusCode, TraceData, Value};

fn contract_named(name: &str, path: &str, required_headers: Vec<&str>) -> Contract {
    Contract {
        api_version: "v1".to_string(),
        kind: "Contract".to_string(),
        metadata: ContractMetadata { name: name.to_string(), version: "1".to_string() },
        endpoints: vec![Endpoint {
            path: path.to_string(),
            operations: vec![Operation {
                method: "GET".to_string(),
                responses: ResponseSpec {
                    status_codes: None,
                    status_ranges: Some(vec!["2xx".to_string()]),
                    aggregation: AggregationStrategy::Auto,
                },
                required: FieldSet::new(vec![], required_headers.into_iter().map(str::to_string).collect()),
                optional: FieldSet::default(),
                stats: None,
            }],
            stats: None,
        }],
    }
}

fn span_for(path: &str, status_code: i64, auth_header: Option<&str>) -> Span {
    let mut attrs = BTreeMap::new();
    attrs.insert("http.method".to_string(), Value::Str("GET".to_string()));
    attrs.insert("http.target".to_string(), Value::Str(path.to_string()));
    attrs.insert("http.status_code".to_string(), Value::Int(status_code));
    if let Some(h) = auth_header {
        attrs.insert("http.request.header.authorization".to_string(), Value::Str(h.to_string()));
    }
    Span {
        span_id: format!("span-{path}"),
        trace_id: "trace-1".to_string(),
        parent_id: None,
        name: format!("GET {path}"),
        start_time: 0,
        end_time: 5,
        status: SpanStatus { code: SpanStatusCode::Ok, message: String::new() },
        attributes: attrs,
        events: Vec::new(),
    }
}

fn trace_with(spans: Vec<Span>) -> TraceData {
    let mut map = BTreeMap::new();
    for span in spans {
        map.insert(span.span_id.clone(), span);
    }
    TraceData::build("trace-1".to_string(), map).unwrap()
}

// Invariant 9 (§4.7): aligning the same contracts against the same trace
// twice produces identical reports (modulo wall-clock timing fields).
#[test]
fn invariant_9_alignment_is_idempotent_over_the_same_input() {
    let contracts = vec![contract_named("users-api", "/api/users/{id}", vec!["authorization"])];
    let trace = trace_with(vec![span_for("/api/users/42", 200, Some("Bearer x"))]);
    let engine = AlignmentEngine::new(AlignmentOptions::default());

    let first = engine.align(&contracts, &trace);
    let second = engine.align(&contracts, &trace);

    assert_eq!(first.summary, second.summary);
    assert_eq!(first.results.len(), second.results.len());
    for (a, b) in first.results.iter().zip(second.results.iter()) {
        assert_eq!(a.status, b.status);
        assert_eq!(a.assertions_total, b.assertions_total);
        assert_eq!(a.assertions_passed, b.assertions_passed);
        assert_eq!(a.matched_spans, b.matched_spans);
        assert_eq!(a.details, b.details);
    }
}

// Invariant 10 (§4.7): a failing status-code validation reports the
// concrete actual and expected values, not just a boolean.
#[test]
fn invariant_10_status_validator_failure_carries_expected_and_actual() {
    let contracts = vec![contract_named("users-api", "/api/users/{id}", vec![])];
    let trace = trace_with(vec![span_for("/api/users/42", 503, None)]);
    let engine = AlignmentEngine::new(AlignmentOptions::default());

    let report = engine.align(&contracts, &trace);
    let detail = report.results[0].details.iter().find(|d| d.category == ValidationCategory::StatusCode).unwrap();
    assert_eq!(detail.actual, Value::Int(503));
    let expected_ranges = match &detail.expected {
        Value::Map(m) => m.get("statusRanges").cloned(),
        _ => None,
    };
    assert_eq!(expected_ranges, Some(Value::List(vec![Value::Str("2xx".to_string())])));
}

// §5 ordering guarantee: results come back in the same order contracts
// were submitted, regardless of worker scheduling.
#[test]
fn multi_contract_results_preserve_input_order() {
    let contracts = vec![
        contract_named("a-api", "/api/a", vec![]),
        contract_named("b-api", "/api/b", vec![]),
        contract_named("c-api", "/api/c", vec![]),
    ];
    let trace = trace_with(vec![span_for("/api/a", 200, None), span_for("/api/b", 200, None), span_for("/api/c", 200, None)]);
    let engine = AlignmentEngine::new(AlignmentOptions { worker_count: Some(3), ..Default::default() });

    let report = engine.align(&contracts, &trace);
    let names: Vec<&str> = report.results.iter().map(|r| r.spec_operation_id.as_str()).collect();
    assert_eq!(names, vec!["a-api", "b-api", "c-api"]);
    assert_eq!(report.summary.succeeded, 3);
}

#[test]
fn skip_missing_suppresses_matching_failures_across_contracts() {
    let contracts = vec![contract_named("missing-api", "/api/missing", vec![])];
    let trace = trace_with(vec![span_for("/api/other", 200, None)]);
    let engine = AlignmentEngine::new(AlignmentOptions { skip_missing: Some(true), ..Default::default() });

    let report = engine.align(&contracts, &trace);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.failed, 0);
}
