//! Alignment Engine orchestrator (§4.7, §5): a parallel worker pool over
//! contracts, built on `crossbeam_channel`'s `Sender`/`Receiver` pair, the
//! same primitive the teacher's storage writer and scanner walker use for
//! cross-thread handoff.

use std::collections::BTreeSet;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use attestor_model::{Contract, Span, TraceData, Value};
use crossbeam_channel::{unbounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};

use super::report::{AlignmentReport, AlignmentResult, OperationResult, OperationStatus, PerformanceInfo, Summary, ValidationCategory, ValidationDetail};
use super::span_matcher;
use super::validators::{self, ValidatorOutcome};

/// Alignment configuration (§4.7, §5), the same `Option<T>` +
/// `effective_*()` shape as `InferenceOptions`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlignmentOptions {
    pub worker_count: Option<usize>,
    pub timeout: Option<Duration>,
    pub skip_missing: Option<bool>,
}

impl AlignmentOptions {
    pub fn effective_worker_count(&self, contract_count: usize) -> usize {
        self.worker_count.unwrap_or(4).max(1).min(contract_count.max(1))
    }

    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn effective_skip_missing(&self) -> bool {
        self.skip_missing.unwrap_or(false)
    }
}

pub struct AlignmentEngine {
    options: AlignmentOptions,
}

impl AlignmentEngine {
    pub fn new(options: AlignmentOptions) -> Self {
        Self { options }
    }

    /// Verify every contract's endpoints/operations against `trace` (§4.7
    /// `align(contracts[], trace) -> AlignmentReport`).
    pub fn align(&self, contracts: &[Contract], trace: &TraceData) -> AlignmentReport {
        let start_time = SystemTime::now();
        let started = Instant::now();

        let worker_count = self.options.effective_worker_count(contracts.len());
        let timeout = self.options.effective_timeout();
        let skip_missing = self.options.effective_skip_missing();

        let (work_tx, work_rx) = unbounded::<(usize, &Contract)>();
        let (result_tx, result_rx) = unbounded::<(usize, AlignmentResult)>();

        for (idx, contract) in contracts.iter().enumerate() {
            work_tx.send((idx, contract)).expect("work receiver outlives every sender");
        }
        drop(work_tx);

        let mut indexed: Vec<(usize, AlignmentResult)> = Vec::with_capacity(contracts.len());
        let mut timed_out = false;
        let deadline = timeout.map(|t| Instant::now() + t);

        thread::scope(|scope| {
            for _ in 0..worker_count {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    // Check the deadline before pulling each item, not just
                    // between result collections, so a large backlog can't
                    // keep a worker draining the queue past expiry (§5).
                    loop {
                        let received = match deadline {
                            Some(d) => work_rx.recv_deadline(d),
                            None => work_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                        };
                        let (idx, contract) = match received {
                            Ok(pair) => pair,
                            Err(_) => break,
                        };
                        let result = align_one_contract(contract, trace, skip_missing);
                        let _ = result_tx.send((idx, result));
                    }
                });
            }
            drop(result_tx);

            for _ in 0..contracts.len() {
                let received = match deadline {
                    Some(d) => result_rx.recv_deadline(d),
                    None => result_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };
                match received {
                    Ok(pair) => indexed.push(pair),
                    Err(_) => {
                        timed_out = true;
                        break;
                    }
                }
            }
        });

        indexed.sort_by_key(|(idx, _)| *idx);
        let results: Vec<AlignmentResult> = indexed.into_iter().map(|(_, r)| r).collect();

        let end_time = SystemTime::now();
        let execution_time = started.elapsed();

        let all_operations: Vec<&OperationResult> = results.iter().flat_map(|r| &r.operation_results).collect();
        let summary = Summary {
            total_operations: all_operations.len() as u64,
            succeeded: all_operations.iter().filter(|o| o.status == OperationStatus::Success).count() as u64,
            failed: all_operations.iter().filter(|o| o.status == OperationStatus::Failed).count() as u64,
            skipped: all_operations.iter().filter(|o| o.status == OperationStatus::Skipped).count() as u64,
        };

        let spans_matched: u64 = results.iter().map(|r| r.matched_spans.len() as u64).sum();
        let assertions_evaluated: u64 = results.iter().map(|r| r.assertions_total).sum();
        let secs = execution_time.as_secs_f64();
        let processing_rate_per_sec = if secs > 0.0 { contracts.len() as f64 / secs } else { contracts.len() as f64 };

        let performance_info = PerformanceInfo {
            specs_processed: contracts.len() as u64,
            spans_matched,
            assertions_evaluated,
            worker_count,
            processing_rate_per_sec,
        };

        AlignmentReport {
            summary,
            results,
            execution_time,
            start_time,
            end_time,
            performance_info,
            error_message: timed_out.then(|| format!("alignment timed out after {:?}; partial results returned", timeout.expect("timed_out implies a configured timeout"))),
        }
    }
}

fn align_one_contract(contract: &Contract, trace: &TraceData, skip_missing: bool) -> AlignmentResult {
    let started = Instant::now();
    let candidate_spans: Vec<&Span> = trace.spans.values().collect();

    let mut operation_results = Vec::new();
    let mut all_details = Vec::new();
    let mut matched_spans: BTreeSet<String> = BTreeSet::new();
    let mut total = 0u64;
    let mut passed = 0u64;
    let mut failed = 0u64;

    // Endpoints are already sorted by path and operations by method
    // (§4.4 Output), so iterating in declared order already satisfies
    // §5's "endpoint-then-method, both sorted" ordering guarantee.
    for endpoint in &contract.endpoints {
        for operation in &endpoint.operations {
            let operation_key = format!("{} {}", operation.method, endpoint.path);
            let matched = span_matcher::match_operation(&operation.method, &endpoint.path, &candidate_spans);

            if matched.is_empty() {
                let (status, details, op_total, op_failed) = missing_match_outcome(&operation_key, skip_missing);
                all_details.extend(details.clone());
                total += op_total;
                failed += op_failed;
                operation_results.push(OperationResult {
                    operation_key,
                    status,
                    details,
                    matched_spans: Vec::new(),
                    assertions_total: op_total,
                    assertions_passed: 0,
                    assertions_failed: op_failed,
                });
                continue;
            }

            let mut op_details = Vec::new();
            let mut op_total = 0u64;
            let mut op_passed = 0u64;
            let mut op_failed = 0u64;
            let mut op_matched_spans = Vec::new();

            for span in &matched {
                matched_spans.insert(span.span_id.clone());
                op_matched_spans.push(span.span_id.clone());

                if let Some(outcome) = validators::validate_status_code(&operation.responses, span) {
                    record_outcome(ValidationCategory::StatusCode, &operation_key, outcome, &mut op_details, &mut op_total, &mut op_passed, &mut op_failed);
                }
                for header in &operation.required.headers {
                    let outcome = validators::validate_required_header(header, span);
                    record_outcome(ValidationCategory::RequiredHeader, &operation_key, outcome, &mut op_details, &mut op_total, &mut op_passed, &mut op_failed);
                }
                for query in &operation.required.query {
                    let outcome = validators::validate_required_query(query, span);
                    record_outcome(ValidationCategory::RequiredQuery, &operation_key, outcome, &mut op_details, &mut op_total, &mut op_passed, &mut op_failed);
                }
            }

            let status = if op_failed > 0 {
                OperationStatus::Failed
            } else if op_total > 0 {
                OperationStatus::Success
            } else {
                OperationStatus::Skipped
            };

            total += op_total;
            passed += op_passed;
            failed += op_failed;
            all_details.extend(op_details.clone());
            operation_results.push(OperationResult {
                operation_key,
                status,
                details: op_details,
                matched_spans: op_matched_spans,
                assertions_total: op_total,
                assertions_passed: op_passed,
                assertions_failed: op_failed,
            });
        }
    }

    let overall_status = if operation_results.iter().any(|r| r.status == OperationStatus::Failed) {
        OperationStatus::Failed
    } else if operation_results.iter().any(|r| r.status == OperationStatus::Success) {
        OperationStatus::Success
    } else {
        OperationStatus::Skipped
    };

    AlignmentResult {
        spec_operation_id: contract.metadata.name.clone(),
        status: overall_status,
        details: all_details,
        execution_time: started.elapsed(),
        matched_spans: matched_spans.into_iter().collect(),
        assertions_total: total,
        assertions_passed: passed,
        assertions_failed: failed,
        operation_results,
        error_message: None,
    }
}

fn missing_match_outcome(operation_key: &str, skip_missing: bool) -> (OperationStatus, Vec<ValidationDetail>, u64, u64) {
    if skip_missing {
        return (OperationStatus::Skipped, Vec::new(), 0, 0);
    }
    let detail = ValidationDetail {
        category: ValidationCategory::Matching,
        operation_key: operation_key.to_string(),
        expression_text: format!("match({operation_key})"),
        expected: Value::Str("at least one matching span".to_string()),
        actual: Value::Int(0),
        message: "no candidate span matched this operation".to_string(),
        failure_reason: Some("no span matched on http.method/http.target/http.route/name".to_string()),
        context: std::collections::BTreeMap::new(),
        suggestions: vec!["lower min_endpoint_samples if this contract was inferred with too few samples".to_string()],
    };
    (OperationStatus::Failed, vec![detail], 1, 1)
}

fn record_outcome(
    category: ValidationCategory,
    operation_key: &str,
    outcome: ValidatorOutcome,
    details: &mut Vec<ValidationDetail>,
    total: &mut u64,
    passed: &mut u64,
    failed: &mut u64,
) {
    *total += 1;
    if outcome.passed {
        *passed += 1;
    } else {
        *failed += 1;
    }
    let failure_reason = (!outcome.passed).then(|| outcome.message.clone());
    details.push(ValidationDetail {
        category,
        operation_key: operation_key.to_string(),
        expression_text: format!("{category:?}({operation_key})"),
        expected: outcome.expected,
        actual: outcome.actual,
        message: outcome.message,
        failure_reason,
        context: std::collections::BTreeMap::new(),
        suggestions: if outcome.passed {
            Vec::new()
        } else {
            vec!["check upstream instrumentation emits this attribute".to_string()]
        },
    });
}
