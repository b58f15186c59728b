//! Legacy flat `operationId`-keyed contract form (§4.5, §9 design note
//! "Legacy format").
//!
//! Kept as a distinct input variant rather than lowered into the §3
//! endpoints form at parse time: lowering would discard the
//! `operationId`-based matching strategies §4.5 defines specifically for
//! this format, and those strategies (priority 100/80/60 against
//! `operation.id`/span name/`operation.name`) are the reason this format
//! still exists. A legacy contract's preconditions/postconditions are
//! evaluated with the same assertion language as the endpoints form
//! (§4.6), just keyed by `operationId` instead of `(method, path)`.

use std::collections::BTreeMap;

use attestor_model::Span;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::alignment::{build_span_scope, evaluate, match_legacy_operation, ValidationCategory, ValidationDetail};
use attestor_model::TraceData;

/// One operation in a legacy contract, keyed by its `operationId` in the
/// containing `LegacyContract.operations` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyOperation {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub preconditions: Vec<JsonValue>,
    #[serde(default)]
    pub postconditions: Vec<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyContract {
    pub operations: BTreeMap<String, LegacyOperation>,
}

impl LegacyContract {
    pub fn operation(&self, operation_id: &str) -> Option<&LegacyOperation> {
        self.operations.get(operation_id)
    }
}

/// Evaluate one legacy operation's pre/postconditions against every span
/// matched by `operationId` (§4.5 legacy matching, §4.6 evaluator).
pub fn align_legacy_operation(operation_id: &str, operation: &LegacyOperation, trace: &TraceData) -> Vec<ValidationDetail> {
    let candidate_spans: Vec<&Span> = trace.spans.values().collect();
    let matched = match_legacy_operation(operation_id, &candidate_spans);

    let operation_key = format!("{} {}", operation.method, operation.path);
    let mut details = Vec::new();

    if matched.is_empty() {
        details.push(ValidationDetail {
            category: ValidationCategory::Matching,
            operation_key,
            expression_text: format!("match({operation_id})"),
            expected: attestor_model::Value::Str("at least one matching span".to_string()),
            actual: attestor_model::Value::Int(0),
            message: "no candidate span matched this legacy operationId".to_string(),
            failure_reason: Some("no span matched on operation.id/name/operation.name".to_string()),
            context: BTreeMap::new(),
            suggestions: vec!["verify the tracing instrumentation stamps operation.id".to_string()],
        });
        return details;
    }

    for span in matched {
        let scope = build_span_scope(span, trace);
        for expr in &operation.preconditions {
            details.push(condition_detail(ValidationCategory::Precondition, &operation_key, expr, &scope));
        }
        for expr in &operation.postconditions {
            details.push(condition_detail(ValidationCategory::Postcondition, &operation_key, expr, &scope));
        }
    }

    details
}

fn condition_detail(category: ValidationCategory, operation_key: &str, expr: &JsonValue, scope: &crate::alignment::Scope) -> ValidationDetail {
    let outcome = evaluate(expr, scope);
    ValidationDetail {
        category,
        operation_key: operation_key.to_string(),
        expression_text: outcome.expression_text,
        expected: outcome.expected,
        actual: outcome.actual,
        message: outcome.message,
        failure_reason: outcome.error.clone().or_else(|| (!outcome.passed).then(|| "assertion did not hold".to_string())),
        context: BTreeMap::new(),
        suggestions: if outcome.passed { Vec::new() } else { vec!["check the expression against the span's actual attributes".to_string()] },
    }
}
