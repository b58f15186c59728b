//! Alignment report types: the stable machine-readable surface (§6, §7).

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use attestor_model::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    Matching,
    StatusCode,
    RequiredHeader,
    RequiredQuery,
    Precondition,
    Postcondition,
}

/// One record in an alignment result's detail list (§7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDetail {
    pub category: ValidationCategory,
    pub operation_key: String,
    pub expression_text: String,
    pub expected: Value,
    pub actual: Value,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub operation_key: String,
    pub status: OperationStatus,
    pub details: Vec<ValidationDetail>,
    pub matched_spans: Vec<String>,
    pub assertions_total: u64,
    pub assertions_passed: u64,
    pub assertions_failed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub spec_operation_id: String,
    pub status: OperationStatus,
    pub details: Vec<ValidationDetail>,
    pub execution_time: Duration,
    pub matched_spans: Vec<String>,
    pub assertions_total: u64,
    pub assertions_passed: u64,
    pub assertions_failed: u64,
    pub operation_results: Vec<OperationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_operations: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInfo {
    pub specs_processed: u64,
    pub spans_matched: u64,
    pub assertions_evaluated: u64,
    pub worker_count: usize,
    pub processing_rate_per_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub summary: Summary,
    pub results: Vec<AlignmentResult>,
    pub execution_time: Duration,
    pub start_time: SystemTime,
    pub end_time: SystemTime,
    pub performance_info: PerformanceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
