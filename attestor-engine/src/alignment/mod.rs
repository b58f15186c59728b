//! Alignment Engine (§4.5-§4.7): span matching, assertion evaluation,
//! and the parallel per-contract verification driver.

mod assertion;
mod engine;
mod report;
mod span_matcher;
mod validators;

pub use assertion::{build_span_scope, evaluate, AssertionOutcome, Scope};
pub use engine::{AlignmentEngine, AlignmentOptions};
pub use report::{
    AlignmentReport, AlignmentResult, OperationResult, OperationStatus, PerformanceInfo, Summary, ValidationCategory, ValidationDetail,
};
pub use span_matcher::{match_legacy_operation, match_operation};
pub use validators::{validate_required_header, validate_required_query, validate_status_code, ValidatorOutcome};
