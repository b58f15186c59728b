//! # attestor-model
//!
//! Foundation crate for the contract inference/alignment system.
//! Defines the shared contract schema, the path pattern engine, the
//! status aggregator, and the error/value types every other crate
//! builds on.

pub mod contract;
pub mod errors;
pub mod pattern;
pub mod record;
pub mod span;
pub mod status;
pub mod value;

pub use contract::{Contract, ContractMetadata, Endpoint, FieldSet, Operation, ResponseSpec, Stats};
pub use errors::{CliExitCode, ModelError, ModelResult};
pub use record::NormalizedRecord;
pub use span::{Span, SpanEvent, SpanStatus, SpanStatusCode, SpanNode, TraceData};
pub use status::{AggregationStrategy, AggregatedStatus};
pub use value::Value;
