//! Contract Inference Engine (§4.4): five-phase pipeline from observed
//! HTTP traffic to a validated `Contract`.

mod conflict;
mod engine;
mod finalize;
mod grouping;
mod parameterize;
mod segment_stats;

pub use engine::{InferenceEngine, InferenceObserver, InferenceOptions, InferencePhase, RecordSource, VecRecordSource};
