//! Inference Engine orchestrator (§4.4): wires phases 1-5 into the
//! single public entry point, `InferenceEngine::infer`.

use std::time::Instant;

use attestor_model::pattern;
use attestor_model::status::AggregationStrategy;
use attestor_model::{Contract, ContractMetadata, Endpoint, NormalizedRecord};
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

use super::conflict;
use super::finalize::finalize_endpoint;
use super::grouping::{self, EndpointAccumulator};
use super::parameterize::build_pattern;
use super::segment_stats::SegmentAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferencePhase {
    SegmentAnalysis,
    Parameterization,
    Grouping,
    ConflictResolution,
    Finalization,
}

/// Progress callback, mirroring the teacher's `DriftEventHandler` used
/// during scanning (§4.4). Defaults to a no-op.
pub trait InferenceObserver {
    fn on_phase_started(&self, _phase: InferencePhase) {}
    fn on_phase_completed(&self, _phase: InferencePhase, _duration: std::time::Duration) {}
}

struct NoopObserver;
impl InferenceObserver for NoopObserver {}

/// Ingestion adapter (§6): the engine pulls records one at a time so a
/// streaming source never needs to materialize its whole corpus.
pub trait RecordSource {
    fn next(&mut self) -> EngineResult<Option<NormalizedRecord>>;
}

/// `RecordSource` over an already-materialized `Vec` — the common case
/// in tests and single-pass callers (§6).
pub struct VecRecordSource {
    records: std::vec::IntoIter<NormalizedRecord>,
}

impl VecRecordSource {
    pub fn new(records: Vec<NormalizedRecord>) -> Self {
        Self { records: records.into_iter() }
    }
}

impl RecordSource for VecRecordSource {
    fn next(&mut self) -> EngineResult<Option<NormalizedRecord>> {
        Ok(self.records.next())
    }
}

/// Inference configuration (§4.4). Every field is optional so a partial
/// external config document can be deserialized directly; `effective_*`
/// accessors supply the documented defaults, mirroring the teacher's
/// `ScanConfig` shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InferenceOptions {
    pub path_clustering_threshold: Option<f64>,
    pub min_sample_size: Option<u64>,
    pub required_field_threshold: Option<f64>,
    pub min_endpoint_samples: Option<u64>,
    pub status_aggregation: Option<AggregationStrategy>,
    pub max_unique_values: Option<usize>,
    pub service_name: Option<String>,
    pub service_version: Option<String>,
}

impl InferenceOptions {
    pub fn effective_path_clustering_threshold(&self) -> f64 {
        self.path_clustering_threshold.unwrap_or(0.8)
    }
    pub fn effective_min_sample_size(&self) -> u64 {
        self.min_sample_size.unwrap_or(20)
    }
    pub fn effective_required_field_threshold(&self) -> f64 {
        self.required_field_threshold.unwrap_or(0.95)
    }
    pub fn effective_min_endpoint_samples(&self) -> u64 {
        self.min_endpoint_samples.unwrap_or(5)
    }
    pub fn effective_status_aggregation(&self) -> AggregationStrategy {
        self.status_aggregation.unwrap_or(AggregationStrategy::Auto)
    }
    pub fn effective_max_unique_values(&self) -> usize {
        self.max_unique_values.unwrap_or(10_000)
    }
    pub fn effective_service_name(&self) -> String {
        self.service_name.clone().unwrap_or_else(|| "unknown-service".to_string())
    }
    pub fn effective_service_version(&self) -> String {
        self.service_version.clone().unwrap_or_else(|| "0.0.0".to_string())
    }
}

pub struct InferenceEngine<'a> {
    options: InferenceOptions,
    observer: &'a dyn InferenceObserver,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(options: InferenceOptions) -> Self {
        Self { options, observer: &NoopObserver }
    }

    pub fn with_observer(options: InferenceOptions, observer: &'a dyn InferenceObserver) -> Self {
        Self { options, observer }
    }

    /// Run the full pipeline (§4.4 phases 1-5) and return a validated
    /// `Contract`. Records are buffered once, for phase 3's grouping
    /// pass, and dropped immediately afterward — nothing retains the raw
    /// corpus past that point.
    pub fn infer(&self, mut source: impl RecordSource) -> EngineResult<Contract> {
        let threshold = self.options.effective_path_clustering_threshold();
        let min_sample_size = self.options.effective_min_sample_size();
        let max_unique_values = self.options.effective_max_unique_values();
        let required_field_threshold = self.options.effective_required_field_threshold();
        let status_strategy = self.options.effective_status_aggregation();
        let min_endpoint_samples = self.options.effective_min_endpoint_samples();

        self.observer.on_phase_started(InferencePhase::SegmentAnalysis);
        let started = Instant::now();
        let mut records = Vec::new();
        let mut analysis = SegmentAnalysis::default();
        while let Some(record) = source.next()? {
            if !record.is_well_formed() {
                continue;
            }
            let segments = pattern::split(&record.path);
            analysis.record_path(&segments, max_unique_values);
            records.push(record);
        }
        self.observer.on_phase_completed(InferencePhase::SegmentAnalysis, started.elapsed());

        self.observer.on_phase_started(InferencePhase::Parameterization);
        let started = Instant::now();
        let mut pattern_of: rustc_hash::FxHashMap<String, String> = rustc_hash::FxHashMap::default();
        for record in &records {
            if pattern_of.contains_key(&record.path) {
                continue;
            }
            let segments = pattern::split(&record.path);
            let built = build_pattern(&segments, &analysis, threshold, min_sample_size, min_endpoint_samples);
            pattern_of.insert(record.path.clone(), built);
        }
        self.observer.on_phase_completed(InferencePhase::Parameterization, started.elapsed());

        self.observer.on_phase_started(InferencePhase::Grouping);
        let started = Instant::now();
        let grouped = grouping::group(&records, |path| pattern_of.get(path).map(String::as_str));
        self.observer.on_phase_completed(InferencePhase::Grouping, started.elapsed());
        drop(records);
        drop(pattern_of);

        self.observer.on_phase_started(InferencePhase::ConflictResolution);
        let started = Instant::now();
        let candidates: Vec<(&str, &EndpointAccumulator)> = grouped.iter().map(|(p, a)| (p.as_str(), a)).collect();
        let accepted = conflict::resolve(candidates, min_endpoint_samples);
        self.observer.on_phase_completed(InferencePhase::ConflictResolution, started.elapsed());

        self.observer.on_phase_started(InferencePhase::Finalization);
        let started = Instant::now();
        let mut endpoints: Vec<Endpoint> = accepted
            .into_iter()
            .map(|(path, acc)| finalize_endpoint(path, acc, required_field_threshold, status_strategy))
            .collect();
        endpoints.sort_by(|a, b| a.path.cmp(&b.path));
        self.observer.on_phase_completed(InferencePhase::Finalization, started.elapsed());

        let contract = Contract {
            api_version: "attestor/v1".to_string(),
            kind: "Contract".to_string(),
            metadata: ContractMetadata {
                name: self.options.effective_service_name(),
                version: self.options.effective_service_version(),
            },
            endpoints,
        };
        contract.validate()?;
        Ok(contract)
    }
}
