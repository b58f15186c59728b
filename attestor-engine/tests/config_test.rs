//! `InferenceOptions`/`AlignmentOptions` are deserialized from partial
//! external config documents (§4.4, §4.7) — YAML is the format the rest
//! of the pack's config loaders use.

use std::time::Duration;

use attestor_engine::alignment::AlignmentOptions;
use attestor_engine::inference::InferenceOptions;

#[test]
fn inference_options_partial_yaml_config_fills_in_documented_defaults() {
    let yaml = r#"
path_clustering_threshold: 0.9
min_sample_size: 50
"#;
    let options: InferenceOptions = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(options.effective_path_clustering_threshold(), 0.9);
    assert_eq!(options.effective_min_sample_size(), 50);
    // Untouched fields still fall back to their documented defaults.
    assert_eq!(options.effective_min_endpoint_samples(), 5);
    assert_eq!(options.effective_service_name(), "unknown-service");
}

#[test]
fn inference_options_empty_yaml_document_is_all_defaults() {
    let options: InferenceOptions = serde_yaml::from_str("{}").unwrap();
    assert_eq!(options.effective_path_clustering_threshold(), 0.8);
    assert_eq!(options.effective_required_field_threshold(), 0.95);
}

#[test]
fn alignment_options_partial_yaml_config_overrides_only_named_fields() {
    let yaml = r#"
skip_missing: true
"#;
    let options: AlignmentOptions = serde_yaml::from_str(yaml).unwrap();
    assert!(options.effective_skip_missing());
    assert!(options.effective_timeout().is_none());
    assert_eq!(options.effective_worker_count(10), 4);
}

#[test]
fn alignment_options_round_trips_through_yaml() {
    let options = AlignmentOptions {
        worker_count: Some(8),
        timeout: Some(Duration::from_secs(30)),
        skip_missing: Some(false),
    };
    let yaml = serde_yaml::to_string(&options).unwrap();
    let parsed: AlignmentOptions = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.effective_worker_count(10), 8);
    assert_eq!(parsed.effective_timeout(), Some(Duration::from_secs(30)));
}
