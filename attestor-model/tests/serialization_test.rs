//! The contract schema (§3) is the artifact external tooling persists
//! and reloads; YAML is the format the rest of the pack's config/report
//! loaders use, so a round trip through it is the relevant black-box check.

use std::time::{Duration, SystemTime};

use attestor_model::status::AggregationStrategy;
use attestor_model::{Contract, ContractMetadata, Endpoint, FieldSet, Operation, ResponseSpec, Stats};

fn sample_contract() -> Contract {
    Contract {
        api_version: "attestor/v1".to_string(),
        kind: "Contract".to_string(),
        metadata: ContractMetadata { name: "users-api".to_string(), version: "1.2.0".to_string() },
        endpoints: vec![Endpoint {
            path: "/api/users/{id}".to_string(),
            operations: vec![Operation {
                method: "GET".to_string(),
                responses: ResponseSpec {
                    status_codes: Some(vec![200, 404]),
                    status_ranges: None,
                    aggregation: AggregationStrategy::Exact,
                },
                required: FieldSet::new(vec![], vec!["authorization".to_string()]),
                optional: FieldSet::new(vec!["include".to_string()], vec![]),
                stats: Some(Stats::new(120, SystemTime::UNIX_EPOCH, SystemTime::UNIX_EPOCH + Duration::from_secs(3_600))),
            }],
            stats: None,
        }],
    }
}

#[test]
fn contract_round_trips_through_yaml() {
    let contract = sample_contract();
    let yaml = serde_yaml::to_string(&contract).unwrap();
    let parsed: Contract = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(contract, parsed);
    parsed.validate().unwrap();
}

#[test]
fn contract_yaml_uses_declared_field_renames() {
    let yaml = serde_yaml::to_string(&sample_contract()).unwrap();
    assert!(yaml.contains("apiVersion:"));
    assert!(yaml.contains("statusCodes:"));
}
