//! Contract Model (§3, §4.1): the typed in-memory schema shared by
//! inference and alignment.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, ModelResult};
use crate::pattern;
use crate::status::AggregationStrategy;

pub const KNOWN_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];
pub const KNOWN_STATUS_RANGES: &[&str] = &["1xx", "2xx", "3xx", "4xx", "5xx"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub support_count: u64,
    pub first_seen: SystemTime,
    pub last_seen: SystemTime,
}

impl Stats {
    pub fn new(support_count: u64, first_seen: SystemTime, last_seen: SystemTime) -> Self {
        Self {
            support_count,
            first_seen,
            last_seen,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.first_seen > self.last_seen {
            return Err("firstSeen is after lastSeen".to_string());
        }
        Ok(())
    }
}

/// A set of field names observed as query parameters or headers (§3).
/// Header names are lowercased once, here, at construction — the only
/// canonicalization point (SPEC_FULL §10.1).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSet {
    #[serde(default)]
    pub query: Vec<String>,
    #[serde(default)]
    pub headers: Vec<String>,
}

impl FieldSet {
    pub fn new(mut query: Vec<String>, mut headers: Vec<String>) -> Self {
        query.sort();
        query.dedup();
        for h in headers.iter_mut() {
            *h = h.to_lowercase();
        }
        headers.sort();
        headers.dedup();
        Self { query, headers }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    #[serde(default, rename = "statusCodes", skip_serializing_if = "Option::is_none")]
    pub status_codes: Option<Vec<u16>>,
    #[serde(default, rename = "statusRanges", skip_serializing_if = "Option::is_none")]
    pub status_ranges: Option<Vec<String>>,
    pub aggregation: AggregationStrategy,
}

impl ResponseSpec {
    pub fn validate(&self, path: &str) -> ModelResult<()> {
        let codes_empty = self.status_codes.as_ref().map(Vec::is_empty).unwrap_or(true);
        let ranges_empty = self.status_ranges.as_ref().map(Vec::is_empty).unwrap_or(true);
        if codes_empty && ranges_empty {
            return Err(ModelError::InvalidContract {
                path: path.to_string(),
                reason: "response spec has neither statusCodes nor statusRanges".to_string(),
            });
        }
        if let Some(codes) = &self.status_codes {
            for &code in codes {
                if !(100..=599).contains(&code) {
                    return Err(ModelError::InvalidContract {
                        path: path.to_string(),
                        reason: format!("status code {code} out of [100,599]"),
                    });
                }
            }
        }
        if let Some(ranges) = &self.status_ranges {
            for r in ranges {
                if !KNOWN_STATUS_RANGES.contains(&r.as_str()) {
                    return Err(ModelError::InvalidContract {
                        path: path.to_string(),
                        reason: format!("unknown status range '{r}'"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub method: String,
    pub responses: ResponseSpec,
    pub required: FieldSet,
    pub optional: FieldSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl Operation {
    fn validate(&self, path: &str) -> ModelResult<()> {
        if !KNOWN_METHODS.contains(&self.method.as_str()) {
            return Err(ModelError::InvalidContract {
                path: path.to_string(),
                reason: format!("unknown HTTP method '{}'", self.method),
            });
        }
        self.responses.validate(path)?;

        let required_query: std::collections::BTreeSet<_> = self.required.query.iter().collect();
        let optional_query: std::collections::BTreeSet<_> = self.optional.query.iter().collect();
        if !required_query.is_disjoint(&optional_query) {
            return Err(ModelError::InvalidContract {
                path: path.to_string(),
                reason: format!("{} {}: required/optional query overlap", self.method, path),
            });
        }

        let required_headers: std::collections::BTreeSet<_> = self.required.headers.iter().collect();
        let optional_headers: std::collections::BTreeSet<_> = self.optional.headers.iter().collect();
        if !required_headers.is_disjoint(&optional_headers) {
            return Err(ModelError::InvalidContract {
                path: path.to_string(),
                reason: format!("{} {}: required/optional header overlap", self.method, path),
            });
        }

        if let Some(stats) = &self.stats {
            stats.validate().map_err(|reason| ModelError::InvalidContract {
                path: path.to_string(),
                reason,
            })?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub operations: Vec<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl Endpoint {
    fn validate(&self) -> ModelResult<()> {
        if self.operations.is_empty() {
            return Err(ModelError::InvalidContract {
                path: self.path.clone(),
                reason: "endpoint has no operations".to_string(),
            });
        }

        let mut seen_methods = std::collections::BTreeSet::new();
        for op in &self.operations {
            op.validate(&self.path)?;
            if !seen_methods.insert(op.method.clone()) {
                return Err(ModelError::InvalidContract {
                    path: self.path.clone(),
                    reason: format!("duplicate method '{}'", op.method),
                });
            }
        }
        Ok(())
    }

    pub fn operation(&self, method: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.method == method)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractMetadata {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ContractMetadata,
    pub endpoints: Vec<Endpoint>,
}

impl Contract {
    /// Validate every invariant named in §3/§4.1. Fails fast, naming the
    /// first offending path and the violated field (§4.1).
    pub fn validate(&self) -> ModelResult<()> {
        if self.endpoints.is_empty() {
            return Err(ModelError::InvalidContract {
                path: "<contract>".to_string(),
                reason: "contract has no endpoints".to_string(),
            });
        }

        for endpoint in &self.endpoints {
            tracing::debug!(path = %endpoint.path, "validating endpoint");
            endpoint.validate().map_err(|e| {
                tracing::warn!(path = %endpoint.path, error = %e, "endpoint failed validation");
                e
            })?;
        }

        // A literal endpoint and a same-length parameterized endpoint are
        // allowed to coexist (S3, §8): concrete requests resolve to the
        // more specific one first. Two patterns only mutually conflict at
        // the contract level when they're equally specific, since that's
        // the case routing genuinely can't disambiguate (SPEC_FULL, phase
        // 5 resolution note).
        for i in 0..self.endpoints.len() {
            for j in (i + 1)..self.endpoints.len() {
                let (a, b) = (&self.endpoints[i].path, &self.endpoints[j].path);
                if pattern::specificity(a) == pattern::specificity(b) && pattern::conflict(a, b) {
                    return Err(ModelError::InvalidContract {
                        path: a.clone(),
                        reason: format!("conflicts with endpoint '{b}'"),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::AggregationStrategy;

    fn op(method: &str) -> Operation {
        Operation {
            method: method.to_string(),
            responses: ResponseSpec {
                status_codes: Some(vec![200]),
                status_ranges: None,
                aggregation: AggregationStrategy::Exact,
            },
            required: FieldSet::default(),
            optional: FieldSet::default(),
            stats: None,
        }
    }

    fn contract(endpoints: Vec<Endpoint>) -> Contract {
        Contract {
            api_version: "v1".to_string(),
            kind: "Contract".to_string(),
            metadata: ContractMetadata {
                name: "test".to_string(),
                version: "1".to_string(),
            },
            endpoints,
        }
    }

    #[test]
    fn rejects_empty_endpoints() {
        let c = contract(vec![]);
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_unknown_method() {
        let e = Endpoint {
            path: "/api/x".to_string(),
            operations: vec![op("TRACE")],
            stats: None,
        };
        assert!(contract(vec![e]).validate().is_err());
    }

    #[test]
    fn rejects_duplicate_method_within_endpoint() {
        let e = Endpoint {
            path: "/api/x".to_string(),
            operations: vec![op("GET"), op("GET")],
            stats: None,
        };
        assert!(contract(vec![e]).validate().is_err());
    }

    #[test]
    fn rejects_conflicting_endpoints() {
        let e1 = Endpoint {
            path: "/api/users/{id}".to_string(),
            operations: vec![op("GET")],
            stats: None,
        };
        let e2 = Endpoint {
            path: "/api/users/{num}".to_string(),
            operations: vec![op("GET")],
            stats: None,
        };
        assert!(contract(vec![e1, e2]).validate().is_err());
    }

    #[test]
    fn accepts_non_conflicting_endpoints() {
        let e1 = Endpoint {
            path: "/api/users/profile".to_string(),
            operations: vec![op("GET")],
            stats: None,
        };
        let e2 = Endpoint {
            path: "/api/users/{num}".to_string(),
            operations: vec![op("GET")],
            stats: None,
        };
        assert!(contract(vec![e1, e2]).validate().is_ok());
    }

    #[test]
    fn field_set_lowercases_and_dedups_headers() {
        let fs = FieldSet::new(vec!["b".into(), "a".into(), "a".into()], vec!["Authorization".into(), "authorization".into()]);
        assert_eq!(fs.query, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(fs.headers, vec!["authorization".to_string()]);
    }

    #[test]
    fn rejects_required_optional_overlap() {
        let mut o = op("GET");
        o.required.query = vec!["page".to_string()];
        o.optional.query = vec!["page".to_string()];
        let e = Endpoint {
            path: "/api/x".to_string(),
            operations: vec![o],
            stats: None,
        };
        assert!(contract(vec![e]).validate().is_err());
    }
}
