//! `NormalizedRecord` — the inference engine's input element (§3).

use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// A mapping from a query-parameter or header name to its non-empty
/// list of observed values. Inference only ever looks at key presence
/// (§3: "the mappings' value-lists are ignored by inference"), but the
/// values are kept so a future alignment/diagnostic consumer can show them.
pub type ValueListMap = BTreeMap<String, Vec<String>>;

/// One normalized HTTP request/response observation fed to the inference engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub timestamp: SystemTime,
    #[serde(default)]
    pub query: ValueListMap,
    #[serde(default)]
    pub headers: ValueListMap,
}

impl NormalizedRecord {
    /// True iff the record's shape is well-formed enough to contribute to
    /// inference: uppercase HTTP method, non-empty path beginning with
    /// `/` (§4.4 failure model: malformed records are silently skipped).
    pub fn is_well_formed(&self) -> bool {
        is_known_method(&self.method) && self.path.starts_with('/') && self.path.len() > 0
    }
}

const KNOWN_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

pub fn is_known_method(method: &str) -> bool {
    KNOWN_METHODS.contains(&method)
}
