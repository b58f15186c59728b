//! `Span` and `TraceData` — the alignment engine's input (§3, §6).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanStatusCode {
    Ok,
    Error,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanStatus {
    pub code: SpanStatusCode,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    pub name: String,
    pub timestamp: i64,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

/// One observed unit of work within a distributed trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub span_id: String,
    pub trace_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub status: SpanStatus,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub events: Vec<SpanEvent>,
}

impl Span {
    pub fn duration(&self) -> i64 {
        self.end_time - self.start_time
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.as_deref().map(str::is_empty).unwrap_or(true)
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A node in the per-trace span tree (§3: "parent-child relation over
/// spans forms a tree per traceId").
#[derive(Debug, Clone, PartialEq)]
pub struct SpanNode {
    pub span_id: String,
    pub children: Vec<String>,
}

/// A fully materialized trace: the flat span set plus (if buildable) a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceData {
    pub trace_id: String,
    pub spans: BTreeMap<String, Span>,
    pub roots: Vec<String>,
    pub tree: BTreeMap<String, SpanNode>,
    /// Spans whose `parentId` does not resolve within this trace's span
    /// set; retained at the span level but excluded from the tree (§6).
    pub orphans: Vec<String>,
}

impl TraceData {
    /// Build a `TraceData` from a flat span set, constructing the tree
    /// when one isn't already provided by the adapter (§6).
    ///
    /// Zero roots with >= 1 span is an error (§6, §9 design note: no
    /// fallback root is synthesized, even for all-cyclic span sets).
    pub fn build(trace_id: String, spans: BTreeMap<String, Span>) -> Result<Self, ModelError> {
        if spans.is_empty() {
            return Ok(TraceData {
                trace_id,
                spans,
                roots: Vec::new(),
                tree: BTreeMap::new(),
                orphans: Vec::new(),
            });
        }

        let mut tree: BTreeMap<String, SpanNode> = spans
            .keys()
            .map(|id| {
                (
                    id.clone(),
                    SpanNode {
                        span_id: id.clone(),
                        children: Vec::new(),
                    },
                )
            })
            .collect();

        let mut roots = Vec::new();
        let mut orphans = Vec::new();

        for span in spans.values() {
            match &span.parent_id {
                None => roots.push(span.span_id.clone()),
                Some(p) if p.is_empty() => roots.push(span.span_id.clone()),
                Some(p) if spans.contains_key(p) => {
                    tree.get_mut(p)
                        .expect("parent key verified present")
                        .children
                        .push(span.span_id.clone());
                }
                Some(_) => orphans.push(span.span_id.clone()),
            }
        }

        roots.sort();
        orphans.sort();

        if roots.is_empty() {
            tracing::warn!(trace_id = %trace_id, span_count = spans.len(), "trace has no resolvable root");
            return Err(ModelError::TraceShape(format!(
                "trace '{trace_id}' has {} spans but zero roots",
                spans.len()
            )));
        }

        // §3's data model states "at most one root per trace" as an
        // invariant, but a malformed or multi-service trace can still
        // resolve more than one; rather than reject it outright, keep
        // every root in `roots` and warn — `root_span_id()` picks the
        // alphabetically-first one deterministically.
        if roots.len() > 1 {
            tracing::warn!(trace_id = %trace_id, root_count = roots.len(), roots = ?roots, "trace has more than one root; using the alphabetically-first as root_span_id");
        }

        // Orphans aren't part of any root's reachable subtree; drop them
        // from the tree view entirely while keeping them in `spans`.
        for orphan in &orphans {
            tree.remove(orphan);
        }

        Ok(TraceData {
            trace_id,
            spans,
            roots,
            tree,
            orphans,
        })
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn root_span_id(&self) -> Option<&str> {
        self.roots.first().map(String::as_str)
    }
}
