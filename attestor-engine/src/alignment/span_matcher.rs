//! Span Matcher (§4.5): maps a contract operation's `(path-pattern,
//! method)` to the spans it describes.

use attestor_model::{pattern, Span, Value};

/// Standard-form matching: `http.method`/`http.target`/`http.route`
/// attributes first, falling back to a literal `"<METHOD> <pattern>"`
/// name match.
pub fn match_operation<'a>(method: &str, path_pattern: &str, candidates: &[&'a Span]) -> Vec<&'a Span> {
    candidates.iter().copied().filter(|span| matches_one(method, path_pattern, span)).collect()
}

fn matches_one(method: &str, path_pattern: &str, span: &Span) -> bool {
    if let Some(span_method) = span.attribute("http.method").and_then(Value::as_str) {
        if !span_method.eq_ignore_ascii_case(method) {
            return false;
        }
    }

    if let Some(target) = span.attribute("http.target").and_then(Value::as_str) {
        return pattern::matches(target, path_pattern);
    }
    if let Some(route) = span.attribute("http.route").and_then(Value::as_str) {
        return pattern::matches(route, path_pattern);
    }

    span.name == format!("{method} {path_pattern}")
}

/// Legacy operationId-based matching (§4.5): strategies are tried in
/// priority order (100, 80, 60); the first to yield a non-empty span
/// set wins.
pub fn match_legacy_operation<'a>(operation_id: &str, candidates: &[&'a Span]) -> Vec<&'a Span> {
    let by_operation_id: Vec<&Span> = candidates
        .iter()
        .copied()
        .filter(|s| s.attribute("operation.id").and_then(Value::as_str) == Some(operation_id))
        .collect();
    if !by_operation_id.is_empty() {
        return by_operation_id;
    }

    let by_name: Vec<&Span> = candidates.iter().copied().filter(|s| s.name == operation_id).collect();
    if !by_name.is_empty() {
        return by_name;
    }

    candidates
        .iter()
        .copied()
        .filter(|s| s.attribute("operation.name").and_then(Value::as_str) == Some(operation_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use attestor_model::{SpanStatus, SpanStatusCode};
    use std::collections::BTreeMap;

    fn span(attrs: &[(&str, Value)], name: &str) -> Span {
        Span {
            span_id: "s1".to_string(),
            trace_id: "t1".to_string(),
            parent_id: None,
            name: name.to_string(),
            start_time: 0,
            end_time: 1,
            status: SpanStatus { code: SpanStatusCode::Ok, message: String::new() },
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect::<BTreeMap<_, _>>(),
            events: Vec::new(),
        }
    }

    #[test]
    fn matches_via_http_target() {
        let s = span(&[("http.method", "GET".into()), ("http.target", "/api/users/42".into())], "irrelevant");
        let candidates = vec![&s];
        assert_eq!(match_operation("GET", "/api/users/{num}", &candidates).len(), 1);
    }

    #[test]
    fn rejects_mismatched_method() {
        let s = span(&[("http.method", "POST".into()), ("http.target", "/api/users/42".into())], "irrelevant");
        let candidates = vec![&s];
        assert!(match_operation("GET", "/api/users/{num}", &candidates).is_empty());
    }

    #[test]
    fn falls_back_to_literal_name() {
        let s = span(&[], "GET /api/users/{num}");
        let candidates = vec![&s];
        assert_eq!(match_operation("GET", "/api/users/{num}", &candidates).len(), 1);
    }

    #[test]
    fn legacy_operation_id_takes_priority_over_name() {
        let s1 = span(&[("operation.id", "listUsers".into())], "listUsers");
        let s2 = span(&[], "listUsers");
        let candidates = vec![&s1, &s2];
        let matched = match_legacy_operation("listUsers", &candidates);
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn legacy_falls_back_to_operation_name_attribute() {
        let s = span(&[("operation.name", "listUsers".into())], "unrelated-name");
        let candidates = vec![&s];
        assert_eq!(match_legacy_operation("listUsers", &candidates).len(), 1);
    }
}
