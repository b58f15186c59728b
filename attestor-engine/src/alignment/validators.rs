//! Status-code and required-field validators (§4.7).

use attestor_model::status::AggregationStrategy;
use attestor_model::{ResponseSpec, Span, Value};

/// One validator's result, the raw material for a `ValidationDetail`.
pub struct ValidatorOutcome {
    pub passed: bool,
    pub expected: Value,
    pub actual: Value,
    pub message: String,
}

/// §4.7 status-code validator. Returns `None` when the validator is
/// skipped because neither `statusCodes` nor `statusRanges` is populated.
pub fn validate_status_code(responses: &ResponseSpec, span: &Span) -> Option<ValidatorOutcome> {
    let codes_empty = responses.status_codes.as_ref().map(Vec::is_empty).unwrap_or(true);
    let ranges_empty = responses.status_ranges.as_ref().map(Vec::is_empty).unwrap_or(true);
    if codes_empty && ranges_empty {
        return None;
    }

    let observed = span.attribute("http.status_code").and_then(Value::as_f64).map(|f| f as u16);
    let Some(code) = observed else {
        return Some(ValidatorOutcome {
            passed: false,
            expected: expected_value(responses),
            actual: Value::Null,
            message: "span has no http.status_code attribute".to_string(),
        });
    };

    let mut passed = false;
    if matches!(responses.aggregation, AggregationStrategy::Exact | AggregationStrategy::Auto) {
        if let Some(codes) = &responses.status_codes {
            passed |= codes.contains(&code);
        }
    }
    if matches!(responses.aggregation, AggregationStrategy::Range | AggregationStrategy::Auto) {
        if let Some(ranges) = &responses.status_ranges {
            let label = format!("{}xx", code / 100);
            passed |= ranges.contains(&label);
        }
    }

    Some(ValidatorOutcome {
        passed,
        expected: expected_value(responses),
        actual: Value::Int(code as i64),
        message: if passed {
            "status code matched".to_string()
        } else {
            format!("status code {code} not in expected set")
        },
    })
}

fn expected_value(responses: &ResponseSpec) -> Value {
    let mut map = std::collections::BTreeMap::new();
    if let Some(codes) = &responses.status_codes {
        map.insert("statusCodes".to_string(), Value::List(codes.iter().map(|c| Value::Int(*c as i64)).collect()));
    }
    if let Some(ranges) = &responses.status_ranges {
        map.insert("statusRanges".to_string(), Value::List(ranges.iter().map(|r| Value::Str(r.clone())).collect()));
    }
    Value::Map(map)
}

/// §4.7 required-header validator: match by lowercased attribute key.
pub fn validate_required_header(name: &str, span: &Span) -> ValidatorOutcome {
    let key = format!("http.request.header.{name}");
    let found = span.attributes.iter().find(|(k, _)| k.to_lowercase() == key);
    match found {
        Some((_, value)) => ValidatorOutcome {
            passed: true,
            expected: Value::Str(name.to_string()),
            actual: value.clone(),
            message: "required header present".to_string(),
        },
        None => ValidatorOutcome {
            passed: false,
            expected: Value::Str(name.to_string()),
            actual: Value::Str("missing".to_string()),
            message: format!("required header '{name}' missing"),
        },
    }
}

/// §4.7 required-query validator: an `http.request.query.<name>`
/// attribute, or a `?name=` pair in `http.url`, either suffices.
pub fn validate_required_query(name: &str, span: &Span) -> ValidatorOutcome {
    let key = format!("http.request.query.{name}");
    if let Some(value) = span.attribute(&key) {
        return ValidatorOutcome {
            passed: true,
            expected: Value::Str(name.to_string()),
            actual: value.clone(),
            message: "required query parameter present via attribute".to_string(),
        };
    }
    if let Some(url) = span.attribute("http.url").and_then(Value::as_str) {
        if url_has_query_param(url, name) {
            return ValidatorOutcome {
                passed: true,
                expected: Value::Str(name.to_string()),
                actual: Value::Str(url.to_string()),
                message: "required query parameter present in http.url".to_string(),
            };
        }
    }
    ValidatorOutcome {
        passed: false,
        expected: Value::Str(name.to_string()),
        actual: Value::Str("missing".to_string()),
        message: format!("required query parameter '{name}' missing"),
    }
}

fn url_has_query_param(url: &str, name: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };
    query.split('&').any(|pair| matches!(pair.split_once('='), Some((k, _)) if k == name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use attestor_model::{SpanStatus, SpanStatusCode};
    use std::collections::BTreeMap;

    fn span(attrs: &[(&str, Value)]) -> Span {
        Span {
            span_id: "s1".to_string(),
            trace_id: "t1".to_string(),
            parent_id: None,
            name: "span".to_string(),
            start_time: 0,
            end_time: 1,
            status: SpanStatus { code: SpanStatusCode::Ok, message: String::new() },
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect::<BTreeMap<_, _>>(),
            events: Vec::new(),
        }
    }

    #[test]
    fn status_validator_skipped_when_response_spec_is_empty() {
        let responses = ResponseSpec {
            status_codes: None,
            status_ranges: None,
            aggregation: AggregationStrategy::Auto,
        };
        assert!(validate_status_code(&responses, &span(&[])).is_none());
    }

    #[test]
    fn status_validator_auto_passes_via_either_route() {
        let responses = ResponseSpec {
            status_codes: None,
            status_ranges: Some(vec!["2xx".to_string()]),
            aggregation: AggregationStrategy::Auto,
        };
        let s = span(&[("http.status_code", Value::Int(200))]);
        let outcome = validate_status_code(&responses, &s).unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.actual, Value::Int(200));
    }

    #[test]
    fn status_validator_fails_on_missing_attribute() {
        let responses = ResponseSpec {
            status_codes: Some(vec![200]),
            status_ranges: None,
            aggregation: AggregationStrategy::Exact,
        };
        let outcome = validate_status_code(&responses, &span(&[])).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.actual, Value::Null);
    }

    #[test]
    fn required_header_matches_case_insensitively() {
        let s = span(&[("Http.Request.Header.Authorization", Value::Str("Bearer x".to_string()))]);
        let outcome = validate_required_header("authorization", &s);
        assert!(outcome.passed);
    }

    #[test]
    fn required_query_via_url_fallback() {
        let s = span(&[("http.url", Value::Str("/api/users?page=2".to_string()))]);
        let outcome = validate_required_query("page", &s);
        assert!(outcome.passed);
    }

    #[test]
    fn required_query_missing_reports_missing() {
        let outcome = validate_required_query("page", &span(&[]));
        assert!(!outcome.passed);
        assert_eq!(outcome.actual, Value::Str("missing".to_string()));
    }
}
