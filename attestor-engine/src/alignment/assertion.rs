//! Assertion Evaluator (§4.6): a small JSON-shaped boolean expression
//! language used only for legacy-style per-span assertions.

use std::collections::BTreeMap;

use attestor_model::{Span, SpanStatusCode, TraceData, Value};
use serde_json::Value as JsonValue;

/// The variable scope an expression is evaluated against (§4.6 "Scope").
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.vars.insert(key.into(), value);
    }

    /// Absent keys yield `Value::Null` (§4.6 `{"var": ...}`).
    pub fn get(&self, key: &str) -> Value {
        self.vars.get(key).cloned().unwrap_or(Value::Null)
    }
}

/// Build the scope for one span within its trace (§4.6 "Scope"): every
/// attribute under its dotted key and its underscored alias, plus the
/// synthetic `span.*`/`trace.*` variables.
pub fn build_span_scope(span: &Span, trace: &TraceData) -> Scope {
    let mut scope = Scope::new();

    for (key, value) in &span.attributes {
        scope.insert(key.clone(), value.clone());
        let underscored = key.replace('.', "_");
        if underscored != *key {
            scope.insert(underscored, value.clone());
        }
    }

    scope.insert("span.id", Value::Str(span.span_id.clone()));
    scope.insert("span.name", Value::Str(span.name.clone()));
    scope.insert("span.start_time", Value::Int(span.start_time));
    scope.insert("span.end_time", Value::Int(span.end_time));
    scope.insert("span.duration", Value::Int(span.duration()));
    scope.insert("span.status.code", Value::Str(status_code_label(span.status.code)));
    scope.insert("span.status.message", Value::Str(span.status.message.clone()));
    scope.insert("span.has_error", Value::Bool(span.status.code == SpanStatusCode::Error));
    scope.insert("span.is_root", Value::Bool(span.is_root()));

    scope.insert("trace.id", Value::Str(trace.trace_id.clone()));
    scope.insert("trace.span_count", Value::Int(trace.span_count() as i64));
    if let Some(root_id) = trace.root_span_id() {
        scope.insert("trace.root_span.id", Value::Str(root_id.to_string()));
    }

    scope
}

fn status_code_label(code: SpanStatusCode) -> String {
    match code {
        SpanStatusCode::Ok => "OK".to_string(),
        SpanStatusCode::Error => "ERROR".to_string(),
        SpanStatusCode::Timeout => "TIMEOUT".to_string(),
    }
}

/// One evaluated assertion (§4.6: "Each assertion yields `{passed,
/// expected, actual, expression-text, message, error?}`").
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionOutcome {
    pub passed: bool,
    pub expected: Value,
    pub actual: Value,
    pub expression_text: String,
    pub message: String,
    pub error: Option<String>,
}

pub fn evaluate(expr: &JsonValue, scope: &Scope) -> AssertionOutcome {
    let expression_text = expr.to_string();
    match eval_top(expr, scope) {
        Ok((passed, expected, actual)) => AssertionOutcome {
            passed,
            expected,
            actual,
            expression_text,
            message: if passed { "assertion passed".to_string() } else { "assertion failed".to_string() },
            error: None,
        },
        Err(error) => AssertionOutcome {
            passed: false,
            expected: Value::Null,
            actual: Value::Null,
            expression_text,
            message: "assertion evaluation failed".to_string(),
            error: Some(error),
        },
    }
}

/// Evaluate the top-level expression, distinguishing expected/actual for
/// comparison operators from the generic boolean-coercion path the
/// logical operators and bare scalars take.
fn eval_top(expr: &JsonValue, scope: &Scope) -> Result<(bool, Value, Value), String> {
    if let Some((op, args)) = single_op(expr) {
        if is_comparison_op(op) {
            let pair = args.as_array().ok_or_else(|| format!("operator '{op}' expects an array of operands"))?;
            if pair.len() != 2 {
                return Err(format!("operator '{op}' expects exactly 2 operands, got {}", pair.len()));
            }
            let actual = eval_expr(&pair[0], scope)?;
            let expected = eval_expr(&pair[1], scope)?;
            let passed = compare(op, &actual, &expected)?;
            return Ok((passed, expected, actual));
        }
    }

    let value = eval_expr(expr, scope)?;
    let passed = value.as_bool().unwrap_or(false);
    Ok((passed, Value::Bool(true), value))
}

fn single_op(expr: &JsonValue) -> Option<(&str, &JsonValue)> {
    match expr {
        JsonValue::Object(map) if map.len() == 1 => map.iter().next().map(|(k, v)| (k.as_str(), v)),
        _ => None,
    }
}

fn is_comparison_op(op: &str) -> bool {
    matches!(op, "==" | "!=" | "<" | "<=" | ">" | ">=")
}

fn compare(op: &str, actual: &Value, expected: &Value) -> Result<bool, String> {
    match op {
        "==" => Ok(values_eq(actual, expected)),
        "!=" => Ok(!values_eq(actual, expected)),
        "<" => Ok(ordering(actual, expected)? == std::cmp::Ordering::Less),
        "<=" => Ok(ordering(actual, expected)? != std::cmp::Ordering::Greater),
        ">" => Ok(ordering(actual, expected)? == std::cmp::Ordering::Greater),
        ">=" => Ok(ordering(actual, expected)? != std::cmp::Ordering::Less),
        _ => unreachable!("is_comparison_op gates this"),
    }
}

fn values_eq(a: &Value, b: &Value) -> bool {
    if let Some(eq) = a.numeric_eq(b) {
        return eq;
    }
    a == b
}

fn ordering(a: &Value, b: &Value) -> Result<std::cmp::Ordering, String> {
    if let Some(ord) = a.numeric_cmp(b) {
        return Ok(ord);
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => Err(format!("cannot order {a} and {b}")),
    }
}

fn eval_expr(expr: &JsonValue, scope: &Scope) -> Result<Value, String> {
    if let Some((op, arg)) = single_op(expr) {
        return match op {
            "var" => {
                let name = arg.as_str().ok_or_else(|| "'var' expects a string name".to_string())?;
                Ok(scope.get(name))
            }
            "and" => {
                let items = arg.as_array().ok_or_else(|| "'and' expects an array".to_string())?;
                let mut result = true;
                for item in items {
                    result = result && eval_expr(item, scope)?.as_bool().unwrap_or(false);
                }
                Ok(Value::Bool(result))
            }
            "or" => {
                let items = arg.as_array().ok_or_else(|| "'or' expects an array".to_string())?;
                let mut result = false;
                for item in items {
                    result = result || eval_expr(item, scope)?.as_bool().unwrap_or(false);
                }
                Ok(Value::Bool(result))
            }
            "!" => {
                let inner = eval_expr(arg, scope)?;
                Ok(Value::Bool(!inner.as_bool().unwrap_or(false)))
            }
            op if is_comparison_op(op) => {
                let (passed, _, _) = eval_top(expr, scope)?;
                Ok(Value::Bool(passed))
            }
            other => Err(format!("unknown operator '{other}'")),
        };
    }
    json_to_value(expr)
}

fn json_to_value(json: &JsonValue) -> Result<Value, String> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                n.as_f64().map(Value::Float).ok_or_else(|| format!("number '{n}' out of range"))
            }
        }
        JsonValue::String(s) => Ok(Value::Str(s.clone())),
        JsonValue::Array(items) => Ok(Value::List(items.iter().map(json_to_value).collect::<Result<Vec<_>, _>>()?)),
        JsonValue::Object(map) => {
            let mut out = BTreeMap::new();
            for (k, v) in map {
                out.insert(k.clone(), json_to_value(v)?);
            }
            Ok(Value::Map(out))
        }
    }
}
