//! Field-level comparison rules
//!
//! Shared parameter keys whose values differ go through an ordered rule
//! table. The first rule whose predicate matches decides the outcome:
//!
//! | # | rule         | applies to                                 | outcome                  |
//! |---|--------------|--------------------------------------------|--------------------------|
//! | 1 | bins         | `bins`                                     | deferred to bin counts   |
//! | 2 | numeric fill | `fill`, both types `int`/`double`          | mode severity if unequal |
//! | 3 | size         | `size`, both arrays                        | info                     |
//! | 4 | value kind   | values of different JSON kinds             | mode severity            |
//! | 5 | description  | `description`                              | mode severity            |
//! | 6 | value        | anything else                              | mode severity            |
//!
//! "Mode severity" is a warning in `update` mode and an error in `exact` mode.

use crate::config::{ComparisonContext, Side};
use crate::report::Severity;
use chrono::{DateTime, Utc};
use hapi_core::{fields, parse_hapi_time, TimeParseError};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

/// Indentation unit of rendered messages
pub const INDENT: &str = "  ";

/// HAPI types whose fill values are compared numerically
const NUMERIC_TYPES: &[&str] = &["int", "double"];

/// A key present in both the candidate and the baseline parameter
#[derive(Debug, Clone, Copy)]
pub struct FieldPair<'a> {
    /// Parameter name, used to locate the difference
    pub parameter: &'a str,
    pub key: &'a str,
    pub candidate: &'a Value,
    pub baseline: &'a Value,
    /// Declared HAPI type of the candidate parameter
    pub candidate_type: Option<&'a str>,
    /// Declared HAPI type of the baseline parameter
    pub baseline_type: Option<&'a str>,
}

/// Outcome of comparing one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Equal, or different in a tolerated way
    Accepted,
    /// Compared by a dedicated check elsewhere
    Deferred,
    Report { severity: Severity, text: String },
}

struct FieldRule {
    name: &'static str,
    applies: fn(&FieldPair<'_>) -> bool,
    judge: fn(&FieldPair<'_>, &ComparisonContext) -> Verdict,
}

const RULES: [FieldRule; 6] = [
    FieldRule {
        name: "bins",
        applies: is_bins,
        judge: defer,
    },
    FieldRule {
        name: "numeric fill",
        applies: is_numeric_fill,
        judge: judge_numeric_fill,
    },
    FieldRule {
        name: "size",
        applies: is_size_sequence,
        judge: judge_size,
    },
    FieldRule {
        name: "value kind",
        applies: kinds_differ,
        judge: judge_kind,
    },
    FieldRule {
        name: "description",
        applies: is_description,
        judge: judge_description,
    },
    FieldRule {
        name: "value",
        applies: any_field,
        judge: judge_value,
    },
];

/// Compare one shared field
pub fn compare_field(pair: &FieldPair<'_>, ctx: &ComparisonContext) -> Verdict {
    if values_equal(pair.candidate, pair.baseline) {
        return Verdict::Accepted;
    }

    match RULES.iter().find(|rule| (rule.applies)(pair)) {
        Some(rule) => {
            trace!("{}/{}: rule '{}'", pair.parameter, pair.key, rule.name);
            (rule.judge)(pair, ctx)
        }
        None => Verdict::Accepted,
    }
}

fn is_bins(pair: &FieldPair<'_>) -> bool {
    pair.key == fields::BINS
}

fn is_numeric_fill(pair: &FieldPair<'_>) -> bool {
    let numeric = |t: Option<&str>| t.is_some_and(|t| NUMERIC_TYPES.contains(&t));
    pair.key == fields::FILL && numeric(pair.candidate_type) && numeric(pair.baseline_type)
}

fn is_size_sequence(pair: &FieldPair<'_>) -> bool {
    pair.key == fields::SIZE && pair.candidate.is_array() && pair.baseline.is_array()
}

fn kinds_differ(pair: &FieldPair<'_>) -> bool {
    kind_name(pair.candidate) != kind_name(pair.baseline)
}

fn is_description(pair: &FieldPair<'_>) -> bool {
    pair.key == fields::DESCRIPTION
}

fn any_field(_: &FieldPair<'_>) -> bool {
    true
}

fn defer(_: &FieldPair<'_>, _: &ComparisonContext) -> Verdict {
    Verdict::Deferred
}

fn judge_numeric_fill(pair: &FieldPair<'_>, ctx: &ComparisonContext) -> Verdict {
    if let (Some(c), Some(b)) = (as_number(pair.candidate), as_number(pair.baseline)) {
        if numbers_equal(c, b) {
            return Verdict::Accepted;
        }
    }
    Verdict::Report {
        severity: ctx.mode().compat_severity(),
        text: format!(
            "{}\n{INDENT}{INDENT}val_{} = {} != val_{} = {}",
            location(pair),
            ctx.label(Side::Candidate),
            render_value(pair.candidate),
            ctx.label(Side::Baseline),
            render_value(pair.baseline)
        ),
    }
}

fn judge_size(pair: &FieldPair<'_>, ctx: &ComparisonContext) -> Verdict {
    if sequences_equal(pair.candidate, pair.baseline) {
        return Verdict::Accepted;
    }
    Verdict::Report {
        severity: Severity::Info,
        text: format!(
            "{}\n{INDENT}{INDENT}val_{} = {} != val_{} = {}",
            location(pair),
            ctx.label(Side::Candidate),
            render_value(pair.candidate),
            ctx.label(Side::Baseline),
            render_value(pair.baseline)
        ),
    }
}

fn judge_kind(pair: &FieldPair<'_>, ctx: &ComparisonContext) -> Verdict {
    Verdict::Report {
        severity: ctx.mode().compat_severity(),
        text: format!(
            "{}\n{INDENT}{INDENT}type_{} = {} != type_{} = {}",
            location(pair),
            ctx.label(Side::Candidate),
            kind_name(pair.candidate),
            ctx.label(Side::Baseline),
            kind_name(pair.baseline)
        ),
    }
}

fn judge_description(pair: &FieldPair<'_>, ctx: &ComparisonContext) -> Verdict {
    Verdict::Report {
        severity: ctx.mode().compat_severity(),
        text: format!(
            "{}\n{INDENT}{INDENT}val_{} = '{}'\n{INDENT}{INDENT}!=\n{INDENT}{INDENT}val_{} = '{}'",
            location(pair),
            ctx.label(Side::Candidate),
            render_value(pair.candidate),
            ctx.label(Side::Baseline),
            render_value(pair.baseline)
        ),
    }
}

fn judge_value(pair: &FieldPair<'_>, ctx: &ComparisonContext) -> Verdict {
    Verdict::Report {
        severity: ctx.mode().compat_severity(),
        text: format!(
            "{}\n{INDENT}{INDENT}val_{} = '{}' != val_{} = '{}'",
            location(pair),
            ctx.label(Side::Candidate),
            render_value(pair.candidate),
            ctx.label(Side::Baseline),
            render_value(pair.baseline)
        ),
    }
}

fn location(pair: &FieldPair<'_>) -> String {
    format!("{INDENT}{}/{}", pair.parameter, pair.key)
}

/// Read a number or a numeric string
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric equality where NaN fills match each other
pub fn numbers_equal(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Structural equality where `24` and `24.0` are the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Element-wise equality of two arrays; non-arrays never match
pub fn sequences_equal(a: &Value, b: &Value) -> bool {
    match (a.as_array(), b.as_array()) {
        (Some(_), Some(_)) => values_equal(a, b),
        _ => false,
    }
}

/// Compare two HAPI time strings as instants
///
/// Returns `Ok(true)` when both denote the same instant, whatever their
/// formatting.
pub fn timestamps_equal(a: &str, b: &str) -> Result<bool, TimeParseError> {
    let a: DateTime<Utc> = parse_hapi_time(a)?;
    let b: DateTime<Utc> = parse_hapi_time(b)?;
    Ok(a == b)
}

/// Name of a JSON value's kind, distinguishing integers from floats
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a value for a message: strings bare, everything else as JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the keys present on only one side, sorted
pub fn key_difference<'a>(a: &BTreeSet<&'a str>, b: &BTreeSet<&'a str>) -> String {
    let keys: Vec<&str> = a.symmetric_difference(b).copied().collect();
    format!("{{{}}}", keys.join(", "))
}
