//! Comparison of the scalar members of one dataset's info

use super::field::{key_difference, render_value, timestamps_equal, values_equal, INDENT};
use crate::config::{ComparisonContext, Side};
use crate::report::Reporter;
use hapi_core::{fields, is_extension_key, Info};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

/// Info keys of one side that take part in the comparison
fn comparable_keys<'a>(info: &'a Info, omits: &[String]) -> BTreeSet<&'a str> {
    info.keys()
        .filter(|key| *key != fields::PARAMETERS && *key != fields::PARAMETER_INDEX)
        .filter(|key| !omits.iter().any(|omit| omit == key))
        .filter(|key| !is_extension_key(key))
        .collect()
}

/// Compare the info of one dataset, candidate first
///
/// Keys ending in `Date` are compared as instants, so differently formatted
/// but equal times are only reported when warnings are enabled.
pub fn compare_info(
    id: &str,
    candidate: &Info,
    baseline: &Info,
    ctx: &ComparisonContext,
    reporter: &mut Reporter,
) {
    trace!("{id}: comparing info");
    let s1 = ctx.label(Side::Baseline);
    let s2 = ctx.label(Side::Candidate);

    let keys_s2 = comparable_keys(candidate, &ctx.candidate().omits);
    let keys_s1 = comparable_keys(baseline, &ctx.baseline().omits);

    if keys_s2.len() != keys_s1.len() {
        reporter.error(format!(
            "{INDENT}n_keys_{s2} = {} != n_keys_{s1} = {}\n{INDENT}{INDENT}Differences: {}",
            keys_s2.len(),
            keys_s1.len(),
            key_difference(&keys_s1, &keys_s2)
        ));
        return;
    }

    for key in keys_s2.intersection(&keys_s1) {
        let (Some(v2), Some(v1)) = (candidate.get(key), baseline.get(key)) else {
            continue;
        };
        if values_equal(v2, v1) {
            continue;
        }

        let values = format!(
            "val_{s2} = {} != val_{s1} = {}",
            render_value(v2),
            render_value(v1)
        );

        if !key.ends_with(fields::DATE_SUFFIX) {
            reporter.error(format!("{INDENT}{key} {values}"));
            continue;
        }

        match (v2, v1) {
            (Value::String(t2), Value::String(t1)) => match timestamps_equal(t2, t1) {
                Ok(false) => {
                    reporter.error(format!("{INDENT}{key} (datetime comparison) {values}"));
                }
                Ok(true) => {
                    if ctx.warn() {
                        reporter.warning(format!(
                            "{INDENT}{key} {values} but datetime equivalent."
                        ));
                    }
                }
                Err(e) => {
                    reporter.error(format!("{INDENT}{key} {values}; {e}"));
                }
            },
            _ => reporter.error(format!("{INDENT}{key} {values}")),
        }
    }
}
