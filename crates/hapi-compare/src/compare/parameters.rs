//! Comparison of one dataset's ordered parameter list
//!
//! Parameter order is the column order of `/data` payloads, so a reordering
//! is never tolerated. A candidate that only appends parameters is a
//! backward-compatible extension in `update` mode.

use super::data::compare_data;
use super::field::{compare_field, key_difference, render_value, FieldPair, Verdict, INDENT};
use crate::catalog::{NormalizedCatalog, NormalizedDataset};
use crate::client::DataSource;
use crate::config::{ComparisonContext, Mode, Side};
use crate::report::Reporter;
use hapi_core::{fields, is_extension_key, Parameter};
use std::collections::BTreeSet;

/// Which parameters the data comparison should request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataScope {
    /// Parameter lists are irreconcilable; do not compare data
    Skip,
    /// Every parameter
    All,
    /// Only the leading parameters both servers share
    Matched(Vec<String>),
}

/// Note naming the baseline's `DEPEND_0` variable, when it declares one
pub fn depend_0_note(dataset: &NormalizedDataset, ctx: &ComparisonContext) -> Option<String> {
    let value = dataset
        .parameters()
        .first()?
        .get(fields::X_CDF_DEPEND_0_NAME)?;
    Some(format!(
        "for {} DEPEND_0 = {}",
        ctx.label(Side::Baseline),
        render_value(value)
    ))
}

fn append_note(text: &mut String, note: Option<&str>) {
    if let Some(note) = note {
        text.push(' ');
        text.push_str(note);
    }
}

/// Compare the parameter lists of a dataset served by both servers, then
/// compare a data sample over the parameters they share
pub async fn compare_parameters(
    id: &str,
    baseline: &NormalizedCatalog,
    candidate: &NormalizedCatalog,
    ctx: &ComparisonContext,
    source: &dyn DataSource,
    reporter: &mut Reporter,
) {
    let (Some(dataset_s1), Some(dataset_s2)) = (baseline.get(id), candidate.get(id)) else {
        return;
    };

    match parameter_scope(dataset_s1, dataset_s2, ctx, reporter) {
        DataScope::Skip => {}
        DataScope::All => {
            compare_data(id, baseline, candidate, ctx, source, reporter, None).await;
        }
        DataScope::Matched(names) => {
            let parameters = Some(names.as_slice());
            compare_data(id, baseline, candidate, ctx, source, reporter, parameters).await;
        }
    }
}

/// Apply the count and order policies and compare parameters pairwise
pub fn parameter_scope(
    baseline: &NormalizedDataset,
    candidate: &NormalizedDataset,
    ctx: &ComparisonContext,
    reporter: &mut Reporter,
) -> DataScope {
    let s1 = ctx.label(Side::Baseline);
    let s2 = ctx.label(Side::Candidate);
    let names_s1 = baseline.parameter_names();
    let names_s2 = candidate.parameter_names();
    let (n1, n2) = (names_s1.len(), names_s2.len());
    let note = depend_0_note(baseline, ctx);

    if n1 != n2 {
        let m = n1.min(n2);
        let set_s1: BTreeSet<&str> = names_s1.iter().copied().collect();
        let set_s2: BTreeSet<&str> = names_s2.iter().copied().collect();
        let differences = key_difference(&set_s1, &set_s2);

        if names_s1[..m] != names_s2[..m] {
            let mut text = format!("{INDENT}n_params_{s2} = {n2} != n_params_{s1} = {n1}");
            append_note(&mut text, note.as_deref());
            text.push_str(&format!(
                "\n{INDENT}{INDENT}Differences: {differences}\
                 \n{INDENT}{INDENT}Error because first {m} parameters are not identical."
            ));
            reporter.error(text);
            return DataScope::Skip;
        }

        let relation = if n2 > n1 { ">" } else { "<" };
        let mut text =
            format!("{INDENT}{INDENT}n_params_{s2} = {n2} {relation} n_params_{s1} = {n1}.");
        append_note(&mut text, note.as_deref());
        if ctx.mode() == Mode::Update {
            text.push_str(&format!(
                "\n{INDENT}{INDENT}{INDENT}Warning b/c first {m} parameters are same & mode = 'update'"
            ));
        }
        text.push_str(&format!("\n{INDENT}{INDENT}{INDENT}Differences: {differences}"));
        reporter.emit(ctx.mode().compat_severity(), text);

        for name in &names_s1[..m] {
            compare_named(name, baseline, candidate, ctx, reporter);
        }
        return DataScope::Matched(names_s1[..m].iter().map(|n| n.to_string()).collect());
    }

    if names_s1 != names_s2 {
        let mut text = format!("{INDENT}Order differs");
        append_note(&mut text, note.as_deref());
        text.push_str(&format!(
            "\n{INDENT}{INDENT}{}: {:?}\n{INDENT}{INDENT}{}: {:?}",
            ctx.padded(Side::Candidate),
            names_s2,
            ctx.padded(Side::Baseline),
            names_s1
        ));
        reporter.error(text);
        return DataScope::Skip;
    }

    for name in &names_s1 {
        compare_named(name, baseline, candidate, ctx, reporter);
    }
    DataScope::All
}

fn compare_named(
    name: &str,
    baseline: &NormalizedDataset,
    candidate: &NormalizedDataset,
    ctx: &ComparisonContext,
    reporter: &mut Reporter,
) {
    if let (Some(param_s1), Some(param_s2)) = (baseline.parameter(name), candidate.parameter(name)) {
        compare_parameter_fields(param_s2, param_s1, ctx, reporter);
    }
}

/// Compare the members of one parameter, candidate first
pub fn compare_parameter_fields(
    candidate: &Parameter,
    baseline: &Parameter,
    ctx: &ComparisonContext,
    reporter: &mut Reporter,
) {
    let s1 = ctx.label(Side::Baseline);
    let s2 = ctx.label(Side::Candidate);
    let keys_s2: BTreeSet<&str> = candidate.keys().filter(|k| !is_extension_key(k)).collect();
    let keys_s1: BTreeSet<&str> = baseline.keys().filter(|k| !is_extension_key(k)).collect();

    if keys_s2.len() != keys_s1.len() {
        let only_bins = keys_s1
            .symmetric_difference(&keys_s2)
            .copied()
            .eq([fields::BINS]);
        if !only_bins {
            reporter.error(format!(
                "{INDENT}{}\n{INDENT}{INDENT}n_param_keys_{s2} = {} != n_param_keys_{s1} = {}\
                 \n{INDENT}{INDENT}{INDENT}Differences: {}",
                candidate.name(),
                keys_s2.len(),
                keys_s1.len(),
                key_difference(&keys_s1, &keys_s2)
            ));
        }
    }

    for &key in keys_s2.intersection(&keys_s1) {
        let (Some(value_s2), Some(value_s1)) = (candidate.get(key), baseline.get(key)) else {
            continue;
        };
        let pair = FieldPair {
            parameter: candidate.name(),
            key,
            candidate: value_s2,
            baseline: value_s1,
            candidate_type: candidate.data_type(),
            baseline_type: baseline.data_type(),
        };
        if let Verdict::Report { severity, text } = compare_field(&pair, ctx) {
            reporter.emit(severity, text);
        }
    }

    compare_bins(candidate, baseline, ctx, reporter);
}

/// Compare the presence and number of bin descriptors; content is not compared
pub fn compare_bins(
    candidate: &Parameter,
    baseline: &Parameter,
    ctx: &ComparisonContext,
    reporter: &mut Reporter,
) {
    let s1 = ctx.label(Side::Baseline);
    let s2 = ctx.label(Side::Candidate);
    let name_s1 = baseline.name();
    let name_s2 = candidate.name();

    match (candidate.bins_count(), baseline.bins_count()) {
        (Some(_), None) => reporter.emit(
            ctx.mode().compat_severity(),
            format!("{INDENT}{name_s2}\n{INDENT}{INDENT}{s2} has bins for '{name_s2}' but {s1} does not"),
        ),
        (None, Some(_)) => reporter.error(format!(
            "{INDENT}{name_s1}\n{INDENT}{INDENT}{s1} has bins for '{name_s1}' but {s2} does not"
        )),
        (Some(n2), Some(n1)) if n2 != n1 => reporter.error(format!(
            "{INDENT}{name_s1}/bins\n{INDENT}{INDENT}{s1} has {n1} bins objects; {s2} has {n2}"
        )),
        _ => {}
    }
}
