//! Presence of datasets on each server

use super::field::INDENT;
use super::parameters::depend_0_note;
use crate::catalog::NormalizedCatalog;
use crate::config::{ComparisonContext, Mode, Side};
use crate::report::{Reporter, Severity};

/// True for ids like `AC_H0_MFI@1`
fn has_version_suffix(id: &str) -> bool {
    let mut tail = id.chars().rev();
    matches!(
        (tail.next(), tail.next()),
        (Some(digit), Some('@')) if digit.is_ascii_digit()
    )
}

/// Hint when the other server has the `@0` variant of a missing id
fn renamed_hint(id: &str, other: &NormalizedCatalog, other_label: &str) -> Option<String> {
    if has_version_suffix(id) {
        return None;
    }
    let versioned = format!("{id}@0");
    other
        .contains(&versioned)
        .then(|| format!("{INDENT}But {versioned} in {other_label}"))
}

/// Report datasets served by only one of the two servers
///
/// Additions on the candidate are tolerated in `update` mode (reported only
/// with `warn`); datasets the candidate dropped are always errors. A missing
/// id whose `@0` variant exists on the other server is always an error.
pub fn compare_dataset_sets(
    baseline: &NormalizedCatalog,
    candidate: &NormalizedCatalog,
    ctx: &ComparisonContext,
    reporter: &mut Reporter,
) {
    let s1 = ctx.label(Side::Baseline);
    let s2 = ctx.label(Side::Candidate);

    for id in candidate.ids() {
        if ctx.filter().should_omit(id) || baseline.contains(id) {
            continue;
        }
        let severity = match ctx.mode() {
            Mode::Update if ctx.warn() => Some(Severity::Warning),
            Mode::Update => None,
            Mode::Exact => Some(Severity::Error),
        };
        if let Some(severity) = severity {
            reporter.emit(severity, format!("{id}\n{INDENT}Not in {s1}"));
        }
        if let Some(hint) = renamed_hint(id, baseline, s1) {
            reporter.error(hint);
        }
    }

    for (id, dataset) in baseline.iter() {
        if ctx.filter().should_omit(id) || candidate.contains(id) {
            continue;
        }
        let mut text = format!("{id}\n{INDENT}{id} not in {s2}");
        if let Some(note) = depend_0_note(dataset, ctx) {
            text.push(' ');
            text.push_str(&note);
        }
        reporter.error(text);
        if let Some(hint) = renamed_hint(id, candidate, s2) {
            reporter.error(hint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NormalizedDataset;
    use crate::config::ServerSpec;
    use hapi_core::Info;
    use serde_json::json;

    fn catalog(label: &str, ids: &[&str]) -> NormalizedCatalog {
        let info = Info::from_value(json!({"parameters": [{"name": "Time"}]})).unwrap();
        let mut catalog = NormalizedCatalog::new(label);
        for id in ids {
            catalog.insert(NormalizedDataset::new(*id, &info));
        }
        catalog
    }

    fn ctx(mode: Mode, warn: bool) -> ComparisonContext {
        ComparisonContext::new(
            ServerSpec::new("nl", "http://a.example/hapi"),
            ServerSpec::new("jf", "http://b.example/hapi"),
        )
        .with_mode(mode)
        .with_warn(warn)
    }

    #[test]
    fn test_version_suffix() {
        assert!(has_version_suffix("AC_H0_MFI@1"));
        assert!(!has_version_suffix("AC_H0_MFI"));
        assert!(!has_version_suffix("@"));
    }

    #[test]
    fn test_addition_suppressed_in_update_without_warn() {
        let mut reporter = Reporter::new();
        compare_dataset_sets(
            &catalog("nl", &["A"]),
            &catalog("jf", &["A", "C"]),
            &ctx(Mode::Update, false),
            &mut reporter,
        );
        assert!(reporter.messages().is_empty());
    }

    #[test]
    fn test_addition_is_warning_with_warn() {
        let mut reporter = Reporter::new();
        compare_dataset_sets(
            &catalog("nl", &["A"]),
            &catalog("jf", &["A", "C"]),
            &ctx(Mode::Update, true),
            &mut reporter,
        );
        assert_eq!(reporter.count(Severity::Warning), 1);
        assert_eq!(reporter.messages()[0].text, "C\n  Not in nl");
    }

    #[test]
    fn test_removal_is_error_with_renamed_hint() {
        let mut reporter = Reporter::new();
        compare_dataset_sets(
            &catalog("nl", &["A"]),
            &catalog("jf", &["A@0"]),
            &ctx(Mode::Update, false),
            &mut reporter,
        );
        assert_eq!(reporter.count(Severity::Error), 2);
        assert_eq!(reporter.messages()[0].text, "A\n  A not in jf");
        assert_eq!(reporter.messages()[1].text, "  But A@0 in jf");
    }

    #[test]
    fn test_renamed_hint_reported_in_update_without_warn() {
        let mut reporter = Reporter::new();
        compare_dataset_sets(
            &catalog("nl", &["X@0"]),
            &catalog("jf", &["X@0", "X"]),
            &ctx(Mode::Update, false),
            &mut reporter,
        );
        assert_eq!(reporter.messages().len(), 1);
        assert_eq!(reporter.messages()[0].severity, Severity::Error);
        assert_eq!(reporter.messages()[0].text, "  But X@0 in nl");
    }

    #[test]
    fn test_renamed_hint_stays_error_with_warn() {
        let mut reporter = Reporter::new();
        compare_dataset_sets(
            &catalog("nl", &["X@0"]),
            &catalog("jf", &["X@0", "X"]),
            &ctx(Mode::Update, true),
            &mut reporter,
        );
        assert_eq!(reporter.count(Severity::Warning), 1);
        assert_eq!(reporter.count(Severity::Error), 1);
        assert_eq!(reporter.messages()[1].text, "  But X@0 in nl");
    }

    #[test]
    fn test_removal_carries_depend_0_note() {
        let info = Info::from_value(json!({
            "parameters": [{"name": "Epoch", "x_cdf_depend_0_name": "Epoch"}]
        }))
        .unwrap();
        let mut baseline = NormalizedCatalog::new("nl");
        baseline.insert(NormalizedDataset::new("B", &info));

        let mut reporter = Reporter::new();
        compare_dataset_sets(
            &baseline,
            &catalog("jf", &[]),
            &ctx(Mode::Exact, false),
            &mut reporter,
        );
        assert_eq!(
            reporter.messages()[0].text,
            "B\n  B not in jf for nl DEPEND_0 = Epoch"
        );
    }
}
