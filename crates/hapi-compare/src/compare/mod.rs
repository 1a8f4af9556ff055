//! The comparison engine
//!
//! Every differ receives the run's [`ComparisonContext`] and writes its
//! findings to a [`Reporter`]; none of them fails on a mismatch.

pub mod data;
pub mod datasets;
pub mod field;
pub mod info;
pub mod parameters;

pub use data::{compare_data, compare_payloads, sample_window, SampleWindow, WindowError};
pub use datasets::compare_dataset_sets;
pub use field::{compare_field, FieldPair, Verdict};
pub use info::compare_info;
pub use parameters::{
    compare_bins, compare_parameter_fields, compare_parameters, parameter_scope, DataScope,
};

use crate::catalog::NormalizedCatalog;
use crate::client::DataSource;
use crate::config::ComparisonContext;
use crate::report::Reporter;

/// Compare two normalized catalogs
///
/// The dataset sets are compared once; each dataset served by both servers
/// then has its info and its parameters compared, in baseline order.
pub async fn compare_catalogs(
    baseline: &NormalizedCatalog,
    candidate: &NormalizedCatalog,
    ctx: &ComparisonContext,
    source: &dyn DataSource,
    reporter: &mut Reporter,
) {
    compare_dataset_sets(baseline, candidate, ctx, reporter);

    for (id, dataset_s1) in baseline.iter() {
        if ctx.filter().should_omit(id) {
            continue;
        }
        let Some(dataset_s2) = candidate.get(id) else {
            continue;
        };

        reporter.info(id);
        compare_info(id, &dataset_s2.info, &dataset_s1.info, ctx, reporter);
        compare_parameters(id, baseline, candidate, ctx, source, reporter).await;
    }
}
