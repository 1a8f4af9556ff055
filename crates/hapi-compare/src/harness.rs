//! One comparison run: load both catalogs, then compare them

use crate::catalog::{normalize, NormalizedCatalog};
use crate::client::HapiClient;
use crate::compare::compare_catalogs;
use crate::config::{ComparisonContext, Mode, Side};
use crate::error::CompareResult;
use crate::fetch::load_catalog;
use crate::report::Reporter;
use tracing::info;

/// Runs a comparison between the two servers of a context
pub struct Harness {
    ctx: ComparisonContext,
    client: HapiClient,
}

impl Harness {
    pub fn new(ctx: ComparisonContext) -> CompareResult<Self> {
        Ok(Self {
            ctx,
            client: HapiClient::new()?,
        })
    }

    pub fn context(&self) -> &ComparisonContext {
        &self.ctx
    }

    /// Log the mode and the two servers
    pub fn log_plan(&self) {
        let update = self.ctx.mode() == Mode::Update;
        if update {
            info!("--mode = 'update'; Backward compatible differences will be treated as warnings.");
        }
        for (side, title) in [
            (Side::Baseline, "Original server"),
            (Side::Candidate, "Updated server"),
        ] {
            if update {
                info!("{}", title);
            }
            let server = self.ctx.server(side);
            info!("  {} = {}", server.label, server.url);
        }
    }

    /// Fetch (or read) and normalize both catalogs
    ///
    /// Datasets without info are reported while normalizing.
    pub async fn load_catalogs(
        &self,
        reporter: &mut Reporter,
    ) -> CompareResult<(NormalizedCatalog, NormalizedCatalog)> {
        let records_s1 = load_catalog(&self.client, self.ctx.baseline(), &self.ctx).await?;
        let records_s2 = load_catalog(&self.client, self.ctx.candidate(), &self.ctx).await?;
        info!("");

        let filter = self.ctx.filter();
        let baseline = normalize(&records_s1, self.ctx.label(Side::Baseline), filter, reporter);
        let candidate = normalize(&records_s2, self.ctx.label(Side::Candidate), filter, reporter);
        Ok((baseline, candidate))
    }

    /// Run the whole comparison
    ///
    /// Only a failure to load a catalog is an error; every difference
    /// between the servers ends up in `reporter`.
    pub async fn run(&self, reporter: &mut Reporter) -> CompareResult<()> {
        self.log_plan();
        let (baseline, candidate) = self.load_catalogs(reporter).await?;
        compare_catalogs(&baseline, &candidate, &self.ctx, &self.client, reporter).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerSpec;
    use crate::report::Severity;
    use hapi_core::{DatasetRecord, Info};
    use serde_json::json;
    use tempfile::TempDir;

    fn write_dump(dir: &TempDir, name: &str, records: &[DatasetRecord]) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string(records).unwrap()).unwrap();
        path.display().to_string()
    }

    fn record(id: &str, units: &str) -> DatasetRecord {
        let info = Info::from_value(json!({
            "startDate": "2001-01-01Z",
            "stopDate": "2002-01-01Z",
            "parameters": [
                {"name": "Time", "type": "isotime", "length": 24},
                {"name": "B", "type": "double", "units": units}
            ]
        }))
        .unwrap();
        DatasetRecord::new(id).with_info(info)
    }

    #[tokio::test]
    async fn test_run_on_local_dumps() {
        let dir = TempDir::new().unwrap();
        let url1 = write_dump(&dir, "all-nl.json", &[record("A", "nT"), record("B", "nT")]);
        let url2 = write_dump(
            &dir,
            "all-jf.json",
            &[record("A", "T"), record("B", "nT"), DatasetRecord::new("C")],
        );

        let ctx = ComparisonContext::new(ServerSpec::new("nl", url1), ServerSpec::new("jf", url2))
            .with_data_dir(dir.path());
        let harness = Harness::new(ctx).unwrap();
        let mut reporter = Reporter::new();
        harness.run(&mut reporter).await.unwrap();

        // C has no info; A's units differ
        assert_eq!(reporter.count(Severity::Error), 1);
        assert_eq!(reporter.count(Severity::Warning), 1);
        assert!(reporter
            .with_severity(Severity::Warning)
            .any(|m| m.text == "  B/units\n    val_jf = 'T' != val_nl = 'nT'"));

        // Snapshots are written when no id pattern is given
        assert!(dir.path().join("cache/catalog-all.nl.json").exists());
    }
}
