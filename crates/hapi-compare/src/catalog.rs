//! Catalog normalization
//!
//! Turns the list of dataset records fetched from one server into a lookup
//! keyed by dataset id, with a name index over each dataset's parameters.

use crate::filter::IdFilter;
use crate::report::Reporter;
use hapi_core::{DatasetRecord, Info, Parameter};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// A dataset whose info was fetched, with its parameters indexed by name
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDataset {
    pub id: String,
    pub info: Info,
    parameter_index: IndexMap<String, Parameter>,
}

impl NormalizedDataset {
    /// Copy an info response and index its parameters
    ///
    /// Duplicate parameter names keep the position of the first occurrence
    /// and the object of the last one.
    pub fn new(id: impl Into<String>, info: &Info) -> Self {
        let id = id.into();
        let mut parameter_index = IndexMap::with_capacity(info.parameters().len());
        for parameter in info.parameters() {
            let name = parameter.name().to_string();
            if parameter_index.insert(name, parameter.clone()).is_some() {
                warn!("{}: duplicate parameter name '{}'", id, parameter.name());
            }
        }

        Self {
            id,
            info: info.clone(),
            parameter_index,
        }
    }

    /// Parameters keyed by name, in declaration order
    pub fn parameter_index(&self) -> &IndexMap<String, Parameter> {
        &self.parameter_index
    }

    /// Distinct parameter names in declaration order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameter_index.keys().map(String::as_str).collect()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameter_index.get(name)
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.info.parameters()
    }
}

/// All comparable datasets of one server, in catalog order
#[derive(Debug, Clone, Default)]
pub struct NormalizedCatalog {
    label: String,
    datasets: IndexMap<String, NormalizedDataset>,
}

impl NormalizedCatalog {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            datasets: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, dataset: NormalizedDataset) {
        self.datasets.insert(dataset.id.clone(), dataset);
    }

    /// Label of the server this catalog came from
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, id: &str) -> Option<&NormalizedDataset> {
        self.datasets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.datasets.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedDataset)> {
        self.datasets.iter().map(|(id, ds)| (id.as_str(), ds))
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Build the normalized catalog of one server
///
/// Omitted ids are dropped silently. Records without info (the `/info`
/// request failed) are reported as errors and dropped.
pub fn normalize(
    records: &[DatasetRecord],
    label: &str,
    filter: &IdFilter,
    reporter: &mut Reporter,
) -> NormalizedCatalog {
    let mut catalog = NormalizedCatalog::new(label);

    for record in records {
        if filter.should_omit(&record.id) {
            continue;
        }
        let Some(info) = &record.info else {
            reporter.error(format!("Dataset {} in {} has no info", record.id, label));
            continue;
        };
        catalog.insert(NormalizedDataset::new(&record.id, info));
    }

    debug!("Normalized {} datasets for {}", catalog.len(), label);
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use serde_json::json;

    fn record(id: &str, parameters: serde_json::Value) -> DatasetRecord {
        let info = Info::from_value(json!({
            "startDate": "2001-01-01Z",
            "stopDate": "2002-01-01Z",
            "parameters": parameters
        }))
        .unwrap();
        DatasetRecord::new(id).with_info(info)
    }

    #[test]
    fn test_normalize_indexes_parameters() {
        let records = vec![record(
            "AC_H0_MFI",
            json!([{"name": "Time", "type": "isotime"}, {"name": "B", "type": "double"}]),
        )];
        let mut reporter = Reporter::new();
        let catalog = normalize(&records, "nl", &IdFilter::default(), &mut reporter);

        let dataset = catalog.get("AC_H0_MFI").unwrap();
        assert_eq!(dataset.parameter_names(), vec!["Time", "B"]);
        assert_eq!(
            dataset.parameter("B").unwrap().data_type(),
            Some("double")
        );
        assert!(reporter.messages().is_empty());
    }

    #[test]
    fn test_missing_info_is_reported_and_skipped() {
        let records = vec![
            DatasetRecord::new("BROKEN"),
            record("OK", json!([{"name": "Time"}])),
        ];
        let mut reporter = Reporter::new();
        let catalog = normalize(&records, "jf", &IdFilter::default(), &mut reporter);

        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["OK"]);
        assert_eq!(reporter.count(Severity::Error), 1);
        assert_eq!(
            reporter.messages()[0].text,
            "Dataset BROKEN in jf has no info"
        );
    }

    #[test]
    fn test_omitted_ids_are_dropped_silently() {
        let records = vec![
            DatasetRecord::new("AIM_CIPS_SCI_3A"),
            record("WI_H0_MFI", json!([{"name": "Time"}])),
            record("AC_H0_MFI", json!([{"name": "Time"}])),
        ];
        let filter = IdFilter::new(Some("^AC")).unwrap();
        let mut reporter = Reporter::new();
        let catalog = normalize(&records, "nl", &filter, &mut reporter);

        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["AC_H0_MFI"]);
        assert!(reporter.messages().is_empty());
    }

    #[test]
    fn test_duplicate_parameter_names_last_wins() {
        let records = vec![record(
            "DUP",
            json!([
                {"name": "Time", "type": "isotime"},
                {"name": "B", "units": "nT"},
                {"name": "B", "units": "T"}
            ]),
        )];
        let mut reporter = Reporter::new();
        let catalog = normalize(&records, "nl", &IdFilter::default(), &mut reporter);

        let dataset = catalog.get("DUP").unwrap();
        assert_eq!(dataset.parameter_names(), vec!["Time", "B"]);
        assert_eq!(dataset.parameter("B").unwrap().get("units"), Some(&json!("T")));
        assert_eq!(dataset.parameters().len(), 3);
    }
}
