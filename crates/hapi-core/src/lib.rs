//! Core types for HAPI server comparison
//!
//! This crate provides the fundamental types shared by the comparison
//! workspace: dataset records as returned by `/catalog` and `/info`, the
//! parameter objects inside an info response, and HAPI time strings.

mod dataset;
mod time;

pub use dataset::{is_extension_key, DatasetRecord, Info, Parameter};
pub use time::{format_sample_time, parse_hapi_time, TimeParseError};

/// Prefix of vendor-extension keys (`x_cdf_depend_0_name`, ...)
pub const EXTENSION_PREFIX: &str = "x_";

/// Well-known member names of HAPI responses
pub mod fields {
    /// Ordered parameter list of an info response
    pub const PARAMETERS: &str = "parameters";

    /// Name index derived from `parameters`
    pub const PARAMETER_INDEX: &str = "_parameters";

    /// Status object included in every HAPI response
    pub const STATUS: &str = "status";

    /// HAPI version string included in every HAPI response
    pub const HAPI: &str = "HAPI";

    pub const START_DATE: &str = "startDate";
    pub const STOP_DATE: &str = "stopDate";
    pub const SAMPLE_START_DATE: &str = "sampleStartDate";
    pub const SAMPLE_STOP_DATE: &str = "sampleStopDate";

    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const FILL: &str = "fill";
    pub const SIZE: &str = "size";
    pub const BINS: &str = "bins";
    pub const DESCRIPTION: &str = "description";

    /// CDF DEPEND_0 variable name some servers attach to the time parameter
    pub const X_CDF_DEPEND_0_NAME: &str = "x_cdf_depend_0_name";

    /// Suffix of info keys holding HAPI time strings
    pub const DATE_SUFFIX: &str = "Date";
}
