//! Backward-compatibility comparison of two HAPI servers
//!
//! This crate compares the catalog, `/info` metadata and optionally a
//! `/data` sample of an original server (`s1`, the baseline) against an
//! updated server (`s2`, the candidate) and reports every difference at a
//! severity that depends on the comparison [`Mode`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐      ┌─────────────────┐
//! │  s1 (baseline)  │      │  s2 (candidate) │
//! │  /catalog /info │      │  /catalog /info │
//! └────────┬────────┘      └────────┬────────┘
//!          │    fetch + cache       │
//!          └──────────┬─────────────┘
//!                     │
//!              ┌──────▼──────┐
//!              │  normalize  │
//!              └──────┬──────┘
//!                     │
//!   dataset sets ─► info ─► parameters ─► data
//!                     │
//!              ┌──────▼──────┐
//!              │  Reporter   │
//!              └─────────────┘
//! ```

pub mod cache;
pub mod catalog;
pub mod client;
pub mod compare;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod harness;
pub mod report;

pub use catalog::{normalize, NormalizedCatalog, NormalizedDataset};
pub use client::{DataQuery, DataResponse, DataSource, HapiClient};
pub use compare::compare_catalogs;
pub use config::{ComparisonContext, Mode, RunOptions, ServerSpec, Side};
pub use error::{CompareError, CompareResult};
pub use filter::IdFilter;
pub use harness::Harness;
pub use report::{Message, Reporter, Severity};
