//! Over-production cost aggregation and spreadsheet reporting for the
//! residential dining facilities (EVK, IRC, UV).
//!
//! Records flow one way: `loader` -> `reports::summarize_facility` ->
//! `workbook::ReportCompiler` -> an in-memory `.xlsx` buffer.
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;
pub mod workbook;

pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use pipeline::{generate_report, FacilityRecords, GeneratedReport};
pub use workbook::{CompiledReport, ReportBuffer, ReportCompiler, ReportInput};
