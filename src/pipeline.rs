use crate::config::ReportConfig;
use crate::error::Result;
use crate::reports::{date_range, summarize_facility};
use crate::types::{ComparisonRow, DateRange, ExecutiveSummary, Facility, FacilitySummary, LineItem};
use crate::workbook::{ReportBuffer, ReportCompiler, ReportInput};
use serde::Serialize;
use tracing::info;

/// Corrected record tables of the three facilities.
#[derive(Debug, Clone, Copy)]
pub struct FacilityRecords<'a> {
    pub evk: &'a [LineItem],
    pub irc: &'a [LineItem],
    pub uv: &'a [LineItem],
}

impl<'a> FacilityRecords<'a> {
    /// Records per facility in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Facility, &'a [LineItem])> {
        [
            (Facility::Evk, self.evk),
            (Facility::Irc, self.irc),
            (Facility::Uv, self.uv),
        ]
        .into_iter()
    }
}

/// Everything computed for one report run.
#[derive(Debug, Serialize)]
pub struct GeneratedReport {
    pub date_range: Option<DateRange>,
    pub summaries: Vec<FacilitySummary>,
    pub executive: ExecutiveSummary,
    pub comparison: Vec<ComparisonRow>,
    #[serde(skip)]
    pub buffer: ReportBuffer,
}

/// Aggregate each facility, then compile the workbook.
pub fn generate_report(records: FacilityRecords<'_>, config: &ReportConfig) -> Result<GeneratedReport> {
    let range = date_range(records.iter().map(|(_, r)| r));
    match &range {
        Some(r) => info!(range = %r, "reporting period"),
        None => info!("no valid event dates found"),
    }

    let summaries: Vec<FacilitySummary> = records
        .iter()
        .map(|(facility, items)| summarize_facility(items, facility))
        .collect();

    let compiler = ReportCompiler::new(config.clone());
    let compiled = compiler.compile(&ReportInput {
        date_range: range,
        summaries: summaries.clone(),
    })?;

    Ok(GeneratedReport {
        date_range: range,
        summaries,
        executive: compiled.executive,
        comparison: compiled.comparison,
        buffer: compiled.buffer,
    })
}
