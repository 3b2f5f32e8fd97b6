use crate::config::ColumnNames;
use crate::error::{ReportError, Result};
use crate::types::LineItem;
use crate::util::{parse_date_safe, parse_f64_safe};
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::WINDOWS_1252;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Malformed CSV rows that could not be read at all.
    pub rejected_rows: usize,
    /// Rows kept for their date whose quantity or cost was unusable.
    pub uncosted_rows: usize,
    pub unlabeled_rows: usize,
    pub unparsed_dates: usize,
}

struct ColumnIndex {
    category: usize,
    quantity: usize,
    unit_cost: usize,
    event_date: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, names: &ColumnNames, source_name: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ReportError::MissingColumn {
                    column: name.to_string(),
                    source_name: source_name.to_string(),
                })
        };
        Ok(Self {
            category: find(&names.category)?,
            quantity: find(&names.quantity)?,
            unit_cost: find(&names.unit_cost)?,
            event_date: find(&names.event_date)?,
        })
    }
}

/// Load one facility export. The file is decoded as Windows-1252, which is
/// what the dining system exports; a UTF-8 BOM switches decoding to UTF-8.
pub fn load_facility(path: &Path, columns: &ColumnNames) -> Result<(Vec<LineItem>, LoadReport)> {
    let bytes = std::fs::read(path)?;
    let (text, encoding, had_errors) = WINDOWS_1252.decode(&bytes);
    if had_errors {
        warn!(path = %path.display(), encoding = encoding.name(), "input contained undecodable bytes");
    }
    parse_facility_csv(&text, &path.display().to_string(), columns)
}

/// Parse CSV text into line items. Unusable quantities, costs and dates
/// become `None` and are counted; the row itself is kept so its date still
/// counts toward the reporting period.
pub fn parse_facility_csv(
    text: &str,
    source_name: &str,
    columns: &ColumnNames,
) -> Result<(Vec<LineItem>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();
    let idx = ColumnIndex::resolve(&headers, columns, source_name)?;

    let mut report = LoadReport::default();
    let mut items = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(source = source_name, error = %e, "skipping malformed CSV row");
                report.rejected_rows += 1;
                continue;
            }
        };

        let category_label = record
            .get(idx.category)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if category_label.is_none() {
            report.unlabeled_rows += 1;
        }

        let quantity_served = parse_f64_safe(record.get(idx.quantity)).filter(|v| *v >= 0.0);
        let unit_cost = parse_f64_safe(record.get(idx.unit_cost)).filter(|v| *v >= 0.0);
        if quantity_served.is_none() || unit_cost.is_none() {
            report.uncosted_rows += 1;
        }

        let event_date = parse_date_safe(record.get(idx.event_date));
        if event_date.is_none() {
            report.unparsed_dates += 1;
        }

        items.push(LineItem { category_label, quantity_served, unit_cost, event_date });
    }

    report.loaded_rows = items.len();
    if report.rejected_rows > 0 {
        warn!(source = source_name, rows = report.rejected_rows, "malformed CSV rows skipped");
    }
    if report.uncosted_rows > 0 {
        warn!(source = source_name, rows = report.uncosted_rows, "rows with unparsable quantity or cost carry no cost");
    }
    if report.unparsed_dates > 0 {
        warn!(source = source_name, rows = report.unparsed_dates, "event dates could not be parsed and were left empty");
    }
    Ok((items, report))
}
