//! Over-production workbook compiler
//!
//! Lays out a single worksheet with:
//! - Title with the reporting date range
//! - Executive Summary: combined category totals of all facilities
//! - Over Production Summary: one row per facility, source of the chart
//! - One detail table per facility
//!
//! ```text
//! | Over Production | Total      | Percentage |
//! |-----------------|------------|------------|
//! | Reused          | $45.00     | 75%        |   <- tinted
//! | Waste           |            |            |   <- tinted
//! | Donated         |            |            |   <- tinted
//! | Over Production | $60.00     | 100%       |   <- plain
//! ```

use crate::config::{ChartStyle, ReportConfig};
use crate::error::{ReportError, Result};
use crate::reports::{generate_comparison, generate_exec_summary};
use crate::types::{
    Category, CategoryRows, ComparisonRow, DateRange, ExecutiveSummary, Facility,
    FacilitySummary, SummaryRow,
};
use rust_xlsxwriter::{Chart, ChartDataLabel, ChartType, Format, FormatAlign, Workbook, Worksheet};
use std::io::Cursor;
use tracing::{info, warn};

/// Finished report, positioned at its start.
pub type ReportBuffer = Cursor<Vec<u8>>;

/// Last column written by any table (A..=C).
const LAST_COL: u16 = 2;

#[derive(Debug, Clone)]
pub struct ReportInput {
    pub date_range: Option<DateRange>,
    pub summaries: Vec<FacilitySummary>,
}

/// The workbook plus the cross-facility tables written into it.
#[derive(Debug)]
pub struct CompiledReport {
    pub buffer: ReportBuffer,
    pub executive: ExecutiveSummary,
    pub comparison: Vec<ComparisonRow>,
}

/// Row positions of one titled table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBlock {
    pub label_row: u32,
    pub header_row: u32,
    pub first_data_row: u32,
    pub last_data_row: u32,
}

impl TableBlock {
    fn at(label_row: u32, data_rows: u32) -> Self {
        Self {
            label_row,
            header_row: label_row + 1,
            first_data_row: label_row + 2,
            last_data_row: label_row + 1 + data_rows,
        }
    }

    /// Label row of the table that follows after one blank row.
    fn next_start(&self) -> u32 {
        self.last_data_row + 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub title_row: u32,
    pub executive: TableBlock,
    pub comparison: TableBlock,
    pub details: Vec<(Facility, TableBlock)>,
}

impl LayoutPlan {
    pub fn new() -> Self {
        let category_rows = Category::CANONICAL.len() as u32;
        let executive = TableBlock::at(2, category_rows);
        let comparison = TableBlock::at(executive.next_start(), Facility::REPORT_ORDER.len() as u32);
        let mut details = Vec::with_capacity(Facility::REPORT_ORDER.len());
        let mut start = comparison.next_start();
        for facility in Facility::REPORT_ORDER {
            let block = TableBlock::at(start, category_rows);
            start = block.next_start();
            details.push((facility, block));
        }
        Self { title_row: 0, executive, comparison, details }
    }
}

impl Default for LayoutPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Reusable cell formats
struct ReportFormats {
    title: Format,
    section: Format,
    header: Format,
    detail_header: Format,
    text: Format,
    text_tint: Format,
    money: Format,
    money_tint: Format,
    percent: Format,
    percent_tint: Format,
}

impl ReportFormats {
    fn new(config: &ReportConfig) -> Self {
        let tint = config.tint_color;
        Self {
            title: Format::new().set_bold().set_font_size(16.0),
            section: Format::new().set_bold().set_font_size(14.0),
            header: Format::new()
                .set_bold()
                .set_background_color(config.header_color)
                .set_font_color(0xFFFFFF)
                .set_align(FormatAlign::Center),
            detail_header: Format::new()
                .set_bold()
                .set_background_color(config.detail_header_color),
            text: Format::new(),
            text_tint: Format::new().set_background_color(tint),
            money: Format::new().set_num_format(&config.currency_format),
            money_tint: Format::new()
                .set_num_format(&config.currency_format)
                .set_background_color(tint),
            percent: Format::new().set_num_format(&config.percent_format),
            percent_tint: Format::new()
                .set_num_format(&config.percent_format)
                .set_background_color(tint),
        }
    }
}

pub struct ReportCompiler {
    config: ReportConfig,
    layout: LayoutPlan,
}

impl ReportCompiler {
    pub fn new(config: ReportConfig) -> Self {
        Self { config, layout: LayoutPlan::new() }
    }

    /// Render the report into an in-memory workbook.
    ///
    /// The input is fully validated before anything is written, so a
    /// failure never yields a partial document.
    pub fn compile(&self, input: &ReportInput) -> Result<CompiledReport> {
        self.config.validate()?;
        if self.config.chart.anchor_col <= LAST_COL {
            return Err(ReportError::Config(format!(
                "chart anchor column {} overlaps the tables (columns 0..={})",
                self.config.chart.anchor_col, LAST_COL
            )));
        }
        let ordered = validate_summaries(&input.summaries)?;

        let executive = generate_exec_summary(&input.summaries);
        let comparison = generate_comparison(&input.summaries, &executive);

        let mut workbook = Workbook::new();
        let formats = ReportFormats::new(&self.config);
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&self.config.sheet_name)?;

            let title = match &input.date_range {
                Some(range) => format!("{} {}", self.config.title, range),
                None => {
                    warn!("no valid event dates; report title has no date range");
                    self.config.title.clone()
                }
            };
            sheet.write_string_with_format(self.layout.title_row, 0, &title, &formats.title)?;

            let exec = self.layout.executive;
            sheet.write_string_with_format(exec.label_row, 0, "Executive Summary", &formats.section)?;
            write_header(sheet, exec.header_row, &["Over Production", "Total", "Percentage"], &formats.header)?;
            write_category_rows(sheet, exec.first_data_row, &executive.rows, &formats)?;

            let cmp = self.layout.comparison;
            sheet.write_string_with_format(cmp.label_row, 0, "Over Production Summary", &formats.section)?;
            write_header(sheet, cmp.header_row, &["Hall", "Total Cost", "Percentage"], &formats.header)?;
            write_comparison_rows(sheet, cmp.first_data_row, &comparison, &formats)?;

            for (facility, block) in &self.layout.details {
                let Some(summary) = ordered.iter().find(|s| s.facility == *facility) else {
                    continue;
                };
                sheet.write_string_with_format(block.label_row, 0, facility.label(), &formats.section)?;
                write_header(
                    sheet,
                    block.header_row,
                    &[facility.label(), "Total Cost", "Percentage"],
                    &formats.detail_header,
                )?;
                write_category_rows(sheet, block.first_data_row, &summary.rows, &formats)?;
            }

            let chart = self.build_chart();
            sheet.insert_chart(self.config.chart.anchor_row, self.config.chart.anchor_col, &chart)?;

            for col in 0..=LAST_COL {
                sheet.set_column_width(col, self.config.column_width)?;
            }
        }

        let bytes = workbook.save_to_buffer()?;
        info!(bytes = bytes.len(), sheet = %self.config.sheet_name, "report compiled");
        Ok(CompiledReport { buffer: Cursor::new(bytes), executive, comparison })
    }

    /// Chart over the comparison block.
    fn build_chart(&self) -> Chart {
        let sheet = self.config.sheet_name.as_str();
        let cmp = self.layout.comparison;
        let categories = (sheet, cmp.first_data_row, 0u16, cmp.last_data_row, 0u16);
        let totals = (sheet, cmp.first_data_row, 1u16, cmp.last_data_row, 1u16);

        let mut labels = ChartDataLabel::new();
        labels.show_value();

        let mut chart = match self.config.chart.style {
            ChartStyle::Pie => {
                let mut chart = Chart::new(ChartType::Pie);
                chart
                    .add_series()
                    .set_name("Total Cost")
                    .set_categories(categories)
                    .set_values(totals)
                    .set_data_label(&labels);
                chart
            }
            ChartStyle::Column => {
                let shares = (sheet, cmp.first_data_row, 2u16, cmp.last_data_row, 2u16);
                let mut chart = Chart::new(ChartType::Column);
                chart
                    .add_series()
                    .set_name("Total Cost")
                    .set_categories(categories)
                    .set_values(totals)
                    .set_data_label(&labels);
                chart
                    .add_series()
                    .set_name("Percentage")
                    .set_categories(categories)
                    .set_values(shares)
                    .set_secondary_axis(true);
                chart.x_axis().set_name("Hall");
                chart.y_axis().set_name("Total Cost").set_num_format(self.config.currency_format.as_str());
                chart.y2_axis().set_name("Percentage").set_num_format(self.config.percent_format.as_str());
                chart
            }
        };
        chart.title().set_name(self.config.chart.title.as_str());
        chart.set_width(self.config.chart.width).set_height(self.config.chart.height);
        chart
    }
}

/// Check that every facility appears exactly once with a canonical four-row
/// table, and return the summaries in report order.
fn validate_summaries(summaries: &[FacilitySummary]) -> Result<Vec<&FacilitySummary>> {
    if summaries.len() != Facility::REPORT_ORDER.len() {
        return Err(ReportError::Schema(format!(
            "expected {} facility summaries, got {}",
            Facility::REPORT_ORDER.len(),
            summaries.len()
        )));
    }
    let mut ordered = Vec::with_capacity(summaries.len());
    for facility in Facility::REPORT_ORDER {
        let mut matching = summaries.iter().filter(|s| s.facility == facility);
        let summary = matching
            .next()
            .ok_or_else(|| ReportError::Schema(format!("missing summary for {facility}")))?;
        if matching.next().is_some() {
            return Err(ReportError::Schema(format!("duplicate summary for {facility}")));
        }
        if !summary.is_canonical() {
            let found: Vec<&str> = summary.rows.iter().map(|r| r.category.name()).collect();
            return Err(ReportError::Schema(format!(
                "{facility} summary must list Reused, Waste, Donated, Over Production; found {found:?}"
            )));
        }
        ordered.push(summary);
    }
    Ok(ordered)
}

fn write_header(sheet: &mut Worksheet, row: u32, headers: &[&str], format: &Format) -> Result<()> {
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *h, format)?;
    }
    Ok(())
}

/// Write label, money and percentage cells. Missing values become blank
/// cells that keep the row's format.
fn write_values(
    sheet: &mut Worksheet,
    row: u32,
    label: &str,
    total: Option<f64>,
    percentage: Option<f64>,
    [text, money, percent]: [&Format; 3],
) -> Result<()> {
    sheet.write_string_with_format(row, 0, label, text)?;
    match total {
        Some(v) => sheet.write_number_with_format(row, 1, v, money)?,
        None => sheet.write_blank(row, 1, money)?,
    };
    match percentage {
        Some(v) => sheet.write_number_with_format(row, 2, v, percent)?,
        None => sheet.write_blank(row, 2, percent)?,
    };
    Ok(())
}

/// Every row except `Over Production` gets the tint.
fn write_category_rows(
    sheet: &mut Worksheet,
    first_row: u32,
    rows: &[SummaryRow],
    formats: &ReportFormats,
) -> Result<()> {
    for (i, r) in rows.iter().enumerate() {
        let cell_formats = if r.category == Category::OverProduction {
            [&formats.text, &formats.money, &formats.percent]
        } else {
            [&formats.text_tint, &formats.money_tint, &formats.percent_tint]
        };
        write_values(
            sheet,
            first_row + i as u32,
            r.category.name(),
            r.total_cost,
            r.percentage,
            cell_formats,
        )?;
    }
    Ok(())
}

fn write_comparison_rows(
    sheet: &mut Worksheet,
    first_row: u32,
    rows: &[ComparisonRow],
    formats: &ReportFormats,
) -> Result<()> {
    for (i, r) in rows.iter().enumerate() {
        write_values(
            sheet,
            first_row + i as u32,
            r.facility.label(),
            r.total_cost,
            r.percentage,
            [&formats.text, &formats.money, &formats.percent],
        )?;
    }
    Ok(())
}
