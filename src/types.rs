use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Label prefix marking an over-production sub-category (e.g. `**Spoilage`).
pub const OVER_PRODUCTION_MARKER: &str = "**";

/// Suggested file name when the report is handed to a caller.
pub const REPORT_FILE_NAME: &str = "Over_Production_Summary.xlsx";

/// Content type to offer alongside `REPORT_FILE_NAME`.
pub const REPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facility {
    #[serde(rename = "EVK")]
    Evk,
    #[serde(rename = "IRC")]
    Irc,
    #[serde(rename = "UV")]
    Uv,
}

impl Facility {
    /// Order in which facilities appear in the comparison block and detail tables.
    pub const REPORT_ORDER: [Facility; 3] = [Facility::Evk, Facility::Irc, Facility::Uv];

    pub fn label(&self) -> &'static str {
        match self {
            Facility::Evk => "EVK",
            Facility::Irc => "IRC",
            Facility::Uv => "UV",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical disposition categories of a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Reused,
    Waste,
    Donated,
    #[serde(rename = "Over Production")]
    OverProduction,
}

impl Category {
    /// Fixed row order of every summary table.
    pub const CANONICAL: [Category; 4] = [
        Category::Reused,
        Category::Waste,
        Category::Donated,
        Category::OverProduction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Reused => "Reused",
            Category::Waste => "Waste",
            Category::Donated => "Donated",
            Category::OverProduction => "Over Production",
        }
    }

    /// Map a (marker-stripped, trimmed) label to its canonical category.
    ///
    /// `Thrown` is accepted as a synonym for `Waste`. Anything else that is
    /// not a canonical name yields `None`.
    pub fn from_label(label: &str) -> Option<Category> {
        match canonical_label(label) {
            "Reused" => Some(Category::Reused),
            "Waste" => Some(Category::Waste),
            "Donated" => Some(Category::Donated),
            "Over Production" => Some(Category::OverProduction),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply the label synonyms (`Thrown` -> `Waste`).
pub fn canonical_label(label: &str) -> &str {
    match label {
        "Thrown" => "Waste",
        other => other,
    }
}

/// One corrected production record of a facility.
///
/// Quantity and cost are `None` when the export held no usable number; such
/// a record still carries its date but contributes no cost.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub category_label: Option<String>,
    pub quantity_served: Option<f64>,
    pub unit_cost: Option<f64>,
    pub event_date: Option<NaiveDate>,
}

impl LineItem {
    pub fn total_cost(&self) -> Option<f64> {
        Some(self.quantity_served? * self.unit_cost?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub category: Category,
    pub total_cost: Option<f64>,
    pub percentage: Option<f64>,
}

impl SummaryRow {
    pub fn empty(category: Category) -> Self {
        Self { category, total_cost: None, percentage: None }
    }
}

/// Lookup-by-name access shared by every four-row category table.
pub trait CategoryRows {
    fn rows(&self) -> &[SummaryRow];

    fn row(&self, category: Category) -> Option<&SummaryRow> {
        self.rows().iter().find(|r| r.category == category)
    }

    fn total(&self, category: Category) -> Option<f64> {
        self.row(category).and_then(|r| r.total_cost)
    }

    fn percentage(&self, category: Category) -> Option<f64> {
        self.row(category).and_then(|r| r.percentage)
    }

    /// True when the rows are exactly the canonical categories in canonical order.
    fn is_canonical(&self) -> bool {
        let rows = self.rows();
        rows.len() == Category::CANONICAL.len()
            && rows.iter().zip(Category::CANONICAL.iter()).all(|(r, c)| r.category == *c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilitySummary {
    pub facility: Facility,
    pub rows: Vec<SummaryRow>,
}

impl CategoryRows for FacilitySummary {
    fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub rows: Vec<SummaryRow>,
}

impl CategoryRows for ExecutiveSummary {
    fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }
}

/// One facility line of the cross-facility comparison block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub facility: Facility,
    pub total_cost: Option<f64>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%m/%d/%Y"),
            self.end.format("%m/%d/%Y")
        )
    }
}

/// Console/JSON rendering of a summary row.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SummaryPreviewRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "TotalCost")]
    #[tabled(rename = "TotalCost")]
    pub total_cost: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}
