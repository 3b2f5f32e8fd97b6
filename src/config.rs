//! Report configuration.
//!
//! `ReportConfig::default()` reproduces the standard monthly report; a JSON
//! file may override any subset of the fields.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input column names of a facility export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub category: String,
    pub quantity: String,
    pub unit_cost: String,
    pub event_date: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            category: "srvcrsname".into(),
            quantity: "servedqty".into(),
            unit_cost: "costprice".into(),
            event_date: "eventdate".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    /// Share of over-production cost per facility.
    Pie,
    /// Grouped columns of cost with the share plotted on a secondary axis.
    Column,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub style: ChartStyle,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Zero-based anchor cell; the default is `G6`.
    pub anchor_row: u32,
    pub anchor_col: u16,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            style: ChartStyle::Pie,
            title: "Residential Over Production".into(),
            width: 540,
            height: 360,
            anchor_row: 5,
            anchor_col: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub sheet_name: String,
    pub title: String,
    pub column_width: f64,
    pub header_color: u32,
    pub tint_color: u32,
    pub detail_header_color: u32,
    pub currency_format: String,
    pub percent_format: String,
    pub columns: ColumnNames,
    pub chart: ChartConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Over Production Summary".into(),
            title: "Over Production Monthly Summary".into(),
            column_width: 20.0,
            header_color: 0x2F75B5,
            tint_color: 0xDCE6F1,
            detail_header_color: 0xE6E6E6,
            currency_format: "\"$\"#,##0.00".into(),
            percent_format: "0%".into(),
            columns: ColumnNames::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> Result<()> {
        // Excel sheet names: 1..=31 chars, none of []:*?/\
        if self.sheet_name.is_empty()
            || self.sheet_name.chars().count() > 31
            || self.sheet_name.contains(['[', ']', ':', '*', '?', '/', '\\'])
        {
            return Err(ReportError::Config(format!(
                "invalid sheet name '{}'",
                self.sheet_name
            )));
        }
        if self.column_width.is_nan() || self.column_width <= 0.0 {
            return Err(ReportError::Config("column_width must be positive".into()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ReportError::Config("chart size must be non-zero".into()));
        }
        Ok(())
    }
}
