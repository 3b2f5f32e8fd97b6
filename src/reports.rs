use crate::types::{
    canonical_label, Category, CategoryRows, ComparisonRow, DateRange, ExecutiveSummary, Facility,
    FacilitySummary, LineItem, SummaryPreviewRow, SummaryRow, OVER_PRODUCTION_MARKER,
};
use crate::util::{format_money, format_percent, round2, share};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Build the four-row category summary of one facility.
///
/// Labels carrying the `**` marker are over-production sub-categories: each
/// is totalled under its stripped name and all of them together form the
/// `Over Production` row. Unmarked labels are totalled under their own name.
/// Percentages are shares of the over-production total, not of the
/// facility's total cost, so the three disposition shares need not sum to 1.
pub fn summarize_facility(records: &[LineItem], facility: Facility) -> FacilitySummary {
    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut over_production = 0.0;
    let mut over_production_rows = 0usize;

    for r in records {
        let Some(label) = r.category_label.as_deref().map(str::trim) else {
            continue;
        };
        let Some(cost) = r.total_cost() else {
            continue;
        };
        let name = match label.strip_prefix(OVER_PRODUCTION_MARKER) {
            Some(sub) => {
                over_production += cost;
                over_production_rows += 1;
                sub.trim()
            }
            None => label,
        };
        *totals.entry(canonical_label(name).to_string()).or_default() += cost;
    }

    let over_production_total = round2(over_production);
    if over_production_rows == 0 {
        warn!(facility = %facility, "no over-production rows; percentages left empty");
    }

    let rows = Category::CANONICAL
        .iter()
        .map(|&category| {
            let total_cost = match category {
                Category::OverProduction => Some(over_production_total),
                _ => totals.get(category.name()).copied().map(round2),
            };
            SummaryRow {
                category,
                total_cost,
                percentage: share(total_cost, over_production_total),
            }
        })
        .collect();

    let ignored: Vec<&String> = totals
        .keys()
        .filter(|k| Category::from_label(k).is_none())
        .collect();
    if !ignored.is_empty() {
        debug!(facility = %facility, labels = ?ignored, "labels outside the canonical categories");
    }

    FacilitySummary { facility, rows }
}

/// Combine facility summaries category by category.
///
/// Totals are the sum of the facility totals that are present (a category
/// is empty only if it is empty everywhere). They are not re-rounded, since
/// every input was rounded once already.
pub fn generate_exec_summary(summaries: &[FacilitySummary]) -> ExecutiveSummary {
    let totals: Vec<(Category, Option<f64>)> = Category::CANONICAL
        .iter()
        .map(|&category| {
            let total = summaries
                .iter()
                .filter_map(|s| s.total(category))
                .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v));
            (category, total)
        })
        .collect();

    let combined = totals
        .iter()
        .find(|(c, _)| *c == Category::OverProduction)
        .and_then(|(_, t)| *t)
        .unwrap_or(0.0);

    let rows = totals
        .into_iter()
        .map(|(category, total_cost)| SummaryRow {
            category,
            total_cost,
            percentage: share(total_cost, combined),
        })
        .collect();
    ExecutiveSummary { rows }
}

/// One row per facility, in report order, with its over-production total and
/// its share of the combined over-production total.
pub fn generate_comparison(
    summaries: &[FacilitySummary],
    executive: &ExecutiveSummary,
) -> Vec<ComparisonRow> {
    let combined = executive.total(Category::OverProduction).unwrap_or(0.0);
    Facility::REPORT_ORDER
        .iter()
        .map(|&facility| {
            let total_cost = summaries
                .iter()
                .find(|s| s.facility == facility)
                .and_then(|s| s.total(Category::OverProduction));
            ComparisonRow { facility, total_cost, percentage: share(total_cost, combined) }
        })
        .collect()
}

/// Earliest and latest valid event date over every facility's records.
/// Records without a date are ignored; `None` means no record had one.
pub fn date_range<'a, I>(facilities: I) -> Option<DateRange>
where
    I: IntoIterator<Item = &'a [LineItem]>,
{
    let mut dates = facilities
        .into_iter()
        .flat_map(|records| records.iter().filter_map(|r| r.event_date));
    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange { start, end })
}

pub fn preview_rows<T: CategoryRows>(table: &T) -> Vec<SummaryPreviewRow> {
    table
        .rows()
        .iter()
        .map(|r| SummaryPreviewRow {
            category: r.category.name().to_string(),
            total_cost: format_money(r.total_cost),
            percentage: format_percent(r.percentage),
        })
        .collect()
}
