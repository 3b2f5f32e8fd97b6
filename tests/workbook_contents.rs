//! Reads the generated `.xlsx` back as a ZIP container and checks the cells,
//! styles and chart ranges that end up in the worksheet XML.
use chrono::NaiveDate;
use overprod_report::reports::summarize_facility;
use overprod_report::types::{DateRange, Facility, FacilitySummary, LineItem};
use overprod_report::{ReportCompiler, ReportConfig, ReportInput};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Read};

struct Part {
    sheet: String,
    styles: String,
    shared_strings: String,
    chart: String,
}

fn item(label: &str, qty: f64, cost: f64) -> LineItem {
    LineItem {
        category_label: Some(label.into()),
        quantity_served: Some(qty),
        unit_cost: Some(cost),
        event_date: None,
    }
}

fn compile(records: &[LineItem]) -> Part {
    let summaries: Vec<FacilitySummary> = Facility::REPORT_ORDER
        .iter()
        .map(|f| summarize_facility(records, *f))
        .collect();
    let input = ReportInput {
        date_range: Some(DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        }),
        summaries,
    };
    let compiled = ReportCompiler::new(ReportConfig::default()).compile(&input).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(compiled.buffer.into_inner())).unwrap();
    let mut read = |name: &str| {
        let mut s = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    };
    Part {
        sheet: read("xl/worksheets/sheet1.xml"),
        styles: read("xl/styles.xml"),
        shared_strings: read("xl/sharedStrings.xml"),
        chart: read("xl/charts/chart1.xml"),
    }
}

fn standard_report() -> Part {
    compile(&[item("**Spoilage", 10.0, 2.0), item("Reused", 5.0, 3.0)])
}

fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let key = format!(" {name}=\"");
    let start = tag.find(&key)? + key.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

/// Opening tag and inner XML of cell `reference` (e.g. `B6`).
fn cell<'a>(sheet: &'a str, reference: &str) -> Option<(&'a str, &'a str)> {
    let key = format!("<c r=\"{reference}\"");
    let start = sheet.find(&key)?;
    let rest = &sheet[start..];
    let open_end = rest.find('>')?;
    let open = &rest[..=open_end];
    if open.ends_with("/>") {
        return Some((open, ""));
    }
    let close = rest.find("</c>")?;
    Some((open, &rest[open_end + 1..close]))
}

fn cell_value<'a>(sheet: &'a str, reference: &str) -> Option<&'a str> {
    let (_, body) = cell(sheet, reference)?;
    let start = body.find("<v>")? + 3;
    let end = body.find("</v>")?;
    Some(&body[start..end])
}

/// The `<xf>` entry of `cellXfs` a cell points at; style 0 when it has none.
fn cell_xf<'a>(part: &'a Part, reference: &str) -> &'a str {
    let (open, _) = cell(&part.sheet, reference).unwrap_or_else(|| panic!("no cell {reference}"));
    let index: usize = attr(open, "s").map_or(0, |s| s.parse().unwrap());
    let start = part.styles.find("<cellXfs").unwrap();
    let end = part.styles.find("</cellXfs>").unwrap();
    let xfs: Vec<&str> = part.styles[start..end].split("<xf").skip(1).collect();
    xfs[index]
}

fn fill_id(part: &Part, reference: &str) -> u32 {
    attr(cell_xf(part, reference), "fillId").map_or(0, |f| f.parse().unwrap())
}

fn number_format(part: &Part, reference: &str) -> String {
    let id = attr(cell_xf(part, reference), "numFmtId").unwrap_or("0");
    if id == "9" {
        return "0%".into();
    }
    let key = format!("<numFmt numFmtId=\"{id}\"");
    let start = part.styles.find(&key).unwrap_or_else(|| panic!("no number format {id}"));
    attr(&part.styles[start..], "formatCode").unwrap().replace("&quot;", "\"")
}

// fillId 0 is "none" and 1 is the mandatory gray125 pattern.
fn is_tinted(part: &Part, reference: &str) -> bool {
    fill_id(part, reference) > 1
}

#[test]
fn title_carries_the_date_range() {
    let part = standard_report();
    assert!(part
        .shared_strings
        .contains("Over Production Monthly Summary 01/01/2024 - 01/31/2024"));
}

#[test]
fn executive_rows_are_tinted_except_over_production() {
    let part = standard_report();
    assert!(is_tinted(&part, "A5"));
    assert!(is_tinted(&part, "B5"));
    assert!(is_tinted(&part, "A7"));
    assert!(!is_tinted(&part, "A8"));
    assert!(!is_tinted(&part, "B8"));
    assert!(part.styles.contains("FFDCE6F1"));
}

#[test]
fn missing_totals_are_styled_blank_cells() {
    let part = standard_report();
    // Waste has no cost anywhere: B6/C6 exist for their format but hold no value.
    let (_, body) = cell(&part.sheet, "B6").expect("B6 is written");
    assert_eq!(body, "");
    assert!(is_tinted(&part, "B6"));
    assert!(number_format(&part, "B6").contains("#,##0.00"));
    assert_eq!(cell_value(&part.sheet, "C6"), None);
    assert_eq!(number_format(&part, "C6"), "0%");
}

#[test]
fn comparison_block_holds_rounded_numbers() {
    let part = standard_report();
    // 20 of 60 per facility
    assert_eq!(cell_value(&part.sheet, "B12"), Some("20"));
    assert_eq!(cell_value(&part.sheet, "C12"), Some("0.33"));
    assert_eq!(number_format(&part, "C12"), "0%");
    assert!(number_format(&part, "B12").contains("#,##0.00"));
    assert!(!is_tinted(&part, "C12"));
    assert_eq!(cell_value(&part.sheet, "B5"), Some("45"));
    assert_eq!(cell_value(&part.sheet, "C5"), Some("0.75"));
}

#[test]
fn chart_points_at_the_comparison_block() {
    let part = standard_report();
    assert!(part.chart.contains("$A$12:$A$14"), "categories: {}", part.chart);
    assert!(part.chart.contains("$B$12:$B$14"), "values: {}", part.chart);
}

#[test]
fn detail_totals_round_to_cents() {
    let part = compile(&[item("**Spoilage", 1.0, 4.0), item("Donated", 1.0, 2.345)]);
    // EVK detail table: label row 16, header 17, Donated on Excel row 20.
    assert_eq!(cell_value(&part.sheet, "B20"), Some("2.34"));
    assert!(is_tinted(&part, "A20"));
    assert_eq!(cell_value(&part.sheet, "B21"), Some("4"));
}
