use crate::error::Result;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Persist a finished report buffer; the buffer itself never touches disk
/// until a caller asks for it here.
pub fn write_buffer<R: Read>(path: &Path, mut buffer: R) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    std::io::copy(&mut buffer, &mut file)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T])
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note { println!("({})", n); }
    println!();
    println!("{}\n", render_table(rows));
}
