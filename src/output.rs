use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::extractor::indicators::{IndicatorRecord, INDICATOR_FIELDS};

/// Output column order: identity, ILI rate, the ten indicators, publish date.
pub fn header() -> Vec<&'static str> {
    let mut columns = vec!["Year", "Week", "Series", "Region", "ILI_Rate"];
    columns.extend(INDICATOR_FIELDS);
    columns.push("Publish_Date");
    columns
}

/// Sort records by numeric (year, week, series). The sort is stable, so the
/// south-then-north pair order within a bulletin is preserved.
pub fn sort_records(records: &mut [IndicatorRecord]) {
    records.sort_by_key(|r| (numeric(&r.year), numeric(&r.week), numeric(&r.series)));
}

fn numeric(s: &str) -> u64 {
    s.parse().unwrap_or(0)
}

/// Write all records as one CSV file, one row per region per bulletin.
pub fn write_csv(path: &Path, records: &[IndicatorRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_records(file, records)
}

fn write_records<W: Write>(writer: W, records: &[IndicatorRecord]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(header())?;
    for r in records {
        let mut row: Vec<&str> = vec![&r.year, &r.week, &r.series, &r.region];
        row.push(r.ili_rate.as_deref().unwrap_or(""));
        for value in &r.indicators {
            row.push(value.as_deref().unwrap_or(""));
        }
        row.push(&r.publish_date);
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}
