use crate::map::MapFrame;
use crate::reshape::SeriesTable;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save the long table as CSV with header `year,country,value,formatted`.
pub fn save_series_csv<P: AsRef<Path>>(table: &SeriesTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize(("year", "country", "value", "formatted"))?;
    for r in &table.rows {
        wtr.serialize((r.year, &r.country, r.value, &r.formatted))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the long table as a pretty JSON array.
pub fn save_series_json<P: AsRef<Path>>(table: &SeriesTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(&table.rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save one map year as CSV with header `country,value,formatted,iso3`.
pub fn save_map_csv<P: AsRef<Path>>(frame: &MapFrame, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize(("country", "value", "formatted", "iso3"))?;
    for r in &frame.rows {
        wtr.serialize((&r.country, r.value, &r.formatted, &r.iso3))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a rendered HTML page.
pub fn save_html<P: AsRef<Path>>(html: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))
}
