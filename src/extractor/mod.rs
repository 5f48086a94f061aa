pub mod filename;
pub mod indicators;
pub mod narrative;
pub mod table;

use thiserror::Error;

use crate::pdf;
use crate::store::MetaStore;
use filename::BulletinId;
use indicators::IndicatorRecord;
use table::TableLayout;

/// Why a bulletin file produced no records. Each variant is logged with the
/// file name; none of them stops the run.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("file name does not match the bulletin pattern")]
    FilenamePattern,
    #[error("no publish date recorded for this file")]
    MissingPublishDate,
    #[error("could not read PDF text: {0}")]
    Unreadable(String),
    #[error("only {0} pages, table page not present")]
    TooFewPages(usize),
    #[error("no indicator table found on the table page")]
    TableNotFound,
}

/// Page indices the fixed bulletin layout pins down (0-based).
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub narrative_page: usize,
    pub table_page: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            narrative_page: 2,
            table_page: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub pages: PageLayout,
    pub table: TableLayout,
}

/// Run the full per-file pipeline: filename identity, publish-date join,
/// page text, narrative rates, table indicators. Returns the two region
/// records (south first) or the reason the file was skipped.
pub fn extract_file(
    file_name: &str,
    data: &[u8],
    store: &MetaStore,
    opts: &ExtractOptions,
) -> Result<Vec<IndicatorRecord>, SkipReason> {
    let id = filename::parse(file_name).ok_or(SkipReason::FilenamePattern)?;
    let publish_date = store
        .get(file_name)
        .map(|e| e.publish_date.clone())
        .ok_or(SkipReason::MissingPublishDate)?;
    let pages = pdf::page_texts(data).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
    extract_pages(&id, &pages, &publish_date, opts)
}

/// The pipeline over already-extracted page texts.
///
/// A missing narrative page only blanks the ILI rates; a missing table page
/// (or an unrecoverable table) skips the file outright. The two behaviors
/// are deliberately distinct: short tables null-fill fields, short
/// documents produce nothing.
pub fn extract_pages(
    id: &BulletinId,
    pages: &[String],
    publish_date: &str,
    opts: &ExtractOptions,
) -> Result<Vec<IndicatorRecord>, SkipReason> {
    let (ili_south, ili_north) = match pages.get(opts.pages.narrative_page) {
        Some(text) => narrative::parse(text),
        None => (None, None),
    };

    let Some(table_text) = pages.get(opts.pages.table_page) else {
        return Err(SkipReason::TooFewPages(pages.len()));
    };
    let rows = table::recover(table_text);
    if rows.is_empty() {
        return Err(SkipReason::TableNotFound);
    }

    let TableLayout {
        header_rows,
        south_col,
        north_col,
    } = opts.table;
    let south = table::region_values(&rows, south_col, header_rows);
    let north = table::region_values(&rows, north_col, header_rows);

    Ok(vec![
        indicators::build_record(id, indicators::REGION_SOUTH, ili_south, south, publish_date),
        indicators::build_record(id, indicators::REGION_NORTH, ili_north, north, publish_date),
    ])
}
