use anyhow::{Context, Result};
use reqwest::Url;
use scraper::{Html, Selector};

/// One entry on a listing page: report detail link plus its date annotation.
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub detail_url: Url,
    /// Date text with the enclosing parentheses stripped, e.g. "2024-01-18".
    pub publish_date: String,
}

/// A resolved PDF download target found on a detail page.
#[derive(Debug, Clone)]
pub struct PdfTarget {
    pub url: Url,
    pub file_name: String,
}

/// Listing page URL for `page` (0 = the seed itself). Successors come from
/// mechanical suffix substitution: index.htm → index_1.htm, index_2.htm, …
/// There is no end-of-listing signal; the caller enforces the page ceiling.
pub fn page_url(seed: &Url, page: usize) -> Result<Url> {
    if page == 0 {
        return Ok(seed.clone());
    }
    let stem = seed
        .as_str()
        .strip_suffix(".htm")
        .with_context(|| format!("seed URL {seed} does not end in .htm"))?;
    format!("{stem}_{page}.htm")
        .parse()
        .context("building listing page URL")
}

/// Parse a listing page into entries. Each entry is an `<li>` holding an
/// anchor and a `span.span_02` whose text carries a parenthesized date;
/// items missing either part are ignored.
pub fn parse_listing(html: &str, base: &Url) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let item_sel = Selector::parse("li").expect("li selector");
    let anchor_sel = Selector::parse("a[href]").expect("anchor selector");
    let date_sel = Selector::parse("span.span_02").expect("date selector");

    let mut entries = Vec::new();
    for item in document.select(&item_sel) {
        let Some(anchor) = item.select(&anchor_sel).next() else {
            continue;
        };
        let Some(span) = item.select(&date_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(detail_url) = base.join(href) else {
            continue;
        };
        let publish_date = span
            .text()
            .collect::<String>()
            .trim()
            .trim_matches(|c| c == '(' || c == ')')
            .to_string();
        entries.push(ListingEntry {
            detail_url,
            publish_date,
        });
    }
    entries
}

/// Find the first anchor on a detail page whose target ends in `.pdf`.
/// The display name is the anchor's trimmed text, falling back to the
/// href's final path segment when the text is empty.
pub fn find_pdf_link(html: &str, base: &Url) -> Option<PdfTarget> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").expect("anchor selector");

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.ends_with(".pdf") {
            continue;
        }
        let Ok(url) = base.join(href) else {
            continue;
        };
        let text = anchor.text().collect::<String>();
        let text = text.trim();
        let file_name = if text.is_empty() {
            href.rsplit('/').next().unwrap_or(href).to_string()
        } else {
            text.to_string()
        };
        return Some(PdfTarget { url, file_name });
    }
    None
}
