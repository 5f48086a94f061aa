use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::header::REFERER;
use reqwest::{Client, Url};
use tracing::{info, warn};

use crate::listing::{self, ListingEntry, PdfTarget};
use crate::store::MetaStore;

/// Browser identity the origin server expects. Sent on every request,
/// together with a Referer pointing at the seed listing; changing either
/// gets requests blocked.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.121 Safari/537.36";

pub struct CollectConfig {
    pub seed_url: Url,
    pub output_dir: PathBuf,
    /// Publish-date year prefixes to keep.
    pub years: Vec<String>,
    /// Listing page ceiling; the walk has no end-of-listing signal.
    pub max_pages: usize,
    /// Courtesy pause after each download attempt.
    pub pause: Duration,
}

/// Collection stats returned after completion.
#[derive(Debug, Default)]
pub struct CollectStats {
    pub pages: usize,
    pub seen: usize,
    pub downloaded: usize,
    pub existing: usize,
    pub filtered: usize,
    pub errors: usize,
}

enum Outcome {
    Downloaded,
    AlreadyPresent,
    Failed,
}

/// Walk the paginated listing and download every new report in the year
/// allowlist. A failed listing fetch aborts the walk; a failed detail page
/// or download skips only that entry.
pub async fn collect(config: &CollectConfig, store: &mut MetaStore) -> Result<CollectStats> {
    let client = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .context("building HTTP client")?;

    let mut stats = CollectStats::default();

    for page in 0..config.max_pages {
        let page_url = listing::page_url(&config.seed_url, page)?;
        let html = match fetch_page(&client, &page_url, &config.seed_url).await {
            Ok(html) => html,
            Err(e) => bail!("listing page {page_url} failed: {e:#}"),
        };
        info!("listing page {}: {}", page, page_url);
        stats.pages += 1;

        for entry in listing::parse_listing(&html, &page_url) {
            stats.seen += 1;
            if !year_allowed(&config.years, &entry.publish_date) {
                info!("skipping report dated {}", entry.publish_date);
                stats.filtered += 1;
                continue;
            }
            match process_entry(&client, config, store, &entry).await? {
                Outcome::Downloaded => stats.downloaded += 1,
                Outcome::AlreadyPresent => stats.existing += 1,
                Outcome::Failed => stats.errors += 1,
            }
        }
    }

    Ok(stats)
}

/// Follow one listing entry to its detail page and download the PDF it
/// links to, unless the file is already on disk. Network failures are
/// logged and reported as `Failed`; only a sidecar write error propagates.
async fn process_entry(
    client: &Client,
    config: &CollectConfig,
    store: &mut MetaStore,
    entry: &ListingEntry,
) -> Result<Outcome> {
    let html = match fetch_page(client, &entry.detail_url, &config.seed_url).await {
        Ok(html) => html,
        Err(e) => {
            warn!("detail page {} failed: {e:#}", entry.detail_url);
            return Ok(Outcome::Failed);
        }
    };

    let Some(target) = listing::find_pdf_link(&html, &entry.detail_url) else {
        warn!("no PDF link on {}", entry.detail_url);
        return Ok(Outcome::Failed);
    };

    let dest = config.output_dir.join(&target.file_name);
    if dest.exists() {
        info!("already downloaded: {}", dest.display());
        return Ok(Outcome::AlreadyPresent);
    }

    info!("found PDF link: {}", target.url);
    let outcome = match download(client, &config.seed_url, &target, &dest).await {
        Ok(true) => {
            store.record(&target.file_name, &entry.publish_date)?;
            Outcome::Downloaded
        }
        Ok(false) => Outcome::Failed,
        Err(e) => {
            warn!("downloading {} failed: {e:#}", target.url);
            Outcome::Failed
        }
    };
    tokio::time::sleep(config.pause).await;

    Ok(outcome)
}

async fn fetch_page(client: &Client, url: &Url, referer: &Url) -> Result<String> {
    let response = client
        .get(url.clone())
        .header(REFERER, referer.as_str())
        .send()
        .await?;
    if !response.status().is_success() {
        bail!("status {}", response.status());
    }
    Ok(response.text().await?)
}

/// Returns `Ok(false)` when the server answered with a non-success status;
/// nothing is written and no metadata entry is made in that case.
async fn download(
    client: &Client,
    referer: &Url,
    target: &PdfTarget,
    dest: &Path,
) -> Result<bool> {
    let response = client
        .get(target.url.clone())
        .header(REFERER, referer.as_str())
        .send()
        .await?;
    if !response.status().is_success() {
        warn!("failed to download {} - status {}", target.url, response.status());
        return Ok(false);
    }
    let bytes = response.bytes().await?;
    std::fs::write(dest, &bytes).with_context(|| format!("writing {}", dest.display()))?;
    info!("downloaded: {}", dest.display());
    Ok(true)
}

fn year_allowed(years: &[String], publish_date: &str) -> bool {
    years.iter().any(|y| publish_date.starts_with(y.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_prefix_allowlist() {
        let years = vec!["2023".to_string(), "2024".to_string()];
        assert!(year_allowed(&years, "2024-01-18"));
        assert!(year_allowed(&years, "2023-12-28"));
        assert!(!year_allowed(&years, "2022-11-03"));
        assert!(!year_allowed(&years, ""));
    }

    #[test]
    fn only_allowed_years_are_followed() {
        let html = r#"
            <ul>
              <li><a href="a.htm">一</a><span class="span_02">(2024-01-18)</span></li>
              <li><a href="b.htm">二</a><span class="span_02">(2024-01-11)</span></li>
              <li><a href="c.htm">三</a><span class="span_02">(2022-06-30)</span></li>
            </ul>"#;
        let base: Url = "https://example.org/reports/index.htm".parse().unwrap();
        let years = vec!["2023".to_string(), "2024".to_string()];

        let followed: Vec<_> = listing::parse_listing(html, &base)
            .into_iter()
            .filter(|e| year_allowed(&years, &e.publish_date))
            .collect();

        assert_eq!(followed.len(), 2);
        assert!(followed.iter().all(|e| e.publish_date.starts_with("2024")));
    }
}
