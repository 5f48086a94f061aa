mod collector;
mod extractor;
mod listing;
mod output;
mod pdf;
mod store;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use tracing::warn;

use extractor::{table::TableLayout, ExtractOptions, PageLayout};
use store::MetaStore;

#[derive(Parser)]
#[command(name = "flu_scraper", about = "Weekly influenza bulletin collector and indicator extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct CollectArgs {
    /// Directory for downloaded PDFs and the metadata sidecar
    #[arg(short, long, default_value = "data/reports")]
    dir: PathBuf,
    /// Seed URL of the paginated report listing
    #[arg(long, default_value = "https://ivdc.chinacdc.cn/cnic/zyzx/lgzb/index.htm")]
    base_url: Url,
    /// Publish-year prefixes to keep (comma separated)
    #[arg(long, default_value = "2023,2024", value_delimiter = ',')]
    years: Vec<String>,
    /// Listing page ceiling
    #[arg(long, default_value_t = 30)]
    max_pages: usize,
    /// Pause after each download attempt, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,
}

#[derive(Args, Clone)]
struct ExtractArgs {
    /// Directory containing the downloaded PDFs
    #[arg(short, long, default_value = "data/reports")]
    dir: PathBuf,
    /// Metadata sidecar path (default: <dir>/metadata.json)
    #[arg(long)]
    metadata: Option<PathBuf>,
    /// Output CSV path
    #[arg(short, long, default_value = "流感周报提取数据.csv")]
    out: PathBuf,
    /// 0-based page index of the narrative summary
    #[arg(long, default_value_t = 2)]
    narrative_page: usize,
    /// 0-based page index of the indicator table
    #[arg(long, default_value_t = 3)]
    table_page: usize,
    /// Header rows at the top of the recovered table
    #[arg(long, default_value_t = 2)]
    header_rows: usize,
    /// Table column index for southern provinces
    #[arg(long, default_value_t = 1)]
    south_col: usize,
    /// Table column index for northern provinces
    #[arg(long, default_value_t = 2)]
    north_col: usize,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            pages: PageLayout {
                narrative_page: self.narrative_page,
                table_page: self.table_page,
            },
            table: TableLayout {
                header_rows: self.header_rows,
                south_col: self.south_col,
                north_col: self.north_col,
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Download new weekly bulletins and record their publish dates
    Collect(CollectArgs),
    /// Extract indicator rows from downloaded bulletins into a CSV
    Extract(ExtractArgs),
    /// Collect then extract in one pipeline
    Run {
        #[command(flatten)]
        collect: CollectArgs,
        /// Output CSV path
        #[arg(short, long, default_value = "流感周报提取数据.csv")]
        out: PathBuf,
    },
    /// Show data directory statistics
    Stats {
        /// Directory containing the downloaded PDFs
        #[arg(short, long, default_value = "data/reports")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Collect(args) => run_collect(&args).await,
        Commands::Extract(args) => {
            let metadata = args
                .metadata
                .clone()
                .unwrap_or_else(|| args.dir.join(store::METADATA_FILE));
            run_extract(&args.dir, &metadata, &args.out, &args.options())
        }
        Commands::Run { collect, out } => {
            run_collect(&collect).await?;
            let metadata = collect.dir.join(store::METADATA_FILE);
            run_extract(&collect.dir, &metadata, &out, &ExtractOptions::default())
        }
        Commands::Stats { dir } => run_stats(&dir),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_collect(args: &CollectArgs) -> Result<()> {
    std::fs::create_dir_all(&args.dir)?;
    let mut store = MetaStore::open(args.dir.join(store::METADATA_FILE))?;

    let config = collector::CollectConfig {
        seed_url: args.base_url.clone(),
        output_dir: args.dir.clone(),
        years: args.years.clone(),
        max_pages: args.max_pages,
        pause: Duration::from_millis(args.pause_ms),
    };

    let stats = collector::collect(&config, &mut store).await?;
    println!(
        "Walked {} listing pages: {} reports seen, {} downloaded, {} already present, {} outside year filter, {} errors.",
        stats.pages, stats.seen, stats.downloaded, stats.existing, stats.filtered, stats.errors
    );
    Ok(())
}

fn run_extract(dir: &Path, metadata: &Path, out: &Path, opts: &ExtractOptions) -> Result<()> {
    if !metadata.exists() {
        bail!("metadata sidecar not found: {}", metadata.display());
    }
    let store = MetaStore::open(metadata)?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "pdf"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        println!("No PDF files in {}.", dir.display());
        return Ok(());
    }

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for path in &paths {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            skipped += 1;
            pb.inc(1);
            continue;
        };
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("skipping {file_name}: {e}");
                skipped += 1;
                pb.inc(1);
                continue;
            }
        };
        match extractor::extract_file(file_name, &data, &store, opts) {
            Ok(mut recs) => records.append(&mut recs),
            Err(reason) => {
                warn!("skipping {file_name}: {reason}");
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if records.is_empty() {
        println!("No data was extracted from {} PDFs.", paths.len());
        return Ok(());
    }

    output::sort_records(&mut records);
    output::write_csv(out, &records)?;
    println!(
        "Extracted {} rows from {} bulletins into {} ({} files skipped).",
        records.len(),
        records.len() / 2,
        out.display(),
        skipped
    );
    Ok(())
}

fn run_stats(dir: &Path) -> Result<()> {
    let store = MetaStore::open(dir.join(store::METADATA_FILE))?;

    let mut pdfs = 0usize;
    let mut unrecognized = 0usize;
    let mut missing_date = 0usize;
    if dir.exists() {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "pdf") {
                continue;
            }
            pdfs += 1;
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if extractor::filename::parse(name).is_none() {
                unrecognized += 1;
            }
            if store.get(name).is_none() {
                missing_date += 1;
            }
        }
    }

    println!("PDFs on disk:       {}", pdfs);
    println!("Metadata entries:   {}", store.len());
    println!("Missing dates:      {}", missing_date);
    println!("Unrecognized names: {}", unrecognized);
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
