use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use mapgrab_core::{export_stem, Exporter, MapgrabError, Result};
use mapgrab_scrapers::{GoogleMapsScraper, ScrapeQuery, WaitConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A single search term; overrides the input file (-s, --search)
    #[arg(short = 's', long)]
    search: Option<String>,

    /// Target listing count per search term; omitted means scrape everything (-t, --total)
    #[arg(short = 't', long)]
    total: Option<usize>,

    /// File with one search term per line (-i, --input)
    #[arg(short = 'i', long, default_value = "input.txt")]
    input: PathBuf,

    /// Directory the XLSX and CSV files are written to (-o, --output)
    #[arg(short = 'o', long, default_value = "output")]
    output: PathBuf,

    /// WebDriver endpoint the browser is driven through (-w, --webdriver-url)
    #[arg(short = 'w', long, default_value = "http://localhost:9515")]
    webdriver_url: String,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Settle interval after each scroll of the results feed, in milliseconds
    #[arg(long, default_value_t = 3000)]
    scroll_wait_ms: u64,

    /// Timeout while polling for a listing's detail panel, in milliseconds
    #[arg(long, default_value_t = 5000)]
    detail_wait_ms: u64,

    /// Settle interval after submitting a search, in milliseconds
    #[arg(long, default_value_t = 5000)]
    search_wait_ms: u64,

    /// Navigation timeout for the initial page load, in milliseconds
    #[arg(long, default_value_t = 60_000)]
    page_load_timeout_ms: u64,
}

/// Resolves the search terms for this run: the `--search` flag wins, otherwise
/// the input file is read one term per line. No terms from either source is a
/// usage error, raised before any browser interaction.
fn load_search_terms(search: Option<&str>, input: &Path) -> Result<Vec<String>> {
    if let Some(search) = search {
        return Ok(vec![search.to_string()]);
    }

    let terms: Vec<String> = match fs::read_to_string(input) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if terms.is_empty() {
        return Err(MapgrabError::NoSearchTerms);
    }
    Ok(terms)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let terms = load_search_terms(cli.search.as_deref(), &cli.input)?;

    let waits = WaitConfig {
        scroll_settle: Duration::from_millis(cli.scroll_wait_ms),
        detail_timeout: Duration::from_millis(cli.detail_wait_ms),
        search_settle: Duration::from_millis(cli.search_wait_ms),
        page_load_timeout: Duration::from_millis(cli.page_load_timeout_ms),
        ..WaitConfig::default()
    };

    let scraper = GoogleMapsScraper::connect(&cli.webdriver_url, cli.headless, waits).await?;
    let exporter = Exporter::new(&cli.output);

    for (index, term) in terms.iter().enumerate() {
        info!("----- {} - {}", index, term);

        let query = ScrapeQuery::new(term.clone(), cli.total);
        let report = scraper.scrape(&query).await?;
        if report.skipped > 0 {
            warn!("{} listings skipped for {:?}", report.skipped, term);
        }

        let (xlsx_path, csv_path) = exporter.save(&report.records, &export_stem(term))?;
        info!(
            "wrote {} records to {:?} and {:?}",
            report.records.len(),
            xlsx_path,
            csv_path
        );
    }

    scraper.quit().await?;
    Ok(())
}
