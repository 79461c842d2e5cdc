use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use recycle_scout::core::config::{self, ScoutFileConfig};
use recycle_scout::scraping::{BrowserSource, FileSource, HttpSource, PageSource};
use recycle_scout::tools::{export, scrape};

const USAGE: &str = "\
recycle-scout: scrape recycling facility listings into CSV

usage: recycle-scout [options]

  --search <term>        what to search for (default: Electronics)
  --zip <code>           ZIP code to search around (default: 10001)
  --radius <miles>       search radius (default: 100)
  --min-results <n>      run the container fallback below this many records (default: 3)
  --max-results <n>      records kept in the export (default: min-results)
  --output <path>        output file; .json selects JSON (default: recycling_facilities.csv)
  --base-url <url>       search page base URL
  --debug-html <path>    where to save the fetched page (default: debug_page_source.html)
  --no-debug-html        do not save the fetched page
  --from-file <path>     extract from a saved page instead of fetching
  --http                 fetch with a plain HTTP GET instead of a headless browser
  -V, --version          print version
  -h, --help             print this help

Settings also come from recycle-scout.json and RECYCLE_SCOUT_* env vars.";

#[derive(Debug, Default)]
struct CliArgs {
    overrides: ScoutFileConfig,
    from_file: Option<PathBuf>,
    http: bool,
    help: bool,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| anyhow!("{} needs a value", name))
        };

        match flag.as_str() {
            "-h" | "--help" => cli.help = true,
            "-V" | "--version" => cli.version = true,
            "--http" => cli.http = true,
            "--no-debug-html" => cli.overrides.debug_html_path = Some(String::new()),
            "--search" => cli.overrides.search_term = Some(value("--search")?),
            "--zip" => cli.overrides.zip_code = Some(value("--zip")?),
            "--radius" => cli.overrides.radius = Some(value("--radius")?),
            "--output" => cli.overrides.output_path = Some(value("--output")?),
            "--base-url" => cli.overrides.base_url = Some(value("--base-url")?),
            "--debug-html" => cli.overrides.debug_html_path = Some(value("--debug-html")?),
            "--from-file" => cli.from_file = Some(PathBuf::from(value("--from-file")?)),
            "--min-results" => {
                let v = value("--min-results")?;
                cli.overrides.min_results =
                    Some(v.parse().with_context(|| format!("invalid --min-results: {}", v))?);
            }
            "--max-results" => {
                let v = value("--max-results")?;
                cli.overrides.max_results =
                    Some(v.parse().with_context(|| format!("invalid --max-results: {}", v))?);
            }
            other => bail!("unknown argument: {} (see --help)", other),
        }
    }

    Ok(cli)
}

/// CLI values win over the config file; unset CLI values leave the file alone.
fn overlay(mut file: ScoutFileConfig, cli: ScoutFileConfig) -> ScoutFileConfig {
    macro_rules! take {
        ($($field:ident),*) => {
            $(if cli.$field.is_some() { file.$field = cli.$field; })*
        };
    }
    take!(
        search_term,
        zip_code,
        radius,
        min_results,
        max_results,
        output_path,
        base_url,
        debug_html_path,
        page_load_timeout_secs,
        settle_ms,
        chrome_executable
    );
    file
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = parse_args(std::env::args().skip(1))?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }
    if cli.version {
        println!("recycle-scout {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = overlay(config::load_file_config(), cli.overrides).resolve();
    cfg.validate()?;

    info!("Starting recycling facility scraper...");

    let source: Box<dyn PageSource> = if let Some(path) = cli.from_file {
        Box::new(FileSource::new(path))
    } else if cli.http {
        Box::new(HttpSource::new(Duration::from_secs(cfg.page_load_timeout_secs))?)
    } else {
        Box::new(BrowserSource::from_config(&cfg))
    };

    let outcome = match scrape::run(&cfg, source.as_ref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Scrape failed: {:#}", e);
            return Err(e);
        }
    };

    if outcome.saved {
        println!("\n{}", export::render_preview(&outcome.records));
        println!("=== SCRAPING COMPLETED SUCCESSFULLY ===");
        println!(
            "Total facilities extracted: {} (kept {})",
            outcome.total_found,
            outcome.records.len()
        );
        println!("Output file: {}", outcome.output_path.display());
    } else {
        println!("\nNo facility data was extracted.");
        if let Some(path) = &outcome.debug_html_path {
            println!(
                "Please check {} to see what was loaded.",
                path.display()
            );
        }
        if let Some(hint) = outcome.hint {
            println!("Hint: {}", hint.message());
        }
    }

    info!("Scraper finished.");
    Ok(())
}
