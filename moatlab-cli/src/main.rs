//! MoatLab CLI: fundamental screening and MA-alignment picks.
//!
//! Commands:
//! - `score`: extract and score the seven moat metrics for symbols
//! - `screen`: run the fundamental screen over a ticker list
//! - `indicators`: compute MA/return/volatility rows and write CSV
//! - `pick`: cross-sectional MA5 ≥ MA20 ≥ MA60 selection on one date
//! - `universe`: inspect or convert a universe list
//! - `synth`: write deterministic synthetic data into the data directory

mod logging;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use moatlab_core::data::{LocalStore, MarketDataProvider, Universe};
use moatlab_core::domain::Metric;
use moatlab_core::fundamentals::extract_record;
use moatlab_core::scoring::score;
use moatlab_core::selection::Pick;
use moatlab_runner::{
    export_indicators_csv, export_pct_change_csv, export_picks_csv, export_report_json,
    export_screen_csv, filter_candidates, import_indicators_csv, populate_store, scan_universe,
    ScanOptions, ScanReport, ScreenConfig, ScreenReport, SyntheticProvider,
};
use logging::LogFormat;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "moatlab",
    about = "MoatLab CLI: moat scoring, fundamental screening and MA-alignment picks"
)]
struct Cli {
    /// Data directory holding prices/ and fundamentals/.
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Serve deterministic synthetic data instead of the data directory.
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    /// Run configuration (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG overrides).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and score the moat metrics for each symbol.
    Score {
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Print JSON score cards instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Screen tickers against the fundamental criteria.
    Screen {
        /// Tickers to screen. Overrides `[screen].tickers` from the config.
        tickers: Vec<String>,

        /// Universe file (.toml or code,name .csv) supplying tickers.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Order admitted tickers by descending moat score.
        #[arg(long, default_value_t = false)]
        rank: bool,

        /// Process tickers one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Directory for screen.csv and report.json.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Compute indicator rows and write them as CSV.
    Indicators {
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults from the config window.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output file. Writes to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write daily percent changes instead of full indicator rows.
        #[arg(long, default_value_t = false)]
        pct_change: bool,
    },
    /// Select tickers whose MA5 ≥ MA20 ≥ MA60 on the evaluation date.
    Pick {
        /// Tickers to scan. Overrides `[screen].tickers` from the config.
        tickers: Vec<String>,

        /// Universe file (.toml or code,name .csv) supplying tickers.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Attach .SH/.SZ suffixes to bare A-share codes before fetching.
        #[arg(long, default_value_t = false)]
        qualify: bool,

        /// Evaluation date. Defaults to the latest date in the scan.
        #[arg(long)]
        as_of: Option<NaiveDate>,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        end: Option<NaiveDate>,

        /// Symbols to skip (bare or qualified).
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Additionally require close ≥ MA5.
        #[arg(long, default_value_t = false)]
        close_above_fast: bool,

        /// Re-filter a saved indicator CSV instead of fetching prices.
        #[arg(long)]
        from_csv: Option<PathBuf>,

        /// Save the scanned indicator rows for later re-filtering.
        #[arg(long)]
        save_csv: Option<PathBuf>,

        /// Write the picks as CSV to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show a universe list; optionally qualify codes and save as TOML.
    Universe {
        file: PathBuf,

        #[arg(long, default_value_t = false)]
        qualify: bool,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write synthetic prices and fundamentals into the data directory.
    Synth {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let config = match &cli.config {
        Some(path) => ScreenConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScreenConfig::default(),
    };
    let provider = make_provider(&cli.data_dir, cli.synthetic);

    match cli.command {
        Commands::Score { symbols, json } => run_score(provider.as_ref(), &symbols, json),
        Commands::Screen {
            tickers,
            universe,
            rank,
            sequential,
            output_dir,
        } => {
            let mut config = config;
            if rank {
                config.screen.rank_by_moat = true;
            }
            if sequential {
                config.screen.parallel = false;
            }
            let universe = resolve_universe(tickers, universe.as_deref(), false, &config)?;
            run_screen(provider.as_ref(), &universe, &config, output_dir.as_deref())
        }
        Commands::Indicators {
            symbols,
            start,
            end,
            output,
            pct_change,
        } => {
            let (start, end) = resolve_window(&config, start, end)?;
            let universe = Universe::from_symbols(symbols);
            let options = scan_options(&config, start, end);
            run_indicators(provider.as_ref(), &universe, &options, output.as_deref(), pct_change)
        }
        Commands::Pick {
            tickers,
            universe,
            qualify,
            as_of,
            start,
            end,
            exclude,
            close_above_fast,
            from_csv,
            save_csv,
            output,
        } => {
            let mut config = config;
            config.technical.exclude.extend(exclude);
            if close_above_fast {
                config.technical.require_close_above_fast = true;
            }
            if as_of.is_some() {
                config.technical.as_of = as_of;
            }
            let report = match from_csv {
                Some(path) => load_scan(&path)?,
                None => {
                    let universe = resolve_universe(tickers, universe.as_deref(), qualify, &config)?;
                    let (start, end) = resolve_window(&config, start, end)?;
                    scan_universe(&universe, provider.as_ref(), &scan_options(&config, start, end))
                }
            };
            if let Some(path) = &save_csv {
                write_file(path, &export_indicators_csv(&report.batch)?)?;
            }
            run_pick(&report, &config, output.as_deref())
        }
        Commands::Universe {
            file,
            qualify,
            output,
        } => run_universe(&file, qualify, output.as_deref()),
        Commands::Synth {
            symbols,
            start,
            end,
        } => {
            let (start, end) = resolve_window(&config, start, end)?;
            let store = LocalStore::new(&cli.data_dir);
            let refs: Vec<&str> = symbols.iter().map(String::as_str).collect();
            let n = populate_store(&store, &refs, start, end)?;
            println!("Wrote synthetic data for {n} symbol(s) to {}", cli.data_dir.display());
            Ok(())
        }
    }
}

fn make_provider(data_dir: &Path, synthetic: bool) -> Box<dyn MarketDataProvider> {
    if synthetic {
        tracing::warn!("using synthetic data; results are not real");
        Box::new(SyntheticProvider::new())
    } else {
        Box::new(LocalStore::new(data_dir))
    }
}

/// Scans honour `[screen].parallel` the same way the screen does.
fn scan_options(config: &ScreenConfig, start: NaiveDate, end: NaiveDate) -> ScanOptions {
    ScanOptions {
        start,
        end,
        parallel: config.screen.parallel,
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// CLI dates override the config window; the config fills the rest.
fn resolve_window(
    config: &ScreenConfig,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let mut technical = config.technical.clone();
    if start.is_some() {
        technical.start_date = start;
    }
    if end.is_some() {
        technical.end_date = end;
    }
    let (start, end) = technical.window(today());
    if start > end {
        bail!("start date {start} is after end date {end}");
    }
    Ok((start, end))
}

/// Tickers from the command line, else a universe file, else the config.
fn resolve_universe(
    tickers: Vec<String>,
    universe_file: Option<&Path>,
    qualify: bool,
    config: &ScreenConfig,
) -> Result<Universe> {
    let universe = if !tickers.is_empty() {
        Universe::from_symbols(tickers)
    } else if let Some(path) = universe_file {
        Universe::from_file(path)
            .with_context(|| format!("failed to load universe {}", path.display()))?
    } else if !config.screen.tickers.is_empty() {
        Universe::from_symbols(config.screen.tickers.iter().cloned())
    } else {
        bail!("no tickers: pass them as arguments, via --universe, or in [screen].tickers");
    };
    Ok(if qualify { universe.qualified() } else { universe })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn run_score(provider: &dyn MarketDataProvider, symbols: &[String], json: bool) -> Result<()> {
    let mut failed = 0;
    for symbol in symbols {
        let snapshot = match provider.fetch_financial_snapshot(symbol) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error for {symbol}: {e}");
                failed += 1;
                continue;
            }
        };
        let record = extract_record(&snapshot);
        let card = score(&record);
        if json {
            println!("{}", serde_json::to_string_pretty(&card)?);
            continue;
        }
        println!();
        println!("=== {symbol} ===");
        println!("{:<20} {:>16} {:>6}", "Metric", "Value", "Score");
        println!("{}", "-".repeat(44));
        for metric in Metric::ALL {
            println!(
                "{:<20} {:>16} {:>6}",
                metric.label(),
                record.get(metric).to_string(),
                card.get(metric).to_string()
            );
        }
        println!("{:<20} {:>23.4}", "Moat Score", card.moat_score);
    }
    if failed == symbols.len() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_screen(
    provider: &dyn MarketDataProvider,
    universe: &Universe,
    config: &ScreenConfig,
    output_dir: Option<&Path>,
) -> Result<()> {
    let tickers: Vec<String> = universe.symbols().into_iter().map(String::from).collect();
    let report = filter_candidates(
        &tickers,
        provider,
        &config.criteria,
        &config.screen.options(),
    )?;
    print_screen_summary(&report);

    if let Some(dir) = output_dir {
        write_file(&dir.join("screen.csv"), &export_screen_csv(&report)?)?;
        let mut json: serde_json::Value = serde_json::from_str(&export_report_json(&report)?)?;
        json["config_fingerprint"] = serde_json::Value::String(config.fingerprint());
        write_file(&dir.join("report.json"), &serde_json::to_string_pretty(&json)?)?;
        println!("Artifacts saved to: {}", dir.display());
    }
    Ok(())
}

fn print_screen_summary(report: &ScreenReport) {
    let admitted = report.admitted();
    println!();
    println!("=== Screen Result ===");
    println!("Provider:  {}", report.provider);
    println!(
        "Criteria:  D/E < {}, ROE > {}, growth > {}, FCF > {}",
        report.criteria.max_debt_equity,
        report.criteria.min_roe,
        report.criteria.min_revenue_growth,
        report.criteria.min_free_cash_flow
    );
    println!(
        "Evaluated: {}  Admitted: {}  Failed: {}",
        report.candidates.len(),
        admitted.len(),
        report.failures.len()
    );
    println!();
    println!("{:<12} {:>10}", "Symbol", "Moat");
    println!("{}", "-".repeat(23));
    for c in &admitted {
        println!("{:<12} {:>10.4}", c.symbol, c.moat_score());
    }
    for f in &report.failures {
        println!("WARNING: {} skipped: {}", f.symbol, f.error);
    }
    println!();
}

fn run_indicators(
    provider: &dyn MarketDataProvider,
    universe: &Universe,
    options: &ScanOptions,
    output: Option<&Path>,
    pct_change: bool,
) -> Result<()> {
    let report = scan_universe(universe, provider, options);
    for f in &report.failures {
        eprintln!("Error for {}: {}", f.symbol, f.error);
    }
    if report.batch.is_empty() {
        std::process::exit(1);
    }
    let csv = if pct_change {
        export_pct_change_csv(&report.batch)?
    } else {
        export_indicators_csv(&report.batch)?
    };
    match output {
        Some(path) => write_file(path, &csv),
        None => {
            print!("{csv}");
            Ok(())
        }
    }
}

fn load_scan(path: &Path) -> Result<ScanReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(ScanReport {
        batch: import_indicators_csv(&text)?,
        failures: Vec::new(),
    })
}

fn run_pick(report: &ScanReport, config: &ScreenConfig, output: Option<&Path>) -> Result<()> {
    let Some(as_of) = config.technical.as_of.or_else(|| report.latest_date()) else {
        bail!("no price data to evaluate");
    };
    let exclude = report.excluded_symbols(&config.technical.exclude);
    let picks = report.pick(as_of, &exclude, &config.technical.rule());
    print_picks(as_of, report, &picks);
    for f in &report.failures {
        println!("WARNING: {} skipped: {}", f.symbol, f.error);
    }
    if let Some(path) = output {
        write_file(path, &export_picks_csv(&picks)?)?;
    }
    Ok(())
}

fn print_picks(as_of: NaiveDate, report: &ScanReport, picks: &[Pick]) {
    println!();
    println!("=== MA Alignment on {as_of} ===");
    println!("Scanned: {}  Picked: {}", report.batch.len(), picks.len());
    println!();
    println!(
        "{:<12} {:<16} {:>10} {:>10} {:>10} {:>10}",
        "Symbol", "Name", "Close", "MA5", "MA20", "MA60"
    );
    println!("{}", "-".repeat(73));
    for p in picks {
        println!(
            "{:<12} {:<16} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            p.symbol,
            p.name.as_deref().unwrap_or(""),
            p.close,
            p.ma5,
            p.ma20,
            p.ma60
        );
    }
    println!();
}

fn run_universe(file: &Path, qualify: bool, output: Option<&Path>) -> Result<()> {
    let mut universe = Universe::from_file(file)
        .with_context(|| format!("failed to load universe {}", file.display()))?;
    if qualify {
        universe = universe.qualified();
    }
    println!("Members: {}", universe.len());
    for m in &universe.members {
        println!("{:<12} {}", m.symbol, m.name.as_deref().unwrap_or(""));
    }
    if let Some(path) = output {
        write_file(path, &universe.to_toml()?)?;
    }
    Ok(())
}
