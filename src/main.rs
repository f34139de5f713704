use address_grouper::geocode::{CoordinateResolver, FileErrorSink, GeocodeCache, GeocodeResolver};
use address_grouper::grouping::{GroupingConfig, DEFAULT_SIMILARITY_THRESHOLD};
use address_grouper::normalize::AddressNormalizer;
use address_grouper::pipeline::Pipeline;
use address_grouper::table::{self, InputTable};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Address Grouper — find people who share one physical address
///
/// Reads a CSV with `Name,Address` columns and writes a CSV listing, per
/// address, the names of everyone living there.
///
/// Examples:
///   addrgroup people.csv
///   addrgroup people.csv --delta 0.005 --output-dir out/
///   addrgroup people.csv --no-geocode --threshold 70
#[derive(Parser)]
#[command(name = "addrgroup", version, about, long_about = None)]
struct Cli {
    /// Input CSV file with header `Name,Address`.
    input: PathBuf,

    /// Directory for the result file (created if missing).
    #[arg(long, short = 'o', default_value = "output")]
    output_dir: PathBuf,

    /// Coordinate tolerance: points within ±delta degrees count as one address.
    /// Without it, only identical coordinates group together.
    #[arg(long, short = 'd', allow_hyphen_values = true)]
    delta: Option<f64>,

    /// Skip geocoding and group by address text similarity.
    #[arg(long)]
    no_geocode: bool,

    /// Similarity score (0-100) an address must exceed to join a text group.
    #[arg(long, short = 't', default_value_t = DEFAULT_SIMILARITY_THRESHOLD,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: u8,

    /// Geoapify API key.
    #[arg(long, env = "GEOAPIFY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Offline mode: only use the local geocode cache.
    #[arg(long)]
    offline: bool,

    /// Geocode cache file (defaults to ~/.address-grouper/geocode_cache.json).
    #[arg(long)]
    cache: Option<PathBuf>,

    /// File that collects addresses which could not be geocoded.
    #[arg(long, default_value = "failed.txt")]
    error_log: PathBuf,

    /// Log every processing step.
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "address_grouper=debug,addrgroup=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // ── Validate paths ──────────────────────────────────────────

    if let Err(e) = table::validate_input_path(&cli.input) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = table::prepare_output_dir(&cli.output_dir) {
        eprintln!("Error: Wrong output directory '{}': {}", cli.output_dir.display(), e);
        std::process::exit(1);
    }

    // ── Configure ───────────────────────────────────────────────

    let config = GroupingConfig {
        geocoding_enabled: !cli.no_geocode,
        delta: cli.delta,
        similarity_score_threshold: cli.threshold,
    };
    let pipeline = Pipeline::new(AddressNormalizer::default(), &config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let input = InputTable::from_csv_path(&cli.input).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // ── Run ─────────────────────────────────────────────────────

    let mut resolver = if config.geocoding_enabled {
        let cache = match &cli.cache {
            Some(path) => GeocodeCache::load_from(path.clone()),
            None => GeocodeCache::load(),
        };
        let mut resolver = GeocodeResolver::with_cache(cache, cli.api_key.clone());
        resolver.set_offline(cli.offline);
        if !resolver.is_online() {
            tracing::warn!("no API key or offline: only cached addresses will be resolved");
        }
        Some(resolver)
    } else {
        None
    };

    let mut sink = FileErrorSink::new(&cli.error_log);
    let output = pipeline
        .run(
            input,
            resolver.as_mut().map(|r| r as &mut dyn CoordinateResolver),
            &mut sink,
        )
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    if output.summary.failed > 0 {
        eprintln!(
            "  {} address(es) could not be geocoded, see {}",
            output.summary.failed,
            sink.path().display()
        );
    }

    // ── Write result ────────────────────────────────────────────

    let now = chrono::Local::now().naive_local();
    let path = output.table.write_to_dir(&cli.output_dir, now).unwrap_or_else(|e| {
        eprintln!("Error: Cannot write result: {}", e);
        std::process::exit(1);
    });

    eprintln!("  {} group(s) from {} row(s)", output.summary.groups, output.summary.rows_read);
    println!("{}", path.display());
}
