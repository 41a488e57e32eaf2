//! CLI entry point for the subway ridership analysis.
//!
//! `analyze` loads the hourly card-tap table from the Seoul Open API or a
//! local CSV export, tests peak against off-peak ridership and draws per-line
//! charts. `exercise` runs one of the counted classroom algorithms.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use subway_ridership::analyzers::analyzer::run;
use subway_ridership::chart::render_all;
use subway_ridership::config::AnalysisConfig;
use subway_ridership::exercises::quadratic::solve_quadratic;
use subway_ridership::exercises::recursion::{
    FibCache, binary_digits_iterative, binary_digits_recursive, factorial_iterative,
    factorial_recursive, fibonacci_memo, fibonacci_naive, hanoi,
};
use subway_ridership::exercises::search::{
    all_unique, sequential_search, square_by_addition, square_direct,
};
use subway_ridership::fetch::BasicClient;
use subway_ridership::infra::csv_file::CsvFileSource;
use subway_ridership::infra::seoul::OpenApiClient;
use subway_ridership::output::{append_test_results, log_report, write_report_json, write_tidy_csv};
use subway_ridership::services::ridership_source::RidershipSource;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const SAMPLE_VALUES: [i64; 10] = [32, 14, 5, 17, 23, 9, 11, 4, 26, 29];

#[derive(Parser)]
#[command(name = "subway_ridership")]
#[command(about = "Hourly Seoul subway ridership analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze peak vs. off-peak ridership from the Open API or a CSV export
    Analyze(AnalyzeArgs),
    /// Run a counted algorithm and report its operation count
    Exercise {
        #[command(subcommand)]
        exercise: Exercise,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Local CSV export of the card-tap table
    #[arg(long, conflicts_with = "period", required_unless_present = "period")]
    file: Option<PathBuf>,

    /// Reporting month for the Open API, e.g. 202309
    #[arg(long)]
    period: Option<String>,

    /// Open API key (falls back to SEOUL_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// JSON config file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<String>,

    /// Directory for charts and exports (overrides the config)
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Skip chart rendering
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// Also write tidy_records.csv, test_results.csv and report.json
    #[arg(long, default_value_t = false)]
    export: bool,
}

#[derive(Subcommand)]
enum Exercise {
    /// Fibonacci, naive recursion vs. memoized
    Fib { n: u32 },
    /// Factorial, recursive vs. iterative
    Factorial { n: u32 },
    /// Tower of Hanoi moves from A to C
    Hanoi { n: u32 },
    /// Number of binary digits, iterative vs. recursive
    Bits { n: u64 },
    /// Sequential search for KEY
    Search {
        key: i64,
        #[arg(long, value_delimiter = ',', default_values_t = SAMPLE_VALUES)]
        values: Vec<i64>,
    },
    /// Pairwise uniqueness check
    Unique {
        #[arg(value_delimiter = ',', default_values_t = SAMPLE_VALUES)]
        values: Vec<i64>,
    },
    /// n², by multiplication vs. repeated addition
    Square { n: u64 },
    /// Real roots of a x² + b x + c = 0
    Quadratic {
        #[arg(allow_hyphen_values = true)]
        a: f64,
        #[arg(allow_hyphen_values = true)]
        b: f64,
        #[arg(allow_hyphen_values = true)]
        c: f64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/subway_ridership.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_ridership.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze(args)?,
        Commands::Exercise { exercise } => run_exercise(exercise),
    }

    Ok(())
}

#[tracing::instrument(skip_all)]
fn analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    debug!(?config, "Configuration loaded");

    let source: Box<dyn RidershipSource> = match (args.file, args.period) {
        (Some(path), _) => Box::new(CsvFileSource::new(path.display().to_string(), &config)),
        (None, Some(period)) => {
            let api_key = args
                .api_key
                .or_else(|| std::env::var("SEOUL_API_KEY").ok())
                .context("an API key is required: pass --api-key or set SEOUL_API_KEY")?;
            Box::new(OpenApiClient::new(BasicClient::new()?, api_key, period, &config))
        }
        (None, None) => anyhow::bail!("either --file or --period is required"),
    };

    let analysis = run(source.as_ref(), &config)?;
    log_report(&analysis.report)?;

    let output_dir = Path::new(&config.output_dir);
    if !args.no_charts {
        let written = render_all(&analysis.records, &analysis.report.top_stations, output_dir)?;
        info!(charts = written.len(), dir = %output_dir.display(), "Charts rendered");
    }

    if args.export {
        std::fs::create_dir_all(output_dir)?;
        write_tidy_csv(output_dir.join("tidy_records.csv"), &analysis.records)?;
        let results: Vec<_> = analysis
            .report
            .overall
            .iter()
            .chain(&analysis.report.per_line)
            .cloned()
            .collect();
        append_test_results(output_dir.join("test_results.csv"), &results)?;
        write_report_json(output_dir.join("report.json"), &analysis.report)?;
        info!(dir = %output_dir.display(), "Exports written");
    }

    Ok(())
}

fn run_exercise(exercise: Exercise) {
    let start = Instant::now();
    match exercise {
        Exercise::Fib { n } => {
            let naive = fibonacci_naive(n);
            info!(n, value = ?naive.value, calls = naive.count, elapsed = ?start.elapsed(), "fibonacci (naive)");

            let start = Instant::now();
            let mut cache = FibCache::new();
            let memo = fibonacci_memo(n, &mut cache);
            info!(n, value = ?memo.value, calls = memo.count, elapsed = ?start.elapsed(), "fibonacci (memo)");
        }
        Exercise::Factorial { n } => {
            let rec = factorial_recursive(n);
            info!(n, value = ?rec.value, calls = rec.count, elapsed = ?start.elapsed(), "factorial (recursive)");

            let start = Instant::now();
            let iter = factorial_iterative(n);
            info!(n, value = ?iter.value, steps = iter.count, elapsed = ?start.elapsed(), "factorial (iterative)");
        }
        Exercise::Hanoi { n } => {
            let result = hanoi(n);
            for m in &result.value {
                info!("{m}");
            }
            info!(n, moves = result.value.len(), calls = result.count, elapsed = ?start.elapsed(), "hanoi");
        }
        Exercise::Bits { n } => {
            let iter = binary_digits_iterative(n);
            let rec = binary_digits_recursive(n);
            info!(
                n,
                digits = iter.value,
                loop_steps = iter.count,
                calls = rec.count,
                log2 = (n as f64).log2(),
                elapsed = ?start.elapsed(),
                "binary digits"
            );
        }
        Exercise::Search { key, values } => {
            let result = sequential_search(&values, &key);
            info!(key, len = values.len(), index = ?result.value, comparisons = result.count, elapsed = ?start.elapsed(), "sequential search");
        }
        Exercise::Unique { values } => {
            let result = all_unique(&values);
            info!(?values, unique = result.value, comparisons = result.count, elapsed = ?start.elapsed(), "uniqueness");
        }
        Exercise::Square { n } => {
            let direct = square_direct(n);
            let added = square_by_addition(n);
            info!(n, value = %direct.value, direct_ops = direct.count, addition_ops = added.count, elapsed = ?start.elapsed(), "square");
        }
        Exercise::Quadratic { a, b, c } => {
            let roots = solve_quadratic(a, b, c);
            info!(a, b, c, roots = %roots, elapsed = ?start.elapsed(), "quadratic");
        }
    }
}
