// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use clap::{Args, Parser, Subcommand};
use nlid_batch::{BatchResult, BatchWorker, ColumnPair, ColumnSource, NlidConfig, analyze_pair};
use nlid_cli::{
    RESULTS_FILE_NAME, TableFileSource, discover_inputs, normalize_column_name, parse_column_pair,
    render_matrix_csv, write_results_csv,
};
use nlid_core::{NlidError, SignalView};
use nlid_recurrence::{EmbeddingParams, RecurrenceOutput, ThresholdSpec, compute_recurrence};
use serde::Serialize;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Nonlinear interdependence (NLID) of paired time series
#[derive(Parser, Debug)]
#[command(name = "nlid")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file; flags override its fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Average NLID over every CSV file in a folder (or a single file)
    Batch {
        /// Input folder or CSV file
        input: PathBuf,

        /// Column pair as X,Y (repeatable)
        #[arg(short, long = "pair", required = true, value_parser = parse_pair_arg)]
        pairs: Vec<ColumnPair>,

        /// Results table path (default: NLID_Results_Avg.csv in the input folder)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full batch result as JSON instead of writing the table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Per-window NLID of one column pair in one file, as JSON
    Pair {
        file: PathBuf,

        /// Column pair as X,Y
        #[arg(short, long, value_parser = parse_pair_arg)]
        pair: ColumnPair,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Distance or recurrence matrix of one column, as CSV
    Recurrence {
        file: PathBuf,

        #[arg(long)]
        column: String,

        /// First sample of the segment
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Segment length (default: the rest of the column)
        #[arg(long)]
        len: Option<usize>,

        /// Dump raw distances instead of the binarized matrix
        #[arg(long)]
        distances: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Embedding dimension m
    #[arg(short = 'm', long = "dimension")]
    dimension: Option<usize>,

    /// Embedding delay tau
    #[arg(short = 't', long = "delay")]
    delay: Option<usize>,

    /// Window size in samples
    #[arg(short = 'w', long = "window")]
    window: Option<usize>,

    /// Fraction of each window shared with the next, in [0, 1)
    #[arg(long)]
    overlap: Option<f64>,

    /// Dynamic threshold as a fraction of each matrix's distance range
    #[arg(long, conflicts_with = "threshold")]
    fraction: Option<f64>,

    /// Static absolute distance threshold
    #[arg(long)]
    threshold: Option<f64>,
}

impl ParamArgs {
    fn apply(&self, mut config: NlidConfig) -> NlidConfig {
        if let Some(dimension) = self.dimension {
            config.embedding.dimension = dimension;
        }
        if let Some(delay) = self.delay {
            config.embedding.delay = delay;
        }
        if let Some(window) = self.window {
            config.window_size = window;
        }
        if let Some(overlap) = self.overlap {
            config.overlap = overlap;
        }
        if let Some(fraction) = self.fraction {
            config.threshold = ThresholdSpec::Dynamic { fraction };
        }
        if let Some(threshold) = self.threshold {
            config.threshold = ThresholdSpec::Static { threshold };
        }
        config
    }
}

fn parse_pair_arg(raw: &str) -> Result<ColumnPair, String> {
    parse_column_pair(raw).map_err(|err| err.message().to_string())
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Nlid(#[from] NlidError),
    #[error("{context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },
}

impl CliError {
    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Nlid(err) => err.code(),
            Self::Json { .. } => "json_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let base = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Batch {
            input,
            pairs,
            output,
            json,
            params,
        } => handle_batch(&input, pairs, output, json, params.apply(base)),
        Commands::Pair { file, pair, params } => handle_pair(&file, &pair, &params.apply(base)),
        Commands::Recurrence {
            file,
            column,
            start,
            len,
            distances,
            output,
            params,
        } => handle_recurrence(
            &file,
            &column,
            start,
            len,
            distances,
            output.as_deref(),
            &params.apply(base),
        ),
    }
}

fn load_config(path: Option<&Path>) -> Result<NlidConfig, CliError> {
    let Some(path) = path else {
        return Ok(NlidConfig::default());
    };
    let raw = fs::read_to_string(path)
        .map_err(|err| NlidError::io(format!("failed to read {}: {err}", path.display())))?;
    let config: NlidConfig = serde_json::from_str(&raw)
        .map_err(|err| CliError::json(format!("invalid config {}", path.display()), err))?;
    debug!(path = %path.display(), ?config, "loaded configuration");
    Ok(config)
}

fn handle_batch(
    input: &Path,
    pairs: Vec<ColumnPair>,
    output: Option<PathBuf>,
    json: bool,
    config: NlidConfig,
) -> Result<(), CliError> {
    config.validate()?;
    let discovery = discover_inputs(input)?;
    for (path, reason) in &discovery.skipped {
        warn!(file = %path.display(), "skipped: {reason}");
    }
    if discovery.inputs.is_empty() {
        warn!(input = %input.display(), "no CSV or spreadsheet inputs found");
    }

    let sources: Vec<TableFileSource> = discovery
        .inputs
        .iter()
        .map(TableFileSource::new)
        .collect();
    let handle = BatchWorker::new(sources, pairs, config)
        .with_progress(Arc::new(|completed: usize, total: usize| {
            debug!(completed, total, "batch progress");
        }))
        .spawn()?;
    let batch = handle.join()?;

    if json {
        return print_json(&batch);
    }

    if batch.is_empty() {
        warn!(failures = batch.failures.len(), "no valid files processed");
        return Ok(());
    }
    let output = output.unwrap_or_else(|| default_results_path(input));
    write_results_csv(&output, &batch)?;
    report_summary(&batch, &output);
    Ok(())
}

fn default_results_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.join(RESULTS_FILE_NAME)
    } else {
        input
            .parent()
            .map(|dir| dir.join(RESULTS_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(RESULTS_FILE_NAME))
    }
}

fn report_summary(batch: &BatchResult, output: &Path) {
    info!(
        results = batch.results.len(),
        failures = batch.failures.len(),
        output = %output.display(),
        "results saved"
    );
    println!("{}", output.display());
}

fn handle_pair(file: &Path, pair: &ColumnPair, config: &NlidConfig) -> Result<(), CliError> {
    let source = TableFileSource::new(file);
    let x = source.column(&pair.x)?;
    let y = source.column(&pair.y)?;
    let analysis = analyze_pair(source.name(), pair, &x, &y, config)?;
    info!(
        file = source.name(),
        pair = %pair,
        windows = analysis.file_result.window_count,
        "processed"
    );
    print_json(&analysis)
}

fn handle_recurrence(
    file: &Path,
    column: &str,
    start: usize,
    len: Option<usize>,
    distances: bool,
    output: Option<&Path>,
    config: &NlidConfig,
) -> Result<(), CliError> {
    let params: EmbeddingParams = config.embedding;
    params.validate()?;
    config.threshold.validate()?;

    let source = TableFileSource::new(file);
    let values = source.column(&normalize_column_name(column))?;
    let signal = SignalView::new(&values)?;
    let len = len.unwrap_or(signal.len().saturating_sub(start));
    let segment = signal.window(start, len)?;

    let trajectory = nlid_recurrence::reconstruct(&segment, &params)?;
    let threshold = (!distances).then_some(&config.threshold);
    let rendered = match compute_recurrence(&trajectory, threshold)? {
        RecurrenceOutput::Distances(matrix) => render_matrix_csv(matrix.as_slice(), matrix.size()),
        RecurrenceOutput::Binary { matrix, cutoff } => {
            info!(
                cutoff,
                recurrence_rate = matrix.recurrence_rate(),
                size = matrix.size(),
                "binarized recurrence matrix"
            );
            render_matrix_csv(matrix.as_slice(), matrix.size())
        }
    };

    match output {
        Some(path) => fs::write(path, rendered)
            .map_err(|err| NlidError::io(format!("failed to write {}: {err}", path.display())))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::json("failed to encode output", err))?;
    println!("{json}");
    Ok(())
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, ParamArgs, default_results_path};
    use clap::Parser;
    use nlid_batch::{ColumnPair, NlidConfig};
    use nlid_recurrence::ThresholdSpec;
    use std::path::Path;

    #[test]
    fn batch_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "nlid", "batch", "data", "--pair", "pupil,gaze", "-p", "A,B", "-m", "4", "-w", "200",
            "--overlap", "0.25", "--threshold", "0.3",
        ])
        .expect("arguments should parse");

        let Commands::Batch { pairs, params, .. } = cli.command else {
            panic!("expected batch command");
        };
        assert_eq!(
            pairs,
            vec![ColumnPair::new("PUPIL", "GAZE"), ColumnPair::new("A", "B")]
        );
        let config = params.apply(NlidConfig::default());
        assert_eq!(config.embedding.dimension, 4);
        assert_eq!(config.embedding.delay, 1);
        assert_eq!(config.window_size, 200);
        assert_eq!(config.overlap, 0.25);
        assert_eq!(config.threshold, ThresholdSpec::Static { threshold: 0.3 });
    }

    #[test]
    fn fraction_and_threshold_conflict() {
        let err = Cli::try_parse_from([
            "nlid", "pair", "f.csv", "--pair", "X,Y", "--fraction", "0.2", "--threshold", "1",
        ])
        .expect_err("both threshold modes must conflict");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn batch_requires_a_pair() {
        assert!(Cli::try_parse_from(["nlid", "batch", "data"]).is_err());
        assert!(Cli::try_parse_from(["nlid", "batch", "data", "--pair", "X"]).is_err());
    }

    #[test]
    fn empty_params_keep_configuration() {
        let base = NlidConfig {
            window_size: 64,
            ..NlidConfig::default()
        };
        assert_eq!(ParamArgs::default().apply(base), base);
    }

    #[test]
    fn results_land_next_to_inputs() {
        assert_eq!(
            default_results_path(Path::new("trials/run1.csv")),
            Path::new("trials/NLID_Results_Avg.csv")
        );
    }
}
