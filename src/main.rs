//! csvtab - Typed in-memory tables over delimited text

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use csvtab::config::{parse_delimiter, Config, ReportFormat};
use csvtab::join::{join, JoinColumns, JoinKind};
use csvtab::output::{CsvSink, ReportFactory, RowSink};
use csvtab::parser::{CsvSource, RowStream};
use csvtab::stats::describe;
use csvtab::unique::{unique, UniqueOptions};
use csvtab::Table;

/// Typed in-memory tables over CSV and TSV files
#[derive(Parser, Debug)]
#[command(name = "csvtab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input delimiter (a single character, or `tab`); defaults by extension
    #[arg(short, long, global = true)]
    delimiter: Option<String>,

    /// Output delimiter (overrides CSVTAB_DELIMITER)
    #[arg(long, global = true)]
    out_delimiter: Option<String>,

    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// One optional input file; `-` or nothing reads stdin
#[derive(Args, Debug)]
struct Input {
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sort rows by one or more columns
    Sort {
        /// Columns to sort by (names, 1-based numbers or ranges)
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Sort in descending order
        #[arg(long)]
        reverse: bool,

        /// Compare every key as a string
        #[arg(long)]
        no_inference: bool,

        #[command(flatten)]
        input: Input,
    },

    /// Join two files on a column
    Join {
        /// Join column, or LEFT,RIGHT when the names differ
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Keep every left row
        #[arg(long)]
        left: bool,

        /// Keep every right row
        #[arg(long)]
        right: bool,

        /// Keep every row of both files
        #[arg(long)]
        outer: bool,

        left_file: PathBuf,
        right_file: PathBuf,
    },

    /// Per-column statistics
    Stats {
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        input: Input,
    },

    /// Dimensions and inferred column types
    Describe {
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        input: Input,
    },

    /// Row and column counts
    Dimensions {
        /// Write the counts as CSV
        #[arg(long)]
        csv: bool,

        #[command(flatten)]
        input: Input,
    },

    /// Drop rows with duplicate keys
    Unique {
        /// Key columns; all columns when omitted
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Input is grouped by the key, so only neighbours are compared
        #[arg(long)]
        sorted: bool,

        /// Append a Count column
        #[arg(long)]
        count: bool,

        #[command(flatten)]
        input: Input,
    },

    /// Random sample of rows
    Sample {
        /// Number of rows
        #[arg(short = 'n', long)]
        rows: usize,

        /// Sample with replacement
        #[arg(long)]
        replace: bool,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        input: Input,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("csvtab=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("csvtab=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()
        .context("Invalid delimiter in environment")?
        .with_verbose(cli.verbose);
    if let Some(d) = &cli.delimiter {
        config = config.with_delimiter(parse_delimiter(d)?);
    }
    if let Some(d) = &cli.out_delimiter {
        config = config.with_output_delimiter(parse_delimiter(d)?);
    }
    Ok(config)
}

fn open(path: Option<&Path>, config: &Config) -> Result<RowStream<'static>> {
    let name = path.map_or_else(|| "-".to_string(), |p| p.display().to_string());
    CsvSource::open(path, config).with_context(|| format!("Failed to read input: {}", name))
}

fn load(path: Option<&Path>, config: &Config) -> Result<(Table, bool)> {
    let stream = open(path, config)?;
    let has_bom = stream.has_bom;
    let table = Table::from_stream(stream)?;
    Ok((table, has_bom))
}

fn stdout_sink(config: &Config, has_bom: bool) -> CsvSink<io::StdoutLock<'static>> {
    CsvSink::from_config(io::stdout().lock(), config).with_bom(has_bom)
}

fn report_format(json: bool) -> ReportFormat {
    if json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = build_config(&cli)?;
    debug!(?config, "starting");

    match cli.command {
        Command::Sort {
            columns,
            reverse,
            no_inference,
            input,
        } => {
            let (mut table, has_bom) = load(input.file.as_deref(), &config)?;
            let keys = table.resolve_columns(columns.as_slice())?;
            table
                .sort_by_columns(&keys, !no_inference, reverse)
                .context("Failed to sort")?;
            let mut sink = stdout_sink(&config, has_bom);
            sink.write_row(table.header())?;
            for row in table.rows() {
                sink.write_row(row)?;
            }
            sink.flush()?;
        }

        Command::Join {
            columns,
            left,
            right,
            outer,
            left_file,
            right_file,
        } => {
            let kind = JoinKind::from_flags(left, right, outer)?;
            let join_columns = match columns.as_slice() {
                [name] => JoinColumns::same(name.as_str()),
                [l, r] => JoinColumns::new(l.as_str(), r.as_str()),
                _ => bail!("Expected one join column, or two separated by a comma"),
            };
            let left_stream = open(Some(&left_file), &config)?;
            let right_stream = open(Some(&right_file), &config)?;
            let mut sink = stdout_sink(&config, left_stream.has_bom);
            let summary = join(left_stream, right_stream, &join_columns, kind, &mut sink)
                .context("Failed to join")?;
            debug!(?summary, "joined");
        }

        Command::Stats { json, input } => {
            let (table, _) = load(input.file.as_deref(), &config)?;
            let stats = table.stats()?;
            let config = config.with_report_format(report_format(json));
            let mut out = io::stdout().lock();
            ReportFactory::create(config.report_format).render_stats(
                &stats,
                table.row_count(),
                &mut out,
            )?;
            out.flush()?;
        }

        Command::Describe { json, input } => {
            let (table, _) = load(input.file.as_deref(), &config)?;
            let columns = describe(&table);
            let config = config.with_report_format(report_format(json));
            let mut out = io::stdout().lock();
            ReportFactory::create(config.report_format).render_describe(
                &columns,
                table.row_count(),
                &mut out,
            )?;
            out.flush()?;
        }

        Command::Dimensions { csv, input } => {
            let stream = open(input.file.as_deref(), &config)?;
            let column_count = stream.header.len();
            let mut row_count = 0;
            for row in stream.rows {
                row?;
                row_count += 1;
            }
            if csv {
                let mut sink = stdout_sink(&config, false);
                for row in [
                    ["Dimension".to_string(), "Size".to_string()],
                    ["Rows".to_string(), row_count.to_string()],
                    ["Columns".to_string(), column_count.to_string()],
                ] {
                    sink.write_row(&row)?;
                }
                sink.flush()?;
            } else {
                let mut out = io::stdout().lock();
                ReportFactory::create(config.report_format).render_dimensions(
                    row_count,
                    column_count,
                    &mut out,
                )?;
                out.flush()?;
            }
        }

        Command::Unique {
            columns,
            sorted,
            count,
            input,
        } => {
            let stream = open(input.file.as_deref(), &config)?;
            let mut sink = stdout_sink(&config, stream.has_bom);
            unique(stream, columns.as_slice(), UniqueOptions { sorted, count }, &mut sink)?;
        }

        Command::Sample {
            rows,
            replace,
            seed,
            input,
        } => {
            let (table, has_bom) = load(input.file.as_deref(), &config)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let sampled = table.sample(rows, replace, &mut rng)?;
            let mut sink = stdout_sink(&config, has_bom);
            sink.write_row(table.header())?;
            for row in sampled {
                sink.write_row(row)?;
            }
            sink.flush()?;
        }
    }

    Ok(())
}
