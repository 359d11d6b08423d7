//! Table extraction benchmark CLI

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tablemetry::{
    AdapterRegistry, BenchmarkConfig, BenchmarkRunner, CellManifest, DocumentManifest, Metric,
    PrecomputedAdapter, SubprocessAdapter, comparison_report, ranking_report, read_json,
    summary_report, write_json,
};

/// CLI enum for ranking metrics
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMetric {
    /// Share of documents extracted without error
    SuccessRate,
    /// Share of documents with the exact expected table count
    TableCount,
    /// Share of expected tables found on the right pages
    Pages,
    /// Share of expected multi-page tables detected as such
    Spanning,
    /// Share of compared tables with exact dimensions
    Structure,
    /// Share of expected cells matched by any comparison step
    Cells,
    /// Share of expected cells matched verbatim
    ExactCells,
    /// Share of compared tables with a matching header row
    Headers,
    /// Average extraction time per document (lower is better)
    Time,
}

impl From<CliMetric> for Metric {
    fn from(metric: CliMetric) -> Self {
        match metric {
            CliMetric::SuccessRate => Metric::SuccessRate,
            CliMetric::TableCount => Metric::TableCountAccuracy,
            CliMetric::Pages => Metric::PageAccuracy,
            CliMetric::Spanning => Metric::SpanningRecall,
            CliMetric::Structure => Metric::StructureAccuracy,
            CliMetric::Cells => Metric::CellAccuracy,
            CliMetric::ExactCells => Metric::ExactAccuracy,
            CliMetric::Headers => Metric::HeaderAccuracy,
            CliMetric::Time => Metric::AvgTimeMs,
        }
    }
}

#[derive(Parser)]
#[command(name = "tablemetry")]
#[command(about = "Benchmark document table-extraction tools against ground truth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate ground-truth manifests without running benchmarks
    Validate {
        /// Document ground-truth manifest (table counts and page ranges)
        #[arg(short, long)]
        ground_truth: PathBuf,

        /// Cell ground-truth manifest (expected table content)
        #[arg(short, long)]
        cells: Option<PathBuf>,
    },

    /// Show a summary of the ground-truth manifests
    Show {
        /// Document ground-truth manifest
        #[arg(short, long)]
        ground_truth: PathBuf,

        /// Cell ground-truth manifest
        #[arg(short, long)]
        cells: Option<PathBuf>,
    },

    /// Run benchmarks over a directory of documents
    Run {
        /// Directory containing the documents to benchmark
        #[arg(short, long)]
        docs: PathBuf,

        /// Document ground-truth manifest
        #[arg(short, long)]
        ground_truth: PathBuf,

        /// Cell ground-truth manifest
        #[arg(short, long)]
        cells: Option<PathBuf>,

        /// External tool adapters, as NAME[+cont][+cells]=COMMANDLINE
        #[arg(short = 'C', long = "command")]
        commands: Vec<String>,

        /// Replay adapters, as NAME[+cont][+cells]=RESULTS_DIR
        #[arg(short = 'P', long = "precomputed")]
        precomputed: Vec<String>,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Compare cell values case-insensitively
        #[arg(long)]
        case_insensitive: bool,

        /// Keep whitespace runs significant during comparison
        #[arg(long)]
        no_normalize_whitespace: bool,

        /// Numeric comparison tolerance (absolute and relative)
        #[arg(long, default_value = "0.001")]
        tolerance: f64,

        /// Print a per-table diagnostic report for every comparison
        #[arg(long)]
        details: bool,
    },

    /// Rank tools from a previously written results file
    Rank {
        /// Results JSON written by a previous run
        #[arg(short, long)]
        results: PathBuf,

        /// Metric to rank by
        #[arg(short, long, value_enum, default_value = "cells")]
        metric: CliMetric,
    },
}

/// Parse an adapter spec of the form `NAME[+cont][+cells]=TARGET`.
fn parse_adapter_spec(spec: &str) -> anyhow::Result<(String, bool, bool, String)> {
    let (head, target) = spec
        .split_once('=')
        .with_context(|| format!("adapter spec '{spec}' is missing '=TARGET'"))?;

    let mut parts = head.split('+');
    let name = parts.next().unwrap_or_default().to_string();
    if name.is_empty() {
        bail!("adapter spec '{spec}' has an empty name");
    }

    let mut continuations = false;
    let mut cells = false;
    for flag in parts {
        match flag {
            "cont" => continuations = true,
            "cells" => cells = true,
            other => bail!("unknown adapter flag '+{other}' in spec '{spec}'"),
        }
    }

    Ok((name, continuations, cells, target.to_string()))
}

fn build_registry(commands: &[String], precomputed: &[String]) -> anyhow::Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();

    for spec in commands {
        let (name, continuations, cells, target) = parse_adapter_spec(spec)?;
        let mut words = target.split_whitespace();
        let Some(program) = words.next() else {
            bail!("adapter spec '{spec}' has an empty command line");
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        let mut adapter = SubprocessAdapter::new(&name, program, args);
        if continuations {
            adapter = adapter.with_continuation_support();
        }
        if cells {
            adapter = adapter.with_cell_support();
        }
        registry.register(Arc::new(adapter))?;
        eprintln!("[adapter] ✓ {name} (registered)");
    }

    for spec in precomputed {
        let (name, continuations, cells, target) = parse_adapter_spec(spec)?;
        let mut adapter = PrecomputedAdapter::new(&name, &target);
        if continuations {
            adapter = adapter.with_continuation_support();
        }
        if cells {
            adapter = adapter.with_cell_support();
        }
        registry.register(Arc::new(adapter))?;
        eprintln!("[adapter] ✓ {name} (registered, replay from {target})");
    }

    Ok(registry)
}

/// Read every regular file in a directory as a benchmark input.
fn load_documents(dir: &Path) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("cannot read document directory {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let bytes = std::fs::read(&path)?;
        files.push((file_name.to_string(), bytes));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn load_cells(path: Option<&PathBuf>) -> anyhow::Result<CellManifest> {
    match path {
        Some(path) => Ok(CellManifest::load(path)?),
        None => Ok(CellManifest::new()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            ground_truth,
            cells,
        } => {
            let documents = DocumentManifest::load(&ground_truth)?;
            let cells = load_cells(cells.as_ref())?;
            println!(
                "✓ {} document(s) and {} cell table(s) are valid",
                documents.len(),
                cells.total_tables()
            );
            Ok(())
        }

        Commands::Show {
            ground_truth,
            cells,
        } => {
            let documents = DocumentManifest::load(&ground_truth)?;
            let cells = load_cells(cells.as_ref())?;

            println!("{} document(s):", documents.len());
            for doc in &documents.documents {
                println!(
                    "  {} - {} table(s), {} spanning, difficulty {} [{}]",
                    doc.file_name,
                    doc.table_count,
                    doc.spanning_table_count(),
                    doc.difficulty,
                    doc.category
                );
                for table in &doc.tables {
                    let cell_note = match cells.get(&doc.file_name, table.table_id) {
                        Some(gt) => format!(", {}x{} cells", gt.rows, gt.cols),
                        None => String::new(),
                    };
                    println!(
                        "    table {} {}{cell_note}",
                        table.table_id,
                        table.page_range_str()
                    );
                }
            }
            println!(
                "{} cell table(s), {} expected cell(s) total",
                cells.total_tables(),
                cells.total_cells()
            );
            Ok(())
        }

        Commands::Run {
            docs,
            ground_truth,
            cells,
            commands,
            precomputed,
            output,
            case_insensitive,
            no_normalize_whitespace,
            tolerance,
            details,
        } => {
            let config = BenchmarkConfig {
                normalize_whitespace: !no_normalize_whitespace,
                case_insensitive,
                numeric_tolerance: tolerance,
            };
            config.validate()?;

            let registry = build_registry(&commands, &precomputed)?;
            if registry.is_empty() {
                bail!("no adapters specified; pass --command or --precomputed");
            }

            let documents = DocumentManifest::load(&ground_truth)?;
            let cell_truth = load_cells(cells.as_ref())?;
            let files = load_documents(&docs)?;

            println!("Loaded {} document(s)", files.len());

            let runner = BenchmarkRunner::new(config, registry, documents, cell_truth);
            let report = runner.run(&files);

            println!("\n{}", summary_report(&report));

            if details {
                for comparison in &report.table_comparisons {
                    println!("{}", comparison_report(comparison));
                }
            }

            let output_file = output.join("results.json");
            write_json(&report, &output_file)?;
            println!("Results written to: {}", output_file.display());

            Ok(())
        }

        Commands::Rank { results, metric } => {
            let report = read_json(&results)?;
            print!("{}", ranking_report(&report, metric.into()));
            Ok(())
        }
    }
}
