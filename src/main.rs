use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use verbatim::config::Settings;
use verbatim::matcher::{AcceptBest, ManualResolver, ScriptedResolver, SkipUnresolved};
use verbatim::ops::telemetry;
use verbatim::pipeline::{BatchReport, BatchRunner, PairRequest};

#[derive(Parser)]
#[command(name = "verbatim")]
#[command(about = "Compare draft documents against live web pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimum block similarity for a match
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Page cap for auto-match crawls
    #[arg(long, global = true)]
    max_pages: Option<usize>,

    /// Delay before every request, in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value = "markdown", global = true)]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Dump Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    metrics: bool,

    /// Default log level (RUST_LOG overrides)
    #[arg(long, default_value = "info", env = "VERBATIM_LOG", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare explicit document/URL pairs
    Compare {
        /// DOC=URL pair (repeatable)
        #[arg(long = "pair", required = true, value_parser = parse_pair)]
        pairs: Vec<PairRequest>,
    },

    /// Crawl a site and match every document to a page
    Auto {
        /// Seed URL of the site
        #[arg(long)]
        seed: String,

        /// Draft documents
        #[arg(required = true)]
        documents: Vec<PathBuf>,

        /// Accept the best candidate for low-confidence documents
        #[arg(long)]
        accept_best: bool,

        /// DOC=URL answer for a low-confidence document (repeatable)
        #[arg(long = "assign", value_parser = parse_pair)]
        assignments: Vec<PairRequest>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

fn parse_pair(raw: &str) -> Result<PairRequest, String> {
    PairRequest::parse(raw).ok_or_else(|| format!("expected DOC=URL, got '{raw}'"))
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(threshold) = cli.threshold {
        settings.compare.threshold = threshold;
    }
    if let Some(max_pages) = cli.max_pages {
        settings.crawl.max_pages = max_pages;
    }
    if let Some(delay_ms) = cli.delay_ms {
        settings.crawl.request_delay_ms = delay_ms;
    }

    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn resolver_for(accept_best: bool, assignments: &[PairRequest]) -> Box<dyn ManualResolver> {
    if accept_best {
        return Box::new(AcceptBest);
    }
    if assignments.is_empty() {
        return Box::new(SkipUnresolved);
    }
    let resolver = assignments.iter().fold(ScriptedResolver::new(), |r, a| {
        let name = a
            .document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        r.with_answer(name, a.url.clone())
    });
    Box::new(resolver)
}

async fn run(cli: &Cli) -> Result<BatchReport> {
    let settings = load_settings(cli)?;
    let runner = BatchRunner::new(settings).context("Failed to initialise HTTP client")?;

    let report = match &cli.command {
        Commands::Compare { pairs } => runner.run_pairs(pairs).await?,
        Commands::Auto {
            seed,
            documents,
            accept_best,
            assignments,
        } => {
            let resolver = resolver_for(*accept_best, assignments);
            runner
                .run_auto(seed, documents, resolver.as_ref())
                .await
                .with_context(|| format!("Auto-match against {seed} failed"))?
        }
    };
    Ok(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing_with_level(&cli.log_level);

    let report = run(&cli).await?;
    let rendered = match cli.format {
        OutputFormat::Json => report.to_json_pretty(),
        OutputFormat::Markdown => report.to_markdown(),
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if cli.metrics {
        eprintln!("{}", telemetry::metrics_text());
    }

    tracing::info!(pairs = report.pairs.len(), "Done");
    Ok(())
}
