use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::FiltersConfig;
use crate::filter::{self, Filter};
use crate::records::{self, Record};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a filter and print its tree
    Parse {
        /// Filter string, e.g. "&(group=admin)(active=yes)"
        filter: String,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the JSON Lines records that match a filter
    Match(MatchArgs),

    /// Compile every filter in a configuration file
    Check {
        /// Filter configuration file (YAML)
        #[arg(short, long, env = "LDAPFILTER_CONFIG")]
        config: PathBuf,
    },
}

#[derive(Args)]
pub struct MatchArgs {
    /// Filter string
    #[arg(short, long, conflicts_with_all = ["config", "name"])]
    pub filter: Option<String>,

    /// Filter configuration file (YAML)
    #[arg(short, long, requires = "name")]
    pub config: Option<PathBuf>,

    /// Name of the filter to use from the configuration file
    #[arg(short, long)]
    pub name: Option<String>,

    /// Input JSON Lines file ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Output file ("-" for stdout)
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// Only print the number of matching records
    #[arg(long)]
    pub count: bool,

    /// Number of threads (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse { filter, json } => run_parse(&filter, json),
        Command::Match(args) => run_match(&args),
        Command::Check { config } => run_check(&config),
    }
}

fn run_parse(expr: &str, json: bool) -> Result<()> {
    let filter = filter::parse(expr).with_context(|| format!("CLI: Invalid filter {:?}", expr))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&filter)?);
    } else {
        println!("{}", filter);
    }
    Ok(())
}

fn run_check(path: &Path) -> Result<()> {
    let compiled = FiltersConfig::load(path)?.compile()?;
    for (name, filter) in &compiled.filters {
        println!("{}: {}", name, filter);
    }
    tracing::info!("{} filters OK", compiled.filters.len());
    Ok(())
}

/// Resolve the filter from `--filter` or from `--config`/`--name`.
pub fn resolve_filter(args: &MatchArgs) -> Result<Filter> {
    if let Some(expr) = &args.filter {
        return filter::parse(expr).with_context(|| format!("CLI: Invalid filter {:?}", expr));
    }

    let (Some(path), Some(name)) = (&args.config, &args.name) else {
        anyhow::bail!("CLI: Either --filter or --config with --name is required");
    };
    let compiled = FiltersConfig::load(path)?.compile()?;
    Ok(compiled.get(name)?.clone())
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("Input: Failed to open {:?}", path))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: &Path) -> Result<BufWriter<Box<dyn Write>>> {
    let writer: Box<dyn Write> = if path == Path::new("-") {
        Box::new(std::io::stdout())
    } else {
        let file =
            File::create(path).with_context(|| format!("CLI: Failed to create {:?}", path))?;
        Box::new(file)
    };
    Ok(BufWriter::new(writer))
}

/// Evaluate one shared tree against every record in parallel. Input order
/// is preserved.
pub fn select_matching<'r>(filter: &Filter, records: &'r [Record]) -> Vec<&'r Record> {
    records
        .par_iter()
        .filter(|record| filter.matches(&record.input))
        .collect()
}

fn run_match(args: &MatchArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("CLI: Failed to initialize thread pool")?;
    }

    let filter = resolve_filter(args)?;
    tracing::info!("Filter: {}", filter);

    let records = records::read_records(open_input(&args.input)?)?;
    let start = std::time::Instant::now();
    let matched = select_matching(&filter, &records);

    let mut out = open_output(&args.output)?;
    if args.count {
        writeln!(out, "{}", matched.len())?;
    } else {
        for record in &matched {
            writeln!(out, "{}", record.line)?;
        }
    }
    out.flush().context("CLI: Failed to flush output")?;

    tracing::info!(
        "Matched {} of {} records in {:.3}s",
        matched.len(),
        records.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
