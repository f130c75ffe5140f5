mod condition;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use cep_core::event::Stream;
use cep_core::optimizer::Optimizer;
use cep_core::pattern::{LeafDesc, Pattern, TopOp, Window};
use cep_core::stats::collect_statistics;
use cep_io::csv::{read_events, write_matches, CsvSchema};
use cep_worker::CepEngine;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "cep", about = "Run a complex-event pattern over a CSV event log")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one pattern over a CSV event log and write matches to a file.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// CSV file of events, one per line.
    #[arg(long)]
    input: PathBuf,

    /// Where to write matches (original protocol: events, blank-line separated).
    #[arg(long)]
    output: PathBuf,

    /// Comma-separated field names, in column order.
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,

    /// Which key selects the event type.
    #[arg(long)]
    event_type_key: String,

    /// Which key selects the timestamp (YYYYMMDDHHMM).
    #[arg(long)]
    event_time_key: String,

    /// One leaf per flag, `name:event_type`, in pattern declaration order.
    #[arg(long = "leaf")]
    leaves: Vec<String>,

    #[arg(long, value_enum, default_value = "seq")]
    top_op: TopOpArg,

    /// Window width in milliseconds of the packed timestamp unit; omit for unbounded.
    #[arg(long)]
    within_ms: Option<i64>,

    /// One binary comparison per flag, e.g. `a.open>b.open`; conjoined.
    #[arg(long = "cond")]
    conditions: Vec<String>,

    #[arg(long, value_enum, default_value = "trivial")]
    optimizer: OptimizerArg,
}

#[derive(Clone, clap::ValueEnum)]
enum TopOpArg {
    Seq,
    And,
}

#[derive(Clone, clap::ValueEnum)]
enum OptimizerArg {
    Trivial,
    AscendingFrequency,
    Greedy,
    DpLeftDeep,
    DpBushy,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let leaves: Vec<LeafDesc> = args
        .leaves
        .iter()
        .map(|spec| {
            let (name, event_type) = spec
                .split_once(':')
                .with_context(|| format!("leaf {spec:?} is not in name:event_type form"))?;
            Ok(LeafDesc::new(event_type, name))
        })
        .collect::<Result<_>>()?;
    anyhow::ensure!(!leaves.is_empty(), "at least one --leaf is required");

    let condition = condition::parse_conditions(&args.conditions)?;
    let window = match args.within_ms {
        Some(ms) => Window::Bounded(Duration::from_millis(ms as u64)),
        None => Window::Unbounded,
    };
    let top_op = match args.top_op {
        TopOpArg::Seq => TopOp::Seq,
        TopOpArg::And => TopOp::And,
    };
    let mut pattern = Pattern::new(top_op, leaves, condition, window);

    let schema = CsvSchema {
        keys: args.keys,
        event_type_key: args.event_type_key,
        event_time_key: args.event_time_key,
    };
    let reader = BufReader::new(File::open(&args.input).with_context(|| format!("opening {:?}", args.input))?);
    let events = read_events(&schema, reader)?;
    info!(count = events.len(), "loaded events");

    let optimizer = match args.optimizer {
        OptimizerArg::Trivial => Optimizer::Trivial,
        OptimizerArg::AscendingFrequency => Optimizer::AscendingFrequency,
        OptimizerArg::Greedy => Optimizer::Greedy,
        OptimizerArg::DpLeftDeep => Optimizer::DpLeftDeep,
        OptimizerArg::DpBushy => Optimizer::DpBushy,
    };

    if !matches!(optimizer, Optimizer::Trivial) {
        let sample = Stream::new();
        for event in &events {
            sample.push_with_counter(event.clone());
        }
        sample.close();
        pattern.statistics = collect_statistics(&pattern.args, &pattern.condition, &sample);
    }

    let mut engine = CepEngine::new();
    let matches = engine.submit("cli-pattern", pattern, Some(optimizer))?;

    for event in events {
        engine.push_event(event);
    }
    engine.close()?;

    let collected: Vec<_> = matches.try_iter().collect();
    info!(count = collected.len(), "pattern produced matches");

    let writer = BufWriter::new(File::create(&args.output).with_context(|| format!("creating {:?}", args.output))?);
    write_matches(writer, &collected)?;
    Ok(())
}
