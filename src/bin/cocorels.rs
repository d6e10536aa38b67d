use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cocorels::{
    is_ethical_query, CocorelsConfig, ConflictResolver, Context, DilemmaScheduler, EthicalProcessor,
    ProcessingOutcome, TaskType,
};

#[derive(Parser)]
#[command(name = "cocorels", about = "Score dilemmas against an ethical trait taxonomy")]
struct Cli {
    /// Dilemma queries, processed in order through one resolver
    #[arg(required = true)]
    queries: Vec<String>,

    /// JSON configuration file (taxonomy and engine settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// duty or wisdom
    #[arg(short, long, default_value_t = TaskType::Wisdom)]
    task_type: TaskType,

    /// Context shared by every query, as a JSON object
    #[arg(long)]
    context: Option<String>,

    /// Seed the resolver's fault injection for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let context = match parse_context(cli.context.as_deref()) {
        Ok(context) => context,
        Err(message) => {
            eprintln!("cocorels: {message}");
            return ExitCode::from(2);
        }
    };

    let config = match CocorelsConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            emit(&ProcessingOutcome::rejected(err.to_string()), cli.pretty);
            return ExitCode::FAILURE;
        }
    };

    let resolver = match cli.seed {
        Some(seed) => ConflictResolver::with_seed(config.engine.decay, seed),
        None => ConflictResolver::new(config.engine.decay),
    };
    let threshold = config.engine.complexity_threshold;
    let processor = EthicalProcessor::with_resolver(config.engine, resolver);
    let mut scheduler = DilemmaScheduler::with_processor(processor);

    for query in &cli.queries {
        if !is_ethical_query(query, threshold) {
            eprintln!("cocorels: query of {} characters exceeds complexity threshold {threshold}", query.chars().count());
            return ExitCode::from(2);
        }
        scheduler.enqueue(query.as_str(), context.clone(), cli.task_type);
    }

    let mut status = ExitCode::SUCCESS;
    for outcome in scheduler.process_all(&config.taxonomy) {
        if !outcome.is_completed() {
            status = ExitCode::FAILURE;
        }
        emit(&outcome, cli.pretty);
    }
    status
}

fn parse_context(raw: Option<&str>) -> Result<Context, String> {
    let Some(raw) = raw else {
        return Ok(Context::new());
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err("--context must be a JSON object".to_string()),
        Err(err) => Err(format!("--context is not valid JSON: {err}")),
    }
}

fn emit(outcome: &ProcessingOutcome, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(outcome)
    } else {
        serde_json::to_string(outcome)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("cocorels: failed to render outcome: {err}"),
    }
}
