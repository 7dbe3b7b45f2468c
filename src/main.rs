use std::collections::HashMap;
use std::path::Path;
use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use deptree::adapters::{
    CollectingConsumer, FilePresenter, FileTraceReader, StdoutPresenter, TracingTelemetryLogger,
};
use deptree::cli::{Args, OutputFormat};
use deptree::config;
use deptree::dependency_tree::domain::AggregatedSnapshot;
use deptree::engine::{DependencyTreeEngine, EngineConfig, SourceHandle};
use deptree::handlers::RuleHandlerRegistry;
use deptree::ports::{OutputPresenter, TraceBatch, TraceSource};
use deptree::shared::{ExitCode, Result};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "deptree=debug" } else { "deptree=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    // Load configuration: explicit path wins, then auto-discovery
    let config = match &args.config {
        Some(path) => Some(config::load_config_from_path(path)?),
        None => config::discover_config(Path::new("."))?,
    };
    let config = config.unwrap_or_default();

    let format = match args.format {
        Some(format) => format,
        None => config
            .format
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: String| anyhow::anyhow!(e))?
            .unwrap_or(OutputFormat::Json),
    };
    let hide_invisible = args.hide_invisible || config.hide_invisible.unwrap_or(false);
    let engine_config = EngineConfig {
        event_capacity: config
            .event_capacity
            .unwrap_or_else(|| EngineConfig::default().event_capacity),
    };

    // Read the trace up front so parse errors surface before the engine spins up
    let reader = FileTraceReader::new();
    let batches = reader.read_batches(&args.trace)?;

    // Assemble the pipeline (explicit dependency injection, no ambient lookup)
    let registry = RuleHandlerRegistry::with_default_handlers();
    let roots = registry.root_nodes();
    let engine = DependencyTreeEngine::start(
        registry,
        Some(Arc::new(TracingTelemetryLogger::new())),
        engine_config,
    );
    let collector = Arc::new(CollectingConsumer::new());
    let _link = engine.link_consumer(collector.clone());

    // Replay: one engine source per (source, target framework) pair
    let mut handles: HashMap<(String, String), SourceHandle> = HashMap::new();
    for batch in batches {
        let key = (
            batch.source().to_string(),
            batch.target_framework().as_str().to_string(),
        );
        let handle = handles
            .entry(key)
            .or_insert_with(|| {
                engine.add_source(batch.source(), batch.target_framework().clone())
            })
            .clone();
        match batch {
            TraceBatch::Updates { updates, .. } => handle.send_updates(updates).await?,
            TraceBatch::OrderedItems { items, .. } => handle.send_ordered_items(items).await?,
        }
    }
    for handle in handles.values() {
        handle.complete().await?;
    }
    drop(handles);

    engine.join().await?;

    if let Some(fault) = collector.fault() {
        anyhow::bail!("pipeline faulted during replay: {}", fault);
    }

    let snapshot = match collector.latest() {
        Some((snapshot, _versions)) => snapshot,
        None => Arc::new(AggregatedSnapshot::empty()),
    };

    let content = format
        .create_formatter(args.output.is_none())
        .format(&snapshot, &roots, hide_invisible)?;
    let presenter: Box<dyn OutputPresenter> = match &args.output {
        Some(path) => Box::new(FilePresenter::new(path)),
        None => Box::new(StdoutPresenter::new()),
    };
    presenter.present(&content)
}
