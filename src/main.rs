//! medrag - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use medrag::{
    cli::{Args, Commands, Config, Verbosity},
    display::{BuildProgress, DisplayManager},
    embedding::{Embedder, OllamaEmbedder},
    generation::OllamaGenerator,
    prompt::PromptBuilder,
    knowledge::{builder::Extraction, snapshot, KnowledgeStoreBuilder},
    query::{InputHandler, QueryPipeline, QuerySession},
    telemetry::{PipelineEvent, PipelineObserver, TelemetryCollector},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbosity());

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    match &args.command {
        Commands::Build { .. } => run_build(&config).await,
        Commands::Ask { .. } => run_ask(&config, args.verbosity()).await,
        Commands::Query { question, .. } => run_query(&config, question, args.verbosity()).await,
        Commands::Probe { texts } => run_probe(&config, texts).await,
        Commands::Config => show_config(&config),
    }
}

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(verbosity.filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let client = OllamaEmbedder::with_config(
        &config.ollama_url(),
        &config.embedding.model,
        config.embedding_timeout(),
    )?;
    Ok(Arc::new(client))
}

/// Offline build; any embedding failure exits non-zero with no snapshot
async fn run_build(config: &Config) -> Result<()> {
    let source_path = config.source_path();
    let snapshot_path = config.snapshot_path();

    let source = std::fs::read_to_string(&source_path)
        .with_context(|| format!("Failed to read knowledge source {}", source_path.display()))?;

    let collector = TelemetryCollector::new();
    let progress = Arc::new(BuildProgress::new(collector.clone()));
    let extraction = Extraction::from_mode(
        config.knowledge.mode,
        &config.knowledge.heading_marker,
        config.chunk_config(),
    );

    let builder = KnowledgeStoreBuilder::new(embedder(config)?)
        .with_extraction(extraction)
        .with_observer(progress.clone());

    let result = builder.build_to(&source, &snapshot_path).await;
    progress.finish();

    let kb = result.context("Knowledge base build aborted, no snapshot written")?;
    println!(
        "{} {} records written to {}",
        "✓".green(),
        kb.len(),
        snapshot_path.display()
    );
    Ok(())
}

/// Load the snapshot and wire up the query pipeline
async fn load_pipeline(config: &Config, collector: &TelemetryCollector) -> Result<QueryPipeline> {
    let snapshot_path = config.snapshot_path();
    let kb = snapshot::load(&snapshot_path)?;
    collector.on_event(&PipelineEvent::SnapshotLoaded { records: kb.len() });

    let generator = OllamaGenerator::with_config(
        &config.ollama_url(),
        &config.generation.model,
        config.generation_timeout(),
    )?;
    if !generator.health_check().await {
        tracing::warn!(url = %generator.base_url(), "Ollama is not reachable, answers will fail");
    }

    Ok(QueryPipeline::new(kb, embedder(config)?, Arc::new(generator))
        .with_top_k(config.retrieval.top_k)
        .with_prompt_builder(PromptBuilder::with_template(config.prompt.clone()))
        .with_observer(Arc::new(collector.clone())))
}

async fn run_ask(config: &Config, verbosity: Verbosity) -> Result<()> {
    let collector = TelemetryCollector::new();
    let pipeline = load_pipeline(config, &collector).await?;
    let display = DisplayManager::new(verbosity.show_sources());

    display.show_info(&format!(
        "{} records loaded from {}",
        pipeline.knowledge_base().len(),
        config.snapshot_path().display()
    ));
    if pipeline.knowledge_base().is_empty() {
        display.show_warning("knowledge base is empty; answers will have no reference material");
    }
    display.show_banner(
        env!("CARGO_PKG_VERSION"),
        pipeline.generator_model(),
        pipeline.knowledge_base().len(),
    );

    let history_path = dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".medrag_history");
    let mut input = InputHandler::with_history(history_path)?;

    let mut session = QuerySession::new(pipeline, display);
    session.run(&mut input).await?;

    if let Err(e) = input.save_history() {
        tracing::warn!(error = %e, "could not save history");
    }
    if verbosity.show_sources() {
        collector.display_summary();
    }
    Ok(())
}

async fn run_query(config: &Config, question: &str, verbosity: Verbosity) -> Result<()> {
    let collector = TelemetryCollector::new();
    let pipeline = load_pipeline(config, &collector).await?;
    let display = DisplayManager::new(verbosity.show_sources());

    let answer = pipeline.ask(question).await?;
    display.show_answer(&answer);
    Ok(())
}

async fn run_probe(config: &Config, texts: &[String]) -> Result<()> {
    let embedder = embedder(config)?;

    for text in texts {
        let embedding = embedder.embed(text).await?;
        let head: Vec<f64> = embedding.iter().take(5).copied().collect();

        println!("\n{} {}", "Text:".bold(), text);
        println!("  Dimension:    {}", embedding.len());
        println!("  First values: {:?}", head);
    }
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "medrag configuration".bold().cyan());
    if let Some(path) = Config::default_path() {
        println!("{}", format!("# default location: {}", path.display()).dimmed());
    }
    println!("\n{}", config.to_toml()?);
    Ok(())
}
