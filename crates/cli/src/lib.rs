use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use codemap_analysis::{AnalysisPipeline, OpenAiCompletionService, PipelineState};
use codemap_chunker::{Chunker, ChunkerConfig};
use codemap_scanner::{load_project, ProjectFiles};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod output;

pub use config::CliConfig;
use output::{AnalyzeOutput, AnalyzePayload, ChunkOutput};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

/// Pretty JSON to `output`, or stdout when no file is given
fn emit<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, text + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
            Ok(())
        }
        None => print_stdout(&text),
    }
}

#[derive(Parser)]
#[command(name = "codemap")]
#[command(about = "Chunk a project and describe every file with a language model", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML configuration file (analysis, openai and scan sections)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project directory and print its parsed files
    Parse(ParseArgs),

    /// Parse and split a project into chunks
    Chunk(ChunkArgs),

    /// Analyse every file of a project and print the project analysis
    Analyze(AnalyzeArgs),
}

#[derive(Args, Default)]
struct ChunkFlags {
    /// Maximum chunk size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters repeated between consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,
}

impl ChunkFlags {
    fn apply(&self, config: &mut ChunkerConfig) {
        if let Some(size) = self.chunk_size {
            config.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.chunk_overlap = overlap;
        }
    }
}

#[derive(Args)]
struct ParseArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Write JSON to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ChunkArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    #[command(flatten)]
    chunking: ChunkFlags,

    /// Write JSON to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Project directory (defaults to current directory)
    path: Option<PathBuf>,

    /// JSON file with `files` (and optionally `chunks`) instead of a directory
    #[arg(long, conflicts_with = "path")]
    payload: Option<PathBuf>,

    #[command(flatten)]
    chunking: ChunkFlags,

    /// Files analysed concurrently
    #[arg(long)]
    batch_size: Option<usize>,

    /// Overall deadline of the run in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Chat model id
    #[arg(long)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,

    /// Include resolved file relationships and the dependency tree
    #[arg(long)]
    relationships: bool,

    /// Write JSON to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn apply(&self, config: &mut CliConfig) {
        self.chunking.apply(&mut config.analysis.chunker);
        if let Some(batch_size) = self.batch_size {
            config.analysis.batch_size = batch_size;
        }
        if let Some(timeout) = self.timeout_secs {
            config.analysis.timeout_secs = timeout;
        }
        if let Some(model) = &self.model {
            config.openai.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.openai.base_url = base_url.clone();
        }
    }
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // HTTP client internals stay quiet unless verbose
    if !cli.verbose {
        builder.filter_module("hyper_util", log::LevelFilter::Off);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse(args) => run_parse(args, config).await?,
        Commands::Chunk(args) => {
            args.chunking.apply(&mut config.analysis.chunker);
            run_chunk(args, config).await?
        }
        Commands::Analyze(args) => {
            args.apply(&mut config);
            run_analyze(args, config).await?
        }
    }
    Ok(())
}

async fn load(path: &Path, config: &CliConfig) -> Result<ProjectFiles> {
    let root = path.canonicalize().context("Invalid project path")?;
    load_project(&root, config.scan.clone())
        .await
        .with_context(|| format!("Failed to load project {}", root.display()))
}

/// Scan and parse a project
async fn run_parse(args: ParseArgs, config: CliConfig) -> Result<()> {
    config.validate()?;
    let project = load(&args.path, &config).await?;
    emit(&project, args.output.as_deref())
}

/// Parse a project and chunk every parsed file
async fn run_chunk(args: ChunkArgs, config: CliConfig) -> Result<()> {
    config.validate()?;
    let chunker = Chunker::new(config.analysis.chunker.clone())?;
    let project = load(&args.path, &config).await?;

    let chunks = chunker.chunk_files(&project.files);
    let stats = Chunker::get_stats(&chunks);
    log::info!("{stats}");

    let output = ChunkOutput {
        summary: project.summary,
        stats,
        chunks,
    };
    emit(&output, args.output.as_deref())
}

/// Run the full pipeline against a directory or a JSON payload
async fn run_analyze(args: AnalyzeArgs, config: CliConfig) -> Result<()> {
    config.validate()?;

    let service = OpenAiCompletionService::new(config.openai.clone())
        .context("Failed to configure the completion service")?;
    log::info!(
        "Analysing with {} at {} (batch size {}, timeout {}s)",
        config.openai.model,
        config.openai.base_url,
        config.analysis.batch_size,
        config.analysis.timeout_secs
    );
    let pipeline = AnalysisPipeline::new(config.analysis.clone(), Arc::new(service))?;

    let (files, chunks) = match &args.payload {
        Some(path) => {
            let payload = read_payload(path)?;
            (payload.files, payload.chunks)
        }
        None => {
            let root = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
            (load(&root, &config).await?.files, None)
        }
    };
    if files.is_empty() {
        bail!("No files to analyse");
    }

    let progress = tokio::spawn(log_progress(pipeline.subscribe()));
    let result = match chunks {
        Some(chunks) => pipeline.run(&files, chunks).await,
        None => pipeline.run_files(&files).await,
    };
    // Closing the sender lets the watcher log the final state and exit
    drop(pipeline);
    if let Err(e) = progress.await {
        log::debug!("Progress watcher stopped: {e}");
    }
    let analysis = result.context("Project analysis failed")?;

    log::info!(
        "Analysed {} of {} files ({} skipped)",
        analysis.summary.analyzed_files,
        analysis.summary.total_files,
        analysis.summary.skipped_files
    );
    for (filename, skip) in &analysis.skipped_files {
        match &skip.error {
            Some(error) => log::warn!("Skipped {filename} ({}): {error}", skip.reason),
            None => log::debug!("Skipped {filename} ({})", skip.reason),
        }
    }

    let output = AnalyzeOutput::new(analysis, args.relationships);
    emit(&output, args.output.as_deref())
}

fn read_payload(path: &Path) -> Result<AnalyzePayload> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let payload: AnalyzePayload = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid payload {}", path.display()))?;
    log::debug!(
        "Payload: {} files, {} chunks",
        payload.files.len(),
        payload.chunks.as_ref().map_or(0, Vec::len)
    );
    Ok(payload)
}

async fn log_progress(mut states: tokio::sync::watch::Receiver<PipelineState>) {
    while states.changed().await.is_ok() {
        let state = *states.borrow_and_update();
        if let Some(message) = progress_message(state) {
            log::info!("{message}");
        }
    }
}

fn progress_message(state: PipelineState) -> Option<String> {
    match state {
        PipelineState::Idle => None,
        PipelineState::Chunking => Some("Chunking files".to_string()),
        PipelineState::Analyzing { batch, batches } => {
            Some(format!("Analysing batch {batch}/{batches}"))
        }
        PipelineState::Aggregated => Some("Results aggregated".to_string()),
        PipelineState::Failed => Some("Analysis run failed".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_flags_override_config() {
        let cli = Cli::try_parse_from([
            "codemap",
            "analyze",
            "proj",
            "--chunk-size",
            "500",
            "--chunk-overlap",
            "50",
            "--batch-size",
            "3",
            "--timeout-secs",
            "9",
            "--model",
            "gpt-4o",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };

        let mut config = CliConfig::default();
        args.apply(&mut config);
        assert_eq!(args.path.as_deref(), Some(Path::new("proj")));
        assert_eq!(config.analysis.chunker, ChunkerConfig::with_size(500, 50));
        assert_eq!(config.analysis.batch_size, 3);
        assert_eq!(config.analysis.timeout_secs, 9);
        assert_eq!(config.openai.model, "gpt-4o");
    }

    #[test]
    fn test_final_states_are_reported() {
        assert_eq!(progress_message(PipelineState::Idle), None);
        assert_eq!(
            progress_message(PipelineState::Analyzing {
                batch: 2,
                batches: 5
            })
            .as_deref(),
            Some("Analysing batch 2/5")
        );
        assert_eq!(
            progress_message(PipelineState::Aggregated).as_deref(),
            Some("Results aggregated")
        );
        assert_eq!(
            progress_message(PipelineState::Failed).as_deref(),
            Some("Analysis run failed")
        );
    }

    #[tokio::test]
    async fn test_watcher_sees_the_final_state() {
        let (sender, receiver) = tokio::sync::watch::channel(PipelineState::Idle);
        let watcher = tokio::spawn(log_progress(receiver.clone()));
        sender.send_replace(PipelineState::Aggregated);
        drop(sender);

        watcher.await.unwrap();
        assert_eq!(*receiver.borrow(), PipelineState::Aggregated);
    }

    #[test]
    fn test_payload_conflicts_with_path() {
        let parsed = Cli::try_parse_from(["codemap", "analyze", "proj", "--payload", "p.json"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["codemap", "parse", ".", "--quiet", "--config", "c.toml"])
            .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config.as_deref(), Some(Path::new("c.toml")));
    }
}
