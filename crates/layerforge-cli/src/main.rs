//! layerforge command-line interface

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layerforge_common::{Notifier, TracingNotifier};
use layerforge_generation::{GenerationRequest, LayerPaths, ModuleGenerator, ProcedureAnalysis};
use layerforge_rollback::{JournalStore, RollbackEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "layerforge", version, about = "Layered API code generation with transactional rollback")]
struct Cli {
    /// Directory where change journals are stored
    #[arg(long, global = true, default_value = "rollbacks")]
    journal_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate layered artifacts for a module
    Generate {
        /// Target project root directory
        #[arg(long)]
        project: PathBuf,
        /// Module the artifacts belong to (e.g. Orders)
        #[arg(long)]
        module: String,
        /// Logical method name driving artifact naming; defaults to the module
        #[arg(long)]
        method: Option<String>,
        /// Database label used by the infrastructure layer
        #[arg(long)]
        database: String,
        /// Operation to generate; repeat for a batch (get, post, getbyid, put, delete)
        #[arg(long = "op", required = true)]
        operations: Vec<String>,
        /// JSON file with stored-procedure analysis for DTO generation
        #[arg(long)]
        analysis: Option<PathBuf>,
    },
    /// Inspect and replay change journals
    #[command(subcommand)]
    Rollback(RollbackCommands),
}

#[derive(Subcommand)]
enum RollbackCommands {
    /// List available journals, newest first
    List,
    /// Reverse a committed journal and consume it
    Run {
        /// Journal file to roll back
        journal: PathBuf,
    },
    /// Remove journals older than the age threshold
    Clean {
        /// Maximum journal age in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier::new());
    let engine = RollbackEngine::new(JournalStore::new(&cli.journal_dir), notifier.clone());

    match cli.command {
        Commands::Generate {
            project,
            module,
            method,
            database,
            operations,
            analysis,
        } => {
            let analysis = match analysis {
                Some(path) => {
                    let raw = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading analysis file {}", path.display()))?;
                    let parsed: ProcedureAnalysis = serde_json::from_str(&raw)
                        .with_context(|| format!("parsing analysis file {}", path.display()))?;
                    Some(parsed)
                }
                None => None,
            };

            let request = GenerationRequest {
                method_name: method.unwrap_or_else(|| module.clone()),
                module,
                database,
                operations,
                analysis,
            };
            let paths =
                LayerPaths::from_project_root(&project, &request.module, &request.database);

            let generator = ModuleGenerator::new(engine, notifier)?;
            let summary = generator
                .generate(&request, &paths)
                .await
                .context("generation failed")?;

            if !summary.generated.is_empty() {
                println!("Generated: {}", summary.generated.join(", "));
            }
            if !summary.unchanged.is_empty() {
                println!("Already up to date: {}", summary.unchanged.join(", "));
            }
            if !summary.skipped.is_empty() {
                println!("Skipped: {}", summary.skipped.join(", "));
            }
        }
        Commands::Rollback(RollbackCommands::List) => {
            let journals = engine.available_rollbacks().await?;
            if journals.is_empty() {
                println!("No journals found.");
            }
            for (path, tx) in journals {
                println!(
                    "{}  {} {} {}  {} change(s)",
                    tx.created_at.format("%Y-%m-%d %H:%M:%S"),
                    tx.module,
                    tx.method_name,
                    tx.operation,
                    tx.changes.len()
                );
                println!("    {}", path.display());
            }
        }
        Commands::Rollback(RollbackCommands::Run { journal }) => {
            let report = engine.execute_rollback(&journal).await?;
            println!(
                "Reverted {} change(s), {} already undone.",
                report.reverted, report.skipped
            );
            for warning in &report.warnings {
                println!("  warning: {}", warning);
            }
        }
        Commands::Rollback(RollbackCommands::Clean { days }) => {
            let removed = engine.clean_old_rollbacks(days).await?;
            println!("Removed {} expired journal(s).", removed.len());
        }
    }

    Ok(())
}
