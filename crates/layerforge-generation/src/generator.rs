//! Batch orchestration of layer generation
//!
//! Each requested operation runs inside its own rollback transaction. A
//! failing operation is committed and immediately rolled back so the target
//! project is left exactly as the operation found it; operations that
//! already committed stay in place.

use std::sync::Arc;

use layerforge_common::Notifier;
use layerforge_rollback::RollbackEngine;
use tracing::{info, warn};

use crate::error::GenerationError;
use crate::layers::{self, LayerContext};
use crate::models::{GenerationRequest, LayerPaths};
use crate::standards::OperationKind;
use crate::templates::TemplateRenderer;

/// What a batch run produced
#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    /// Operation labels that generated and committed successfully
    pub generated: Vec<String>,
    /// Operation names that were not recognized and were skipped
    pub skipped: Vec<String>,
    /// Operation labels that ran but produced no new artifacts
    pub unchanged: Vec<String>,
}

/// Drives the per-layer ensure steps for a generation request
pub struct ModuleGenerator {
    engine: RollbackEngine,
    renderer: TemplateRenderer,
    notifier: Arc<dyn Notifier>,
}

impl ModuleGenerator {
    /// Creates a generator over a rollback engine, reporting through
    /// `notifier`
    pub fn new(engine: RollbackEngine, notifier: Arc<dyn Notifier>) -> Result<Self, GenerationError> {
        Ok(ModuleGenerator {
            engine,
            renderer: TemplateRenderer::new()?,
            notifier,
        })
    }

    /// Runs the request's operations in order, one transaction each
    ///
    /// Unknown operation names are skipped with a warning and do not affect
    /// their siblings. A failing operation is rolled back and aborts the
    /// rest of the batch; the error returned is the generation failure, not
    /// any secondary rollback problem. When the journal itself cannot be
    /// written, the operation's changes are reverted directly from the
    /// in-memory transaction so no half-generated artifacts remain.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        paths: &LayerPaths,
    ) -> Result<GenerationSummary, GenerationError> {
        let mut summary = GenerationSummary::default();

        for operation in &request.operations {
            let kind = match OperationKind::parse(operation) {
                Some(kind) => kind,
                None => {
                    self.notifier
                        .warn(&format!("Unsupported operation skipped: {}", operation));
                    summary.skipped.push(operation.clone());
                    continue;
                }
            };

            let mut tx = self
                .engine
                .begin(&request.module, &request.method_name, kind.as_str());

            let ctx = LayerContext {
                module: &request.module,
                method_name: &request.method_name,
                database: &request.database,
                kind,
                config: kind.config(),
                analysis: request.analysis.as_ref(),
                renderer: &self.renderer,
                notifier: &self.notifier,
            };

            let result = self.run_operation(&ctx, paths, &mut tx).await;

            match result {
                Ok(()) => {
                    if tx.is_empty() {
                        info!(operation = kind.as_str(), "nothing to generate");
                        summary.unchanged.push(kind.as_str().to_string());
                    } else {
                        match self.engine.commit(&tx).await {
                            Ok(_) => {
                                info!(
                                    operation = kind.as_str(),
                                    changes = tx.changes.len(),
                                    "operation generated"
                                );
                                summary.generated.push(kind.as_str().to_string());
                            }
                            Err(commit_err) => {
                                // Changes without a journal cannot be
                                // reversed later, so they are reverted
                                // right now from the in-memory transaction.
                                self.notifier.warn(&format!(
                                    "Committing journal for {} failed: {}; reverting changes",
                                    kind.as_str(),
                                    commit_err
                                ));
                                self.engine.revert_uncommitted(&tx).await;
                                return Err(commit_err.into());
                            }
                        }
                    }
                }
                Err(err) => {
                    self.notifier.warn(&format!(
                        "Generation of {} failed: {}; rolling back",
                        kind.as_str(),
                        err
                    ));
                    if !tx.is_empty() {
                        // Committing makes the journal durable so the
                        // reversal runs from the same data a later manual
                        // rollback would use.
                        match self.engine.commit(&tx).await {
                            Ok(journal) => {
                                if let Err(rollback_err) =
                                    self.engine.execute_rollback(&journal).await
                                {
                                    warn!(error = %rollback_err, "rollback after failed generation also failed");
                                    self.notifier.warn(&format!(
                                        "Rollback after failure did not complete: {}",
                                        rollback_err
                                    ));
                                }
                            }
                            Err(commit_err) => {
                                self.notifier.warn(&format!(
                                    "Committing journal for {} failed: {}; reverting changes",
                                    kind.as_str(),
                                    commit_err
                                ));
                                self.engine.revert_uncommitted(&tx).await;
                            }
                        }
                    }
                    return Err(err);
                }
            }
        }

        Ok(summary)
    }

    async fn run_operation(
        &self,
        ctx: &LayerContext<'_>,
        paths: &LayerPaths,
        tx: &mut layerforge_rollback::Transaction,
    ) -> Result<(), GenerationError> {
        layers::controller::ensure(ctx, &paths.controller_dir, tx).await?;
        layers::application::ensure(ctx, &paths.application_dir, tx).await?;
        layers::domain::ensure(ctx, &paths.domain_dir, tx).await?;
        layers::infrastructure::ensure(ctx, &paths.infrastructure_dir, tx).await?;
        layers::registration::ensure(ctx, &paths.registration_file, tx).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use layerforge_common::{MemoryNotifier, Notifier};
    use layerforge_rollback::JournalStore;
    use tempfile::TempDir;
    use tokio::fs;

    use super::*;

    const REGISTRATION: &str = "\
namespace Shop.Config;

public static class DependencyInjection
{
    public static void ConfigureRepositories(this IServiceCollection services)
    {
    }

    public static void ConfigureAppServices(this IServiceCollection services)
    {
    }
}
";

    async fn project_in(temp_dir: &TempDir) -> LayerPaths {
        let project = temp_dir.path().join("Shop");
        let paths = LayerPaths::from_project_root(&project, "Orders", "Warehouse");
        fs::create_dir_all(paths.registration_file.parent().unwrap())
            .await
            .unwrap();
        fs::write(&paths.registration_file, REGISTRATION).await.unwrap();
        paths
    }

    fn generator_in(temp_dir: &TempDir, notifier: Arc<dyn Notifier>) -> ModuleGenerator {
        let engine = RollbackEngine::new(
            JournalStore::new(temp_dir.path().join("rollbacks")),
            notifier.clone(),
        );
        ModuleGenerator::new(engine, notifier).unwrap()
    }

    fn request(operations: &[&str]) -> GenerationRequest {
        GenerationRequest {
            module: "Orders".to_string(),
            method_name: "Orders".to_string(),
            database: "Warehouse".to_string(),
            operations: operations.iter().map(|s| s.to_string()).collect(),
            analysis: None,
        }
    }

    #[tokio::test]
    async fn test_batch_generates_all_layers_and_journals_per_operation() {
        let temp_dir = TempDir::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let generator = generator_in(&temp_dir, notifier);
        let paths = project_in(&temp_dir).await;

        let summary = generator
            .generate(&request(&["get", "post"]), &paths)
            .await
            .unwrap();

        assert_eq!(summary.generated, vec!["Get", "Post"]);
        assert!(summary.skipped.is_empty());

        assert!(paths.controller_dir.join("OrdersController.cs").exists());
        assert!(paths.application_dir.join("SearchOrders.cs").exists());
        assert!(paths.application_dir.join("Orders.cs").exists());
        assert!(paths
            .domain_dir
            .join("Interfaces")
            .join("ISearchOrdersRepository.cs")
            .exists());
        assert!(paths
            .infrastructure_dir
            .join("SearchOrdersRepository.cs")
            .exists());

        let registration = fs::read_to_string(&paths.registration_file).await.unwrap();
        assert!(registration.contains("ISearchOrdersRepository, SearchOrdersRepository"));
        assert!(registration.contains("services.AddScoped<Orders>();"));

        // One journal per committed operation.
        let mut journals = fs::read_dir(temp_dir.path().join("rollbacks")).await.unwrap();
        let mut count = 0;
        while journals.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_unknown_operation_is_skipped_with_warning() {
        let temp_dir = TempDir::new().unwrap();
        let memory = Arc::new(MemoryNotifier::new());
        let notifier: Arc<dyn Notifier> = memory.clone();
        let generator = generator_in(&temp_dir, notifier);
        let paths = project_in(&temp_dir).await;

        let summary = generator
            .generate(&request(&["patch", "delete"]), &paths)
            .await
            .unwrap();

        assert_eq!(summary.skipped, vec!["patch"]);
        assert_eq!(summary.generated, vec!["Delete"]);
        assert!(memory
            .warnings()
            .iter()
            .any(|w| w.contains("Unsupported operation skipped: patch")));
    }

    #[tokio::test]
    async fn test_rerun_commits_nothing_new() {
        let temp_dir = TempDir::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let generator = generator_in(&temp_dir, notifier);
        let paths = project_in(&temp_dir).await;

        generator.generate(&request(&["put"]), &paths).await.unwrap();
        let summary = generator.generate(&request(&["put"]), &paths).await.unwrap();

        assert!(summary.generated.is_empty());
        assert_eq!(summary.unchanged, vec!["Put"]);

        // Still exactly one journal from the first run.
        let mut journals = fs::read_dir(temp_dir.path().join("rollbacks")).await.unwrap();
        let mut count = 0;
        while journals.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_commit_failure_reverts_all_generated_files() {
        let temp_dir = TempDir::new().unwrap();
        // The journal directory path is occupied by a file, so every
        // commit fails.
        fs::write(temp_dir.path().join("rollbacks"), "in the way")
            .await
            .unwrap();

        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let generator = generator_in(&temp_dir, notifier);
        let paths = project_in(&temp_dir).await;
        let registration_before = fs::read_to_string(&paths.registration_file).await.unwrap();

        let result = generator.generate(&request(&["post"]), &paths).await;
        assert!(result.is_err());

        // Nothing half-generated survives the failed commit.
        assert!(!paths.controller_dir.join("OrdersController.cs").exists());
        assert!(!paths.application_dir.join("Orders.cs").exists());
        assert!(!paths
            .infrastructure_dir
            .join("OrdersRepository.cs")
            .exists());
        assert_eq!(
            fs::read_to_string(&paths.registration_file).await.unwrap(),
            registration_before
        );
    }

    #[tokio::test]
    async fn test_failed_operation_rolls_back_but_keeps_siblings() {
        let temp_dir = TempDir::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let generator = generator_in(&temp_dir, notifier);
        let paths = project_in(&temp_dir).await;

        // First operation succeeds.
        generator.generate(&request(&["post"]), &paths).await.unwrap();

        // Sabotage the second: the application "directory" is a file, so
        // creating the service class fails partway through the operation.
        fs::remove_dir_all(&paths.application_dir).await.ok();
        fs::create_dir_all(paths.application_dir.parent().unwrap())
            .await
            .unwrap();
        fs::write(&paths.application_dir, "not a directory").await.unwrap();

        let result = generator.generate(&request(&["get"]), &paths).await;
        assert!(result.is_err());

        // The failed Get's controller edits were reverted; Post's remain.
        let controller = fs::read_to_string(paths.controller_dir.join("OrdersController.cs"))
            .await
            .unwrap();
        assert!(controller.contains("[HttpPost]"));
        assert!(!controller.contains("[HttpGet]"));
        assert!(!controller.contains("searchOrders"));

        let registration = fs::read_to_string(&paths.registration_file).await.unwrap();
        assert!(registration.contains("services.AddScoped<Orders>();"));
        assert!(!registration.contains("SearchOrders"));
    }
}
