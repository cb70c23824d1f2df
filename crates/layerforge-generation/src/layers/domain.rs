//! Domain layer: request DTOs under Entities/ and repository interfaces
//! under Interfaces/

use std::path::Path;

use layerforge_rollback::Transaction;
use serde_json::json;
use tracing::debug;

use crate::error::GenerationError;
use crate::layers::{create_file, modify_file, read_if_exists, LayerContext};
use crate::text::{
    contains_identifier, contains_method, insert_lines_before, last_closing_brace_line,
    property_name,
};

pub(crate) async fn ensure(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    ensure_request_dto(ctx, dir, tx).await?;
    ensure_interface(ctx, dir, tx).await?;
    Ok(())
}

/// Ensures the request DTO for structured-input operations. An existing DTO
/// is merged: properties whose names are already declared are skipped, new
/// ones are appended before the class closing brace.
async fn ensure_request_dto(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    let class_name = match ctx.config.request_dto {
        Some(pattern) => ctx.name(pattern),
        None => return Ok(()),
    };
    let path = dir.join("Entities").join(format!("{}.cs", class_name));
    let properties: &[String] = ctx
        .analysis
        .map(|a| a.request_parameters.as_slice())
        .unwrap_or_default();

    match read_if_exists(&path).await? {
        None => {
            let rendered = ctx.renderer.render(
                "request_dto",
                &json!({
                    "module": ctx.module,
                    "class_name": class_name,
                    "properties": properties,
                }),
            )?;
            create_file(tx, &path, &rendered).await?;
            ctx.notifier
                .info(&format!("Created request DTO {}.cs", class_name));
        }
        Some(content) => {
            let missing: Vec<String> = properties
                .iter()
                .filter(|decl| {
                    property_name(decl)
                        .map(|name| !contains_identifier(&content, name))
                        .unwrap_or(false)
                })
                .map(|decl| format!("    {}", decl.trim()))
                .collect();
            if missing.is_empty() {
                debug!(dto = %class_name, "request DTO already complete");
                return Ok(());
            }
            let close = match last_closing_brace_line(&content) {
                Some(line) => line,
                None => return Ok(()),
            };
            let (updated, _) = insert_lines_before(&content, close, &missing);
            modify_file(tx, &path, content, &updated).await?;
        }
    }
    Ok(())
}

/// Ensures the per-operation repository interface with its single method
/// signature.
async fn ensure_interface(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    let interface_name = ctx.name(ctx.config.domain_interface);
    let path = dir.join("Interfaces").join(format!("{}.cs", interface_name));

    let repository_method = ctx.name(ctx.config.repository_method);
    let signature = format!(
        "Task<{}> {}({});",
        ctx.return_type(),
        repository_method,
        ctx.parameter_list()
    );

    match read_if_exists(&path).await? {
        None => {
            let rendered = ctx.renderer.render(
                "domain_interface",
                &json!({
                    "module": ctx.module,
                    "interface_name": interface_name,
                    "method_signature": signature,
                }),
            )?;
            create_file(tx, &path, &rendered).await?;
            ctx.notifier
                .info(&format!("Created domain interface {}.cs", interface_name));
        }
        Some(content) => {
            if contains_method(&content, &repository_method) {
                debug!(interface = %interface_name, "interface method already declared");
                return Ok(());
            }
            let close = match last_closing_brace_line(&content) {
                Some(line) => line,
                None => return Ok(()),
            };
            let (updated, _) =
                insert_lines_before(&content, close, &[format!("    {}", signature)]);
            modify_file(tx, &path, content, &updated).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use layerforge_common::{MemoryNotifier, Notifier};
    use tempfile::TempDir;

    use super::*;
    use crate::models::ProcedureAnalysis;
    use crate::standards::OperationKind;
    use crate::templates::TemplateRenderer;

    fn context<'a>(
        kind: OperationKind,
        renderer: &'a TemplateRenderer,
        notifier: &'a Arc<dyn Notifier>,
        analysis: Option<&'a ProcedureAnalysis>,
    ) -> LayerContext<'a> {
        LayerContext {
            module: "Client",
            method_name: "Client",
            database: "Warehouse",
            kind,
            config: kind.config(),
            analysis,
            renderer,
            notifier,
        }
    }

    fn analysis_with(request_parameters: &[&str]) -> ProcedureAnalysis {
        ProcedureAnalysis {
            request_parameters: request_parameters.iter().map(|s| s.to_string()).collect(),
            ..ProcedureAnalysis::default()
        }
    }

    #[tokio::test]
    async fn test_creates_entities_and_interfaces_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let analysis = analysis_with(&["public string Name { get; set; }"]);
        let ctx = context(OperationKind::Get, &renderer, &notifier, Some(&analysis));
        let mut tx = Transaction::new("Client", "Client", "Get");

        ensure(&ctx, temp_dir.path(), &mut tx).await.unwrap();

        let dto = std::fs::read_to_string(
            temp_dir.path().join("Entities").join("SearchClientRequest.cs"),
        )
        .unwrap();
        assert!(dto.contains("public class SearchClientRequest"));
        assert!(dto.contains("public string Name { get; set; }"));

        let interface = std::fs::read_to_string(
            temp_dir
                .path()
                .join("Interfaces")
                .join("ISearchClientRepository.cs"),
        )
        .unwrap();
        assert!(interface.contains("public interface ISearchClientRepository"));
        assert!(interface.contains("Task<object> SearchClient(SearchClientRequest request);"));
    }

    #[tokio::test]
    async fn test_identifier_operation_skips_request_dto() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let ctx = context(OperationKind::Delete, &renderer, &notifier, None);
        let mut tx = Transaction::new("Client", "Client", "Delete");

        ensure(&ctx, temp_dir.path(), &mut tx).await.unwrap();

        assert!(!temp_dir.path().join("Entities").exists());
        let interface = std::fs::read_to_string(
            temp_dir
                .path()
                .join("Interfaces")
                .join("IDeleteClientRepository.cs"),
        )
        .unwrap();
        assert!(interface.contains("Task<Response> DeleteClient(int code);"));
    }

    #[tokio::test]
    async fn test_existing_dto_gains_only_missing_properties() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());

        let initial = analysis_with(&["public string Name { get; set; }"]);
        let ctx = context(OperationKind::Get, &renderer, &notifier, Some(&initial));
        let mut tx = Transaction::new("Client", "Client", "Get");
        ensure(&ctx, temp_dir.path(), &mut tx).await.unwrap();

        let extended = analysis_with(&[
            "public string Name { get; set; }",
            "public int Code { get; set; }",
        ]);
        let ctx = context(OperationKind::Get, &renderer, &notifier, Some(&extended));
        let mut tx = Transaction::new("Client", "Client", "Get");
        ensure(&ctx, temp_dir.path(), &mut tx).await.unwrap();

        let dto = std::fs::read_to_string(
            temp_dir.path().join("Entities").join("SearchClientRequest.cs"),
        )
        .unwrap();
        assert_eq!(dto.matches("public string Name").count(), 1);
        assert!(dto.contains("public int Code { get; set; }"));
    }

    #[tokio::test]
    async fn test_second_run_records_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let analysis = analysis_with(&["public string Name { get; set; }"]);
        let ctx = context(OperationKind::Put, &renderer, &notifier, Some(&analysis));

        let mut first = Transaction::new("Client", "Client", "Put");
        ensure(&ctx, temp_dir.path(), &mut first).await.unwrap();

        let mut second = Transaction::new("Client", "Client", "Put");
        ensure(&ctx, temp_dir.path(), &mut second).await.unwrap();
        assert!(second.is_empty());
    }
}
