//! Infrastructure layer: Dapper repository classes and response DTOs

use std::path::Path;

use layerforge_rollback::Transaction;
use serde_json::json;
use tracing::debug;

use crate::error::GenerationError;
use crate::layers::{create_file, modify_file, read_if_exists, LayerContext};
use crate::standards::OperationKind;
use crate::text::{
    contains_identifier, contains_method, insert_lines_before, last_closing_brace_line,
    property_name,
};

pub(crate) async fn ensure(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    ensure_response_dto(ctx, dir, tx).await?;
    ensure_repository(ctx, dir, tx).await?;
    Ok(())
}

/// Ensures the module response DTO under Dto/ when analysis supplies fields.
/// An existing DTO is merged field-by-field, deduplicated by property name.
async fn ensure_response_dto(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    let fields = match ctx.analysis {
        Some(analysis) if !analysis.dto_fields.is_empty() => &analysis.dto_fields,
        _ => return Ok(()),
    };
    let class_name = format!("{}Dto", ctx.module);
    let path = dir.join("Dto").join(format!("{}.cs", class_name));

    match read_if_exists(&path).await? {
        None => {
            let rendered = ctx.renderer.render(
                "dto_class",
                &json!({
                    "module": ctx.module,
                    "class_name": class_name,
                    "fields": fields,
                }),
            )?;
            create_file(tx, &path, &rendered).await?;
            ctx.notifier
                .info(&format!("Created response DTO {}.cs", class_name));
        }
        Some(content) => {
            let missing: Vec<String> = fields
                .iter()
                .filter(|decl| {
                    property_name(decl)
                        .map(|name| !contains_identifier(&content, name))
                        .unwrap_or(false)
                })
                .map(|decl| format!("    {}", decl.trim()))
                .collect();
            if missing.is_empty() {
                debug!(dto = %class_name, "response DTO already complete");
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

/// Ensures the repository class implementing the operation's domain
/// interface, with a stored-procedure call body shaped by the operation
/// kind: list query for Get, single-row query for GetById, command for the
/// mutating kinds.
async fn ensure_repository(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    let interface_name = ctx.name(ctx.config.domain_interface);
    let class_name = interface_name
        .strip_prefix('I')
        .unwrap_or(&interface_name)
        .to_string();
    let path = dir.join(format!("{}.cs", class_name));
    let repository_method = ctx.name(ctx.config.repository_method);

    let method = ctx.renderer.render(
        method_template(ctx.kind),
        &json!({
            "module": ctx.module,
            "method_name": repository_method,
            "parameter_list": ctx.parameter_list(),
            "procedure": procedure_name(ctx, &repository_method),
            "parameters": call_parameters(ctx),
            "mappers": ctx.analysis.map(|a| a.response_mapper.clone()).unwrap_or_default(),
        }),
    )?;

    match read_if_exists(&path).await? {
        None => {
            let rendered = ctx.renderer.render(
                "repository_class",
                &json!({
                    "module": ctx.module,
                    "database": ctx.database,
                    "class_name": class_name,
                    "interface_name": interface_name,
                    "method": method,
                }),
            )?;
            create_file(tx, &path, &rendered).await?;
            ctx.notifier
                .info(&format!("Created repository {}.cs", class_name));
        }
        Some(content) => {
            if contains_method(&content, &repository_method) {
                debug!(repository = %class_name, "repository method already present");
                return Ok(());
            }
            let close = match last_closing_brace_line(&content) {
                Some(line) => line,
                None => {
                    ctx.notifier.warn(&format!(
                        "No class body found in {}; method {} not added",
                        path.display(),
                        repository_method
                    ));
                    return Ok(());
                }
            };
            let mut block: Vec<String> = vec![String::new()];
            block.extend(method.lines().map(str::to_string));
            let (updated, _) = insert_lines_before(&content, close, &block);
            modify_file(tx, &path, content, &updated).await?;
        }
    }
    Ok(())
}

fn method_template(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Get => "repository_query_list",
        OperationKind::GetById => "repository_query_single",
        OperationKind::Post | OperationKind::Put | OperationKind::Delete => "repository_command",
    }
}

/// Procedure name from analysis, or a conventional default when the run has
/// no analysis attached.
fn procedure_name(ctx: &LayerContext<'_>, repository_method: &str) -> String {
    ctx.analysis
        .map(|a| a.stored_procedure_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("usp_{}", repository_method))
}

/// Parameter mappings for the anonymous parameters object. Identifier
/// operations always bind the path code; structured operations take the
/// analysis mappings as-is.
fn call_parameters(ctx: &LayerContext<'_>) -> Vec<String> {
    match ctx.config.request_dto {
        Some(_) => ctx
            .analysis
            .map(|a| a.parameters.clone())
            .unwrap_or_default(),
        None => vec!["Code = code".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use layerforge_common::{MemoryNotifier, Notifier};
    use tempfile::TempDir;

    use super::*;
    use crate::models::ProcedureAnalysis;
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

    fn full_analysis() -> ProcedureAnalysis {
        ProcedureAnalysis {
            stored_procedure_name: "usp_Client_Search".to_string(),
            request_parameters: vec!["public string Name { get; set; }".to_string()],
            parameters: vec!["Name = request.Name".to_string()],
            dto_fields: vec![
                "public int Code { get; set; }".to_string(),
                "public string Name { get; set; }".to_string(),
            ],
            response_mapper: vec!["dto.Code,".to_string(), "dto.Name".to_string()],
        }
    }

    #[tokio::test]
    async fn test_get_generates_dto_and_list_query_repository() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let analysis = full_analysis();
        let ctx = context(OperationKind::Get, &renderer, &notifier, Some(&analysis));
        let mut tx = Transaction::new("Client", "Client", "Get");

        ensure(&ctx, temp_dir.path(), &mut tx).await.unwrap();

        let dto =
            std::fs::read_to_string(temp_dir.path().join("Dto").join("ClientDto.cs")).unwrap();
        assert!(dto.contains("public class ClientDto"));
        assert!(dto.contains("public int Code { get; set; }"));

        let repo = std::fs::read_to_string(
            temp_dir.path().join("SearchClientRepository.cs"),
        )
        .unwrap();
        assert!(repo.contains(
            "public class SearchClientRepository(WarehouseConnection connection)"
        ));
        assert!(repo.contains("ISearchClientRepository"));
        assert!(repo.contains("cn.QueryAsync<ClientDto>(\"usp_Client_Search\""));
        assert!(repo.contains("Name = request.Name"));
    }

    #[tokio::test]
    async fn test_delete_without_analysis_uses_conventional_procedure() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let ctx = context(OperationKind::Delete, &renderer, &notifier, None);
        let mut tx = Transaction::new("Client", "Client", "Delete");

        ensure(&ctx, temp_dir.path(), &mut tx).await.unwrap();

        // No analysis fields, so no response DTO is written.
        assert!(!temp_dir.path().join("Dto").exists());

        let repo = std::fs::read_to_string(
            temp_dir.path().join("DeleteClientRepository.cs"),
        )
        .unwrap();
        assert!(repo.contains("public async Task<Response> DeleteClient(int code)"));
        assert!(repo.contains("\"usp_DeleteClient\""));
        assert!(repo.contains("Code = code"));
        assert!(repo.contains("ResponseParser.Make(response)"));
    }

    #[tokio::test]
    async fn test_get_by_id_uses_single_row_query() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let analysis = full_analysis();
        let ctx = context(OperationKind::GetById, &renderer, &notifier, Some(&analysis));
        let mut tx = Transaction::new("Client", "Client", "GetById");

        ensure(&ctx, temp_dir.path(), &mut tx).await.unwrap();

        let repo = std::fs::read_to_string(
            temp_dir.path().join("FindClientRepository.cs"),
        )
        .unwrap();
        assert!(repo.contains("QueryFirstOrDefaultAsync<ClientDto>"));
        assert!(repo.contains("FindClient(int code)"));
        assert!(repo.contains("if (response == null) return null;"));
    }

    #[tokio::test]
    async fn test_second_run_records_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new().unwrap();
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());
        let analysis = full_analysis();
        let ctx = context(OperationKind::Get, &renderer, &notifier, Some(&analysis));

        let mut first = Transaction::new("Client", "Client", "Get");
        ensure(&ctx, temp_dir.path(), &mut first).await.unwrap();

        let mut second = Transaction::new("Client", "Client", "Get");
        ensure(&ctx, temp_dir.path(), &mut second).await.unwrap();
        assert!(second.is_empty());
    }
}
