//! Controller layer: endpoint stubs and action methods

use std::path::Path;

use layerforge_rollback::Transaction;
use serde_json::json;
use tracing::debug;

use crate::error::GenerationError;
use crate::layers::{create_file, modify_file, read_if_exists, LayerContext};
use crate::text::{contains_identifier, contains_method, last_closing_brace_line, parameter_span};

/// Ensures the module controller exists, holds the application-service
/// dependency in its primary constructor, and exposes the operation's
/// action method.
pub(crate) async fn ensure(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    let path = dir.join(format!("{}Controller.cs", ctx.module));

    let mut content = match read_if_exists(&path).await? {
        Some(existing) => existing,
        None => {
            let stub = ctx
                .renderer
                .render("controller_stub", &json!({ "module": ctx.module }))?;
            create_file(tx, &path, &stub).await?;
            ctx.notifier
                .info(&format!("Created controller {}Controller.cs", ctx.module));
            stub
        }
    };

    content = ensure_dependency(ctx, &path, content, tx).await?;
    ensure_action_method(ctx, &path, content, tx).await?;
    Ok(())
}

/// Adds the operation's application service to the primary constructor when
/// no parameter with that name is present yet.
async fn ensure_dependency(
    ctx: &LayerContext<'_>,
    path: &Path,
    content: String,
    tx: &mut Transaction,
) -> Result<String, GenerationError> {
    let dependency_type = ctx.name(ctx.config.dependency_type);
    let dependency_name = ctx.name(ctx.config.dependency_name);

    let marker = format!("class {}Controller", ctx.module);
    let span = match parameter_span(&content, &marker) {
        Some(span) => span,
        None => {
            ctx.notifier.warn(&format!(
                "No primary constructor found in {}; dependency {} not injected",
                path.display(),
                dependency_name
            ));
            return Ok(content);
        }
    };

    let params = &content[span.clone()];
    if contains_identifier(params, &dependency_name) {
        debug!(dependency = %dependency_name, "constructor dependency already present");
        return Ok(content);
    }

    let inserted = if params.trim().is_empty() {
        format!("{} {}", dependency_type, dependency_name)
    } else {
        format!("{}, {} {}", params, dependency_type, dependency_name)
    };
    let mut updated = String::with_capacity(content.len() + inserted.len());
    updated.push_str(&content[..span.start]);
    updated.push_str(&inserted);
    updated.push_str(&content[span.end..]);

    modify_file(tx, path, content, &updated).await?;
    Ok(updated)
}

/// Inserts the operation's action method before the class closing brace.
async fn ensure_action_method(
    ctx: &LayerContext<'_>,
    path: &Path,
    content: String,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    let method_name = ctx.name(ctx.config.controller_method);
    if contains_method(&content, &method_name) {
        debug!(method = %method_name, "controller action already present");
        return Ok(());
    }

    let close = match last_closing_brace_line(&content) {
        Some(line) => line,
        None => {
            ctx.notifier.warn(&format!(
                "No class body found in {}; action {} not added",
                path.display(),
                method_name
            ));
            return Ok(());
        }
    };

    let method = ctx.renderer.render(
        "controller_method",
        &json!({
            "http_attribute": ctx.config.http_attribute,
            "route": ctx.config.route,
            "method_name": method_name,
            "parameter_list": ctx.controller_parameter_list(),
            "dependency_name": ctx.name(ctx.config.dependency_name),
            "application_method": ctx.name(ctx.config.application_method),
            "argument": ctx.argument(),
        }),
    )?;

    let mut block: Vec<String> = vec![String::new()];
    block.extend(method.lines().map(str::to_string));
    let (updated, _) = crate::text::insert_lines_before(&content, close, &block);

    modify_file(tx, path, content, &updated).await?;
    Ok(())
}
