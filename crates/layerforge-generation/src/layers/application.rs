//! Application layer: pass-through service classes

use std::path::Path;

use layerforge_rollback::Transaction;
use serde_json::json;
use tracing::debug;

use crate::error::GenerationError;
use crate::layers::{create_file, modify_file, read_if_exists, LayerContext};
use crate::text::{contains_method, insert_lines_before, last_closing_brace_line};

/// Ensures the operation's application-service class exists with its
/// forwarding method. Each operation kind owns a distinct class, so the
/// common case is a fresh file; an existing class only gains the method
/// when it is missing.
pub(crate) async fn ensure(
    ctx: &LayerContext<'_>,
    dir: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    let class_name = ctx.name(ctx.config.application_class);
    let path = dir.join(format!("{}.cs", class_name));

    let method = ctx.renderer.render(
        "application_method",
        &json!({
            "return_type": ctx.return_type(),
            "method_name": ctx.name(ctx.config.application_method),
            "parameter_list": ctx.parameter_list(),
            "repository_method": ctx.name(ctx.config.repository_method),
            "argument": ctx.argument(),
        }),
    )?;

    match read_if_exists(&path).await? {
        None => {
            let class = ctx.renderer.render(
                "application_class",
                &json!({
                    "module": ctx.module,
                    "class_name": class_name,
                    "interface_name": ctx.name(ctx.config.domain_interface),
                    "method": method,
                }),
            )?;
            create_file(tx, &path, &class).await?;
            ctx.notifier
                .info(&format!("Created application service {}.cs", class_name));
        }
        Some(content) => {
            let method_name = ctx.name(ctx.config.application_method);
            if contains_method(&content, &method_name) {
                debug!(class = %class_name, "application method already present");
                return Ok(());
            }
            let close = match last_closing_brace_line(&content) {
                Some(line) => line,
                None => {
                    ctx.notifier.warn(&format!(
                        "No class body found in {}; method {} not added",
                        path.display(),
                        method_name
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
