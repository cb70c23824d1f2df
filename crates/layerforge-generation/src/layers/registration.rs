//! Dependency-registration file: scoped-service lines in two sections
//!
//! The registration file is shared by every module in the target project,
//! so edits are journaled as individual line insertions rather than full
//! snapshots. Each operation contributes one repository binding to the
//! ConfigureRepositories section and one service binding to the
//! ConfigureAppServices section.

use layerforge_common::text::lines_equivalent;
use layerforge_rollback::Transaction;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::GenerationError;
use crate::layers::LayerContext;
use crate::text::{find_brace_block, insert_lines_before};

const REPOSITORIES_SECTION: &str = "ConfigureRepositories";
const APP_SERVICES_SECTION: &str = "ConfigureAppServices";
const INDENT: &str = "        ";

pub(crate) async fn ensure(
    ctx: &LayerContext<'_>,
    file: &Path,
    tx: &mut Transaction,
) -> Result<(), GenerationError> {
    if !fs::try_exists(file).await? {
        ctx.notifier.warn(&format!(
            "Registration file {} not found; service bindings skipped",
            file.display()
        ));
        return Ok(());
    }

    let interface_name = ctx.name(ctx.config.domain_interface);
    let repository_class = interface_name.strip_prefix('I').unwrap_or(&interface_name);
    let repository_line = format!(
        "services.AddScoped<{}, {}>();",
        interface_name, repository_class
    );
    let service_line = format!("services.AddScoped<{}>();", ctx.name(ctx.config.application_class));

    let mut content = fs::read_to_string(file).await?;
    let mut pending: Vec<(String, usize)> = Vec::new();

    for (section, line) in [
        (REPOSITORIES_SECTION, repository_line),
        (APP_SERVICES_SECTION, service_line),
    ] {
        match insert_into_section(&content, section, &line) {
            Some((updated, number)) => {
                content = updated;
                pending.push((line, number));
            }
            None if section_missing(&content, section) => {
                ctx.notifier.warn(&format!(
                    "Section {} not found in {}; binding skipped",
                    section,
                    file.display()
                ));
            }
            None => {
                debug!(section, "service binding already registered");
            }
        }
    }

    if pending.is_empty() {
        return Ok(());
    }
    for (line, number) in pending {
        tx.record_line_added(file, line, number);
    }
    fs::write(file, content).await?;
    Ok(())
}

fn section_missing(content: &str, section: &str) -> bool {
    find_brace_block(content, section).is_none()
}

/// Inserts `line` at the end of the named section unless an equivalent line
/// is already there. Returns the updated content and the 1-based number of
/// the inserted line.
fn insert_into_section(content: &str, section: &str, line: &str) -> Option<(String, usize)> {
    let block = find_brace_block(content, section)?;

    let already_present = content
        .lines()
        .skip(block.open_line + 1)
        .take(block.close_line.saturating_sub(block.open_line + 1))
        .any(|existing| lines_equivalent(existing, line));
    if already_present {
        return None;
    }

    let (updated, numbers) = insert_lines_before(
        content,
        block.close_line,
        &[format!("{}{}", INDENT, line)],
    );
    numbers.first().map(|&number| (updated, number))
}
