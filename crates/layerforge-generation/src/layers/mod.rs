//! Per-layer ensure steps
//!
//! Each submodule owns one target-project layer and exposes an `ensure`
//! function that brings that layer's artifacts for the current operation
//! into existence. Every step is idempotent: artifacts already present are
//! left untouched and produce no change records.

use std::path::Path;
use std::sync::Arc;

use layerforge_common::Notifier;
use layerforge_rollback::Transaction;
use tokio::fs;

use crate::error::GenerationError;
use crate::models::ProcedureAnalysis;
use crate::standards::{format_pattern, OperationConfig, OperationKind, RequestShape};
use crate::templates::TemplateRenderer;

pub(crate) mod application;
pub(crate) mod controller;
pub(crate) mod domain;
pub(crate) mod infrastructure;
pub(crate) mod registration;

/// Everything a layer step needs about the operation being generated.
pub(crate) struct LayerContext<'a> {
    pub module: &'a str,
    pub method_name: &'a str,
    pub database: &'a str,
    pub kind: OperationKind,
    pub config: &'static OperationConfig,
    pub analysis: Option<&'a ProcedureAnalysis>,
    pub renderer: &'a TemplateRenderer,
    pub notifier: &'a Arc<dyn Notifier>,
}

impl LayerContext<'_> {
    /// Expands a naming pattern with this operation's method name.
    pub fn name(&self, pattern: &str) -> String {
        format_pattern(pattern, self.method_name)
    }

    /// Controller/service parameter list for this operation's input shape.
    pub fn parameter_list(&self) -> String {
        match self.config.request_shape {
            RequestShape::Query | RequestShape::Body => {
                let dto = self
                    .config
                    .request_dto
                    .map(|p| self.name(p))
                    .unwrap_or_else(|| "object".to_string());
                format!("{} request", dto)
            }
            RequestShape::Identifier => "int code".to_string(),
        }
    }

    /// Controller action parameter list; structured inputs carry their
    /// binding attribute, query-bound for Get and body-bound for the
    /// mutating kinds. Identifier inputs bind through the route instead.
    pub fn controller_parameter_list(&self) -> String {
        match self.config.request_shape {
            RequestShape::Query => format!("[FromQuery] {}", self.parameter_list()),
            RequestShape::Body => format!("[FromBody] {}", self.parameter_list()),
            RequestShape::Identifier => self.parameter_list(),
        }
    }

    /// Name of the value forwarded down the layers.
    pub fn argument(&self) -> &'static str {
        match self.config.request_shape {
            RequestShape::Query | RequestShape::Body => "request",
            RequestShape::Identifier => "code",
        }
    }

    /// Return type shared by the application and domain signatures.
    pub fn return_type(&self) -> &'static str {
        if self.config.returns_response {
            "Response"
        } else {
            "object"
        }
    }
}

/// Writes a new file, recording it on the transaction first.
///
/// Recording before writing means a half-finished write still rolls back:
/// reverting a `Created` record for a missing file is a no-op.
pub(crate) async fn create_file(
    tx: &mut Transaction,
    path: &Path,
    content: &str,
) -> Result<(), GenerationError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    tx.record_created(path);
    fs::write(path, content).await?;
    Ok(())
}

/// Overwrites an existing file, snapshotting its prior content first.
pub(crate) async fn modify_file(
    tx: &mut Transaction,
    path: &Path,
    backup: String,
    updated: &str,
) -> Result<(), GenerationError> {
    tx.record_modified(path, backup);
    fs::write(path, updated).await?;
    Ok(())
}

/// Reads a file when it exists; None when it does not.
pub(crate) async fn read_if_exists(path: &Path) -> Result<Option<String>, GenerationError> {
    if fs::try_exists(path).await? {
        Ok(Some(fs::read_to_string(path).await?))
    } else {
        Ok(None)
    }
}
