#![warn(missing_docs)]

//! Module generation for layerforge
//!
//! Orchestrates a sequence of idempotent "ensure this artifact exists" steps
//! against the four layers of a target project (controller, application,
//! domain, infrastructure) plus its dependency-registration file. Target
//! source files are treated as opaque line-oriented text; every mutation is
//! recorded into the active rollback transaction so a failed run can be
//! reversed.

pub mod error;
pub mod generator;
pub mod models;
pub mod standards;
pub mod templates;

mod layers;
mod text;

// Re-export public API
pub use error::GenerationError;
pub use generator::{GenerationSummary, ModuleGenerator};
pub use models::{GenerationRequest, LayerPaths, ProcedureAnalysis};
pub use standards::{OperationConfig, OperationKind, RequestShape};
pub use templates::TemplateRenderer;
