//! Error types for module generation

use layerforge_rollback::RollbackError;

/// Errors that can occur during module generation
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Operation name is not in the configuration table
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A built-in template failed to register
    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// A template failed to render
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Journaling or rollback failure
    #[error(transparent)]
    Rollback(#[from] RollbackError),
}

impl From<handlebars::TemplateError> for GenerationError {
    fn from(err: handlebars::TemplateError) -> Self {
        GenerationError::Template(Box::new(err))
    }
}
