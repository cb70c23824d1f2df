//! Data models for generation requests

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Parsed stored-procedure analysis supplied by the AI collaborator
///
/// Every field is opaque text from the generator's point of view; fragments
/// are inserted into templates as units and never interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcedureAnalysis {
    /// Stored-procedure name the repository method executes
    #[serde(default)]
    pub stored_procedure_name: String,
    /// Property declarations for the request DTO
    #[serde(default)]
    pub request_parameters: Vec<String>,
    /// Parameter mappings passed to the procedure call
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Property declarations for the response DTO
    #[serde(default)]
    pub dto_fields: Vec<String>,
    /// Response mapping expressions
    #[serde(default)]
    pub response_mapper: Vec<String>,
}

/// One generation request: a module, a method name, and a batch of operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Module the artifacts belong to (e.g. "Orders")
    pub module: String,
    /// Logical method name driving artifact naming (e.g. "Orders")
    pub method_name: String,
    /// Database label used by the infrastructure layer (e.g. "Warehouse")
    pub database: String,
    /// Requested operation names; unknown names are skipped with a warning
    pub operations: Vec<String>,
    /// Optional AI-derived field data for DTO and repository generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ProcedureAnalysis>,
}

/// Target directories for the four generated layers plus the registration file
#[derive(Debug, Clone)]
pub struct LayerPaths {
    /// Directory for controller files
    pub controller_dir: PathBuf,
    /// Directory for application-service classes
    pub application_dir: PathBuf,
    /// Module root of the domain layer (Entities/ and Interfaces/ live below)
    pub domain_dir: PathBuf,
    /// Directory for infrastructure repository classes
    pub infrastructure_dir: PathBuf,
    /// Shared dependency-registration file
    pub registration_file: PathBuf,
}

impl LayerPaths {
    /// Resolves layer directories from a project root using the standard
    /// layout: the API project shares the project directory's name and holds
    /// controllers and the registration file; Application, Domain, and
    /// Infrastructure are sibling directories.
    pub fn from_project_root(project_dir: &Path, module: &str, database: &str) -> Self {
        let api_project = project_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();

        LayerPaths {
            controller_dir: project_dir.join(&api_project).join("Controllers").join(module),
            application_dir: project_dir.join("Application").join(module),
            domain_dir: project_dir.join("Domain").join(module),
            infrastructure_dir: project_dir
                .join("Infrastructure")
                .join(database)
                .join("Repositories")
                .join(module),
            registration_file: project_dir
                .join(&api_project)
                .join("Config")
                .join("DependencyInjection.cs"),
        }
    }
}
