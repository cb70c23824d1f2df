//! Operation configuration table
//!
//! Each supported operation kind maps to a static set of naming patterns
//! and bindings that drive artifact generation at every layer. Patterns use
//! `{name}` for the request's method name and `{name:camel}` for its
//! lower-camel form.

use heck::ToLowerCamelCase;

/// Closed set of CRUD-style request kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// List/search records
    Get,
    /// Create a record
    Post,
    /// Fetch a single record by identifier
    GetById,
    /// Update a record
    Put,
    /// Delete a record by identifier
    Delete,
}

/// How the controller method receives its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// Query-bound request object
    Query,
    /// Body-bound request object
    Body,
    /// Path-bound integer identifier
    Identifier,
}

/// Naming patterns and bindings for one operation kind
#[derive(Debug, Clone)]
pub struct OperationConfig {
    /// Controller method name pattern
    pub controller_method: &'static str,
    /// HTTP verb attribute on the controller method
    pub http_attribute: &'static str,
    /// Optional route template on the verb attribute
    pub route: Option<&'static str>,
    /// Application-service type the controller depends on
    pub dependency_type: &'static str,
    /// Constructor parameter name for that dependency
    pub dependency_name: &'static str,
    /// Application-service class name pattern
    pub application_class: &'static str,
    /// Application-service method name pattern
    pub application_method: &'static str,
    /// Domain interface name pattern (one interface per operation kind)
    pub domain_interface: &'static str,
    /// Repository method name pattern (shared by domain and infrastructure)
    pub repository_method: &'static str,
    /// Request DTO name pattern for structured-input operations
    pub request_dto: Option<&'static str>,
    /// Input binding of the controller method
    pub request_shape: RequestShape,
    /// Whether the operation returns the shared Response shape
    pub returns_response: bool,
}

impl OperationKind {
    /// Resolves an operation name, lowercased; unknown names yield None
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "get" => Some(OperationKind::Get),
            "post" => Some(OperationKind::Post),
            "getbyid" => Some(OperationKind::GetById),
            "put" => Some(OperationKind::Put),
            "delete" => Some(OperationKind::Delete),
            _ => None,
        }
    }

    /// Canonical label used in journals and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Get => "Get",
            OperationKind::Post => "Post",
            OperationKind::GetById => "GetById",
            OperationKind::Put => "Put",
            OperationKind::Delete => "Delete",
        }
    }

    /// Static configuration for this operation kind
    pub fn config(&self) -> &'static OperationConfig {
        match self {
            OperationKind::Get => &GET_CONFIG,
            OperationKind::Post => &POST_CONFIG,
            OperationKind::GetById => &GET_BY_ID_CONFIG,
            OperationKind::Put => &PUT_CONFIG,
            OperationKind::Delete => &DELETE_CONFIG,
        }
    }
}

static GET_CONFIG: OperationConfig = OperationConfig {
    controller_method: "Get{name}",
    http_attribute: "HttpGet",
    route: None,
    dependency_type: "Search{name}",
    dependency_name: "search{name}",
    application_class: "Search{name}",
    application_method: "search{name}",
    domain_interface: "ISearch{name}Repository",
    repository_method: "Search{name}",
    request_dto: Some("Search{name}Request"),
    request_shape: RequestShape::Query,
    returns_response: false,
};

static POST_CONFIG: OperationConfig = OperationConfig {
    controller_method: "{name}",
    http_attribute: "HttpPost",
    route: None,
    dependency_type: "{name}",
    dependency_name: "{name:camel}",
    application_class: "{name}",
    application_method: "{name:camel}",
    domain_interface: "I{name}Repository",
    repository_method: "{name}",
    request_dto: Some("{name}Request"),
    request_shape: RequestShape::Body,
    returns_response: true,
};

static GET_BY_ID_CONFIG: OperationConfig = OperationConfig {
    controller_method: "GetById{name}",
    http_attribute: "HttpGet",
    route: Some("{code}"),
    dependency_type: "Find{name}",
    dependency_name: "find{name}",
    application_class: "Find{name}",
    application_method: "Find{name}ById",
    domain_interface: "IFind{name}Repository",
    repository_method: "Find{name}",
    request_dto: None,
    request_shape: RequestShape::Identifier,
    returns_response: false,
};

static PUT_CONFIG: OperationConfig = OperationConfig {
    controller_method: "Update{name}",
    http_attribute: "HttpPut",
    route: None,
    dependency_type: "Update{name}",
    dependency_name: "update{name}",
    application_class: "Update{name}",
    application_method: "Update{name}",
    domain_interface: "IUpdate{name}Repository",
    repository_method: "Update{name}",
    request_dto: Some("Update{name}Request"),
    request_shape: RequestShape::Body,
    returns_response: true,
};

static DELETE_CONFIG: OperationConfig = OperationConfig {
    controller_method: "Delete{name}",
    http_attribute: "HttpDelete",
    route: None,
    dependency_type: "Delete{name}",
    dependency_name: "delete{name}",
    application_class: "Delete{name}",
    application_method: "Delete{name}",
    domain_interface: "IDelete{name}Repository",
    repository_method: "Delete{name}",
    request_dto: None,
    request_shape: RequestShape::Identifier,
    returns_response: true,
};

/// Expands `{name}` and `{name:camel}` placeholders in a naming pattern
pub fn format_pattern(pattern: &str, name: &str) -> String {
    pattern
        .replace("{name:camel}", &name.to_lower_camel_case())
        .replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(OperationKind::parse("GET"), Some(OperationKind::Get));
        assert_eq!(OperationKind::parse("getById"), Some(OperationKind::GetById));
        assert_eq!(OperationKind::parse(" put "), Some(OperationKind::Put));
        assert_eq!(OperationKind::parse("patch"), None);
    }

    #[test]
    fn test_get_family_naming() {
        let config = OperationKind::Get.config();
        assert_eq!(format_pattern(config.application_class, "Client"), "SearchClient");
        assert_eq!(
            format_pattern(config.domain_interface, "Client"),
            "ISearchClientRepository"
        );
        assert_eq!(format_pattern(config.dependency_name, "Client"), "searchClient");
    }

    #[test]
    fn test_post_family_uses_camel_for_parameter_names() {
        let config = OperationKind::Post.config();
        assert_eq!(format_pattern(config.dependency_name, "OrderItem"), "orderItem");
        assert_eq!(format_pattern(config.controller_method, "OrderItem"), "OrderItem");
    }

    #[test]
    fn test_identifier_operations_have_no_request_dto() {
        assert!(OperationKind::GetById.config().request_dto.is_none());
        assert!(OperationKind::Delete.config().request_dto.is_none());
        assert!(OperationKind::Get.config().request_dto.is_some());
    }

    #[test]
    fn test_get_by_id_is_path_bound() {
        let config = OperationKind::GetById.config();
        assert_eq!(config.request_shape, RequestShape::Identifier);
        assert_eq!(config.route, Some("{code}"));
        assert_eq!(config.http_attribute, "HttpGet");
    }
}
