//! Code template renderer
//!
//! Renders the opaque source-text blobs inserted into target projects. The
//! generator never inspects rendered output beyond placing it as a unit, so
//! the C#-flavored text lives entirely here.

use handlebars::{no_escape, Handlebars};
use serde_json::Value;

use crate::error::GenerationError;

const CONTROLLER_STUB: &str = "\
using Microsoft.AspNetCore.Mvc;
using Application.{{module}};
using Microsoft.AspNetCore.Authorization;
using Domain.{{module}}.Entities;

namespace Http.Controllers;

[ApiController]
[Route(\"[controller]\")]
[Authorize]
public class {{module}}Controller() : ControllerBase
{
}
";

const CONTROLLER_METHOD: &str = "\
    [{{http_attribute}}{{#if route}}(\"{{route}}\"){{/if}}]
    public async Task<object> {{method_name}}({{parameter_list}})
    {
        var response = await {{dependency_name}}.{{application_method}}({{argument}});
        return Results.Ok(new { data = response });
    }";

const APPLICATION_CLASS: &str = "\
using Domain.{{module}}.Interfaces;
using Domain.{{module}}.Entities;

namespace Application.{{module}};

public class {{class_name}}({{interface_name}} repository)
{
{{method}}
}
";

const APPLICATION_METHOD: &str = "\
    public async Task<{{return_type}}> {{method_name}}({{parameter_list}})
    {
        return await repository.{{repository_method}}({{argument}});
    }";

const DOMAIN_INTERFACE: &str = "\
using Domain.{{module}}.Entities;
using Domain.Shared.Entities;

namespace Domain.{{module}}.Interfaces;

public interface {{interface_name}}
{
    {{method_signature}}
}
";

const REQUEST_DTO: &str = "\
namespace Domain.{{module}}.Entities;

public class {{class_name}}
{
{{#each properties}}    {{this}}
{{/each}}}
";

const DTO_CLASS: &str = "\
using System;

namespace Infrastructure.Repositories.{{module}}.Dto;

public class {{class_name}}
{
{{#each fields}}    {{this}}
{{/each}}}
";

const REPOSITORY_CLASS: &str = "\
using Dapper;
using Domain.{{module}}.Interfaces;
using Domain.{{module}}.Entities;
using {{database}}.Connections;
using {{database}}.Repositories.Shared.Parser;

namespace {{database}}.Repositories.{{module}};

public class {{class_name}}({{database}}Connection connection) : {{database}}Repository(connection), {{interface_name}}
{
{{method}}
}
";

const REPOSITORY_QUERY_LIST: &str = "\
    public async Task<object> {{method_name}}({{parameter_list}})
    {
        using var cn = Connection();
        var parameters = new
        {
{{#each parameters}}            {{this}}{{#unless @last}},{{/unless}}
{{/each}}        };
        var response = await cn.QueryAsync<{{module}}Dto>(\"{{procedure}}\", parameters, commandType: System.Data.CommandType.StoredProcedure);
        return GenericListMapper.ParseCollection(response, dto => new
        {
{{#each mappers}}            {{this}}
{{/each}}        });
    }";

const REPOSITORY_QUERY_SINGLE: &str = "\
    public async Task<object> {{method_name}}({{parameter_list}})
    {
        using var cn = Connection();
        var parameters = new
        {
{{#each parameters}}            {{this}}{{#unless @last}},{{/unless}}
{{/each}}        };
        var response = await cn.QueryFirstOrDefaultAsync<{{module}}Dto>(\"{{procedure}}\", parameters, commandType: System.Data.CommandType.StoredProcedure);
        if (response == null) return null;
        return GenericListMapper.Parse(response, dto => new
        {
{{#each mappers}}            {{this}}
{{/each}}        });
    }";

const REPOSITORY_COMMAND: &str = "\
    public async Task<Response> {{method_name}}({{parameter_list}})
    {
        using var cn = Connection();
        var parameters = new
        {
{{#each parameters}}            {{this}}{{#unless @last}},{{/unless}}
{{/each}}        };
        var response = await cn.QueryFirstOrDefaultAsync<ResponseDto>(\"{{procedure}}\", parameters, commandType: System.Data.CommandType.StoredProcedure);
        return ResponseParser.Make(response);
    }";

/// Renders named code templates with value substitution
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Creates a renderer with all built-in templates registered
    pub fn new() -> Result<Self, GenerationError> {
        let mut registry = Handlebars::new();
        // Rendered output is source text, not HTML.
        registry.register_escape_fn(no_escape);

        registry.register_template_string("controller_stub", CONTROLLER_STUB)?;
        registry.register_template_string("controller_method", CONTROLLER_METHOD)?;
        registry.register_template_string("application_class", APPLICATION_CLASS)?;
        registry.register_template_string("application_method", APPLICATION_METHOD)?;
        registry.register_template_string("domain_interface", DOMAIN_INTERFACE)?;
        registry.register_template_string("request_dto", REQUEST_DTO)?;
        registry.register_template_string("dto_class", DTO_CLASS)?;
        registry.register_template_string("repository_class", REPOSITORY_CLASS)?;
        registry.register_template_string("repository_query_list", REPOSITORY_QUERY_LIST)?;
        registry.register_template_string("repository_query_single", REPOSITORY_QUERY_SINGLE)?;
        registry.register_template_string("repository_command", REPOSITORY_COMMAND)?;

        Ok(TemplateRenderer { registry })
    }

    /// Renders a registered template with the given data
    pub fn render(&self, template: &str, data: &Value) -> Result<String, GenerationError> {
        Ok(self.registry.render(template, data)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_controller_stub_has_scaffolding_attributes() {
        let renderer = TemplateRenderer::new().unwrap();
        let rendered = renderer
            .render("controller_stub", &json!({ "module": "Orders" }))
            .unwrap();

        assert!(rendered.contains("[ApiController]"));
        assert!(rendered.contains("[Route(\"[controller]\")]"));
        assert!(rendered.contains("[Authorize]"));
        assert!(rendered.contains("public class OrdersController() : ControllerBase"));
    }

    #[test]
    fn test_controller_method_with_route() {
        let renderer = TemplateRenderer::new().unwrap();
        let rendered = renderer
            .render(
                "controller_method",
                &json!({
                    "http_attribute": "HttpGet",
                    "route": "{code}",
                    "method_name": "GetByIdOrders",
                    "parameter_list": "int code",
                    "dependency_name": "findOrders",
                    "application_method": "FindOrdersById",
                    "argument": "code",
                }),
            )
            .unwrap();

        assert!(rendered.contains("[HttpGet(\"{code}\")]"));
        assert!(rendered.contains("await findOrders.FindOrdersById(code)"));
    }

    #[test]
    fn test_controller_method_without_route() {
        let renderer = TemplateRenderer::new().unwrap();
        let rendered = renderer
            .render(
                "controller_method",
                &json!({
                    "http_attribute": "HttpPost",
                    "method_name": "Orders",
                    "parameter_list": "[FromBody] OrdersRequest request",
                    "dependency_name": "orders",
                    "application_method": "orders",
                    "argument": "request",
                }),
            )
            .unwrap();

        assert!(rendered.contains("[HttpPost]"));
        assert!(!rendered.contains("[HttpPost("));
    }

    #[test]
    fn test_repository_query_joins_parameters_with_commas() {
        let renderer = TemplateRenderer::new().unwrap();
        let rendered = renderer
            .render(
                "repository_query_list",
                &json!({
                    "module": "Orders",
                    "method_name": "SearchOrders",
                    "parameter_list": "SearchOrdersRequest request",
                    "procedure": "usp_SearchOrders",
                    "parameters": ["Code = request.Code", "Name = request.Name"],
                    "mappers": ["dto.Code,", "dto.Name"],
                }),
            )
            .unwrap();

        assert!(rendered.contains("Code = request.Code,"));
        assert!(rendered.contains("Name = request.Name\n"));
        assert!(rendered.contains("\"usp_SearchOrders\""));
    }

    #[test]
    fn test_request_dto_lists_properties() {
        let renderer = TemplateRenderer::new().unwrap();
        let rendered = renderer
            .render(
                "request_dto",
                &json!({
                    "module": "Orders",
                    "class_name": "SearchOrdersRequest",
                    "properties": ["public string Name { get; set; }"],
                }),
            )
            .unwrap();

        assert!(rendered.contains("namespace Domain.Orders.Entities;"));
        assert!(rendered.contains("public string Name { get; set; }"));
    }

    #[test]
    fn test_rendered_code_is_not_html_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let rendered = renderer
            .render(
                "application_method",
                &json!({
                    "return_type": "object",
                    "method_name": "searchOrders",
                    "parameter_list": "SearchOrdersRequest request",
                    "repository_method": "SearchOrders",
                    "argument": "request",
                }),
            )
            .unwrap();

        assert!(rendered.contains("Task<object>"));
        assert!(!rendered.contains("&lt;"));
    }
}
