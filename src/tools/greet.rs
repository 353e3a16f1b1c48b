/// Greet Tool Implementation
///
/// Greets a person by name. Any string is accepted, including the empty string.

use crate::core::error::ToolError;
use crate::core::server::{MCPTool, ToolHandler, ToolParam, ToolRegistry};
use crate::core::utils;
use serde_json::Value;

pub const NAME: &str = "greet";

/// Build the greeting for `name`.
pub fn greet(name: &str) -> String {
    format!("Hello, {name}! Welcome to the MCP server.")
}

/// Register the greet tool with the tool registry.
pub fn register(registry: &mut ToolRegistry) {
    let tool = MCPTool::new(
        NAME,
        "Greets a person by name with a welcome message",
        vec![ToolParam::string("name", "The name of the person to greet")],
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let name = utils::string_arg(&args, "name")?;
        Ok(Value::String(greet(name)))
    });

    registry.register(tool, handler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn greets_by_name() {
        assert_eq!(greet("World"), "Hello, World! Welcome to the MCP server.");
    }

    #[test]
    fn empty_and_unusual_names_pass_through() {
        assert_eq!(greet(""), "Hello, ! Welcome to the MCP server.");
        assert_eq!(greet("Zoë 🦀"), "Hello, Zoë 🦀! Welcome to the MCP server.");
    }

    #[test]
    fn handler_reads_name_argument() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);

        let result = registry.call(NAME, json!({ "name": "Ada" })).unwrap();
        assert_eq!(result, Ok(json!("Hello, Ada! Welcome to the MCP server.")));
        assert!(registry.call(NAME, json!({})).unwrap().is_err());
    }
}
