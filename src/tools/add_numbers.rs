/// addNumbers Tool Implementation
///
/// Adds two signed 32-bit integers. Overflow wraps around exactly like native
/// two's-complement `i32` arithmetic, so `i32::MAX + 1 == i32::MIN`.

use crate::core::error::ToolError;
use crate::core::server::{MCPTool, ToolHandler, ToolParam, ToolRegistry};
use crate::core::utils;
use serde_json::Value;

pub const NAME: &str = "addNumbers";

pub fn add_numbers(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Register the addNumbers tool with the tool registry.
pub fn register(registry: &mut ToolRegistry) {
    let tool = MCPTool::new(
        NAME,
        "Adds two numbers together and returns the sum",
        vec![
            ToolParam::integer("a", "First number to add"),
            ToolParam::integer("b", "Second number to add"),
        ],
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let a = utils::i32_arg(&args, "a")?;
        let b = utils::i32_arg(&args, "b")?;
        Ok(Value::from(add_numbers(a, b)))
    });

    registry.register(tool, handler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adds() {
        assert_eq!(add_numbers(2, 3), 5);
        assert_eq!(add_numbers(-5, 5), 0);
        assert_eq!(add_numbers(-10, -20), -30);
    }

    #[test]
    fn wraps_on_overflow() {
        assert_eq!(add_numbers(2147483647, 1), -2147483648);
        assert_eq!(add_numbers(i32::MIN, -1), i32::MAX);
    }

    #[test]
    fn handler_coerces_integer_arguments() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);

        assert_eq!(registry.call(NAME, json!({ "a": 2, "b": "3" })).unwrap(), Ok(json!(5)));
        assert_eq!(
            registry.call(NAME, json!({ "a": 2 })).unwrap(),
            Err(ToolError::MissingArgument { name: "b".to_string() })
        );
    }
}
