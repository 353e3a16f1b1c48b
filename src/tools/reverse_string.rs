/// reverseString Tool Implementation
///
/// Reverses the order of the characters (Unicode scalar values) of a string.
/// Combining marks and other multi-scalar grapheme clusters are not kept
/// together.

use crate::core::error::ToolError;
use crate::core::server::{MCPTool, ToolHandler, ToolParam, ToolRegistry};
use crate::core::utils;
use serde_json::Value;

pub const NAME: &str = "reverseString";

pub fn reverse_string(text: &str) -> String {
    text.chars().rev().collect()
}

/// Register the reverseString tool with the tool registry.
pub fn register(registry: &mut ToolRegistry) {
    let tool = MCPTool::new(
        NAME,
        "Reverses the given text string",
        vec![ToolParam::string("text", "The text to reverse")],
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let text = utils::string_arg(&args, "text")?;
        Ok(Value::String(reverse_string(text)))
    });

    registry.register(tool, handler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reverses_short_strings() {
        assert_eq!(reverse_string(""), "");
        assert_eq!(reverse_string("A"), "A");
        assert_eq!(reverse_string("abc"), "cba");
    }

    #[test]
    fn reversing_twice_is_identity() {
        for text in ["", "hello world", "naïve café", "🦀 crab 🦀", "a\u{301}b"] {
            assert_eq!(reverse_string(&reverse_string(text)), text);
        }
    }

    #[test]
    fn keeps_multibyte_characters_whole() {
        assert_eq!(reverse_string("ab🦀"), "🦀ba");
        // combining acute accent moves with character order, not with its base
        assert_eq!(reverse_string("e\u{301}x"), "x\u{301}e");
    }

    #[test]
    fn handler_reads_text_argument() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        assert_eq!(
            registry.call(NAME, json!({ "text": "stressed" })).unwrap(),
            Ok(json!("desserts"))
        );
    }
}
