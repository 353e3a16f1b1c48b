/// Argument Extraction Helpers
///
/// Tool handlers receive their arguments as a JSON object. These helpers pull
/// a named argument out of that object and coerce it to the Rust type the
/// operation expects. Values are never validated beyond their type.

use serde_json::Value;

use crate::core::error::ToolError;

/// Get a required string argument.
///
/// # Arguments
/// * `args` - The `arguments` object from a tools/call request
/// * `name` - Parameter name to look up
pub fn string_arg<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Err(missing(name)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(invalid(name, "a string")),
    }
}

/// Get a required 32-bit signed integer argument.
///
/// JSON integers and strings holding an integer are both accepted, as long as
/// the value fits in an `i32`. Fractional numbers are rejected.
pub fn i32_arg(args: &Value, name: &str) -> Result<i32, ToolError> {
    let wide = match args.get(name) {
        None | Some(Value::Null) => return Err(missing(name)),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    wide.and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| invalid(name, "a 32-bit integer"))
}

fn missing(name: &str) -> ToolError {
    ToolError::MissingArgument { name: name.to_string() }
}

fn invalid(name: &str, expected: &str) -> ToolError {
    ToolError::InvalidArgument {
        name: name.to_string(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_arg_accepts_empty_strings() {
        let args = json!({ "name": "" });
        assert_eq!(string_arg(&args, "name"), Ok(""));
    }

    #[test]
    fn string_arg_reports_missing_and_mistyped() {
        let args = json!({ "other": 1, "name": 42 });
        assert_eq!(
            string_arg(&args, "text"),
            Err(ToolError::MissingArgument { name: "text".to_string() })
        );
        assert!(matches!(
            string_arg(&args, "name"),
            Err(ToolError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn i32_arg_coerces_numbers_and_numeric_strings() {
        let args = json!({ "a": -7, "b": " 12 " });
        assert_eq!(i32_arg(&args, "a"), Ok(-7));
        assert_eq!(i32_arg(&args, "b"), Ok(12));
    }

    #[test]
    fn i32_arg_rejects_out_of_range_and_fractions() {
        let args = json!({ "big": 2147483648_i64, "frac": 1.5, "flag": true });
        for name in ["big", "frac", "flag"] {
            assert!(matches!(
                i32_arg(&args, name),
                Err(ToolError::InvalidArgument { .. })
            ));
        }
        assert_eq!(
            i32_arg(&args, "missing"),
            Err(ToolError::MissingArgument { name: "missing".to_string() })
        );
    }
}
