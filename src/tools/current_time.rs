/// getCurrentTime Tool Implementation
///
/// Renders the local wall-clock time as e.g.
/// "Monday, January 15, 2024 at 2:30:00 PM". The clock is injected at
/// registration so tests can pin it.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::core::error::ToolError;
use crate::core::server::{MCPTool, ToolHandler, ToolRegistry};

pub const NAME: &str = "getCurrentTime";

/// Weekday, month name, unpadded day, year, unpadded 12-hour clock, AM/PM.
const TIME_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M:%S %p";

/// Source of the current local date and time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock in the local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn format_time(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn current_time(clock: &dyn Clock) -> String {
    format_time(&clock.now())
}

/// Register the getCurrentTime tool, reading time from `clock`.
pub fn register(registry: &mut ToolRegistry, clock: Arc<dyn Clock>) {
    let tool = MCPTool::new(
        NAME,
        "Returns the current server time in a readable format",
        Vec::new(),
    );

    // Takes no arguments; anything supplied is ignored.
    let handler: ToolHandler = Box::new(move |_args: Value| -> Result<Value, ToolError> {
        Ok(Value::String(current_time(clock.as_ref())))
    });

    registry.register(tool, handler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    #[test]
    fn formats_afternoon() {
        let clock = FixedClock(at(2024, 1, 15, 14, 30, 0));
        assert_eq!(current_time(&clock), "Monday, January 15, 2024 at 2:30:00 PM");
    }

    #[test]
    fn formats_midnight_and_noon_as_twelve() {
        assert_eq!(
            format_time(&at(2023, 12, 31, 0, 5, 9)),
            "Sunday, December 31, 2023 at 12:05:09 AM"
        );
        assert_eq!(
            format_time(&at(2024, 7, 4, 12, 0, 59)),
            "Thursday, July 4, 2024 at 12:00:59 PM"
        );
    }

    #[test]
    fn system_clock_output_has_expected_shape() {
        let text = current_time(&SystemClock);
        assert!(text.contains(" at "));
        assert!(text.ends_with(" AM") || text.ends_with(" PM"));
    }

    #[test]
    fn handler_uses_injected_clock() {
        let mut registry = ToolRegistry::new();
        register(&mut registry, Arc::new(FixedClock(at(2024, 2, 29, 9, 1, 2))));

        assert_eq!(
            registry.call(NAME, json!({})).unwrap(),
            Ok(json!("Thursday, February 29, 2024 at 9:01:02 AM"))
        );
    }
}
