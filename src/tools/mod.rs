/// Tools Module
///
/// This module contains all MCP tool implementations. Each tool is implemented
/// as a separate module that exports a `register` function to add the tool to
/// the registry during server initialization.

pub mod add_numbers;
pub mod current_time;
pub mod greet;
pub mod reverse_string;

use std::sync::Arc;

use crate::core::server::ToolRegistry;
use current_time::Clock;

/// Register every tool, in listing order.
pub fn register_all(registry: &mut ToolRegistry, clock: Arc<dyn Clock>) {
    greet::register(registry);
    add_numbers::register(registry);
    current_time::register(registry, clock);
    reverse_string::register(registry);
}
