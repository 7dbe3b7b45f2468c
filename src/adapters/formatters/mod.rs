/// Formatter adapters - concrete [`crate::ports::TreeFormatter`]s.
pub mod console_formatter;
pub mod json_formatter;

pub use console_formatter::ConsoleTreeFormatter;
pub use json_formatter::JsonTreeFormatter;
