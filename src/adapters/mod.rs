/// Adapters - concrete implementations of the ports.
pub mod collecting_consumer;
pub mod formatters;
pub mod presenters;
pub mod telemetry_logger;
pub mod trace_reader;

pub use collecting_consumer::CollectingConsumer;
pub use formatters::{ConsoleTreeFormatter, JsonTreeFormatter};
pub use presenters::{FilePresenter, StdoutPresenter};
pub use telemetry_logger::TracingTelemetryLogger;
pub use trace_reader::FileTraceReader;
