use clap::Parser;
use std::path::PathBuf;

use crate::adapters::{ConsoleTreeFormatter, JsonTreeFormatter};
use crate::ports::TreeFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Tree,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "tree" | "console" => Ok(OutputFormat::Tree),
            _ => Err(format!(
                "Invalid format: {}. Please specify 'json' or 'tree'",
                s
            )),
        }
    }
}

impl OutputFormat {
    /// Creates a formatter instance for the specified output format.
    ///
    /// `colored` selects ANSI color for the tree format; pass `false`
    /// when the output goes to a file.
    pub fn create_formatter(&self, colored: bool) -> Box<dyn TreeFormatter> {
        match self {
            OutputFormat::Json => Box::new(JsonTreeFormatter::new()),
            OutputFormat::Tree if colored => Box::new(ConsoleTreeFormatter::new()),
            OutputFormat::Tree => Box::new(ConsoleTreeFormatter::plain()),
        }
    }
}

/// Replay a recorded project-evaluation trace through the dependency-tree
/// engine and render the resulting cross-target dependency tree
#[derive(Parser, Debug)]
#[command(name = "deptree")]
#[command(version)]
#[command(about = "Replay an evaluation trace into a dependency tree", long_about = None)]
pub struct Args {
    /// Path to the JSON trace file to replay
    #[arg(short, long)]
    pub trace: PathBuf,

    /// Output format: json or tree
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to a deptree.config.yml (defaults to auto-discovery in the
    /// current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hide dependencies marked invisible from the rendered output
    #[arg(long)]
    pub hide_invisible: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_output_format_from_str_json() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_output_format_from_str_tree() {
        assert_eq!(OutputFormat::from_str("tree").unwrap(), OutputFormat::Tree);
        assert_eq!(
            OutputFormat::from_str("console").unwrap(),
            OutputFormat::Tree
        );
    }

    #[test]
    fn test_output_format_from_str_invalid() {
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_args_parse_minimal() {
        let args = Args::try_parse_from(["deptree", "--trace", "trace.json"]).unwrap();
        assert_eq!(args.trace, PathBuf::from("trace.json"));
        assert!(args.format.is_none());
        assert!(!args.hide_invisible);
    }

    #[test]
    fn test_args_require_trace() {
        assert!(Args::try_parse_from(["deptree"]).is_err());
    }
}
