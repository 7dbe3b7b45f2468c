//! deptree - incremental dependency-tree snapshot engine
//!
//! This library folds MSBuild-style project-evaluation rule updates into
//! immutable, versioned dependency snapshots, merges snapshots across
//! target frameworks, and publishes each new aggregated snapshot through
//! a dataflow pipeline to linked consumers.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`dependency_tree::domain`): Pure dependency-model,
//!   snapshot, and version-vector value objects
//! - **Services** (`dependency_tree::services`): Pure computation
//!   (cross-target aggregation)
//! - **Handlers** (`handlers`): Rule handlers converting raw evaluation
//!   updates into typed dependency deltas, plus their registry
//! - **Engine** (`engine`): The tokio-based dataflow/subscription engine
//! - **Ports** (`ports`): Interface definitions for collaborators
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use deptree::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let registry = RuleHandlerRegistry::with_default_handlers();
//! let engine = DependencyTreeEngine::start(registry, None, EngineConfig::default());
//!
//! let collector = Arc::new(CollectingConsumer::new());
//! let _link = engine.link_consumer(collector.clone());
//!
//! let source = engine.add_source("evaluation", TargetFramework::new("net8.0")?);
//! source
//!     .send_updates(vec![RuleUpdate::full(
//!         "PackageReference",
//!         TargetFramework::new("net8.0")?,
//!     )
//!     .with_added(RuleItem::new("Serilog").with_property("Version", "3.1.1"))])
//!     .await?;
//! source.complete().await?;
//!
//! engine.join().await?;
//! let (snapshot, versions) = collector.latest().expect("one publication");
//! assert_eq!(snapshot.per_framework().len(), 1);
//! assert_eq!(versions.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod dependency_tree;
pub mod engine;
pub mod handlers;
pub mod ports;
pub mod shared;

/// Convenience re-exports of the types most integrations need.
pub mod prelude {
    pub use crate::adapters::{
        CollectingConsumer, ConsoleTreeFormatter, FilePresenter, FileTraceReader,
        JsonTreeFormatter, StdoutPresenter, TracingTelemetryLogger,
    };
    pub use crate::dependency_tree::domain::{
        AggregatedSnapshot, DependencyChanges, DependencyId, DependencyModel, MergedEntry,
        ProviderType, Snapshot, SourceId, TargetFramework, VersionVector,
    };
    pub use crate::dependency_tree::services::aggregate;
    pub use crate::engine::{
        ConsumerLink, DependencyTreeEngine, EngineConfig, LinkState, Publication, SourceEvent,
        SourceHandle,
    };
    pub use crate::handlers::{
        AssemblyReferenceHandler, PackageReferenceHandler, ProjectReferenceHandler, RootNode,
        RuleHandler, RuleHandlerRegistry, RuleItem, RuleUpdate,
    };
    pub use crate::ports::{
        OutputPresenter, SnapshotConsumer, TelemetrySink, TraceBatch, TraceSource, TreeFormatter,
    };
    pub use crate::shared::{DepTreeError, ExitCode, Result};
}
