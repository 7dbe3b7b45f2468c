/// Services layer - pure computation over domain values.
pub mod aggregator;

pub use aggregator::aggregate;
