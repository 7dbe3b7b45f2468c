/// Dependency-tree core: domain values and the pure services over them.
pub mod domain;
pub mod services;
