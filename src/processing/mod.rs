//! Matching, search, scoring and team metrics

pub mod model;
pub mod embeddings;
pub mod embedding_manager;
pub mod constraints;
pub mod enumerator;
pub mod scorer;
pub mod workload;
pub mod chemistry;
pub mod recommendations;
pub mod optimizer;

pub use optimizer::TeamOptimizer;
