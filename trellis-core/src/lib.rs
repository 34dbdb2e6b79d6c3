//! Trellis Core - Dependency and metrics analysis for GitHub Projects
//!
//! This crate holds the item model, the dependency graph and its checks,
//! the project metrics and the priority rubric. Project data arrives through
//! a [`SnapshotFetcher`]; nothing here talks to the network.

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod index;
pub mod metrics;
pub mod model;
pub mod priority;
pub mod secrets;

pub use config::{AnalysisConfig, Config, GitHubConfig, MetricsConfig, StatusDateFields};
pub use engine::{Engine, SnapshotFetcher};
pub use error::{Error, Result};
pub use graph::{
    AnalysisCriteria, CycleReport, DanglingReference, DependencyAnalysis, DependencyGraph,
    MissingReport, StatusInconsistency, StatusReport,
};
pub use index::ItemIndex;
pub use metrics::{Measured, MetricKind, ProjectMetrics};
pub use model::{
    ContentKind, FieldValue, Item, ItemState, ItemStatus, RelationshipKind, Relationships,
    Snapshot,
};
pub use priority::{ClientPriority, Level, Priority, PriorityCriteria};
pub use secrets::{Token, TokenSource};
