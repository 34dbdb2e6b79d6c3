//! Trellis GitHub - GitHub Projects integration for Trellis
//!
//! This crate talks to the GitHub GraphQL API: it fetches project snapshots
//! for the analysis engine and manages projects, items, views, dependencies
//! and priorities.

mod client;
mod dependencies;
mod error;
mod graphql;
mod items;
mod priorities;
mod projects;
mod views;

pub use client::{parse_project_url, GitHubClient, OwnerKind, ProjectRef};
pub use dependencies::DependencyUpdate;
pub use error::{Error, Result};
pub use items::ProjectItem;
pub use priorities::{priority_value, Assessment, BatchOutcome, PriorityUpdate};
pub use projects::{
    find_field, CreatedProject, FieldDataType, FieldOption, FieldUpdate, ProjectField,
    ProjectInfo, ProjectSummary,
};
pub use views::{ProjectView, ViewLayout};
