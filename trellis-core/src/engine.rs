//! Analysis engine
//!
//! Each request fetches one snapshot through a [`SnapshotFetcher`], builds the
//! item index and dependency graph from it, and runs only the analyses that
//! were asked for. Nothing is kept between requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::graph::{AnalysisCriteria, DependencyAnalysis, DependencyGraph};
use crate::index::ItemIndex;
use crate::metrics::{MetricKind, ProjectMetrics};
use crate::model::Snapshot;
use crate::Result;

/// Source of project snapshots
///
/// Failures should be reported as [`crate::Error::Upstream`].
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch every item of a project with fields, timestamps and relationships
    async fn fetch_snapshot(&self, project_id: &str) -> Result<Snapshot>;
}

/// Runs dependency analysis and metrics against fetched snapshots
#[derive(Debug)]
pub struct Engine<F> {
    fetcher: F,
    config: Config,
}

impl<F: SnapshotFetcher> Engine<F> {
    pub fn new(fetcher: F, config: Config) -> Self {
        Self { fetcher, config }
    }

    /// Fetch the project and run the requested dependency checks
    pub async fn analyze_dependencies(
        &self,
        project_id: &str,
        criteria: AnalysisCriteria,
    ) -> Result<DependencyAnalysis> {
        let snapshot = self.fetch(project_id).await?;
        Ok(self.analyze_snapshot(&snapshot, criteria))
    }

    /// Fetch the project and compute the requested metrics as of now
    pub async fn generate_project_metrics(
        &self,
        project_id: &str,
        metrics: &[MetricKind],
    ) -> Result<ProjectMetrics> {
        let snapshot = self.fetch(project_id).await?;
        Ok(self.metrics_for_snapshot(&snapshot, metrics, Utc::now()))
    }

    /// Run dependency checks on a snapshot already in hand
    pub fn analyze_snapshot(
        &self,
        snapshot: &Snapshot,
        criteria: AnalysisCriteria,
    ) -> DependencyAnalysis {
        let index = ItemIndex::new(snapshot, &self.config.analysis.status_field);
        let graph = DependencyGraph::build(&index);
        DependencyAnalysis::run(&graph, &index, criteria, self.config.analysis.max_cycles)
    }

    /// Compute metrics on a snapshot already in hand
    pub fn metrics_for_snapshot(
        &self,
        snapshot: &Snapshot,
        metrics: &[MetricKind],
        now: DateTime<Utc>,
    ) -> ProjectMetrics {
        let index = ItemIndex::new(snapshot, &self.config.analysis.status_field);
        let graph = DependencyGraph::build(&index);
        ProjectMetrics::compute(
            metrics,
            &index,
            &graph,
            &self.config.metrics,
            &self.config.analysis.status_field,
            now,
        )
    }

    async fn fetch(&self, project_id: &str) -> Result<Snapshot> {
        debug!(project_id, "Fetching project snapshot");
        let snapshot = self.fetcher.fetch_snapshot(project_id).await?;
        info!(
            project_id,
            items = snapshot.items.len(),
            "Fetched project snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Measured;
    use crate::model::{ContentKind, FieldValue, Item, ItemState};
    use crate::Error;
    use std::collections::HashMap;

    /// Serves canned snapshots by project id
    struct StaticFetcher {
        snapshots: HashMap<String, Vec<Item>>,
    }

    #[async_trait]
    impl SnapshotFetcher for StaticFetcher {
        async fn fetch_snapshot(&self, project_id: &str) -> Result<Snapshot> {
            self.snapshots
                .get(project_id)
                .map(|items| Snapshot::new(project_id, items.clone()))
                .ok_or_else(|| Error::Upstream(format!("project {} not found", project_id)))
        }
    }

    fn item(id: &str, status: Option<&str>, blocks: &[&str]) -> Item {
        let mut item = Item::new(id, ContentKind::Issue);
        if let Some(s) = status {
            item.fields
                .insert("Status".to_string(), FieldValue::SingleSelect(s.to_string()));
        }
        item.relationships.blocks = blocks.iter().map(|s| s.to_string()).collect();
        item
    }

    fn engine(items: Vec<Item>) -> Engine<StaticFetcher> {
        let snapshots = HashMap::from([("P".to_string(), items)]);
        Engine::new(StaticFetcher { snapshots }, Config::default())
    }

    #[tokio::test]
    async fn test_analyze_dependencies_end_to_end() {
        let engine = engine(vec![
            item("A", Some("Todo"), &["B", "GONE"]),
            item("B", Some("Done"), &["C"]),
            item("C", None, &["A"]),
        ]);

        let analysis = engine
            .analyze_dependencies("P", AnalysisCriteria::all())
            .await
            .unwrap();

        let cycles = analysis.cycles.unwrap();
        assert_eq!(cycles.cycles.len(), 1);
        assert_eq!(cycles.cycles[0], vec!["A", "B", "C"]);
        assert_eq!(analysis.missing.unwrap().missing[0].target_id, "GONE");
        assert_eq!(analysis.status.unwrap().inconsistencies.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_request() {
        let engine = engine(vec![]);

        let err = engine
            .analyze_dependencies("unknown", AnalysisCriteria::all())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));

        let err = engine
            .generate_project_metrics("unknown", &MetricKind::ALL)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_metrics_without_timestamps() {
        let mut closed = item("B", Some("Done"), &[]);
        closed.state = ItemState::Closed;
        let engine = engine(vec![item("A", Some("Todo"), &[]), closed]);

        let metrics = engine
            .generate_project_metrics("P", &[MetricKind::BacklogHealth, MetricKind::CycleTime])
            .await
            .unwrap();

        let backlog = metrics.backlog_health.unwrap();
        assert_eq!(backlog.total, 2);
        let cycle_time = metrics.cycle_time.unwrap();
        assert_eq!(cycle_time.average_days, Measured::Unavailable);
        assert!(metrics.completion_rate.is_none());
        assert!(metrics.dependency_status.is_none());
    }

    #[tokio::test]
    async fn test_empty_project_metrics() {
        let engine = engine(vec![]);

        let metrics = engine
            .generate_project_metrics("P", &MetricKind::ALL)
            .await
            .unwrap();

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["completion_rate"]["total"], 0);
        assert_eq!(json["completion_rate"]["rate"], 0.0);
        assert_eq!(json["priority_distribution"]["unset"], 0);
        assert_eq!(json["dependency_status"]["blocked_items"], 0);
        assert_eq!(json["cycle_time"]["average_days"], "unavailable");
    }
}
