//! Metrics command

use clap::{Args, ValueEnum};
use trellis_core::{Config, Engine, MetricKind};

use super::{get_client, print_json, resolve_project_id};

/// Compute project metrics
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Project node id, URL or owner/number
    pub project: String,

    /// Metric to compute; repeat for several (all if not specified)
    #[arg(short, long = "metric", value_enum)]
    pub metrics: Vec<MetricArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    BacklogHealth,
    DependencyStatus,
    PriorityDistribution,
    CompletionRate,
    CycleTime,
}

impl From<MetricArg> for MetricKind {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::BacklogHealth => MetricKind::BacklogHealth,
            MetricArg::DependencyStatus => MetricKind::DependencyStatus,
            MetricArg::PriorityDistribution => MetricKind::PriorityDistribution,
            MetricArg::CompletionRate => MetricKind::CompletionRate,
            MetricArg::CycleTime => MetricKind::CycleTime,
        }
    }
}

fn requested(metrics: &[MetricArg]) -> Vec<MetricKind> {
    if metrics.is_empty() {
        MetricKind::ALL.to_vec()
    } else {
        metrics.iter().copied().map(MetricKind::from).collect()
    }
}

impl MetricsArgs {
    /// Execute the metrics command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = get_client(config)?;
        let project_id = resolve_project_id(&client, &self.project).await?;

        let engine = Engine::new(client, config.clone());
        let metrics = engine
            .generate_project_metrics(&project_id, &requested(&self.metrics))
            .await?;
        print_json(&metrics)
    }
}
