//! Shared application state and the evaluation entry point

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use probabilitas_classifiers::{EvaluationInput, EvaluationResult, NaiveBayesEngine};
use probabilitas_core::{AttributeId, ProjectId};
use probabilitas_store::{ProjectSnapshot, ProjectStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::report::ReportRenderer;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Project workspace storage
    pub store: Arc<ProjectStore>,

    /// Scoring engine shared by the JSON and report endpoints
    pub engine: NaiveBayesEngine,

    /// Compiled report template
    pub reports: Arc<ReportRenderer>,

    /// Prometheus handle for rendering, absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Initialize application state from configuration
    pub fn new(
        config: ServerConfig,
        store: ProjectStore,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Result<Self> {
        let reports = ReportRenderer::new(config.report.clone())?;
        info!(
            projects = store.project_count(),
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            engine: NaiveBayesEngine::new(),
            reports: Arc::new(reports),
            metrics_handle,
        })
    }

    /// Snapshot a project and run the engine over it
    ///
    /// Both the JSON endpoint and the report go through here so that they
    /// always agree on the numbers.
    pub fn evaluate(
        &self,
        project: ProjectId,
        selected: &[AttributeId],
    ) -> probabilitas_core::Result<(ProjectSnapshot, EvaluationResult)> {
        let snapshot = self.store.project_snapshot(project)?;
        let start = Instant::now();

        let input = EvaluationInput::new(
            &snapshot.classes,
            &snapshot.attributes,
            &snapshot.associations,
            selected,
        );
        let outcome = self.engine.evaluate(&input);
        let latency_us = start.elapsed().as_micros() as f64;

        match outcome {
            Ok(result) => {
                metrics::counter!("probabilitas_evaluations_total").increment(1);
                metrics::histogram!("probabilitas_evaluation_latency_us").record(latency_us);
                debug!(
                    project = %project,
                    selected = result.selected_count,
                    total_score = result.total_score,
                    "evaluation complete"
                );
                Ok((snapshot, result))
            }
            Err(e) => {
                metrics::counter!("probabilitas_evaluation_errors_total").increment(1);
                Err(e)
            }
        }
    }
}
