//! Metrics implementation using Prometheus.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use trustmesh_core::{Error, Result};

use crate::simulation::SimulationReport;

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::internal(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// Publish end-of-run gauges for a finished simulation.
pub fn track_report(report: &SimulationReport) {
    metrics::gauge!("simulation_ledger_length").set(report.ledger_len as f64);
    metrics::gauge!("simulation_isolated_agents").set(report.isolated_agents.len() as f64);
    for (agent_id, trust) in &report.trust_summary {
        metrics::gauge!("agent_trust", "agent" => agent_id.clone()).set(*trust);
    }
}
