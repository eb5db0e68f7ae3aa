#![deny(unused)]
//! TrustMesh - agent trust simulation with a tamper-evident isolation ledger.
//!
//! Runs one simulation: agents act, their trust is scored, low-trust agents
//! are isolated, and every isolation is mined into the ledger.

use std::fs;
use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trustmesh_core::AppConfig;
use trustmesh_governance::{read_ledger, setup_metrics_recorder, track_report, Simulation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    trustmesh_governance::configure_tracing(config.logging.json_logs)?;
    let metrics_handle = if config.metrics.enabled {
        Some(setup_metrics_recorder()?)
    } else {
        None
    };

    let run_id = uuid::Uuid::new_v4();
    let seed = config.simulation.seed.unwrap_or_else(rand::random);
    tracing::info!(
        %run_id,
        seed,
        difficulty = config.ledger.difficulty,
        "Starting TrustMesh v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut sim = Simulation::new(config.simulation.clone(), &config.trust, config.ledger.clone())?;
    sim.register_agents()?;

    // Mining is CPU-bound; run the whole simulation on the blocking pool.
    let (sim, report) = tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        sim.run(&mut rng).map(|report| (sim, report))
    })
    .await??;

    for event in &report.isolations {
        tracing::info!(
            agent_id = %event.agent_id,
            step = event.step,
            block_index = event.block_index,
            "Isolated agent"
        );
    }
    tracing::info!(summary = ?report.trust_summary, "Final trust summary");
    tracing::info!(valid = report.ledger_valid, length = report.ledger_len, "Ledger verified");

    if let Some(path) = &config.simulation.export_path {
        export_chain(&sim, Path::new(path))?;
    }

    if let Some(handle) = metrics_handle {
        track_report(&report);
        println!("{}", handle.render());
    }

    Ok(())
}

fn export_chain(sim: &Simulation, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let blocks = read_ledger(sim.ledger())?.export();
    let json = serde_json::to_string_pretty(&blocks)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), blocks = blocks.len(), "Saved ledger");
    Ok(())
}
