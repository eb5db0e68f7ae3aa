//! End-to-end tests across the trust engine, ledger, and isolation layers.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::fs;
use trustmesh_core::{Error, LedgerConfig, SimulationConfig, TrustConfig};
use trustmesh_governance::{read_ledger, IsolationController, Simulation, LOW_TRUST_REASON};
use trustmesh_ledger::{Block, Ledger};
use trustmesh_trust::{Behavior, TrustEngine};

// ============================================================================
// Manual driver: the caller owns the isolation policy
// ============================================================================

#[test]
fn test_driver_isolates_below_threshold() {
    let mut trust = TrustEngine::new();
    let ledger = Ledger::new(1).into_shared();
    let mut isolation = IsolationController::new(ledger.clone());
    let mut rng = StdRng::seed_from_u64(9);

    trust.register("honest").unwrap();
    trust.register("rogue").unwrap();

    for _ in 0..20 {
        for (agent, behavior) in [("honest", Behavior::Benign), ("rogue", Behavior::Malicious)] {
            trust.observe(agent, behavior.action(&mut rng)).unwrap();
            if trust.get_trust(agent).unwrap() < 0.3 && !isolation.is_isolated(agent) {
                isolation.isolate(agent, LOW_TRUST_REASON).unwrap();
            }
        }
    }

    assert!(isolation.is_isolated("rogue"));
    assert!(!isolation.is_isolated("honest"));
    assert!(trust.get_trust("honest").unwrap() > 0.5);
    assert_eq!(trust.get_trust("rogue").unwrap(), 0.0);

    let guard = read_ledger(&ledger).unwrap();
    assert_eq!(guard.len(), 2);
    assert_eq!(guard.latest().unwrap().data()["agent"], json!("rogue"));
    assert!(guard.is_valid());
}

#[test]
fn test_unknown_agent_does_not_reach_ledger() {
    let mut trust = TrustEngine::new();
    let ledger = Ledger::new(0).into_shared();
    trust.register("a1").unwrap();

    let err = trust.observe("a2", "exfiltrate:secret").unwrap_err();
    assert!(matches!(err, Error::UnknownAgent(ref id) if id == "a2"));
    assert_eq!(trust.summary().len(), 1);
    assert_eq!(read_ledger(&ledger).unwrap().len(), 1);
}

// ============================================================================
// Simulation driver
// ============================================================================

fn run_simulation(seed: u64, malicious_probability: f64) -> Simulation {
    let config = SimulationConfig {
        agent_count: 5,
        steps: 200,
        malicious_probability,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(config, &TrustConfig::default(), LedgerConfig::with_difficulty(2)).unwrap();
    sim.register_agents().unwrap();
    sim.run(&mut StdRng::seed_from_u64(seed)).unwrap();
    sim
}

#[test]
fn test_simulation_ledger_matches_isolations() {
    let sim = run_simulation(17, 0.25);
    let guard = read_ledger(sim.ledger()).unwrap();
    assert!(guard.is_valid());
    assert!(guard.underpowered_blocks().is_empty());

    let mut logged: Vec<String> = guard.blocks()[1..]
        .iter()
        .map(|b| {
            assert_eq!(b.data()["action"], json!("isolate"));
            assert_eq!(b.data()["reason"], json!(LOW_TRUST_REASON));
            b.data()["agent"].as_str().unwrap().to_string()
        })
        .collect();
    logged.sort();
    assert_eq!(logged, sim.isolation().isolated_agents());

    for (agent, trust) in sim.trust().summary() {
        assert!((0.0..=1.0).contains(&trust), "{agent} has trust {trust}");
    }
}

#[test]
fn test_simulation_export_round_trip() {
    let sim = run_simulation(23, 0.2);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results").join("chain.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let exported = read_ledger(sim.ledger()).unwrap().export();
    fs::write(&path, serde_json::to_string_pretty(&exported).unwrap()).unwrap();

    let blocks: Vec<Block> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let restored = Ledger::from_blocks(blocks, LedgerConfig::with_difficulty(2)).unwrap();
    assert!(restored.is_valid());
    assert_eq!(restored.len(), exported.len());
}

#[test]
fn test_release_after_simulation() {
    let mut sim = run_simulation(31, 0.5);
    let isolated = sim.isolation().isolated_agents();
    assert!(!isolated.is_empty());

    let before = read_ledger(sim.ledger()).unwrap().len();
    for agent in &isolated {
        sim.isolation_mut().release(agent, "manual_review").unwrap();
    }

    assert!(sim.isolation().isolated_agents().is_empty());
    let guard = read_ledger(sim.ledger()).unwrap();
    assert_eq!(guard.len(), before + isolated.len());
    assert!(guard.is_valid());
}
