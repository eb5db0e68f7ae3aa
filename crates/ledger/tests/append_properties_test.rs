use proptest::prelude::*;
use serde_json::{json, Value};
use trustmesh_ledger::{Block, Ledger, GENESIS_PREV_HASH};

fn arb_payload() -> impl Strategy<Value = Value> {
    (
        "[a-z_]{1,12}",
        any::<i64>(),
        -1.0e9f64..1.0e9,
        prop::collection::vec("[a-z0-9]{0,8}", 0..4),
    )
        .prop_map(|(event, count, score, tags)| {
            json!({ "event": event, "count": count, "score": score, "tags": tags })
        })
}

fn assert_linked(blocks: &[Block]) -> Result<(), TestCaseError> {
    prop_assert_eq!(blocks[0].prev_hash(), GENESIS_PREV_HASH);
    for (i, block) in blocks.iter().enumerate() {
        prop_assert_eq!(block.index(), i as u64);
        prop_assert!(block.is_sealed_correctly());
        if i > 0 {
            prop_assert_eq!(block.prev_hash(), blocks[i - 1].hash());
        }
    }
    Ok(())
}

// ── Every successful append keeps the chain valid ───────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn appends_keep_chain_valid(
        difficulty in 0usize..=1,
        payloads in prop::collection::vec(arb_payload(), 0..12),
    ) {
        let mut ledger = Ledger::new(difficulty);
        for (n, payload) in payloads.iter().enumerate() {
            let block = ledger.add_block(payload).unwrap().into_result().unwrap();
            prop_assert_eq!(block.index(), n as u64 + 1);
            prop_assert_eq!(block.data(), payload.as_object().unwrap());
            prop_assert!(block.meets_difficulty(difficulty));
            prop_assert!(ledger.is_valid());
        }
        prop_assert_eq!(ledger.len(), payloads.len() + 1);
        prop_assert!(ledger.underpowered_blocks().is_empty());
        assert_linked(ledger.blocks())?;
    }

    #[test]
    fn exported_chain_survives_json_round_trip(
        payloads in prop::collection::vec(arb_payload(), 1..8),
    ) {
        let mut ledger = Ledger::new(0);
        for payload in &payloads {
            ledger.add_block(payload).unwrap();
        }

        let text = serde_json::to_string(&ledger.export()).unwrap();
        let blocks: Vec<Block> = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(&blocks, &ledger.export());
        assert_linked(&blocks)?;
    }
}
