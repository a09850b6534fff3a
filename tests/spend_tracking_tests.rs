//! Tests for spend tracking and phantom promotion in the contract graph

use covenant_tracking_libs::contract::ContractGraph;
use covenant_tracking_libs::data_structures::{
    OutPoint, OutputTemplate, Satoshis, Script, TxId, TxTemplate,
};
use covenant_tracking_libs::errors::ModelError;

fn single_output_template(raw: &[u8], amount: u64) -> TxTemplate {
    TxTemplate::new(
        raw.to_vec(),
        vec![OutputTemplate::new(amount, Script::new(vec![0x51]))],
    )
}

#[test]
fn test_phantom_spend_scenario() {
    // A phantom transaction with synthesized id "mock:1" creates a UTXO at
    // index 0 with amount 5000.
    let mut graph = ContractGraph::new();
    let funding = graph.insert_phantom(single_output_template(&[0x01], 5000));
    assert_eq!(graph.tx(funding).unwrap().txid().as_str(), "mock:1");

    let utxo_key = graph.outputs_of(funding)[0];
    let utxo = graph.utxo(utxo_key).unwrap();
    assert_eq!(utxo.vout(), 0);
    assert_eq!(utxo.amount(), Satoshis::new(5000));

    // add_spend with a concrete transaction T, id "abc123".
    let spender = graph.insert_concrete(TxId::new("abc123"), single_output_template(&[0x02], 4000));
    assert!(graph.add_spend(utxo_key, spender).unwrap());
    assert_eq!(graph.spend_txids(utxo_key), vec![TxId::new("abc123")]);

    // Calling add_spend(T) again leaves spends == [T].
    assert!(!graph.add_spend(utxo_key, spender).unwrap());
    assert_eq!(graph.spend_txids(utxo_key), vec![TxId::new("abc123")]);
}

#[test]
fn test_spend_list_grows_never_shrinks() {
    let mut graph = ContractGraph::new();
    let funding = graph.insert_phantom(single_output_template(&[0x01], 5000));
    let utxo_key = graph.outputs_of(funding)[0];

    let first = graph.insert_concrete(TxId::new("abc123"), single_output_template(&[0x02], 1000));
    let second = graph.insert_concrete(TxId::new("def456"), single_output_template(&[0x03], 2000));
    graph.add_spend(utxo_key, first).unwrap();
    graph.add_spend(utxo_key, second).unwrap();

    assert_eq!(
        graph.spend_txids(utxo_key),
        vec![TxId::new("abc123"), TxId::new("def456")]
    );
    assert!(graph.utxo(utxo_key).unwrap().is_spent());
}

#[test]
fn test_is_mock_flips_exactly_at_promotion() {
    let mut graph = ContractGraph::new();
    let funding = graph.insert_phantom(single_output_template(&[0x01], 5000));
    let utxo_key = graph.outputs_of(funding)[0];
    let mock_outpoint = graph.outpoint_of(utxo_key).unwrap();

    assert!(graph.is_mock(&mock_outpoint));

    graph
        .promote(funding, TxId::new("abc123"), vec![0xde, 0xad])
        .unwrap();

    // False immediately after promotion, for both the old and new name.
    assert!(!graph.is_mock(&mock_outpoint));
    assert!(!graph.is_mock(&OutPoint::new("abc123", 0)));

    // The old mock outpoint and the new real outpoint are never both live
    // views of the same output.
    assert!(graph.utxo_at(&mock_outpoint).is_none());
    assert_eq!(graph.utxo_at(&OutPoint::new("abc123", 0)), Some(utxo_key));
}

#[test]
fn test_promotion_preserves_spend_history() {
    let mut graph = ContractGraph::new();
    let funding = graph.insert_phantom(single_output_template(&[0x01], 5000));
    let utxo_key = graph.outputs_of(funding)[0];
    let spender = graph.insert_phantom(single_output_template(&[0x02], 4000));
    graph.add_spend(utxo_key, spender).unwrap();

    graph
        .promote(funding, TxId::new("abc123"), vec![0xbe, 0xef])
        .unwrap();

    // The UTXO key is stable across promotion and the spend survives.
    let utxo = graph.utxo(utxo_key).unwrap();
    assert!(utxo.is_spent());
    assert_eq!(utxo.amount(), Satoshis::new(5000));
    assert_eq!(graph.spend_txids(utxo_key), vec![TxId::synthesized(2)]);
}

#[test]
fn test_identity_conflict_keeps_history() {
    let mut graph = ContractGraph::new();
    let funding = graph.insert_phantom(single_output_template(&[0x01], 5000));
    graph.insert_concrete(TxId::new("abc123"), single_output_template(&[0x02], 1));

    let err = graph
        .promote(funding, TxId::new("abc123"), vec![])
        .unwrap_err();
    assert!(matches!(err, ModelError::IdentityConflict { .. }));

    // The mock entry is retained rather than history silently dropped.
    assert!(graph.tx(funding).unwrap().is_phantom());
    assert!(graph.is_mock(&OutPoint::new(TxId::synthesized(1), 0)));
}

#[test]
fn test_independently_reconstructed_phantoms_share_a_fingerprint() {
    let mut graph = ContractGraph::new();
    let first = graph.insert_phantom(single_output_template(&[0x07], 5000));
    let second = graph.insert_phantom(single_output_template(&[0x07], 5000));

    let a = graph.tx(first).unwrap().dedup_key();
    let b = graph.tx(second).unwrap().dedup_key();
    assert_ne!(a.0, b.0, "synthesized ids must be distinct");
    assert_eq!(a.1, b.1, "content fingerprints must collapse them");
}
