use utxo_compose::{CandidateInput, ComposeError, ScriptKind, SortingStrategy, compose};

use crate::helpers::*;

fn candidate(seed: u8, amount: u64, own: bool, confirmations: u32) -> CandidateInput {
    CandidateInput::builder()
        .txid(txid(seed))
        .vout(0)
        .amount(amount)
        .own(own)
        .confirmations(confirmations)
        .build()
}

fn spent_txids(inputs: &[CandidateInput]) -> Vec<String> {
    inputs.iter().map(|i| i.txid.clone()).collect()
}

#[test]
fn test_prefers_confirmed_own_inputs() {
    let inputs = vec![candidate(1, 500_000, true, 0), candidate(2, 200_000, true, 1)];

    let request = new_request(
        inputs.clone(),
        vec![payment(ScriptKind::P2wpkh, 9, 100_000)],
        ScriptKind::P2wpkh,
    );
    let parts = expect_final(compose(&request));
    assert_eq!(spent_txids(&parts.inputs), vec![txid(2)]);

    // the confirmed input alone is not enough
    let request = new_request(
        inputs,
        vec![payment(ScriptKind::P2wpkh, 9, 300_000)],
        ScriptKind::P2wpkh,
    );
    let parts = expect_final(compose(&request));
    assert_eq!(spent_txids(&parts.inputs), vec![txid(1)]);
}

#[test]
fn test_foreign_inputs_need_six_confirmations() {
    let outputs = vec![payment(ScriptKind::P2wpkh, 9, 50_000)];
    let request_with = |confirmations| {
        new_request(
            vec![candidate(1, 100_000, false, confirmations)],
            outputs.clone(),
            ScriptKind::P2wpkh,
        )
    };
    assert_eq!(
        compose(&request_with(5)).error(),
        Some(&ComposeError::NotEnoughFunds)
    );
    assert!(compose(&request_with(6)).is_final());
}

#[test]
fn test_immature_coinbase_is_not_spent() {
    let mut coinbase = candidate(1, 1_000_000, true, 99);
    coinbase.coinbase = true;
    let request = new_request(
        vec![coinbase.clone(), candidate(2, 10_000, true, 6)],
        vec![payment(ScriptKind::P2wpkh, 9, 50_000)],
        ScriptKind::P2wpkh,
    );
    assert_eq!(compose(&request).error(), Some(&ComposeError::NotEnoughFunds));

    coinbase.confirmations = 100;
    let request = utxo_compose::ComposeRequest {
        candidate_inputs: vec![coinbase],
        ..request
    };
    assert!(compose(&request).is_final());
}

#[test]
fn test_required_inputs_are_always_spent() {
    let mut required = candidate(1, 5_000, false, 0);
    required.required = true;
    let request = new_request(
        vec![candidate(2, 500_000, true, 6), required],
        vec![payment(ScriptKind::P2wpkh, 9, 100_000)],
        ScriptKind::P2wpkh,
    );
    let parts = expect_final(compose(&request));
    let mut spent = spent_txids(&parts.inputs);
    spent.sort();
    assert_eq!(spent, vec![txid(1), txid(2)]);
    assert_conserves_value(&parts);
}

#[test]
fn test_largest_effective_value_first() {
    let request = new_request(
        vec![
            candidate(1, 10_000, true, 6),
            candidate(2, 300_000, true, 6),
            candidate(3, 50_000, true, 6),
        ],
        vec![payment(ScriptKind::P2wpkh, 9, 40_000)],
        ScriptKind::P2wpkh,
    );
    let parts = expect_final(compose(&request));
    assert_eq!(spent_txids(&parts.inputs), vec![txid(2)]);
}

#[test]
fn test_inputs_worth_less_than_their_fee_are_not_spent() {
    // a p2wpkh input costs 680 sat at 10 sat/vB
    let request = new_request(
        vec![
            candidate(1, 100_000, true, 6),
            candidate(2, 600, true, 6),
            candidate(3, 600, true, 6),
        ],
        vec![payment(ScriptKind::P2wpkh, 9, 98_950)],
        ScriptKind::P2wpkh,
    );
    assert_eq!(compose(&request).error(), Some(&ComposeError::NotEnoughFunds));
}

#[test]
fn test_skip_selection_spends_inputs_verbatim() {
    let mut coinbase = candidate(1, 30_000, false, 0);
    coinbase.coinbase = true;
    let mut request = new_request(
        vec![coinbase, candidate(2, 200_000, true, 6)],
        vec![payment(ScriptKind::P2wpkh, 9, 10_000)],
        ScriptKind::P2wpkh,
    );
    request.skip_selection = true;
    request.sorting_strategy = SortingStrategy::PreserveOrder;
    let parts = expect_final(compose(&request));
    assert_eq!(spent_txids(&parts.inputs), vec![txid(1), txid(2)]);
    assert!(change_amount(&parts.outputs).is_some());
    assert_conserves_value(&parts);

    request.requested_outputs = vec![payment(ScriptKind::P2wpkh, 9, 230_000)];
    assert_eq!(compose(&request).error(), Some(&ComposeError::NotEnoughFunds));
}

fn with_kind(mut input: CandidateInput, kind: ScriptKind) -> CandidateInput {
    input.script_kind = Some(kind);
    input
}

fn mixed_inputs() -> Vec<CandidateInput> {
    // effective values at 10 sat/vB: 59320, 59020, 59520
    vec![
        candidate(1, 60_000, true, 6),
        with_kind(candidate(2, 60_500, true, 6), ScriptKind::P2pkh),
        candidate(3, 60_200, true, 6),
    ]
}

#[test]
fn test_selection_follows_effective_value_per_input_kind() {
    let mut request = new_request(
        mixed_inputs(),
        vec![payment(ScriptKind::P2wpkh, 9, 100_000)],
        ScriptKind::P2wpkh,
    );
    request.sorting_strategy = SortingStrategy::PreserveOrder;
    let parts = expect_final(compose(&request));
    // the largest input costs a p2pkh spend and is passed over
    assert_eq!(spent_txids(&parts.inputs), vec![txid(1), txid(3)]);
    assert_eq!(parts.vbytes, 209);
}

#[test]
fn test_legacy_input_among_segwit_inputs() {
    let request = new_request(
        mixed_inputs(),
        vec![payment(ScriptKind::P2wpkh, 9, 150_000)],
        ScriptKind::P2wpkh,
    );
    let parts = expect_final(compose(&request));
    assert_eq!(parts.inputs.len(), 3);
    // 40 + 2 marker/flag + 1 empty witness, 2 * 272 + 592 inputs, 2 * 124 outputs
    assert_eq!(parts.vbytes, 357);
    assert_eq!(parts.fee, 3570);
    assert_eq!(change_amount(&parts.outputs), Some(180_700 - 150_000 - 3570));
    assert_conserves_value(&parts);
}
