use rand::{SeedableRng, rngs::StdRng};
use utxo_compose::{
    CandidateInput, ComposeRequest, RequestedOutput, ResolvedOutput, ScriptKind,
    SortingStrategy, compose, compose_with_rng,
};

use crate::helpers::*;

fn three_inputs() -> Vec<CandidateInput> {
    vec![utxo(3, 0, 60_000), utxo(1, 1, 60_000), utxo(1, 0, 60_000)]
}

fn three_payments() -> Vec<RequestedOutput> {
    vec![
        payment(ScriptKind::P2wpkh, 5, 3_000),
        payment(ScriptKind::P2wpkh, 6, 1_000),
        payment(ScriptKind::P2wpkh, 7, 2_000),
    ]
}

fn sorted_request(strategy: SortingStrategy) -> ComposeRequest {
    let mut request = new_request(three_inputs(), three_payments(), ScriptKind::P2wpkh);
    request.requested_outputs.push(payment(ScriptKind::P2wpkh, 8, 140_000));
    request.sorting_strategy = strategy;
    request
}

fn outpoints(inputs: &[CandidateInput]) -> Vec<(String, u32)> {
    inputs.iter().map(|i| (i.txid.clone(), i.vout)).collect()
}

fn assert_permutation_matches(request: &ComposeRequest, outputs: &[ResolvedOutput], permutation: &[usize]) {
    assert_eq!(outputs.len(), permutation.len());
    let mut seen = permutation.to_vec();
    seen.sort();
    assert_eq!(seen, (0..outputs.len()).collect::<Vec<_>>());
    for (output, original) in outputs.iter().zip(permutation) {
        match request.requested_outputs.get(*original) {
            Some(RequestedOutput::Payment { address, amount }) => {
                assert_eq!(
                    output,
                    &ResolvedOutput::Payment {
                        address: address.clone(),
                        amount: *amount,
                    }
                );
            }
            Some(other) => panic!("unexpected requested output {:?}", other),
            None => assert!(output.is_change()),
        }
    }
}

#[test]
fn test_bip69_order() {
    let request = sorted_request(SortingStrategy::Bip69);
    let parts = expect_final(compose(&request));
    assert_eq!(
        outpoints(&parts.inputs),
        vec![(txid(1), 0), (txid(1), 1), (txid(3), 0)]
    );
    let amounts: Vec<u64> = parts.outputs.iter().map(|o| o.amount()).collect();
    let mut sorted = amounts.clone();
    sorted.sort();
    assert_eq!(amounts, sorted);
    assert_eq!(&parts.output_permutation[..3], &[1, 2, 0]);
    assert_permutation_matches(&request, &parts.outputs, &parts.output_permutation);
}

#[test]
fn test_bip69_breaks_amount_ties_by_script() {
    let request = new_request(
        vec![utxo(1, 0, 100_000)],
        vec![
            payment(ScriptKind::P2wpkh, 5, 1_000),
            payment(ScriptKind::P2wpkh, 4, 1_000),
        ],
        ScriptKind::P2wpkh,
    );
    let parts = expect_final(compose(&request));
    assert_eq!(parts.output_permutation, vec![1, 0, 2]);
}

#[test]
fn test_preserve_order() {
    let request = sorted_request(SortingStrategy::PreserveOrder);
    let parts = expect_final(compose(&request));
    assert_eq!(
        outpoints(&parts.inputs),
        vec![(txid(3), 0), (txid(1), 1), (txid(1), 0)]
    );
    assert_eq!(parts.output_permutation, vec![0, 1, 2, 3, 4]);
    assert!(parts.outputs[4].is_change());
    assert_permutation_matches(&request, &parts.outputs, &parts.output_permutation);
}

#[test]
fn test_random_order_is_seeded() {
    let request = sorted_request(SortingStrategy::Random);
    let first = compose_with_rng(&request, &mut StdRng::seed_from_u64(11));
    let second = compose_with_rng(&request, &mut StdRng::seed_from_u64(11));
    assert_eq!(first, second);

    for seed in 0..16 {
        let parts = expect_final(compose_with_rng(&request, &mut StdRng::seed_from_u64(seed)));
        let fixed: Vec<usize> = parts
            .output_permutation
            .iter()
            .copied()
            .filter(|i| *i != 4)
            .collect();
        assert_eq!(fixed, vec![0, 1, 2, 3]);
        assert_permutation_matches(&request, &parts.outputs, &parts.output_permutation);
        assert_conserves_value(&parts);
    }
}

#[test]
fn test_deterministic_strategies_are_idempotent() {
    for strategy in [SortingStrategy::Bip69, SortingStrategy::PreserveOrder] {
        let request = sorted_request(strategy);
        assert_eq!(compose(&request), compose(&request));
    }
}
