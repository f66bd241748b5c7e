//! Transaction size and fee model.
//!
//! Weights come from `bitcoin::transaction::predict_weight` and are rounded up
//! to virtual bytes once per transaction. The per-kind signature and witness
//! lengths below are calibration data: they reproduce the sizes of
//! transactions actually signed by hardware wallets, so they must not be
//! derived from script templates.

use bitcoin::{
    Weight,
    transaction::{InputWeightPrediction, predict_weight},
};

use crate::types::ScriptKind;

/// prevout hash + prevout index + nSequence, which `InputWeightPrediction`
/// leaves out.
const OUTPOINT_AND_SEQUENCE: Weight = Weight::from_non_witness_data_size(32 + 4 + 4);

/// scriptSig push of the nested p2wpkh program.
const P2SH_P2WPKH: InputWeightPrediction = InputWeightPrediction::from_slice(23, &[72, 33]);

pub const fn input_prediction(kind: ScriptKind) -> InputWeightPrediction {
    match kind {
        ScriptKind::P2pkh => InputWeightPrediction::P2PKH_COMPRESSED_MAX,
        ScriptKind::P2sh => P2SH_P2WPKH,
        ScriptKind::P2wpkh | ScriptKind::P2wsh => InputWeightPrediction::P2WPKH_MAX,
        ScriptKind::P2tr => InputWeightPrediction::P2TR_KEY_DEFAULT_SIGHASH,
    }
}

/// scriptPubKey length of a standard output of `kind`.
pub const fn output_script_len(kind: ScriptKind) -> usize {
    match kind {
        ScriptKind::P2pkh => 25,
        ScriptKind::P2sh => 23,
        ScriptKind::P2wpkh => 22,
        ScriptKind::P2wsh => 34,
        ScriptKind::P2tr => 34,
    }
}

/// Weight one input adds, without the segwit marker and flag.
pub fn input_weight(kind: ScriptKind) -> Weight {
    input_prediction(kind).weight() + OUTPOINT_AND_SEQUENCE
}

pub fn output_weight(script_len: usize) -> Weight {
    predict_weight([], [script_len]) - predict_weight([], [])
}

pub fn transaction_weight(inputs: &[ScriptKind], output_script_lens: &[usize]) -> Weight {
    predict_weight(
        inputs.iter().map(|kind| input_prediction(*kind)),
        output_script_lens.iter().copied(),
    )
}

pub fn transaction_vbytes(inputs: &[ScriptKind], output_script_lens: &[usize]) -> u64 {
    transaction_weight(inputs, output_script_lens).to_vbytes_ceil()
}

pub fn estimate_input_vbytes(kind: ScriptKind) -> u64 {
    input_weight(kind).to_vbytes_ceil()
}

pub fn estimate_output_vbytes(kind: ScriptKind) -> u64 {
    output_weight(output_script_len(kind)).to_vbytes_ceil()
}

/// Overhead of a transaction whose inputs are either all segwit or all legacy.
pub fn estimate_overhead_vbytes(
    input_count: usize,
    output_count: usize,
    has_segwit_input: bool,
) -> u64 {
    let kind = if has_segwit_input {
        ScriptKind::P2wpkh
    } else {
        ScriptKind::P2pkh
    };
    let inputs = vec![kind; input_count];
    let outputs = vec![output_script_len(kind); output_count];
    let items = input_weight(kind) * input_count as u64
        + output_weight(output_script_len(kind)) * output_count as u64;
    (transaction_weight(&inputs, &outputs) - items).to_vbytes_ceil()
}

/// Fee for a transaction of `vbytes`, rounded up to the next satoshi.
///
/// A base fee is added on top of the size fee. With `floor_base_fee` the
/// result is truncated to a whole multiple of the base fee instead.
pub fn fee_for_size(vbytes: u64, fee_rate: f64, base_fee: Option<u64>, floor_base_fee: bool) -> u64 {
    let size_fee = size_fee(vbytes, fee_rate);
    match base_fee {
        Some(base) if base > 0 => {
            if floor_base_fee {
                base.saturating_mul(base.saturating_add(size_fee) / base)
            } else {
                base.saturating_add(size_fee)
            }
        }
        _ => size_fee,
    }
}

fn size_fee(vbytes: u64, fee_rate: f64) -> u64 {
    let exact = fee_rate * vbytes as f64;
    // 1.1 * 110 must stay 121
    let rounded = (exact * 1e6).round() / 1e6;
    rounded.ceil() as u64
}

/// Fee parameters of one compose call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeePolicy {
    pub fee_rate: f64,
    pub long_term_fee_rate: Option<f64>,
    pub base_fee: Option<u64>,
    pub floor_base_fee: bool,
    pub dust_threshold: u64,
}

impl FeePolicy {
    pub fn fee(&self, vbytes: u64) -> u64 {
        fee_for_size(vbytes, self.fee_rate, self.base_fee, self.floor_base_fee)
    }

    /// Fee a single input of `kind` adds at the current rate.
    pub fn input_fee(&self, kind: ScriptKind) -> u64 {
        size_fee(estimate_input_vbytes(kind), self.fee_rate)
    }

    /// Smallest change worth creating: the explicit threshold, or what it
    /// costs to spend the change later, whichever is higher.
    pub fn dust_amount(&self, change_kind: ScriptKind) -> u64 {
        let rate = self.long_term_fee_rate.unwrap_or(self.fee_rate);
        let spend_cost = size_fee(estimate_input_vbytes(change_kind), rate);
        self.dust_threshold.max(spend_cost)
    }
}
