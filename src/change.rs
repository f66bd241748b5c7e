use tracing::debug;

use crate::{
    error::{ComposeError, Result},
    size::{FeePolicy, transaction_vbytes},
    types::ScriptKind,
};

/// Change output as seen by the change policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeShape {
    pub kind: ScriptKind,
    pub script_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalized {
    pub change: Option<u64>,
    pub fee: u64,
    pub vbytes: u64,
}

/// Decides whether the leftover of a funded selection becomes a change output
/// or goes to the miner. Inputs always equal outputs + change + fee.
pub fn finalize(
    input_kinds: &[ScriptKind],
    input_total: u64,
    output_script_lens: &[usize],
    output_total: u64,
    change: ChangeShape,
    policy: &FeePolicy,
) -> Result<Finalized> {
    let vbytes = transaction_vbytes(input_kinds, output_script_lens);
    let fee = policy.fee(vbytes);
    let available = input_total
        .checked_sub(output_total)
        .filter(|available| *available >= fee)
        .ok_or(ComposeError::NotEnoughFunds)?;

    let mut with_change = output_script_lens.to_vec();
    with_change.push(change.script_len);
    let vbytes_with_change = transaction_vbytes(input_kinds, &with_change);
    let fee_with_change = policy.fee(vbytes_with_change);
    let dust = policy.dust_amount(change.kind);

    match available.checked_sub(fee_with_change) {
        Some(amount) if amount > dust => {
            debug!(
                "Adding change of {} sat, fee {} sat for {} vB",
                amount, fee_with_change, vbytes_with_change
            );
            Ok(Finalized {
                change: Some(amount),
                fee: fee_with_change,
                vbytes: vbytes_with_change,
            })
        }
        _ => {
            debug!(
                "Folding {} sat of leftover into fee (dust limit {} sat)",
                available - fee,
                dust
            );
            Ok(Finalized {
                change: None,
                fee: available,
                vbytes,
            })
        }
    }
}
