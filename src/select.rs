//! Coin selection.
//!
//! Fixed-amount requests accumulate inputs by descending effective value until
//! the outputs and the re-estimated fee are covered. Send-max requests spend
//! every eligible input. With `skip_selection` the candidate list is spent as
//! given.

use tracing::{debug, trace};

use crate::{
    change::{self, ChangeShape},
    error::{ComposeError, Result},
    size::{FeePolicy, transaction_vbytes},
    types::{CandidateInput, ScriptKind},
    validate::{OutputAmount, PreparedInput, PreparedRequest},
};

pub const COINBASE_MATURITY: u32 = 100;
/// Confirmations an input received from someone else needs before it is spent.
pub const FOREIGN_CONFIRMATIONS: u32 = 6;

/// Minimum confirmations for inputs in one selection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationTier {
    pub own: u32,
    pub other: u32,
}

impl ConfirmationTier {
    pub fn admits(&self, input: &CandidateInput) -> bool {
        if input.coinbase && input.confirmations < COINBASE_MATURITY {
            return false;
        }
        let needed = if input.own { self.own } else { self.other };
        input.confirmations >= needed
    }
}

/// Attempted in order, confirmed own coins first.
pub const CONFIRMATION_TIERS: [ConfirmationTier; 2] = [
    ConfirmationTier {
        own: 1,
        other: FOREIGN_CONFIRMATIONS,
    },
    ConfirmationTier {
        own: 0,
        other: FOREIGN_CONFIRMATIONS,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Candidate indices in selection order.
    pub inputs: Vec<usize>,
    /// Amount of each requested output, send-max resolved.
    pub output_amounts: Vec<u64>,
    pub send_max_amount: Option<u64>,
    pub change: Option<u64>,
    pub fee: u64,
    pub vbytes: u64,
}

pub fn select(prepared: &PreparedRequest) -> Result<Selection> {
    if prepared.request.skip_selection {
        let inputs: Vec<&PreparedInput> = prepared.inputs.iter().collect();
        debug!("Skipping selection, spending {} inputs as given", inputs.len());
        return if prepared.has_send_max() {
            send_max(prepared, &inputs)
        } else {
            spend(prepared, &inputs)
        };
    }

    if prepared.has_send_max() {
        let floor = CONFIRMATION_TIERS[CONFIRMATION_TIERS.len() - 1];
        let inputs: Vec<&PreparedInput> = prepared
            .inputs
            .iter()
            .filter(|i| i.input.required || floor.admits(i.input))
            .collect();
        return send_max(prepared, &inputs);
    }

    for tier in CONFIRMATION_TIERS {
        match accumulate(prepared, tier) {
            Err(ComposeError::NotEnoughFunds) => {
                trace!("Not enough funds with {:?}", tier);
            }
            result => return result,
        }
    }
    Err(ComposeError::NotEnoughFunds)
}

fn effective_value(input: &PreparedInput, policy: &FeePolicy) -> i128 {
    input.input.amount as i128 - policy.input_fee(input.kind) as i128
}

fn kinds(inputs: &[&PreparedInput]) -> Vec<ScriptKind> {
    inputs.iter().map(|i| i.kind).collect()
}

fn total(inputs: &[&PreparedInput]) -> u64 {
    inputs.iter().map(|i| i.input.amount).sum()
}

fn output_script_lens(prepared: &PreparedRequest) -> Vec<usize> {
    prepared.outputs.iter().map(|o| o.script_len).collect()
}

fn covers(
    inputs: &[&PreparedInput],
    output_script_lens: &[usize],
    output_total: u64,
    policy: &FeePolicy,
) -> bool {
    let fee = policy.fee(transaction_vbytes(&kinds(inputs), output_script_lens));
    output_total
        .checked_add(fee)
        .is_some_and(|needed| total(inputs) >= needed)
}

fn accumulate(prepared: &PreparedRequest, tier: ConfirmationTier) -> Result<Selection> {
    let policy = &prepared.policy;
    let lens = output_script_lens(prepared);
    let output_total = prepared.fixed_output_total();

    let (mut selected, optional): (Vec<&PreparedInput>, Vec<&PreparedInput>) =
        prepared.inputs.iter().partition(|i| i.input.required);
    let mut optional: Vec<&PreparedInput> = optional
        .into_iter()
        .filter(|i| tier.admits(i.input))
        .collect();
    optional.sort_by(|a, b| {
        effective_value(b, policy)
            .cmp(&effective_value(a, policy))
            .then(a.index.cmp(&b.index))
    });

    if !selected.is_empty() && covers(&selected, &lens, output_total, policy) {
        return spend(prepared, &selected);
    }
    for input in optional {
        if effective_value(input, policy) <= 0 {
            trace!(
                "Skipping input {} worth less than its own fee",
                input.index
            );
            continue;
        }
        selected.push(input);
        if covers(&selected, &lens, output_total, policy) {
            return spend(prepared, &selected);
        }
    }
    Err(ComposeError::NotEnoughFunds)
}

fn send_max(prepared: &PreparedRequest, inputs: &[&PreparedInput]) -> Result<Selection> {
    let policy = &prepared.policy;
    let lens = output_script_lens(prepared);
    let fee = policy.fee(transaction_vbytes(&kinds(inputs), &lens));
    let max = total(inputs)
        .checked_sub(prepared.fixed_output_total())
        .and_then(|remaining| remaining.checked_sub(fee))
        .filter(|max| *max > policy.dust_threshold)
        .ok_or(ComposeError::NotEnoughFunds)?;
    debug!("Send-max over {} inputs resolves to {} sat", inputs.len(), max);
    finish(prepared, inputs, Some(max))
}

fn spend(prepared: &PreparedRequest, inputs: &[&PreparedInput]) -> Result<Selection> {
    finish(prepared, inputs, None)
}

fn finish(
    prepared: &PreparedRequest,
    inputs: &[&PreparedInput],
    send_max_amount: Option<u64>,
) -> Result<Selection> {
    let output_amounts: Vec<u64> = prepared
        .outputs
        .iter()
        .map(|o| match o.amount {
            OutputAmount::Fixed(amount) => amount,
            OutputAmount::SendMax => send_max_amount.unwrap_or(0),
        })
        .collect();
    let output_total = output_amounts.iter().sum();
    let finalized = change::finalize(
        &kinds(inputs),
        total(inputs),
        &output_script_lens(prepared),
        output_total,
        ChangeShape {
            kind: prepared.change.kind,
            script_len: prepared.change.script.len(),
        },
        &prepared.policy,
    )
    .map_err(|e| match e {
        // skip_selection is the only path that reaches here unfunded
        ComposeError::NotEnoughFunds if !prepared.request.skip_selection => {
            ComposeError::SelectionFailure("selected inputs do not cover the fee".into())
        }
        e => e,
    })?;

    Ok(Selection {
        inputs: inputs.iter().map(|i| i.index).collect(),
        output_amounts,
        send_max_amount,
        change: finalized.change,
        fee: finalized.fee,
        vbytes: finalized.vbytes,
    })
}
