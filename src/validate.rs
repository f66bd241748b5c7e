use bitcoin::{ScriptBuf, policy::MAX_STANDARD_TX_WEIGHT, script::PushBytesBuf};
use tracing::trace;

use crate::{
    error::{ComposeError, Result},
    size::{FeePolicy, output_script_len},
    types::{CandidateInput, ComposeRequest, RequestedOutput, ScriptKind},
};

/// A candidate input that passed validation.
#[derive(Debug, Clone)]
pub struct PreparedInput<'a> {
    /// Position in the caller's candidate list.
    pub index: usize,
    pub input: &'a CandidateInput,
    pub kind: ScriptKind,
    pub txid: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAmount {
    Fixed(u64),
    SendMax,
}

#[derive(Debug, Clone)]
pub struct PreparedOutput<'a> {
    /// Position in the caller's output list.
    pub index: usize,
    pub output: &'a RequestedOutput,
    pub amount: OutputAmount,
    /// `None` until the caller resolves the address.
    pub script: Option<ScriptBuf>,
    pub script_len: usize,
}

#[derive(Debug, Clone)]
pub struct PreparedChange<'a> {
    pub address: &'a str,
    pub script: ScriptBuf,
    pub kind: ScriptKind,
}

#[derive(Debug, Clone)]
pub struct PreparedRequest<'a> {
    pub request: &'a ComposeRequest,
    pub inputs: Vec<PreparedInput<'a>>,
    pub outputs: Vec<PreparedOutput<'a>>,
    pub change: PreparedChange<'a>,
    pub policy: FeePolicy,
}

impl PreparedRequest<'_> {
    /// Every output has a concrete address.
    pub fn is_final(&self) -> bool {
        self.outputs.iter().all(|o| o.output.has_address())
    }

    pub fn has_send_max(&self) -> bool {
        self.outputs.iter().any(|o| o.amount == OutputAmount::SendMax)
    }

    pub fn fixed_output_total(&self) -> u64 {
        self.outputs
            .iter()
            .map(|o| match o.amount {
                OutputAmount::Fixed(amount) => amount,
                OutputAmount::SendMax => 0,
            })
            .sum()
    }
}

pub fn validate(request: &ComposeRequest) -> Result<PreparedRequest<'_>> {
    if request.requested_outputs.is_empty() {
        return Err(ComposeError::MissingOutputs);
    }
    if request.candidate_inputs.is_empty() && !request.skip_selection {
        return Err(ComposeError::MissingUtxos);
    }
    if !is_valid_rate(request.fee_rate) {
        return Err(ComposeError::IncorrectFeeRate);
    }
    if request
        .long_term_fee_rate
        .is_some_and(|rate| !is_valid_rate(rate))
    {
        return Err(ComposeError::IncorrectFeeRate);
    }

    let inputs = request
        .candidate_inputs
        .iter()
        .enumerate()
        .map(|(index, input)| prepare_input(index, input, request.script_kind))
        .collect::<Result<Vec<_>>>()?;
    inputs.iter().try_fold(0u64, |acc, i| {
        acc.checked_add(i.input.amount)
            .ok_or_else(|| ComposeError::IncorrectUtxo("total input amount overflows".into()))
    })?;

    let outputs = request
        .requested_outputs
        .iter()
        .enumerate()
        .map(|(index, output)| prepare_output(index, output, request))
        .collect::<Result<Vec<_>>>()?;
    if outputs
        .iter()
        .filter(|o| o.output.is_send_max())
        .count()
        > 1
    {
        return Err(ComposeError::IncorrectOutput(
            "only one send-max output is allowed".into(),
        ));
    }
    outputs.iter().try_fold(0u64, |acc, o| match o.amount {
        OutputAmount::Fixed(amount) => acc
            .checked_add(amount)
            .ok_or_else(|| ComposeError::IncorrectOutput("total output amount overflows".into())),
        OutputAmount::SendMax => Ok(acc),
    })?;

    let (script, kind) = request
        .network
        .address_to_script(&request.change.address)
        .map_err(|e| ComposeError::IncorrectOutput(format!("invalid change address: {}", e)))?;
    let change = PreparedChange {
        address: &request.change.address,
        script,
        kind,
    };

    trace!(
        "Validated request with {} inputs and {} outputs",
        inputs.len(),
        outputs.len()
    );

    Ok(PreparedRequest {
        request,
        inputs,
        outputs,
        change,
        policy: FeePolicy {
            fee_rate: request.fee_rate,
            long_term_fee_rate: request.long_term_fee_rate,
            base_fee: request.base_fee,
            floor_base_fee: request.floor_base_fee,
            dust_threshold: request.dust_threshold,
        },
    })
}

fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

fn prepare_input(
    index: usize,
    input: &CandidateInput,
    default_kind: ScriptKind,
) -> Result<PreparedInput<'_>> {
    if input.txid.is_empty() {
        return Err(ComposeError::IncorrectUtxo(format!(
            "input {} has an empty txid",
            index
        )));
    }
    let txid = hex::decode(&input.txid).map_err(|e| {
        ComposeError::IncorrectUtxo(format!("input {} has an invalid txid: {}", index, e))
    })?;
    Ok(PreparedInput {
        index,
        input,
        kind: input.script_kind.unwrap_or(default_kind),
        txid,
    })
}

fn prepare_output<'a>(
    index: usize,
    output: &'a RequestedOutput,
    request: &ComposeRequest,
) -> Result<PreparedOutput<'a>> {
    let placeholder_len = output_script_len(request.script_kind);
    let (amount, script) = match output {
        RequestedOutput::Payment { address, amount } => {
            check_amount(index, *amount)?;
            (OutputAmount::Fixed(*amount), Some(output_script(index, address, request)?))
        }
        RequestedOutput::PaymentNoAddress { amount } => {
            check_amount(index, *amount)?;
            (OutputAmount::Fixed(*amount), None)
        }
        RequestedOutput::SendMax { address } => {
            (OutputAmount::SendMax, Some(output_script(index, address, request)?))
        }
        RequestedOutput::SendMaxNoAddress {} => (OutputAmount::SendMax, None),
        RequestedOutput::OpReturn { data_hex } => {
            (OutputAmount::Fixed(0), Some(op_return_script(index, data_hex)?))
        }
    };
    let script_len = script.as_ref().map_or(placeholder_len, |s| s.len());
    Ok(PreparedOutput {
        index,
        output,
        amount,
        script,
        script_len,
    })
}

fn check_amount(index: usize, amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(ComposeError::IncorrectOutput(format!(
            "output {} amount must be positive",
            index
        )));
    }
    Ok(())
}

fn output_script(index: usize, address: &str, request: &ComposeRequest) -> Result<ScriptBuf> {
    request
        .network
        .address_to_script(address)
        .map(|(script, _)| script)
        .map_err(|e| {
            ComposeError::IncorrectOutput(format!("output {} has an invalid address: {}", index, e))
        })
}

/// Largest op_return payload that still fits a standard transaction.
pub const MAX_OP_RETURN_DATA: usize = MAX_STANDARD_TX_WEIGHT as usize / 4;

fn op_return_script(index: usize, data_hex: &str) -> Result<ScriptBuf> {
    let data = hex::decode(data_hex).map_err(|e| {
        ComposeError::IncorrectOutput(format!("output {} has invalid op_return data: {}", index, e))
    })?;
    if data.len() > MAX_OP_RETURN_DATA {
        return Err(ComposeError::IncorrectOutput(format!(
            "output {} op_return data is too large",
            index
        )));
    }
    let push = PushBytesBuf::try_from(data).map_err(|_| {
        ComposeError::IncorrectOutput(format!("output {} op_return data is too large", index))
    })?;
    Ok(ScriptBuf::new_op_return(&push))
}
