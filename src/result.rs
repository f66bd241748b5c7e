use crate::{
    error::{ComposeError, Result},
    select::Selection,
    types::{CandidateInput, ComposeOutcome, RequestedOutput, ResolvedOutput},
    validate::PreparedRequest,
};

/// Builds the outcome of a funded selection.
///
/// `output_order` is the output permutation. Without it the request still
/// has address-less outputs and only the size and fee are reported.
pub fn assemble(
    prepared: &PreparedRequest,
    selection: &Selection,
    input_order: &[usize],
    output_order: Option<&[usize]>,
) -> Result<ComposeOutcome> {
    let inputs: Vec<CandidateInput> = input_order
        .iter()
        .filter_map(|index| prepared.request.candidate_inputs.get(*index))
        .cloned()
        .collect();
    let total_spent = selection
        .output_amounts
        .iter()
        .sum::<u64>()
        .saturating_add(selection.fee);
    let fee_per_vbyte = selection.fee as f64 / selection.vbytes as f64;

    let Some(permutation) = output_order else {
        return Ok(ComposeOutcome::NonFinal {
            inputs,
            total_spent,
            fee: selection.fee,
            fee_per_vbyte,
            vbytes: selection.vbytes,
            send_max_amount: selection.send_max_amount,
        });
    };

    let outputs = permutation
        .iter()
        .map(|original| resolve(prepared, selection, *original))
        .collect::<Result<Vec<_>>>()?;

    Ok(ComposeOutcome::Final {
        inputs,
        outputs,
        output_permutation: permutation.to_vec(),
        total_spent,
        fee: selection.fee,
        fee_per_vbyte,
        vbytes: selection.vbytes,
        send_max_amount: selection.send_max_amount,
    })
}

fn resolve(prepared: &PreparedRequest, selection: &Selection, original: usize) -> Result<ResolvedOutput> {
    if original == prepared.outputs.len() {
        let amount = selection
            .change
            .ok_or_else(|| ComposeError::SelectionFailure("change output has no amount".into()))?;
        return Ok(ResolvedOutput::Change {
            address: prepared.change.address.to_string(),
            amount,
        });
    }
    let (output, amount) = prepared
        .outputs
        .get(original)
        .zip(selection.output_amounts.get(original))
        .ok_or_else(|| {
            ComposeError::SelectionFailure(format!("output {} is out of range", original))
        })?;
    match output.output {
        RequestedOutput::Payment { address, .. } => Ok(ResolvedOutput::Payment {
            address: address.clone(),
            amount: *amount,
        }),
        RequestedOutput::SendMax { address } => Ok(ResolvedOutput::SendMax {
            address: address.clone(),
            amount: *amount,
        }),
        RequestedOutput::OpReturn { data_hex } => Ok(ResolvedOutput::OpReturn {
            data_hex: data_hex.clone(),
        }),
        RequestedOutput::PaymentNoAddress { .. } | RequestedOutput::SendMaxNoAddress {} => Err(
            ComposeError::IncorrectOutput(format!("output {} has no address", original)),
        ),
    }
}
