use rand::{Rng, seq::SliceRandom};

use crate::{select::Selection, types::SortingStrategy, validate::PreparedRequest};

/// An input as seen by the sorter.
#[derive(Debug, Clone, Copy)]
pub struct InputEntry<'a> {
    /// Candidate index.
    pub original: usize,
    pub txid: &'a [u8],
    pub vout: u32,
}

/// An output as seen by the sorter. Change carries the index one past the
/// last requested output.
#[derive(Debug, Clone, Copy)]
pub struct OutputEntry<'a> {
    pub original: usize,
    pub amount: u64,
    pub script: &'a [u8],
}

pub fn input_entries<'a>(prepared: &'a PreparedRequest, selection: &Selection) -> Vec<InputEntry<'a>> {
    selection
        .inputs
        .iter()
        .filter_map(|index| prepared.inputs.get(*index))
        .map(|i| InputEntry {
            original: i.index,
            txid: &i.txid,
            vout: i.input.vout,
        })
        .collect()
}

pub fn output_entries<'a>(
    prepared: &'a PreparedRequest,
    selection: &Selection,
) -> Vec<OutputEntry<'a>> {
    let mut entries: Vec<OutputEntry> = prepared
        .outputs
        .iter()
        .zip(&selection.output_amounts)
        .map(|(o, amount)| OutputEntry {
            original: o.index,
            amount: *amount,
            script: o.script.as_ref().map_or(&[][..], |s| s.as_bytes()),
        })
        .collect();
    if let Some(amount) = selection.change {
        entries.push(OutputEntry {
            original: prepared.outputs.len(),
            amount,
            script: prepared.change.script.as_bytes(),
        });
    }
    entries
}

/// Returns candidate indices in transaction order.
pub fn order_inputs<R: Rng>(
    mut entries: Vec<InputEntry>,
    strategy: SortingStrategy,
    rng: &mut R,
) -> Vec<usize> {
    match strategy {
        SortingStrategy::Bip69 => {
            entries.sort_by(|a, b| a.txid.cmp(b.txid).then(a.vout.cmp(&b.vout)));
        }
        SortingStrategy::Random => entries.shuffle(rng),
        SortingStrategy::PreserveOrder => entries.sort_by_key(|e| e.original),
    }
    entries.into_iter().map(|e| e.original).collect()
}

/// Returns the output permutation: `permutation[new_index] == original_index`.
pub fn order_outputs<R: Rng>(
    mut entries: Vec<OutputEntry>,
    change_index: usize,
    strategy: SortingStrategy,
    rng: &mut R,
) -> Vec<usize> {
    match strategy {
        SortingStrategy::Bip69 => {
            entries.sort_by(|a, b| a.amount.cmp(&b.amount).then(a.script.cmp(b.script)));
        }
        SortingStrategy::Random => {
            if let Some(position) = entries.iter().position(|e| e.original == change_index) {
                let change = entries.remove(position);
                let at = rng.random_range(0..=entries.len());
                entries.insert(at, change);
            }
        }
        SortingStrategy::PreserveOrder => entries.sort_by_key(|e| e.original),
    }
    entries.into_iter().map(|e| e.original).collect()
}
