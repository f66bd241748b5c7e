use rand::Rng;
use tracing::{debug, info};

use crate::{
    error::Result,
    result, select, sort,
    types::{ComposeOutcome, ComposeRequest},
    validate,
};

/// Composes a transaction from `request`. Failures are reported through
/// [`ComposeOutcome::Error`].
pub fn compose(request: &ComposeRequest) -> ComposeOutcome {
    compose_with_rng(request, &mut rand::rng())
}

/// Like [`compose`], with the randomness of `SortingStrategy::Random` drawn
/// from `rng`.
pub fn compose_with_rng<R: Rng>(request: &ComposeRequest, rng: &mut R) -> ComposeOutcome {
    match try_compose(request, rng) {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!("Compose failed: {}", e);
            e.into()
        }
    }
}

fn try_compose<R: Rng>(request: &ComposeRequest, rng: &mut R) -> Result<ComposeOutcome> {
    let prepared = validate::validate(request)?;
    let selection = select::select(&prepared)?;

    let strategy = request.sorting_strategy;
    let input_order = sort::order_inputs(sort::input_entries(&prepared, &selection), strategy, rng);
    let output_order = prepared.is_final().then(|| {
        sort::order_outputs(
            sort::output_entries(&prepared, &selection),
            prepared.outputs.len(),
            strategy,
            rng,
        )
    });

    info!(
        "Composed {} inputs, fee {} sat for {} vB{}",
        input_order.len(),
        selection.fee,
        selection.vbytes,
        if selection.change.is_some() { " with change" } else { "" }
    );
    result::assemble(&prepared, &selection, &input_order, output_order.as_deref())
}
