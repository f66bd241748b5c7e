use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Every way a compose call can fail. Errors are terminal for the call.
#[derive(ThisError, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "message", rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ComposeError {
    #[error("No candidate inputs supplied")]
    MissingUtxos,
    #[error("No requested outputs supplied")]
    MissingOutputs,
    #[error("Fee rate is missing, not positive or not finite")]
    IncorrectFeeRate,
    #[error("Candidate inputs do not cover the requested outputs plus fee")]
    NotEnoughFunds,
    #[error("Incorrect input: {0}")]
    IncorrectUtxo(String),
    #[error("Incorrect output: {0}")]
    IncorrectOutput(String),
    #[serde(rename = "COINSELECT")]
    #[error("Coin selection failed: {0}")]
    SelectionFailure(String),
}

pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
