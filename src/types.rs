use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{error::ComposeError, network::NetworkParams};

/// Script kind of a spendable input or a standard output.
///
/// As an input kind `P2sh` is the nested segwit `p2sh-p2wpkh` spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 5] = [
        ScriptKind::P2pkh,
        ScriptKind::P2sh,
        ScriptKind::P2tr,
        ScriptKind::P2wpkh,
        ScriptKind::P2wsh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptKind::P2pkh => "p2pkh",
            ScriptKind::P2sh => "p2sh",
            ScriptKind::P2wpkh => "p2wpkh",
            ScriptKind::P2wsh => "p2wsh",
            ScriptKind::P2tr => "p2tr",
        }
    }
}

impl std::fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spendable output offered to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct CandidateInput {
    /// Hash of the funding transaction, hex as displayed by explorers.
    #[builder(into)]
    pub txid: String,
    pub vout: u32,
    pub amount: u64,
    #[serde(default)]
    #[builder(default)]
    pub coinbase: bool,
    #[serde(default)]
    #[builder(default)]
    pub own: bool,
    #[serde(default)]
    #[builder(default)]
    pub confirmations: u32,
    /// Always spent, regardless of the selection outcome.
    #[serde(default)]
    #[builder(default)]
    pub required: bool,
    /// Overrides [`ComposeRequest::script_kind`] for this input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_kind: Option<ScriptKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestedOutput {
    #[serde(rename = "payment")]
    Payment { address: String, amount: u64 },
    /// Amount known, address chosen later.
    #[serde(rename = "payment-noaddress")]
    PaymentNoAddress { amount: u64 },
    /// Receives everything left after fee and the other outputs.
    #[serde(rename = "send-max")]
    SendMax { address: String },
    #[serde(rename = "send-max-noaddress")]
    SendMaxNoAddress {},
    #[serde(rename = "opreturn")]
    OpReturn { data_hex: String },
}

impl RequestedOutput {
    pub fn is_send_max(&self) -> bool {
        matches!(
            self,
            RequestedOutput::SendMax { .. } | RequestedOutput::SendMaxNoAddress {}
        )
    }

    pub fn has_address(&self) -> bool {
        !matches!(
            self,
            RequestedOutput::PaymentNoAddress { .. } | RequestedOutput::SendMaxNoAddress {}
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    pub address: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortingStrategy {
    /// Lexicographic input/output ordering.
    #[default]
    Bip69,
    /// Inputs shuffled, outputs kept with change at a random position.
    Random,
    /// Caller order for both sides, change appended.
    #[serde(alias = "none")]
    PreserveOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
pub struct ComposeRequest {
    pub candidate_inputs: Vec<CandidateInput>,
    pub requested_outputs: Vec<RequestedOutput>,
    /// Satoshis per virtual byte.
    pub fee_rate: f64,
    /// Fee rate expected when the change output is spent later.
    pub long_term_fee_rate: Option<f64>,
    #[serde(default)]
    #[builder(default)]
    pub network: NetworkParams,
    pub change: ChangeDescriptor,
    pub dust_threshold: u64,
    /// Absolute fee added on top of the size-based fee (RBF or Dogecoin-style chains).
    pub base_fee: Option<u64>,
    #[serde(default)]
    #[builder(default)]
    pub floor_base_fee: bool,
    #[serde(default)]
    #[builder(default)]
    pub skip_selection: bool,
    #[serde(default)]
    #[builder(default)]
    pub sorting_strategy: SortingStrategy,
    /// Script kind of the account inputs and of address-less outputs.
    #[serde(default = "default_script_kind")]
    #[builder(default = ScriptKind::P2wpkh)]
    pub script_kind: ScriptKind,
}

fn default_script_kind() -> ScriptKind {
    ScriptKind::P2wpkh
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolvedOutput {
    #[serde(rename = "payment")]
    Payment { address: String, amount: u64 },
    #[serde(rename = "send-max")]
    SendMax { address: String, amount: u64 },
    #[serde(rename = "opreturn")]
    OpReturn { data_hex: String },
    #[serde(rename = "change")]
    Change { address: String, amount: u64 },
}

impl ResolvedOutput {
    pub fn amount(&self) -> u64 {
        match self {
            ResolvedOutput::Payment { amount, .. }
            | ResolvedOutput::SendMax { amount, .. }
            | ResolvedOutput::Change { amount, .. } => *amount,
            ResolvedOutput::OpReturn { .. } => 0,
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, ResolvedOutput::Change { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComposeOutcome {
    Error(ComposeError),
    /// Size and fee are known but some output addresses are not.
    #[serde(rename = "nonfinal")]
    NonFinal {
        inputs: Vec<CandidateInput>,
        total_spent: u64,
        fee: u64,
        fee_per_vbyte: f64,
        vbytes: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        send_max_amount: Option<u64>,
    },
    Final {
        inputs: Vec<CandidateInput>,
        outputs: Vec<ResolvedOutput>,
        /// `output_permutation[new_index] == original_index`.
        output_permutation: Vec<usize>,
        total_spent: u64,
        fee: u64,
        fee_per_vbyte: f64,
        vbytes: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        send_max_amount: Option<u64>,
    },
}

impl ComposeOutcome {
    pub fn is_final(&self) -> bool {
        matches!(self, ComposeOutcome::Final { .. })
    }

    pub fn error(&self) -> Option<&ComposeError> {
        match self {
            ComposeOutcome::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn fee(&self) -> Option<u64> {
        match self {
            ComposeOutcome::Error(_) => None,
            ComposeOutcome::NonFinal { fee, .. } | ComposeOutcome::Final { fee, .. } => Some(*fee),
        }
    }

    pub fn vbytes(&self) -> Option<u64> {
        match self {
            ComposeOutcome::Error(_) => None,
            ComposeOutcome::NonFinal { vbytes, .. } | ComposeOutcome::Final { vbytes, .. } => {
                Some(*vbytes)
            }
        }
    }
}

impl From<ComposeError> for ComposeOutcome {
    fn from(error: ComposeError) -> Self {
        ComposeOutcome::Error(error)
    }
}
