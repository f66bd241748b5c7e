pub mod change;
pub mod compose;
pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod result;
pub mod select;
pub mod size;
pub mod sort;
pub mod types;
pub mod validate;

pub use compose::{compose, compose_with_rng};
pub use error::ComposeError;
pub use network::NetworkParams;
pub use types::{
    CandidateInput, ChangeDescriptor, ComposeOutcome, ComposeRequest, RequestedOutput,
    ResolvedOutput, ScriptKind, SortingStrategy,
};
