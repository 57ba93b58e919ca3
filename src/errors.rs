use thiserror::Error;

use crate::adapter::Time;
use crate::coupling::LifecycleState;

/// The variable attribute that failed a compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableAttribute {
    Type,
    Size,
}

impl std::fmt::Display for VariableAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableAttribute::Type => write!(f, "type"),
            VariableAttribute::Size => write!(f, "size"),
        }
    }
}

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum CouplingError {
    /// A failure raised inside a wrapped model.
    ///
    /// These propagate through a composed adapter unchanged.
    #[error("{0}")]
    Model(String),
    #[error("models are not compatible in {attribute} at {name}: {primary} != {secondary}")]
    IncompatibleVariable {
        name: String,
        attribute: VariableAttribute,
        primary: String,
        secondary: String,
    },
    #[error(
        "time steps are incompatible (one is not a factor of the other): dt1 = {dt1} and dt2 = {dt2}"
    )]
    IncompatibleTimeStep { dt1: Time, dt2: Time },
    #[error("wrapped models disagree on the current time: primary = {primary}, secondary = {secondary}")]
    TimeDrift { primary: Time, secondary: Time },
    #[error("{operation} is not valid while the composed model is {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },
    #[error("interface variable {name} is not declared by {model}")]
    UndeclaredInterfaceVariable { name: String, model: String },
    #[error("unknown variable {0}")]
    UnknownVariable(String),
}

/// Convenience type for `Result<T, CouplingError>`.
pub type CouplingResult<T> = Result<T, CouplingError>;
