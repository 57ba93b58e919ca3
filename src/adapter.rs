//! The adapter contract implemented by every steppable model.
//!
//! A model adapter exposes a fixed capability set: lifecycle operations,
//! per-variable metadata queries, value get/set, and time queries. Anything
//! implementing [`ModelAdapter`] can be coupled to another adapter with
//! [`compose`](crate::compose), and the result of a composition implements
//! the trait itself, so composition nests.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::errors::CouplingResult;

/// Simulation time, in whatever units the wrapped model reports.
pub type Time = f64;

/// The float type used for variable values.
pub type FloatValue = f64;

/// Semantic type tag for a variable's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarType {
    Float32,
    Float64,
    Int32,
    Int64,
}

impl VarType {
    /// Size of a single element in bytes.
    pub const fn itemsize(self) -> usize {
        match self {
            VarType::Float32 | VarType::Int32 => 4,
            VarType::Float64 | VarType::Int64 => 8,
        }
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarType::Float32 => write!(f, "Float32"),
            VarType::Float64 => write!(f, "Float64"),
            VarType::Int32 => write!(f, "Int32"),
            VarType::Int64 => write!(f, "Int64"),
        }
    }
}

/// Where on a model's grid a variable is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarLocation {
    Node,
    Edge,
    Face,
    /// The variable is not tied to a grid element (e.g. a scalar diagnostic).
    None,
}

impl std::fmt::Display for VarLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarLocation::Node => write!(f, "node"),
            VarLocation::Edge => write!(f, "edge"),
            VarLocation::Face => write!(f, "face"),
            VarLocation::None => write!(f, "none"),
        }
    }
}

/// A steppable simulation model driven through a fixed capability set.
///
/// Lifecycle: `initialize` once, any number of `update`/`update_until`
/// calls, then `finalize` once. Metadata queries may be used before
/// `initialize`; [`compose`](crate::compose) relies on this to validate a
/// pairing before either model is started.
///
/// Errors raised by an implementation are reported as-is by any composed
/// adapter wrapping it; the [`CouplingError::Model`] variant is available
/// for failures that have no more specific kind.
///
/// [`CouplingError::Model`]: crate::errors::CouplingError::Model
pub trait ModelAdapter {
    /// Prepare the model for stepping.
    ///
    /// The configuration string is model-specific and passed through
    /// unmodified by a composed adapter.
    fn initialize(&mut self, config: &str) -> CouplingResult<()>;

    /// Advance the model by one native time step.
    fn update(&mut self) -> CouplingResult<()>;

    /// Advance the model to an absolute time.
    fn update_until(&mut self, time: Time) -> CouplingResult<()>;

    /// Release the model's resources. No operation is valid afterwards.
    fn finalize(&mut self) -> CouplingResult<()>;

    fn component_name(&self) -> String;

    /// Names of the variables the model reads, in declaration order.
    fn input_var_names(&self) -> Vec<String>;

    /// Names of the variables the model provides, in declaration order.
    fn output_var_names(&self) -> Vec<String>;

    fn var_type(&self, name: &str) -> CouplingResult<VarType>;

    fn var_units(&self, name: &str) -> CouplingResult<String>;

    /// Total size of the variable's value array in bytes.
    fn var_nbytes(&self, name: &str) -> CouplingResult<usize>;

    fn var_location(&self, name: &str) -> CouplingResult<VarLocation>;

    /// The current value of a variable, in the model's native element order.
    fn get_value(&self, name: &str) -> CouplingResult<Array1<FloatValue>>;

    /// The values of a variable at the given flat indices.
    fn get_value_at_indices(
        &self,
        name: &str,
        indices: &[usize],
    ) -> CouplingResult<Array1<FloatValue>>;

    /// Overwrite the full value array of a variable.
    fn set_value(&mut self, name: &str, values: ArrayView1<FloatValue>) -> CouplingResult<()>;

    /// Overwrite the values of a variable at the given flat indices.
    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[usize],
        values: ArrayView1<FloatValue>,
    ) -> CouplingResult<()>;

    /// The model's native time step. Constant for the model's lifetime.
    fn time_step(&self) -> Time;

    fn current_time(&self) -> CouplingResult<Time>;

    fn start_time(&self) -> Time;

    fn end_time(&self) -> Time;
}

/// Per-variable metadata as reported by a model.
///
/// Descriptors are derived on demand via [`VariableDescriptor::from_model`]
/// and never stored; the model remains the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    pub name: String,
    pub var_type: VarType,
    /// Total size of the value array in bytes.
    pub nbytes: usize,
    pub units: String,
    pub location: VarLocation,
}

impl VariableDescriptor {
    /// Query a model for the metadata of a single variable.
    pub fn from_model(model: &dyn ModelAdapter, name: &str) -> CouplingResult<Self> {
        Ok(Self {
            name: name.to_string(),
            var_type: model.var_type(name)?,
            nbytes: model.var_nbytes(name)?,
            units: model.var_units(name)?,
            location: model.var_location(name)?,
        })
    }
}
