//! Compatibility checking between two model adapters.

use crate::adapter::{ModelAdapter, VariableDescriptor};
use crate::errors::{CouplingError, CouplingResult, VariableAttribute};

/// Check that variables shared between two models agree in type and size.
///
/// Every name declared by the primary model (inputs first, then outputs)
/// that the secondary model also declares must report the same type tag and
/// byte size on both sides. Units and locations are not required to match;
/// the primary model's metadata is authoritative for shared variables.
///
/// Fails on the first mismatch found, in primary list order. Read-only.
pub(crate) fn check_compatibility(
    primary: &dyn ModelAdapter,
    secondary: &dyn ModelAdapter,
) -> CouplingResult<()> {
    let declared: Vec<String> = secondary
        .input_var_names()
        .into_iter()
        .chain(secondary.output_var_names())
        .collect();

    for name in primary
        .input_var_names()
        .into_iter()
        .chain(primary.output_var_names())
    {
        if !declared.contains(&name) {
            continue;
        }

        let ours = VariableDescriptor::from_model(primary, &name)?;
        let theirs = VariableDescriptor::from_model(secondary, &name)?;

        if ours.var_type != theirs.var_type {
            return Err(CouplingError::IncompatibleVariable {
                name,
                attribute: VariableAttribute::Type,
                primary: ours.var_type.to_string(),
                secondary: theirs.var_type.to_string(),
            });
        }
        if ours.nbytes != theirs.nbytes {
            return Err(CouplingError::IncompatibleVariable {
                name,
                attribute: VariableAttribute::Size,
                primary: ours.nbytes.to_string(),
                secondary: theirs.nbytes.to_string(),
            });
        }
    }

    Ok(())
}
