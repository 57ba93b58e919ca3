//! Value hand-off between two model adapters.

use log::trace;

use crate::adapter::ModelAdapter;
use crate::errors::CouplingResult;

/// Copy the current values of `names` from `source` into `destination`.
///
/// Each variable is read from the source and written to the destination in
/// the order given, preserving array shape and element order. The copy is
/// fail-fast with no rollback: the first failure aborts the hand-off and
/// leaves any variables copied so far in place, so the caller must treat a
/// failure as fatal to the composite step.
pub(crate) fn copy(
    source: &dyn ModelAdapter,
    destination: &mut dyn ModelAdapter,
    names: &[String],
) -> CouplingResult<()> {
    for name in names {
        let values = source.get_value(name)?;
        trace!(
            "bridging {} ({} values) from {} to {}",
            name,
            values.len(),
            source.component_name(),
            destination.component_name()
        );
        destination.set_value(name, values.view())?;
    }
    Ok(())
}
