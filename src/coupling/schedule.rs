//! Cycle scheduling between two native time steps.

use serde::{Deserialize, Serialize};

use crate::adapter::Time;
use crate::errors::{CouplingError, CouplingResult};

/// The integer run-ratio between two models' native time steps.
///
/// At most one of the two cycle counts exceeds 1: the model with the smaller
/// time step runs that many native steps per composite step while the other
/// model runs exactly one. The composite time step equals the larger of the
/// two native steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleRatio {
    /// Native steps the primary model runs per composite step.
    pub primary_cycles: u32,
    /// Native steps the secondary model runs per composite step.
    pub secondary_cycles: u32,
    /// The composite time step.
    pub time_step: Time,
}

impl CycleRatio {
    /// Compute the run-ratio for two native time steps.
    ///
    /// One step must be an exact integer multiple of the other. Equal steps
    /// yield a ratio of one cycle each. Runs once, at composition time.
    pub fn from_time_steps(dt1: Time, dt2: Time) -> CouplingResult<Self> {
        if dt1 > 0.0 && dt2 > 0.0 {
            if dt1 % dt2 == 0.0 {
                return Ok(Self {
                    primary_cycles: 1,
                    secondary_cycles: (dt1 / dt2) as u32,
                    time_step: dt1,
                });
            }
            if dt2 % dt1 == 0.0 {
                return Ok(Self {
                    primary_cycles: (dt2 / dt1) as u32,
                    secondary_cycles: 1,
                    time_step: dt2,
                });
            }
        }
        Err(CouplingError::IncompatibleTimeStep { dt1, dt2 })
    }
}
