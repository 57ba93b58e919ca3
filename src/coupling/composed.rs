//! The composed model adapter and its construction.

use std::collections::HashMap;

use log::{debug, trace};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::adapter::{FloatValue, ModelAdapter, Time, VarLocation, VarType};
use crate::errors::{CouplingError, CouplingResult};

use super::bridge;
use super::compat::check_compatibility;
use super::schedule::CycleRatio;

/// Lifecycle state of a composed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Finalized,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "uninitialized"),
            LifecycleState::Initialized => write!(f, "initialized"),
            LifecycleState::Finalized => write!(f, "finalized"),
        }
    }
}

/// Which wrapped model answers per-variable queries for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarOwner {
    Primary,
    Secondary,
}

/// Two model adapters driven in lock-step as a single adapter.
///
/// Created by [`compose`]. The composite owns both wrapped models
/// exclusively; once composed, no other caller may drive them. Within every
/// composite step the primary model is authoritative: it runs its sub-steps
/// first, pushes the interface variables to the secondary model, and receives
/// the secondary's values back once the secondary has caught up.
///
/// The composite implements [`ModelAdapter`] itself, so more than two models
/// can be coupled by repeated pairwise composition.
///
/// Not safe for concurrent use; callers must serialize access.
pub struct ComposedModelAdapter {
    primary: Box<dyn ModelAdapter>,
    secondary: Box<dyn ModelAdapter>,
    ratio: CycleRatio,
    /// Names of the variables exchanged at each synchronization point.
    interface: Vec<String>,
    /// Variable ownership, built once at composition time.
    owners: HashMap<String, VarOwner>,
    state: LifecycleState,
}

impl std::fmt::Debug for ComposedModelAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedModelAdapter")
            .field("primary", &self.primary.component_name())
            .field("secondary", &self.secondary.component_name())
            .field("ratio", &self.ratio)
            .field("interface", &self.interface)
            .field("owners", &self.owners)
            .field("state", &self.state)
            .finish()
    }
}

/// Compose two model adapters into a single adapter with the same contract.
///
/// `interface` lists the variables exchanged between the models at each
/// synchronization point, in copy order. Validation is eager and fail-fast,
/// before either model is initialized:
///
/// - every interface variable must be declared by both models,
/// - variables declared by both models must agree in type and byte size,
/// - one native time step must be an exact integer multiple of the other.
///
/// The first model is the primary: it is initialized, stepped, and finalized
/// before the secondary, and its metadata answers queries for variables both
/// models declare.
pub fn compose(
    primary: Box<dyn ModelAdapter>,
    secondary: Box<dyn ModelAdapter>,
    interface: Vec<String>,
) -> CouplingResult<ComposedModelAdapter> {
    for name in &interface {
        for model in [primary.as_ref(), secondary.as_ref()] {
            if !declares(model, name) {
                return Err(CouplingError::UndeclaredInterfaceVariable {
                    name: name.clone(),
                    model: model.component_name(),
                });
            }
        }
    }

    check_compatibility(primary.as_ref(), secondary.as_ref())?;
    let ratio = CycleRatio::from_time_steps(primary.time_step(), secondary.time_step())?;

    // Later inserts win, so the primary model owns any shared name
    let mut owners = HashMap::new();
    for name in declared_names(secondary.as_ref()) {
        owners.insert(name, VarOwner::Secondary);
    }
    for name in declared_names(primary.as_ref()) {
        owners.insert(name, VarOwner::Primary);
    }

    debug!(
        "composed {} (dt = {}) with {} (dt = {}): {:?}",
        primary.component_name(),
        primary.time_step(),
        secondary.component_name(),
        secondary.time_step(),
        ratio
    );

    Ok(ComposedModelAdapter {
        primary,
        secondary,
        ratio,
        interface,
        owners,
        state: LifecycleState::Uninitialized,
    })
}

fn declares(model: &dyn ModelAdapter, name: &str) -> bool {
    model.input_var_names().iter().any(|n| n == name)
        || model.output_var_names().iter().any(|n| n == name)
}

fn declared_names(model: &dyn ModelAdapter) -> Vec<String> {
    model
        .input_var_names()
        .into_iter()
        .chain(model.output_var_names())
        .collect()
}

/// Order-preserving union of two name lists.
fn union(xs: Vec<String>, ys: Vec<String>) -> Vec<String> {
    let mut names = Vec::with_capacity(xs.len() + ys.len());
    for name in xs.into_iter().chain(ys) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

impl ComposedModelAdapter {
    /// The cycle ratio computed at composition time.
    pub fn cycle_ratio(&self) -> &CycleRatio {
        &self.ratio
    }

    /// The interface variable names, in copy order.
    pub fn interface(&self) -> &[String] {
        &self.interface
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.state
    }

    fn ensure(&self, operation: &'static str, expected: LifecycleState) -> CouplingResult<()> {
        if self.state != expected {
            return Err(CouplingError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn ensure_not_finalized(&self, operation: &'static str) -> CouplingResult<()> {
        if self.state == LifecycleState::Finalized {
            return Err(CouplingError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Run a wrapped model through its native sub-steps for one composite step.
    fn run_cycles(model: &mut dyn ModelAdapter, cycles: u32) -> CouplingResult<()> {
        for _ in 0..cycles {
            model.update()?;
        }
        Ok(())
    }

    /// The model that answers per-variable queries for `name`.
    fn owner(&self, name: &str) -> CouplingResult<&dyn ModelAdapter> {
        match self.owners.get(name) {
            Some(VarOwner::Primary) => Ok(self.primary.as_ref()),
            Some(VarOwner::Secondary) => Ok(self.secondary.as_ref()),
            None => Err(CouplingError::UnknownVariable(name.to_string())),
        }
    }
}

impl ModelAdapter for ComposedModelAdapter {
    /// Initialize both wrapped models with the same configuration,
    /// primary first.
    fn initialize(&mut self, config: &str) -> CouplingResult<()> {
        self.ensure("initialize", LifecycleState::Uninitialized)?;
        self.primary.initialize(config)?;
        self.secondary.initialize(config)?;
        self.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Run one composite step.
    ///
    /// The primary model runs its sub-steps, the interface variables are
    /// pushed primary -> secondary, the secondary runs its sub-steps, and
    /// the interface variables are pushed back. Both models advance by
    /// exactly one composite time step. A failure in either model aborts
    /// the step without completing the paired exchange.
    fn update(&mut self) -> CouplingResult<()> {
        self.ensure("update", LifecycleState::Initialized)?;
        trace!("composite step: {:?}", self.ratio);

        Self::run_cycles(self.primary.as_mut(), self.ratio.primary_cycles)?;
        bridge::copy(self.primary.as_ref(), self.secondary.as_mut(), &self.interface)?;
        Self::run_cycles(self.secondary.as_mut(), self.ratio.secondary_cycles)?;
        bridge::copy(self.secondary.as_ref(), self.primary.as_mut(), &self.interface)?;
        Ok(())
    }

    /// Advance both models to an absolute time using their own bulk advance,
    /// bridging the interface variables at both hand-off points.
    fn update_until(&mut self, time: Time) -> CouplingResult<()> {
        self.ensure("update_until", LifecycleState::Initialized)?;

        self.primary.update_until(time)?;
        bridge::copy(self.primary.as_ref(), self.secondary.as_mut(), &self.interface)?;
        self.secondary.update_until(time)?;
        bridge::copy(self.secondary.as_ref(), self.primary.as_mut(), &self.interface)?;
        Ok(())
    }

    /// Finalize both wrapped models, primary first.
    fn finalize(&mut self) -> CouplingResult<()> {
        self.ensure("finalize", LifecycleState::Initialized)?;
        self.primary.finalize()?;
        self.secondary.finalize()?;
        self.state = LifecycleState::Finalized;
        Ok(())
    }

    fn component_name(&self) -> String {
        format!(
            "{} >< {}",
            self.primary.component_name(),
            self.secondary.component_name()
        )
    }

    fn input_var_names(&self) -> Vec<String> {
        union(
            self.primary.input_var_names(),
            self.secondary.input_var_names(),
        )
    }

    fn output_var_names(&self) -> Vec<String> {
        union(
            self.primary.output_var_names(),
            self.secondary.output_var_names(),
        )
    }

    fn var_type(&self, name: &str) -> CouplingResult<VarType> {
        self.ensure_not_finalized("var_type")?;
        self.owner(name)?.var_type(name)
    }

    fn var_units(&self, name: &str) -> CouplingResult<String> {
        self.ensure_not_finalized("var_units")?;
        self.owner(name)?.var_units(name)
    }

    fn var_nbytes(&self, name: &str) -> CouplingResult<usize> {
        self.ensure_not_finalized("var_nbytes")?;
        self.owner(name)?.var_nbytes(name)
    }

    fn var_location(&self, name: &str) -> CouplingResult<VarLocation> {
        self.ensure_not_finalized("var_location")?;
        self.owner(name)?.var_location(name)
    }

    fn get_value(&self, name: &str) -> CouplingResult<Array1<FloatValue>> {
        self.ensure_not_finalized("get_value")?;
        self.owner(name)?.get_value(name)
    }

    fn get_value_at_indices(
        &self,
        name: &str,
        indices: &[usize],
    ) -> CouplingResult<Array1<FloatValue>> {
        self.ensure_not_finalized("get_value_at_indices")?;
        self.owner(name)?.get_value_at_indices(name, indices)
    }

    /// Broadcast the write to both wrapped models so they stay consistent
    /// for any variable the caller sets directly. No existence check is
    /// made here; a model rejecting the name fails the whole write.
    fn set_value(&mut self, name: &str, values: ArrayView1<FloatValue>) -> CouplingResult<()> {
        self.ensure_not_finalized("set_value")?;
        self.primary.set_value(name, values.view())?;
        self.secondary.set_value(name, values)
    }

    /// Broadcast to both wrapped models, like [`set_value`](Self::set_value).
    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[usize],
        values: ArrayView1<FloatValue>,
    ) -> CouplingResult<()> {
        self.ensure_not_finalized("set_value_at_indices")?;
        self.primary
            .set_value_at_indices(name, indices, values.view())?;
        self.secondary.set_value_at_indices(name, indices, values)
    }

    /// The composite time step computed at construction. Constant for the
    /// adapter's lifetime.
    fn time_step(&self) -> Time {
        self.ratio.time_step
    }

    /// The shared current time of both wrapped models.
    ///
    /// Fails with [`CouplingError::TimeDrift`] if the models' clocks
    /// disagree by any amount; drift is a synchronization fault and is never
    /// silently reconciled.
    fn current_time(&self) -> CouplingResult<Time> {
        self.ensure_not_finalized("current_time")?;
        let primary = self.primary.current_time()?;
        let secondary = self.secondary.current_time()?;
        if primary != secondary {
            return Err(CouplingError::TimeDrift { primary, secondary });
        }
        Ok(primary)
    }

    /// The primary model's start time (the primary is authoritative).
    fn start_time(&self) -> Time {
        self.primary.start_time()
    }

    /// The primary model's end time (the primary is authoritative).
    fn end_time(&self) -> Time {
        self.primary.end_time()
    }
}
