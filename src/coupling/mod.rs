//! Pairwise composition of model adapters.
//!
//! [`compose`] takes two [`ModelAdapter`](crate::adapter::ModelAdapter)s and
//! a list of interface variable names and returns a [`ComposedModelAdapter`]
//! implementing the same contract. All validation runs once, up front:
//! variables shared between the models must agree in type and size, every
//! declared interface variable must exist on both models, and the two native
//! time steps must be related by an exact integer ratio. Steady-state
//! stepping is then error-free by construction; only a failure inside a
//! wrapped model, clock drift between the models, or a lifecycle violation
//! can surface afterwards.
//!
//! Each composite step drives the model with the smaller time step through
//! its sub-steps and copies the interface variables across at both hand-off
//! points. The first (primary) model is authoritative: it runs first within
//! every composite step and its metadata answers queries for variables that
//! both models declare.

mod bridge;
mod compat;
mod composed;
mod schedule;

#[cfg(test)]
mod tests;

// Public re-exports
pub use composed::{compose, ComposedModelAdapter, LifecycleState};
pub use schedule::CycleRatio;
