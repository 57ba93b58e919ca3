//! Integration tests for composed model adapters.
//!
//! These tests drive full compositions built from the example models,
//! covering construction-time validation, metadata delegation, the stepping
//! protocol, recursive composition, and serialisation of the plain-data
//! types.

#[cfg(test)]
mod basic;
