pub mod adapter;
pub mod coupling;
pub mod errors;

mod example_models;

// Re-export the composition entry point for convenience
pub use coupling::{compose, ComposedModelAdapter};
