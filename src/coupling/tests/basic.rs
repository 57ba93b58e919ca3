//! Composition-time validation and metadata delegation.

use ndarray::array;

use crate::adapter::{ModelAdapter, VariableDescriptor, VarLocation, VarType};
use crate::coupling::compose;
use crate::errors::CouplingError;
use crate::example_models::TestModel;

fn ocean() -> TestModel {
    TestModel::new("ocean", 1.0)
        .with_input("Wind Speed", "m / s", array![0.0, 0.0])
        .with_output("Surface Temperature", "K", array![288.0])
}

fn atmosphere() -> TestModel {
    TestModel::new("atmosphere", 0.25)
        .with_input("Surface Temperature", "degC", array![15.0])
        .with_output("Wind Speed", "m / s", array![4.0, 6.0])
}

#[test]
fn component_name_concatenates() {
    let composed = compose(Box::new(ocean()), Box::new(atmosphere()), vec![]).unwrap();
    assert_eq!(composed.component_name(), "ocean >< atmosphere");
}

#[test]
fn var_name_lists_are_order_preserving_unions() {
    let composed = compose(Box::new(ocean()), Box::new(atmosphere()), vec![]).unwrap();

    assert_eq!(
        composed.input_var_names(),
        vec!["Wind Speed", "Surface Temperature"]
    );
    assert_eq!(
        composed.output_var_names(),
        vec!["Surface Temperature", "Wind Speed"]
    );
}

#[test]
fn cycle_ratio_is_computed_at_composition() {
    let composed = compose(Box::new(ocean()), Box::new(atmosphere()), vec![]).unwrap();

    let ratio = composed.cycle_ratio();
    assert_eq!(ratio.primary_cycles, 1);
    assert_eq!(ratio.secondary_cycles, 4);
    assert_eq!(ratio.time_step, 1.0);
    assert_eq!(composed.time_step(), 1.0);
}

#[test]
fn metadata_prefers_the_primary_model() {
    let composed = compose(Box::new(ocean()), Box::new(atmosphere()), vec![]).unwrap();

    // Both models declare these; the primary's units win
    assert_eq!(composed.var_units("Surface Temperature").unwrap(), "K");
    assert_eq!(composed.var_units("Wind Speed").unwrap(), "m / s");
    assert_eq!(composed.var_nbytes("Wind Speed").unwrap(), 16);

    let err = composed.var_units("Pressure").unwrap_err();
    assert!(matches!(err, CouplingError::UnknownVariable(_)));
}

#[test]
fn descriptor_from_a_composed_model() {
    let composed = compose(Box::new(ocean()), Box::new(atmosphere()), vec![]).unwrap();

    let descriptor = VariableDescriptor::from_model(&composed, "Surface Temperature").unwrap();
    assert_eq!(descriptor.var_type, VarType::Float64);
    assert_eq!(descriptor.nbytes, 8);
    assert_eq!(descriptor.units, "K");
    assert_eq!(descriptor.location, VarLocation::Node);
}

#[test]
fn undeclared_interface_variable_fails_composition() {
    let err = compose(
        Box::new(ocean()),
        Box::new(atmosphere()),
        vec!["Salinity".to_string()],
    )
    .unwrap_err();

    match err {
        CouplingError::UndeclaredInterfaceVariable { name, model } => {
            assert_eq!(name, "Salinity");
            assert_eq!(model, "ocean");
        }
        _ => panic!("unexpected error: {}", err),
    }
}

#[test]
fn incompatible_shared_variable_fails_composition() {
    let primary = ocean();
    let secondary = TestModel::new("atmosphere", 0.25)
        .with_input("Surface Temperature", "K", array![15.0])
        .with_var_type("Surface Temperature", VarType::Float32);

    let err = compose(Box::new(primary), Box::new(secondary), vec![]).unwrap_err();
    assert!(matches!(err, CouplingError::IncompatibleVariable { .. }));
}

#[test]
fn incompatible_time_steps_fail_composition() {
    let primary = TestModel::new("a", 0.3);
    let secondary = TestModel::new("b", 0.2);

    let err = compose(Box::new(primary), Box::new(secondary), vec![]).unwrap_err();
    match err {
        CouplingError::IncompatibleTimeStep { dt1, dt2 } => {
            assert_eq!(dt1, 0.3);
            assert_eq!(dt2, 0.2);
        }
        _ => panic!("unexpected error: {}", err),
    }
}

#[test]
fn interface_variables_are_held_in_order() {
    let composed = compose(
        Box::new(ocean()),
        Box::new(atmosphere()),
        vec!["Wind Speed".to_string(), "Surface Temperature".to_string()],
    )
    .unwrap();

    assert_eq!(
        composed.interface(),
        ["Wind Speed", "Surface Temperature"]
    );
}
