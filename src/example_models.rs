#![allow(dead_code)]

//! Configurable model adapters used across the test suite.
//!
//! [`TestModel`] is a minimal in-memory model: a fixed time step, a set of
//! named variables backed by arrays, and an update rule that increments every
//! output variable by one per native step. That rule makes the coupling
//! protocol observable from the outside: after a composite step, a variable's
//! value encodes how many sub-steps touched it and which bridge copies ran.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ndarray::{Array1, ArrayView1};
use serde::Deserialize;

use crate::adapter::{FloatValue, ModelAdapter, Time, VarLocation, VarType};
use crate::errors::{CouplingError, CouplingResult};

/// Shared log of adapter calls, for asserting call order in tests.
pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

/// Configuration accepted by [`TestModel::initialize`].
#[derive(Debug, Deserialize)]
struct TestModelConfig {
    #[serde(default)]
    start_time: Option<Time>,
    /// Fill the named variables with a constant initial value.
    #[serde(default)]
    initial_values: HashMap<String, FloatValue>,
}

#[derive(Debug, Clone)]
struct Variable {
    values: Array1<FloatValue>,
    var_type: VarType,
    units: String,
    location: VarLocation,
    input: bool,
    output: bool,
}

/// An in-memory model adapter with configurable variables and clock.
pub(crate) struct TestModel {
    name: String,
    time_step: Time,
    start_time: Time,
    end_time: Time,
    current_time: Time,
    /// Extra clock advance applied on every update, used to provoke drift.
    clock_skew: Time,
    initialized: bool,
    finalized: bool,
    variables: HashMap<String, Variable>,
    /// Declaration order of `variables`.
    order: Vec<String>,
    events: Option<EventLog>,
}

impl TestModel {
    pub fn new(name: &str, time_step: Time) -> Self {
        Self {
            name: name.to_string(),
            time_step,
            start_time: 0.0,
            end_time: Time::INFINITY,
            current_time: 0.0,
            clock_skew: 0.0,
            initialized: false,
            finalized: false,
            variables: HashMap::new(),
            order: vec![],
            events: None,
        }
    }

    /// Declare an input variable. Redeclaring an existing name only adds the
    /// input marking and keeps the existing values.
    pub fn with_input(self, name: &str, units: &str, values: Array1<FloatValue>) -> Self {
        self.add(name, units, values, false)
    }

    /// Declare an output variable. Output values are incremented by one on
    /// every native step.
    pub fn with_output(self, name: &str, units: &str, values: Array1<FloatValue>) -> Self {
        self.add(name, units, values, true)
    }

    fn add(mut self, name: &str, units: &str, values: Array1<FloatValue>, output: bool) -> Self {
        match self.variables.get_mut(name) {
            Some(var) => {
                if output {
                    var.output = true;
                } else {
                    var.input = true;
                }
            }
            None => {
                self.order.push(name.to_string());
                self.variables.insert(
                    name.to_string(),
                    Variable {
                        values,
                        var_type: VarType::Float64,
                        units: units.to_string(),
                        location: VarLocation::Node,
                        input: !output,
                        output,
                    },
                );
            }
        }
        self
    }

    /// Override the type tag reported for a variable.
    pub fn with_var_type(mut self, name: &str, var_type: VarType) -> Self {
        self.variables
            .get_mut(name)
            .expect("variable not declared")
            .var_type = var_type;
        self
    }

    /// Override the location reported for a variable.
    pub fn with_location(mut self, name: &str, location: VarLocation) -> Self {
        self.variables
            .get_mut(name)
            .expect("variable not declared")
            .location = location;
        self
    }

    pub fn with_end_time(mut self, end_time: Time) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn with_clock_skew(mut self, skew: Time) -> Self {
        self.clock_skew = skew;
        self
    }

    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    fn record(&self, event: impl AsRef<str>) {
        if let Some(events) = &self.events {
            events
                .borrow_mut()
                .push(format!("{}: {}", self.name, event.as_ref()));
        }
    }

    fn variable(&self, name: &str) -> CouplingResult<&Variable> {
        self.variables
            .get(name)
            .ok_or_else(|| CouplingError::UnknownVariable(name.to_string()))
    }

    fn variable_mut(&mut self, name: &str) -> CouplingResult<&mut Variable> {
        self.variables
            .get_mut(name)
            .ok_or_else(|| CouplingError::UnknownVariable(name.to_string()))
    }

    fn names_where(&self, predicate: impl Fn(&Variable) -> bool) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| predicate(&self.variables[*name]))
            .cloned()
            .collect()
    }
}

impl ModelAdapter for TestModel {
    fn initialize(&mut self, config: &str) -> CouplingResult<()> {
        if self.initialized {
            return Err(CouplingError::Model(format!(
                "{} is already initialized",
                self.name
            )));
        }

        let config: TestModelConfig =
            toml::from_str(config).map_err(|e| CouplingError::Model(e.to_string()))?;
        if let Some(start_time) = config.start_time {
            self.start_time = start_time;
        }
        self.current_time = self.start_time;
        for (name, value) in config.initial_values {
            if let Some(var) = self.variables.get_mut(&name) {
                var.values.fill(value);
            }
        }

        self.initialized = true;
        self.record("initialize");
        Ok(())
    }

    fn update(&mut self) -> CouplingResult<()> {
        if !self.initialized || self.finalized {
            return Err(CouplingError::Model(format!(
                "{} is not ready to update",
                self.name
            )));
        }
        let next = self.current_time + self.time_step;
        if next > self.end_time {
            return Err(CouplingError::Model(format!(
                "{} cannot update past its end time",
                self.name
            )));
        }

        self.current_time = next + self.clock_skew;
        for name in &self.order {
            let var = self.variables.get_mut(name).unwrap();
            if var.output {
                var.values += 1.0;
            }
        }
        self.record("update");
        Ok(())
    }

    fn update_until(&mut self, time: Time) -> CouplingResult<()> {
        if !self.initialized || self.finalized {
            return Err(CouplingError::Model(format!(
                "{} is not ready to update",
                self.name
            )));
        }
        while self.current_time + self.time_step <= time {
            self.update()?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> CouplingResult<()> {
        if !self.initialized || self.finalized {
            return Err(CouplingError::Model(format!(
                "{} cannot be finalized",
                self.name
            )));
        }
        self.finalized = true;
        self.record("finalize");
        Ok(())
    }

    fn component_name(&self) -> String {
        self.name.clone()
    }

    fn input_var_names(&self) -> Vec<String> {
        self.names_where(|var| var.input)
    }

    fn output_var_names(&self) -> Vec<String> {
        self.names_where(|var| var.output)
    }

    fn var_type(&self, name: &str) -> CouplingResult<VarType> {
        Ok(self.variable(name)?.var_type)
    }

    fn var_units(&self, name: &str) -> CouplingResult<String> {
        Ok(self.variable(name)?.units.clone())
    }

    fn var_nbytes(&self, name: &str) -> CouplingResult<usize> {
        let var = self.variable(name)?;
        Ok(var.var_type.itemsize() * var.values.len())
    }

    fn var_location(&self, name: &str) -> CouplingResult<VarLocation> {
        Ok(self.variable(name)?.location)
    }

    fn get_value(&self, name: &str) -> CouplingResult<Array1<FloatValue>> {
        self.record(format!("get_value {}", name));
        Ok(self.variable(name)?.values.clone())
    }

    fn get_value_at_indices(
        &self,
        name: &str,
        indices: &[usize],
    ) -> CouplingResult<Array1<FloatValue>> {
        let var = self.variable(name)?;
        Ok(indices.iter().map(|&i| var.values[i]).collect())
    }

    fn set_value(&mut self, name: &str, values: ArrayView1<FloatValue>) -> CouplingResult<()> {
        self.record(format!("set_value {}", name));
        let name_owned = self.name.clone();
        let var = self.variable_mut(name)?;
        if var.values.len() != values.len() {
            return Err(CouplingError::Model(format!(
                "{} expected {} values for {}, got {}",
                name_owned,
                var.values.len(),
                name,
                values.len()
            )));
        }
        var.values.assign(&values);
        Ok(())
    }

    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[usize],
        values: ArrayView1<FloatValue>,
    ) -> CouplingResult<()> {
        self.record(format!("set_value_at_indices {}", name));
        let var = self.variable_mut(name)?;
        for (value, &index) in values.iter().zip(indices) {
            var.values[index] = *value;
        }
        Ok(())
    }

    fn time_step(&self) -> Time {
        self.time_step
    }

    fn current_time(&self) -> CouplingResult<Time> {
        Ok(self.current_time)
    }

    fn start_time(&self) -> Time {
        self.start_time
    }

    fn end_time(&self) -> Time {
        self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn declares_variables_in_order() {
        let model = TestModel::new("m", 1.0)
            .with_input("a", "m", array![0.0])
            .with_output("b", "s", array![0.0])
            .with_input("c", "kg", array![0.0]);

        assert_eq!(model.input_var_names(), vec!["a", "c"]);
        assert_eq!(model.output_var_names(), vec!["b"]);
    }

    #[test]
    fn redeclaring_merges_markings() {
        let model = TestModel::new("m", 1.0)
            .with_input("flux", "W", array![0.0])
            .with_output("flux", "W", array![9.0]);

        assert_eq!(model.input_var_names(), vec!["flux"]);
        assert_eq!(model.output_var_names(), vec!["flux"]);
        // Values from the first declaration are kept
        assert_eq!(model.get_value("flux").unwrap(), array![0.0]);
    }

    #[test]
    fn update_advances_clock_and_outputs() {
        let mut model = TestModel::new("m", 0.5)
            .with_input("a", "m", array![1.0, 2.0])
            .with_output("b", "s", array![0.0]);
        model.initialize("").unwrap();

        model.update().unwrap();
        model.update().unwrap();

        assert_eq!(model.current_time().unwrap(), 1.0);
        assert_eq!(model.get_value("a").unwrap(), array![1.0, 2.0]);
        assert_eq!(model.get_value("b").unwrap(), array![2.0]);
    }

    #[test]
    fn initialize_applies_config() {
        let mut model = TestModel::new("m", 1.0).with_output("b", "s", array![0.0, 0.0]);
        model
            .initialize("start_time = 10.0\n\n[initial_values]\nb = 3.5\n")
            .unwrap();

        assert_eq!(model.current_time().unwrap(), 10.0);
        assert_eq!(model.get_value("b").unwrap(), array![3.5, 3.5]);
    }

    #[test]
    fn update_past_end_time_fails() {
        let mut model = TestModel::new("m", 1.0).with_end_time(1.0);
        model.initialize("").unwrap();

        model.update().unwrap();
        let err = model.update().unwrap_err();
        assert!(matches!(err, CouplingError::Model(_)));
    }

    #[test]
    fn value_at_indices() {
        let mut model = TestModel::new("m", 1.0).with_input("a", "m", array![1.0, 2.0, 3.0]);
        model.initialize("").unwrap();

        assert_eq!(
            model.get_value_at_indices("a", &[2, 0]).unwrap(),
            array![3.0, 1.0]
        );

        model
            .set_value_at_indices("a", &[1], array![9.0].view())
            .unwrap();
        assert_eq!(model.get_value("a").unwrap(), array![1.0, 9.0, 3.0]);
    }
}
