//! A `Program` owns every `Value` and every `Function`.

use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Program {
    values: Vec<Value>,
    functions: BTreeMap<ValueId, Function>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            values: Vec::new(),
            functions: BTreeMap::new(),
        }
    }

    fn push_value(
        &mut self,
        name: Option<String>,
        kind: ValueKind,
        type_class: TypeClass,
    ) -> ValueId {
        let id = ValueId::new(self.values.len());
        self.values.push(Value::new(id, name, kind, type_class));
        id
    }

    /// Create a new named value.
    pub fn new_value<S>(&mut self, name: S, kind: ValueKind, type_class: TypeClass) -> ValueId
    where
        S: Into<String>,
    {
        self.push_value(Some(name.into()), kind, type_class)
    }

    /// Create a new null pointer constant.
    pub fn null(&mut self, type_class: TypeClass) -> ValueId {
        self.push_value(Some("null".to_string()), ValueKind::NullConstant, type_class)
    }

    /// Create a new function with an empty body, and return its id.
    ///
    /// A value is created for the function itself, and one for each of its
    /// parameters.
    pub fn new_function<S>(
        &mut self,
        name: S,
        return_type: TypeClass,
        parameters: &[(&str, TypeClass)],
    ) -> ValueId
    where
        S: Into<String>,
    {
        let name = name.into();
        let id = self.push_value(Some(name.clone()), ValueKind::Function, TypeClass::Function);
        let parameters = parameters
            .iter()
            .map(|(name, type_class)| self.new_value(*name, ValueKind::Argument, *type_class))
            .collect();
        self.functions
            .insert(id, Function::new(id, name, return_type, parameters));
        id
    }

    pub fn value(&self, id: ValueId) -> Result<&Value, Error> {
        self.values
            .get(id.index())
            .ok_or(Error::ValueNotFound(id.index()))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The display name of a value, or its id if the value is unknown.
    pub fn value_name(&self, id: ValueId) -> String {
        self.value(id)
            .map(|value| value.name())
            .unwrap_or_else(|_| id.to_string())
    }

    pub fn function(&self, id: ValueId) -> Result<&Function, Error> {
        self.functions
            .get(&id)
            .ok_or_else(|| Error::FunctionNotFound(self.value_name(id)))
    }

    pub fn function_mut(&mut self, id: ValueId) -> Result<&mut Function, Error> {
        let name = self.value_name(id);
        self.functions
            .get_mut(&id)
            .ok_or(Error::FunctionNotFound(name))
    }

    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions
            .values()
            .find(|function| function.name() == name)
    }

    pub fn functions(&self) -> Vec<&Function> {
        self.functions.values().collect()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for value in &self.values {
            writeln!(f, "{} = {}", value.id(), value)?;
        }
        for function in self.functions.values() {
            writeln!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn functions_are_values() {
        let mut program = Program::new();
        let f = program.new_function(
            "f",
            TypeClass::ScalarPointer,
            &[("a", TypeClass::ScalarPointer), ("n", TypeClass::NonPointer)],
        );

        let value = program.value(f).unwrap();
        assert!(value.is_function());
        assert_eq!(value.type_class(), TypeClass::Function);

        let function = program.function(f).unwrap();
        assert_eq!(function.parameters().len(), 2);
        assert!(function.returns_pointer());
        assert!(function.is_declaration());
        assert_eq!(program.value_name(function.parameters()[0]), "a");
        assert_eq!(
            program.value(function.parameters()[1]).unwrap().kind(),
            ValueKind::Argument
        );
        assert!(program.function_by_name("f").is_some());
    }

    #[test]
    fn unknown_function() {
        let mut program = Program::new();
        let v = program.new_value("v", ValueKind::Local, TypeClass::ScalarPointer);
        assert!(program.function(v).is_err());
        assert_eq!(program.value_name(ValueId::new(42)), "%42");
    }
}
