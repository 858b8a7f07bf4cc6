//! Values are the operands of every `Operation`.
//!
//! A `Value` is owned by the `Program` and referred to everywhere else by its
//! `ValueId`. Two `ValueId`s are the same value if and only if they are equal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable handle to a `Value` in a `Program`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ValueId(usize);

impl ValueId {
    pub(crate) fn new(index: usize) -> ValueId {
        ValueId(index)
    }

    /// The index of this value in the arena of its `Program`.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// The static type of a value, as far as the points-to analysis cares.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum TypeClass {
    /// A function, or a pointer to a function.
    Function,
    /// A pointer to a struct or an array.
    AggregatePointer,
    /// A pointer to anything which is not an aggregate.
    ScalarPointer,
    NonPointer,
}

impl TypeClass {
    /// Returns true for every class which may hold an address.
    pub fn is_pointer(&self) -> bool {
        !matches!(self, TypeClass::NonPointer)
    }

    pub fn is_aggregate_pointer(&self) -> bool {
        matches!(self, TypeClass::AggregatePointer)
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TypeClass::Function => write!(f, "fn"),
            TypeClass::AggregatePointer => write!(f, "aggregate*"),
            TypeClass::ScalarPointer => write!(f, "scalar*"),
            TypeClass::NonPointer => write!(f, "value"),
        }
    }
}

/// Where a value comes from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ValueKind {
    Function,
    Argument,
    Global,
    /// The result of an instruction.
    Local,
    NullConstant,
    Constant,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Value {
    id: ValueId,
    name: Option<String>,
    kind: ValueKind,
    type_class: TypeClass,
}

impl Value {
    pub(crate) fn new(
        id: ValueId,
        name: Option<String>,
        kind: ValueKind,
        type_class: TypeClass,
    ) -> Value {
        Value {
            id,
            name,
            kind,
            type_class,
        }
    }

    pub fn id(&self) -> ValueId {
        self.id
    }

    /// The display name of this value, falling back to its id.
    pub fn name(&self) -> String {
        match self.name {
            Some(ref name) => name.to_string(),
            None => self.id.to_string(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn type_class(&self) -> TypeClass {
        self.type_class
    }

    pub fn is_function(&self) -> bool {
        self.kind == ValueKind::Function
    }

    pub fn is_null(&self) -> bool {
        self.kind == ValueKind::NullConstant
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.name(), self.type_class)
    }
}
