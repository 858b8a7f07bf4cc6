use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A function in a `Program`.
///
/// Every function is also a `Value` of kind `ValueKind::Function`, and the
/// function is identified by the `ValueId` of that value.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Function {
    // The value naming this function
    id: ValueId,
    name: String,
    return_type: TypeClass,
    // The formal parameters, in order
    parameters: Vec<ValueId>,
    // The `ControlFlowGraph` capturing semantics of the function
    control_flow_graph: ControlFlowGraph,
}

impl Function {
    pub(crate) fn new(
        id: ValueId,
        name: String,
        return_type: TypeClass,
        parameters: Vec<ValueId>,
    ) -> Function {
        Function {
            id,
            name,
            return_type,
            parameters,
            control_flow_graph: ControlFlowGraph::new(),
        }
    }

    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> TypeClass {
        self.return_type
    }

    pub fn returns_pointer(&self) -> bool {
        self.return_type.is_pointer()
    }

    pub fn parameters(&self) -> &[ValueId] {
        &self.parameters
    }

    /// A function without an entry block has no body to analyse.
    pub fn is_declaration(&self) -> bool {
        self.control_flow_graph.entry().is_none()
    }

    pub fn control_flow_graph(&self) -> &ControlFlowGraph {
        &self.control_flow_graph
    }

    pub fn control_flow_graph_mut(&mut self) -> &mut ControlFlowGraph {
        &mut self.control_flow_graph
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "fn {}({}) -> {}",
            self.name,
            self.parameters
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<String>>()
                .join(", "),
            self.return_type
        )?;
        write!(f, "{}", self.control_flow_graph)
    }
}
