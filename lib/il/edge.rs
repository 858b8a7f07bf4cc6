//! An `Edge` is a directed edge between `Block`s in a `ControlFlowGraph`.
//!
//! Edges are unguarded. Branch conditions do not change which states reach a
//! block, so the analyses never look at them.

use crate::graph;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge between IL blocks
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Edge {
    head: usize,
    tail: usize,
}

impl Edge {
    pub(crate) fn new(head: usize, tail: usize) -> Edge {
        Edge { head, tail }
    }

    /// Retrieve the index of the head `Block` for this `Edge`.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Retrieve the index of the tail `Block` for this `Edge`.
    pub fn tail(&self) -> usize {
        self.tail
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(0x{:X}->0x{:X})", self.head, self.tail)
    }
}

impl graph::Edge for Edge {
    fn head(&self) -> usize {
        self.head
    }

    fn tail(&self) -> usize {
        self.tail
    }

    fn dot_label(&self) -> String {
        String::new()
    }
}
