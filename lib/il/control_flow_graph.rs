//! A `ControlFlowGraph` is a directed `Graph` of `Block` and `Edge`.

use crate::il::*;
use crate::{graph, Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed graph of types `Block` and `Edge`.
///
/// A `ControlFlowGraph` has an optional entry. A function whose graph has no
/// entry is a declaration, and is never analysed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ControlFlowGraph {
    // The internal graph used to store our blocks.
    graph: graph::Graph<Block, Edge>,
    // The next index to use when creating a basic block.
    next_index: usize,
    // An optional entry index for the graph.
    entry: Option<usize>,
}

impl ControlFlowGraph {
    pub fn new() -> ControlFlowGraph {
        ControlFlowGraph {
            graph: graph::Graph::new(),
            next_index: 0,
            entry: None,
        }
    }

    /// Returns the underlying graph
    pub fn graph(&self) -> &graph::Graph<Block, Edge> {
        &self.graph
    }

    /// Sets the entry point for this `ControlFlowGraph` to the given `Block` index.
    pub fn set_entry(&mut self, entry: usize) -> Result<(), Error> {
        if self.graph.has_vertex(entry) {
            self.entry = Some(entry);
            return Ok(());
        }
        Err(Error::GraphVertexNotFound(entry))
    }

    /// Get the entry `Block` index for this `ControlFlowGraph`.
    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    /// Get a `Block` by index.
    pub fn block(&self, index: usize) -> Result<&Block, Error> {
        self.graph.vertex(index)
    }

    /// Get every `Block` in this `ControlFlowGraph`.
    pub fn blocks(&self) -> Vec<&Block> {
        self.graph.vertices()
    }

    /// Get every `Edge` in this `ControlFlowGraph`.
    pub fn edges(&self) -> Vec<&Edge> {
        self.graph.edges()
    }

    /// Get the indices of every predecessor of a `Block` in this `ControlFlowGraph`.
    pub fn predecessor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.graph.predecessor_indices(index)
    }

    /// Get the indices of every successor of a `Block` in this `ControlFlowGraph`.
    pub fn successor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.graph.successor_indices(index)
    }

    /// Every `Block` reachable from the entry which has no successors.
    ///
    /// Without an entry, every `Block` without successors is returned.
    pub fn exit_blocks(&self) -> Vec<&Block> {
        let reachable = self
            .entry
            .and_then(|entry| self.graph.reachable_vertices(entry).ok());
        self.graph
            .vertices_without_successors()
            .into_iter()
            .filter(|block| {
                reachable
                    .as_ref()
                    .map(|reachable| reachable.contains(&block.index()))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Creates a new basic block, adds it to the graph, and returns it
    pub fn new_block(&mut self) -> Result<&mut Block, Error> {
        let next_index = self.next_index;
        self.next_index += 1;
        self.graph.insert_vertex(Block::new(next_index))?;
        self.graph.vertex_mut(next_index)
    }

    /// Creates an unconditional edge from one block to another block
    pub fn unconditional_edge(&mut self, head: usize, tail: usize) -> Result<(), Error> {
        self.graph.insert_edge(Edge::new(head, tail))
    }

    /// Returns this graph in the graphviz dot format
    pub fn dot_graph(&self) -> String {
        self.graph.dot_graph()
    }
}

impl Default for ControlFlowGraph {
    fn default() -> ControlFlowGraph {
        ControlFlowGraph::new()
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for block in self.blocks() {
            writeln!(f, "{}", block)?;
        }
        for edge in self.edges() {
            writeln!(f, "edge {}", edge)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_blocks_skip_unreachable() {
        let mut cfg = ControlFlowGraph::new();
        let head = cfg.new_block().unwrap().index();
        let tail = cfg.new_block().unwrap().index();
        let orphan = cfg.new_block().unwrap().index();

        cfg.unconditional_edge(head, tail).unwrap();
        cfg.set_entry(head).unwrap();

        let exits = cfg
            .exit_blocks()
            .into_iter()
            .map(|block| block.index())
            .collect::<Vec<usize>>();
        assert_eq!(exits, vec![tail]);
        assert!(!exits.contains(&orphan));
    }

    #[test]
    fn set_entry_requires_block() {
        let mut cfg = ControlFlowGraph::new();
        assert!(cfg.set_entry(0).is_err());
        assert!(cfg.entry().is_none());
    }
}
