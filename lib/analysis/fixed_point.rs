//! A generic, iterative worklist fixed-point engine.
//!
//! An analysis implements `FixedPointAnalysis` for its state type, and is
//! driven over the `ControlFlowGraph` of a function by `fixed_point_forward`
//! or `fixed_point_backward`. The engine is agnostic of the state; it only
//! requires that states can be cloned, compared and joined.
//!
//! The caller must ensure `trans` and `join` are monotone. Otherwise the
//! engine may never reach a fixed point.

use crate::il;
use crate::Error;
use log::trace;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::Debug;

/// The direction in which instructions of a block are visited.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Backward,
}

pub trait FixedPointAnalysis<State: Clone + Debug + PartialEq> {
    /// Apply the effect of the instruction at `location` to `state`.
    fn trans(
        &mut self,
        location: &il::InstructionLocation,
        state: &mut State,
    ) -> Result<(), Error>;

    /// Join `state1` into `state0`.
    fn join(&mut self, state0: &mut State, state1: &State) -> Result<(), Error>;

    /// Apply every instruction of `block` to `state`, in `direction`.
    fn trans_block(
        &mut self,
        function: &il::Function,
        block: &il::Block,
        state: &mut State,
        direction: Direction,
    ) -> Result<(), Error> {
        let positions: Box<dyn Iterator<Item = usize>> = match direction {
            Direction::Forward => Box::new(0..block.instructions().len()),
            Direction::Backward => Box::new((0..block.instructions().len()).rev()),
        };
        for position in positions {
            if let Some(location) = il::InstructionLocation::new(function, block, position) {
                self.trans(&location, state)?;
            }
        }
        Ok(())
    }
}

/// The states at the entry and exit of a block.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BlockStates<State> {
    pub in_state: State,
    pub out_state: State,
}

/// The result of a fixed-point computation: for every block index, the
/// states at its entry and exit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DataflowResult<State> {
    states: BTreeMap<usize, BlockStates<State>>,
}

impl<State> DataflowResult<State> {
    fn new() -> DataflowResult<State> {
        DataflowResult {
            states: BTreeMap::new(),
        }
    }

    pub fn block(&self, index: usize) -> Option<&BlockStates<State>> {
        self.states.get(&index)
    }

    pub fn in_state(&self, index: usize) -> Option<&State> {
        self.states.get(&index).map(|states| &states.in_state)
    }

    pub fn out_state(&self, index: usize) -> Option<&State> {
        self.states.get(&index).map(|states| &states.out_state)
    }

    pub fn blocks(&self) -> &BTreeMap<usize, BlockStates<State>> {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<State: fmt::Display> fmt::Display for DataflowResult<State> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, states) in &self.states {
            writeln!(f, "[ Block: 0x{:X} ]", index)?;
            writeln!(f, "\tin : {}", states.in_state)?;
            writeln!(f, "\tout : {}", states.out_state)?;
        }
        Ok(())
    }
}

/// Compute a forward fixed point of `analysis` over `function`.
///
/// Every block starts with `initial` as its in and out state, except the
/// entry block, whose in state is `entry_initial`. A block is only transferred
/// once the entry block or one of its predecessors has been, so blocks
/// unreachable from the entry keep `initial`.
pub fn fixed_point_forward<Analysis, State>(
    analysis: &mut Analysis,
    function: &il::Function,
    initial: State,
    entry_initial: State,
) -> Result<DataflowResult<State>, Error>
where
    Analysis: FixedPointAnalysis<State>,
    State: Clone + Debug + PartialEq,
{
    let control_flow_graph = function.control_flow_graph();
    let entry = control_flow_graph
        .entry()
        .ok_or_else(|| Error::EntryBlockNotFound(function.name().to_string()))?;

    let mut result = DataflowResult::new();
    let mut queue: BTreeSet<usize> = BTreeSet::new();

    for block in control_flow_graph.blocks() {
        let in_state = if block.index() == entry {
            entry_initial.clone()
        } else {
            initial.clone()
        };
        result.states.insert(
            block.index(),
            BlockStates {
                in_state,
                out_state: initial.clone(),
            },
        );
        queue.insert(block.index());
    }

    // Blocks whose out state has been computed at least once
    let mut visited: FxHashSet<usize> = FxHashSet::default();

    let mut iterations: usize = 0;
    while let Some(index) = queue.pop_first() {
        let predecessors = control_flow_graph.predecessor_indices(index)?;

        // a block is not transferred until control can reach it
        if index != entry
            && !predecessors
                .iter()
                .any(|predecessor| visited.contains(predecessor))
        {
            continue;
        }

        iterations += 1;
        let block = control_flow_graph.block(index)?;

        // join the out states of every visited predecessor into the stored in
        // state
        let mut state = result.states[&index].in_state.clone();
        for predecessor in predecessors {
            if visited.contains(&predecessor) {
                analysis.join(&mut state, &result.states[&predecessor].out_state)?;
            }
        }
        if let Some(states) = result.states.get_mut(&index) {
            states.in_state = state.clone();
        }

        analysis.trans_block(function, block, &mut state, Direction::Forward)?;

        let first_visit = visited.insert(index);
        if !first_visit && state == result.states[&index].out_state {
            continue;
        }
        if let Some(states) = result.states.get_mut(&index) {
            states.out_state = state;
        }

        for successor in control_flow_graph.successor_indices(index)? {
            queue.insert(successor);
        }
    }

    trace!(
        "fixed_point_forward {} converged after {} iterations",
        function.name(),
        iterations
    );

    Ok(result)
}

/// Compute a backward fixed point of `analysis` over `function`.
///
/// Every block starts with `initial` as its in and out state.
pub fn fixed_point_backward<Analysis, State>(
    analysis: &mut Analysis,
    function: &il::Function,
    initial: State,
) -> Result<DataflowResult<State>, Error>
where
    Analysis: FixedPointAnalysis<State>,
    State: Clone + Debug + PartialEq,
{
    let control_flow_graph = function.control_flow_graph();

    let mut result = DataflowResult::new();
    let mut queue: BTreeSet<usize> = BTreeSet::new();

    for block in control_flow_graph.blocks() {
        result.states.insert(
            block.index(),
            BlockStates {
                in_state: initial.clone(),
                out_state: initial.clone(),
            },
        );
        queue.insert(block.index());
    }

    let mut iterations: usize = 0;
    while let Some(index) = queue.pop_first() {
        iterations += 1;
        let block = control_flow_graph.block(index)?;

        // join the in states of every successor into the stored out state
        let mut state = result.states[&index].out_state.clone();
        for successor in control_flow_graph.successor_indices(index)? {
            analysis.join(&mut state, &result.states[&successor].in_state)?;
        }
        if let Some(states) = result.states.get_mut(&index) {
            states.out_state = state.clone();
        }

        analysis.trans_block(function, block, &mut state, Direction::Backward)?;

        if state == result.states[&index].in_state {
            continue;
        }
        if let Some(states) = result.states.get_mut(&index) {
            states.in_state = state;
        }

        for predecessor in control_flow_graph.predecessor_indices(index)? {
            queue.insert(predecessor);
        }
    }

    trace!(
        "fixed_point_backward {} converged after {} iterations",
        function.name(),
        iterations
    );

    Ok(result)
}
