//! A flow-sensitive points-to analysis which resolves indirect calls.
//!
//! The analysis tracks, for every pointer-valued `il::Value`, the set of
//! values it may point to, and drives `fixed_point_forward` over the entry
//! function. At every call, the callee operand is resolved to its candidate
//! functions, which are recorded in a `CallSiteRecord` and analysed in turn
//! from a copy of the state at the call, with the pointees of every pointer
//! argument bound to the matching formal parameter.
//!
//! The analysis is field insensitive, and the same entry state is reused for
//! every visit of a call site.

mod analysis;
mod call_site;
mod diagnostics;
mod domain;
mod options;

pub use self::call_site::{CallSite, CallSiteRecord};
pub use self::diagnostics::{Diagnostics, Warning, WarningKind};
pub use self::domain::{PointsToSet, PointsToState};
pub use self::options::{AggregatePolicy, Options, OptionsBuilder};

use self::analysis::PointsToAnalysis;
use crate::analysis::fixed_point::DataflowResult;
use crate::il;
use crate::Error;
use log::debug;
use serde_json::json;
use std::fmt;

/// Compute the points-to states of `entry`, and the candidate callees of
/// every call site reachable from it.
pub fn points_to<'p>(
    program: &'p il::Program,
    entry: il::ValueId,
    options: &Options,
) -> Result<PointsToResult<'p>, Error> {
    let function = program.function(entry)?;
    debug!("points-to analysis from {}", function.name());

    let mut analysis = PointsToAnalysis::new(program, options);
    let states = analysis.analyze(function, PointsToState::new())?;
    let (call_sites, diagnostics) = analysis.into_parts();

    Ok(PointsToResult {
        program,
        entry,
        states,
        call_sites,
        diagnostics,
    })
}

/// The result of a points-to analysis.
#[derive(Clone, Debug)]
pub struct PointsToResult<'p> {
    program: &'p il::Program,
    entry: il::ValueId,
    states: DataflowResult<PointsToState>,
    call_sites: CallSiteRecord,
    diagnostics: Diagnostics,
}

impl<'p> PointsToResult<'p> {
    /// The function the analysis started from.
    pub fn entry(&self) -> il::ValueId {
        self.entry
    }

    /// The states at the entry and exit of every block of the entry function.
    pub fn states(&self) -> &DataflowResult<PointsToState> {
        &self.states
    }

    pub fn call_sites(&self) -> &CallSiteRecord {
        &self.call_sites
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn state_string(&self, state: &PointsToState) -> String {
        state
            .iter()
            .map(|(pointer, pointees)| {
                format!(
                    "{} -> {{{}}}",
                    self.program.value_name(*pointer),
                    self.names(pointees).join(", ")
                )
            })
            .collect::<Vec<String>>()
            .join(", ")
    }

    fn names(&self, pointees: &PointsToSet) -> Vec<String> {
        pointees
            .iter()
            .map(|pointee| self.program.value_name(*pointee))
            .collect()
    }

    fn state_json(&self, state: &PointsToState) -> serde_json::Value {
        state
            .iter()
            .map(|(pointer, pointees)| {
                json!({
                    "pointer": self.program.value_name(*pointer),
                    "pointees": self.names(pointees),
                })
            })
            .collect()
    }

    /// Dump this result as JSON, with every value referred to by name.
    pub fn to_json(&self) -> Result<String, Error> {
        let blocks: Vec<serde_json::Value> = self
            .states
            .blocks()
            .iter()
            .map(|(index, states)| {
                json!({
                    "block": index,
                    "in": self.state_json(&states.in_state),
                    "out": self.state_json(&states.out_state),
                })
            })
            .collect();

        let call_sites: Vec<serde_json::Value> = self
            .call_sites
            .iter()
            .map(|(site, names)| {
                json!({
                    "location": site.location().to_string(),
                    "line": site.line(),
                    "callees": names,
                })
            })
            .collect();

        let warnings: Vec<String> = self
            .diagnostics
            .warnings()
            .iter()
            .map(|warning| warning.to_string())
            .collect();

        let dump = json!({
            "function": self.program.value_name(self.entry),
            "blocks": blocks,
            "call_sites": call_sites,
            "warnings": warnings,
        });

        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

impl<'p> fmt::Display for PointsToResult<'p> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, states) in self.states.blocks() {
            writeln!(f, "[ Block: 0x{:X} ]", index)?;
            writeln!(f, "\tin : {}", self.state_string(&states.in_state))?;
            writeln!(f, "\tout : {}", self.state_string(&states.out_state))?;
        }
        write!(f, "{}", self.call_sites)
    }
}
