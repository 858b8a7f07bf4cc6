use super::{AggregatePolicy, CallSite, CallSiteRecord, Diagnostics, Options, WarningKind};
use super::{PointsToSet, PointsToState};
use crate::analysis::fixed_point::{self, DataflowResult};
use crate::il;
use crate::Error;
use log::{debug, trace};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Transfers `PointsToState` over instructions, and follows calls into their
/// candidate callees.
pub(super) struct PointsToAnalysis<'p> {
    program: &'p il::Program,
    options: Options,
    call_sites: CallSiteRecord,
    diagnostics: Diagnostics,
    // Functions currently being analysed, outermost first
    call_stack: Vec<il::ValueId>,
}

impl<'p> PointsToAnalysis<'p> {
    pub fn new(program: &'p il::Program, options: &Options) -> PointsToAnalysis<'p> {
        PointsToAnalysis {
            program,
            options: options.clone(),
            call_sites: CallSiteRecord::new(),
            diagnostics: Diagnostics::new(),
            call_stack: Vec::new(),
        }
    }

    /// Analyse `function` from `entry_state`.
    pub fn analyze(
        &mut self,
        function: &'p il::Function,
        entry_state: PointsToState,
    ) -> Result<DataflowResult<PointsToState>, Error> {
        self.call_stack.push(function.id());
        let result =
            fixed_point::fixed_point_forward(self, function, PointsToState::new(), entry_state);
        self.call_stack.pop();
        result
    }

    pub fn into_parts(self) -> (CallSiteRecord, Diagnostics) {
        (self.call_sites, self.diagnostics)
    }

    fn aggregate_policy(&self) -> AggregatePolicy {
        self.options.aggregate_policy()
    }

    fn warn(&mut self, kind: WarningKind, location: &il::InstructionLocation, message: String) {
        self.diagnostics
            .warn(kind, Some(location.program_location()), message);
    }

    /// The points-to set of an operand which must already be tracked.
    fn required(
        &mut self,
        location: &il::InstructionLocation,
        state: &PointsToState,
        value: il::ValueId,
    ) -> PointsToSet {
        match state.get(value) {
            Some(pointees) => pointees.clone(),
            None => {
                let message = format!(
                    "{} is not tracked in {}",
                    self.program.value_name(value),
                    location.instruction()
                );
                self.warn(WarningKind::UntrackedOperand, location, message);
                PointsToSet::new()
            }
        }
    }

    /// The values `value` may point to when it is passed or returned.
    ///
    /// A function constant points to itself, and a null constant to nothing.
    /// The state entry keyed by a function holds its return set, not its
    /// pointees.
    fn pointees(
        &mut self,
        location: &il::InstructionLocation,
        state: &PointsToState,
        value: il::ValueId,
    ) -> Result<PointsToSet, Error> {
        let v = self.program.value(value)?;
        if v.is_function() {
            Ok(PointsToSet::singleton(value))
        } else if let Some(pointees) = state.get(value) {
            Ok(pointees.clone())
        } else if v.is_null() {
            Ok(PointsToSet::new())
        } else {
            Ok(self.required(location, state, value))
        }
    }

    fn store(
        &mut self,
        location: &il::InstructionLocation,
        state: &mut PointsToState,
        src: il::ValueId,
        dst: il::ValueId,
    ) -> Result<(), Error> {
        if !state.is_tracked(dst) {
            self.required(location, state, dst);
            state.track(dst);
        }

        let src_value = self.program.value(src)?;
        if state.is_tracked(src) || src_value.is_function() {
            state.set(dst, PointsToSet::singleton(src));
        } else if src_value.type_class().is_pointer() && !src_value.is_null() {
            let message = format!(
                "stored value {} is not tracked in {}",
                src_value.name(),
                location.instruction()
            );
            self.warn(WarningKind::UntrackedStoreSource, location, message);
        }
        Ok(())
    }

    fn field_address(
        &mut self,
        location: &il::InstructionLocation,
        state: &mut PointsToState,
        dst: il::ValueId,
        base: il::ValueId,
    ) {
        let base_pointees = self.required(location, state, base);
        state.set(dst, PointsToSet::new());

        let store_follows = location
            .next_instruction()
            .map(|instruction| instruction.is_store())
            .unwrap_or(false);

        if base_pointees.is_empty() || store_follows {
            state.set(base, PointsToSet::singleton(dst));
            return;
        }

        match base_pointees.single() {
            Some(inner) => state.set(dst, PointsToSet::singleton(inner)),
            None => {
                let message = format!(
                    "{} has more than one field {}",
                    self.program.value_name(base),
                    base_pointees
                );
                self.warn(WarningKind::AmbiguousAggregate, location, message);
                state.set(dst, base_pointees);
            }
        }
    }

    fn phi(&self, state: &mut PointsToState, dst: il::ValueId, incoming: &[il::ValueId]) {
        let pointees = incoming
            .iter()
            .filter(|value| {
                self.program
                    .value(**value)
                    .map(|value| !value.is_null())
                    .unwrap_or(false)
            })
            .cloned()
            .collect::<PointsToSet>();
        state.set(dst, pointees);
    }

    fn ret(
        &mut self,
        location: &il::InstructionLocation,
        state: &mut PointsToState,
        value: Option<il::ValueId>,
    ) -> Result<(), Error> {
        let function = location.function();
        let value = match value {
            Some(value) => value,
            None => return Ok(()),
        };
        if !function.returns_pointer() {
            return Ok(());
        }
        let pointees = self.pointees(location, state, value)?;
        state.set(function.id(), pointees);
        Ok(())
    }

    /// Find every function `callee` may refer to.
    fn resolve_callees(
        &self,
        site: &CallSite,
        state: &PointsToState,
        callee: il::ValueId,
    ) -> Result<BTreeSet<il::ValueId>, Error> {
        let mut candidates = BTreeSet::new();
        let mut visited: FxHashSet<il::ValueId> = FxHashSet::default();
        let mut queue = vec![callee];

        while let Some(value) = queue.pop() {
            if !visited.insert(value) {
                continue;
            }
            if self.program.value(value)?.is_function() {
                candidates.insert(value);
            } else if let Some(pointees) = state.get(value) {
                queue.extend(pointees.iter().cloned());
            } else {
                return Err(Error::Resolution {
                    call_site: site.to_string(),
                    reason: format!(
                        "{} is neither a function nor a tracked pointer",
                        self.program.value_name(value)
                    ),
                });
            }
        }

        if candidates.is_empty() {
            return Err(Error::Resolution {
                call_site: site.to_string(),
                reason: format!(
                    "{} has no candidate callee",
                    self.program.value_name(callee)
                ),
            });
        }

        Ok(candidates)
    }

    /// Bind the pointees of every pointer argument to the matching formal
    /// parameter of `function`.
    fn bind_arguments(
        &mut self,
        location: &il::InstructionLocation,
        caller_state: &PointsToState,
        callee_state: &mut PointsToState,
        function: &il::Function,
        args: &[il::ValueId],
    ) -> Result<(), Error> {
        for (formal, actual) in function.parameters().iter().zip(args.iter()) {
            if !self.program.value(*actual)?.type_class().is_pointer() {
                continue;
            }
            let pointees = self.pointees(location, caller_state, *actual)?;
            callee_state.bind(*formal, &pointees);
        }
        Ok(())
    }

    /// Returns true if a call to `function` should be analysed.
    fn follows(&mut self, location: &il::InstructionLocation, function: &il::Function) -> bool {
        if function.is_declaration() {
            debug!("{} is a declaration, not followed", function.name());
            return false;
        }
        if self.call_stack.contains(&function.id()) {
            debug!(
                "recursive call to {} at {}, not followed",
                function.name(),
                location
            );
            return false;
        }
        if let Some(max_call_depth) = self.options.max_call_depth() {
            if self.call_stack.len() > max_call_depth {
                let message = format!(
                    "call to {} exceeds the maximum call depth {}",
                    function.name(),
                    max_call_depth
                );
                self.warn(WarningKind::CallNotFollowed, location, message);
                return false;
            }
        }
        true
    }

    /// The state at the exit of `function`: the join of the out states of its
    /// exit blocks.
    fn exit_state(
        &mut self,
        function: &il::Function,
        result: &DataflowResult<PointsToState>,
        entry_state: PointsToState,
    ) -> PointsToState {
        let mut exit_states = function
            .control_flow_graph()
            .exit_blocks()
            .into_iter()
            .filter_map(|block| result.out_state(block.index()));

        let mut state = match exit_states.next() {
            Some(state) => state.clone(),
            None => return entry_state,
        };
        let policy = self.aggregate_policy();
        for exit_state in exit_states {
            state.merge(exit_state, self.program, policy, &mut self.diagnostics);
        }
        state
    }

    fn call(
        &mut self,
        location: &il::InstructionLocation,
        state: &mut PointsToState,
        dst: Option<il::ValueId>,
        callee: il::ValueId,
        args: &[il::ValueId],
    ) -> Result<(), Error> {
        let program = self.program;
        let site = CallSite::new(location.program_location(), location.instruction().line());

        let callee_value = program.value(callee)?;
        if callee_value.is_function() && self.options.is_allocator(&callee_value.name()) {
            self.call_sites.insert(site, vec![callee_value.name()]);
            if let Some(dst) = dst {
                state.set(dst, PointsToSet::new());
            }
            return Ok(());
        }

        let candidates = self.resolve_callees(&site, state, callee)?;
        self.call_sites.insert(
            site,
            candidates.iter().map(|candidate| program.value_name(*candidate)),
        );
        trace!(
            "{} resolves to {}",
            site,
            candidates
                .iter()
                .map(|candidate| program.value_name(*candidate))
                .collect::<Vec<String>>()
                .join(", ")
        );

        let mut call_state: Option<PointsToState> = None;
        for candidate in candidates {
            let function = program.function(candidate)?;

            let mut entry_state = state.clone();
            self.bind_arguments(location, state, &mut entry_state, function, args)?;

            let mut exit_state = if self.follows(location, function) {
                let result = self.analyze(function, entry_state.clone())?;
                self.exit_state(function, &result, entry_state)
            } else {
                entry_state
            };

            if let Some(dst) = dst {
                if function.returns_pointer() {
                    let returned = if function.is_declaration() {
                        PointsToSet::new()
                    } else {
                        exit_state.get(candidate).cloned().unwrap_or_default()
                    };
                    exit_state.set(dst, returned);
                }
            }

            call_state = match call_state {
                None => Some(exit_state),
                Some(mut merged) => {
                    let policy = self.aggregate_policy();
                    merged.merge(&exit_state, program, policy, &mut self.diagnostics);
                    Some(merged)
                }
            };
        }

        if let Some(call_state) = call_state {
            *state = call_state;
        }
        Ok(())
    }
}

impl<'p> fixed_point::FixedPointAnalysis<PointsToState> for PointsToAnalysis<'p> {
    fn trans(
        &mut self,
        location: &il::InstructionLocation,
        state: &mut PointsToState,
    ) -> Result<(), Error> {
        match *location.instruction().operation() {
            il::Operation::Alloca { dst } => {
                state.set(dst, PointsToSet::new());
            }
            il::Operation::Store { src, dst } => self.store(location, state, src, dst)?,
            il::Operation::Load { dst, src } => {
                let pointees = self.required(location, state, src);
                state.set(dst, pointees);
            }
            il::Operation::FieldAddress { dst, base } => {
                self.field_address(location, state, dst, base)
            }
            il::Operation::Cast { dst, src } => {
                if !self.program.value(src)?.is_function() {
                    self.required(location, state, src);
                }
                state.set(dst, PointsToSet::singleton(src));
            }
            il::Operation::MemCopy { dst, src } => {
                let pointees = state.get(src).cloned().unwrap_or_default();
                state.set(dst, pointees);
            }
            il::Operation::Phi { dst, ref incoming } => self.phi(state, dst, incoming),
            il::Operation::Call {
                dst,
                callee,
                ref args,
            } => self.call(location, state, dst, callee, args)?,
            il::Operation::Return { value } => self.ret(location, state, value)?,
            il::Operation::Debug | il::Operation::Nop => {}
        }
        Ok(())
    }

    fn join(&mut self, state0: &mut PointsToState, state1: &PointsToState) -> Result<(), Error> {
        let policy = self.aggregate_policy();
        state0.merge(state1, self.program, policy, &mut self.diagnostics);
        Ok(())
    }
}
