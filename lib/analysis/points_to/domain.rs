//! The points-to domain.
//!
//! A `PointsToState` maps each tracked value to the `PointsToSet` of values it
//! may point to. A value absent from the state is untracked, which is not the
//! same as a value tracked with an empty set.

use super::{AggregatePolicy, Diagnostics, WarningKind};
use crate::il;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The values a single pointer may point to.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PointsToSet {
    pointees: BTreeSet<il::ValueId>,
}

impl PointsToSet {
    pub fn new() -> PointsToSet {
        PointsToSet::default()
    }

    /// A set holding exactly one pointee.
    pub fn singleton(pointee: il::ValueId) -> PointsToSet {
        let mut set = PointsToSet::new();
        set.insert(pointee);
        set
    }

    /// Returns true if `pointee` was not already in the set.
    pub fn insert(&mut self, pointee: il::ValueId) -> bool {
        self.pointees.insert(pointee)
    }

    /// Add every pointee of `other` to this set. Returns true if this set grew.
    pub fn union(&mut self, other: &PointsToSet) -> bool {
        let before = self.pointees.len();
        self.pointees.extend(other.pointees.iter().cloned());
        self.pointees.len() != before
    }

    pub fn contains(&self, pointee: &il::ValueId) -> bool {
        self.pointees.contains(pointee)
    }

    pub fn is_subset(&self, other: &PointsToSet) -> bool {
        self.pointees.is_subset(&other.pointees)
    }

    /// The only pointee of this set, if it has exactly one.
    pub fn single(&self) -> Option<il::ValueId> {
        if self.pointees.len() == 1 {
            self.pointees.iter().next().cloned()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.pointees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointees.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &il::ValueId> {
        self.pointees.iter()
    }
}

impl FromIterator<il::ValueId> for PointsToSet {
    fn from_iter<I: IntoIterator<Item = il::ValueId>>(iter: I) -> PointsToSet {
        PointsToSet {
            pointees: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for PointsToSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.pointees
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

/// The dataflow fact of the points-to analysis.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PointsToState {
    pointers: BTreeMap<il::ValueId, PointsToSet>,
}

impl PointsToState {
    pub fn new() -> PointsToState {
        PointsToState::default()
    }

    pub fn is_tracked(&self, value: il::ValueId) -> bool {
        self.pointers.contains_key(&value)
    }

    pub fn get(&self, value: il::ValueId) -> Option<&PointsToSet> {
        self.pointers.get(&value)
    }

    /// Replace the points-to set of `value`.
    pub fn set(&mut self, value: il::ValueId, pointees: PointsToSet) {
        self.pointers.insert(value, pointees);
    }

    /// Start tracking `value` with an empty set, unless it is already tracked.
    pub fn track(&mut self, value: il::ValueId) -> &mut PointsToSet {
        self.pointers.entry(value).or_default()
    }

    /// Union `pointees` into the set of `value`, tracking `value` if needed.
    pub fn bind(&mut self, value: il::ValueId, pointees: &PointsToSet) {
        self.track(value).union(pointees);
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<il::ValueId, PointsToSet> {
        self.pointers.iter()
    }

    /// Returns true if every binding of this state is included in `other`.
    pub fn is_subsumed_by(&self, other: &PointsToState) -> bool {
        self.pointers.iter().all(|(value, pointees)| {
            other
                .get(*value)
                .map(|other_pointees| pointees.is_subset(other_pointees))
                .unwrap_or(false)
        })
    }

    /// Follow the chain of singleton aggregate pointees starting at `pointer`.
    ///
    /// Returns the last address of the chain, and the points-to set stored
    /// there. The walk stops at the first set which is not a singleton, whose
    /// pointee is not an aggregate pointer, or whose pointee is untracked.
    pub fn resolve_chain(
        &self,
        pointer: il::ValueId,
        program: &il::Program,
    ) -> (il::ValueId, PointsToSet) {
        let mut address = pointer;
        let mut visited: FxHashSet<il::ValueId> = FxHashSet::default();
        visited.insert(pointer);

        loop {
            let pointees = match self.pointers.get(&address) {
                Some(pointees) => pointees,
                None => return (address, PointsToSet::new()),
            };
            match pointees.single() {
                Some(next)
                    if is_aggregate_pointer(program, next)
                        && self.is_tracked(next)
                        && visited.insert(next) =>
                {
                    address = next
                }
                _ => return (address, pointees.clone()),
            }
        }
    }

    /// Merge `src` into this state.
    ///
    /// Pointers only tracked in `src` are copied. Pointers tracked in both
    /// states have their sets unioned, except pointers to aggregates under
    /// `AggregatePolicy::ResolveChains`, which are merged at the end of their
    /// pointee chains.
    pub fn merge(
        &mut self,
        src: &PointsToState,
        program: &il::Program,
        policy: AggregatePolicy,
        diagnostics: &mut Diagnostics,
    ) {
        for (pointer, src_pointees) in src.iter() {
            let dest_pointees = match self.pointers.get(pointer) {
                Some(dest_pointees) => dest_pointees.clone(),
                None => {
                    self.pointers.insert(*pointer, src_pointees.clone());
                    continue;
                }
            };

            if policy == AggregatePolicy::MergedSlot || !is_aggregate_pointer(program, *pointer) {
                self.bind(*pointer, src_pointees);
                continue;
            }

            if dest_pointees.len() > 1 || src_pointees.len() > 1 {
                diagnostics.warn(
                    WarningKind::AmbiguousAggregate,
                    None,
                    format!(
                        "aggregate pointer {} merges sets {} and {}",
                        program.value_name(*pointer),
                        dest_pointees,
                        src_pointees
                    ),
                );
                self.bind(*pointer, src_pointees);
                continue;
            }

            match (dest_pointees.single(), src_pointees.single()) {
                (Some(dest_pointee), Some(src_pointee)) if dest_pointee != src_pointee => {
                    let (dest_address, mut root) = self.resolve_chain(*pointer, program);
                    let (_, src_root) = src.resolve_chain(*pointer, program);
                    root.union(&src_root);
                    self.pointers.insert(dest_address, root);
                }
                _ => self.bind(*pointer, src_pointees),
            }
        }
    }
}

fn is_aggregate_pointer(program: &il::Program, value: il::ValueId) -> bool {
    program
        .value(value)
        .map(|value| value.type_class().is_aggregate_pointer())
        .unwrap_or(false)
}

impl fmt::Display for PointsToState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.pointers
                .iter()
                .map(|(pointer, pointees)| format!("{} -> {}", pointer, pointees))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::{Program, TypeClass, ValueId, ValueKind};

    struct Values {
        program: Program,
        f: ValueId,
        g: ValueId,
        p: ValueId,
        q: ValueId,
        s: ValueId,
        x: ValueId,
        y: ValueId,
    }

    fn values() -> Values {
        let mut program = Program::new();
        let f = program.new_function("F", TypeClass::ScalarPointer, &[]);
        let g = program.new_function("G", TypeClass::NonPointer, &[]);
        let p = program.new_value("p", ValueKind::Local, TypeClass::ScalarPointer);
        let q = program.new_value("q", ValueKind::Local, TypeClass::ScalarPointer);
        let s = program.new_value("s", ValueKind::Local, TypeClass::AggregatePointer);
        let x = program.new_value("x", ValueKind::Local, TypeClass::AggregatePointer);
        let y = program.new_value("y", ValueKind::Local, TypeClass::AggregatePointer);
        Values {
            program,
            f,
            g,
            p,
            q,
            s,
            x,
            y,
        }
    }

    fn state(bindings: &[(ValueId, Vec<ValueId>)]) -> PointsToState {
        let mut state = PointsToState::new();
        for (pointer, pointees) in bindings {
            state.set(*pointer, pointees.iter().cloned().collect());
        }
        state
    }

    fn merge(dest: &PointsToState, src: &PointsToState, program: &Program) -> PointsToState {
        let mut dest = dest.clone();
        let mut diagnostics = Diagnostics::new();
        dest.merge(src, program, AggregatePolicy::ResolveChains, &mut diagnostics);
        dest
    }

    #[test]
    fn untracked_differs_from_empty() {
        let v = values();
        let mut state = PointsToState::new();
        assert!(!state.is_tracked(v.p));

        state.track(v.p);
        assert!(state.is_tracked(v.p));
        assert!(state.get(v.p).unwrap().is_empty());
    }

    #[test]
    fn merge_copies_and_unions_scalars() {
        let v = values();
        let dest = state(&[(v.p, vec![v.f])]);
        let src = state(&[(v.p, vec![v.g]), (v.q, vec![])]);

        let merged = merge(&dest, &src, &v.program);

        assert_eq!(merged.get(v.p).unwrap(), &[v.f, v.g].into_iter().collect::<PointsToSet>());
        assert!(merged.get(v.q).unwrap().is_empty());
    }

    #[test]
    fn merge_unions_function_keys() {
        let v = values();
        let dest = state(&[(v.f, vec![v.p])]);
        let src = state(&[(v.f, vec![v.q])]);

        let merged = merge(&dest, &src, &v.program);

        assert_eq!(merged.get(v.f).unwrap(), &[v.p, v.q].into_iter().collect::<PointsToSet>());
    }

    #[test]
    fn merge_is_idempotent() {
        let v = values();
        let s = state(&[
            (v.p, vec![v.f, v.g]),
            (v.s, vec![v.x]),
            (v.x, vec![v.f]),
            (v.q, vec![]),
        ]);

        assert_eq!(merge(&s, &s, &v.program), s);
    }

    #[test]
    fn merge_is_monotone() {
        let v = values();
        let s1 = state(&[(v.p, vec![v.f])]);
        let s2 = state(&[(v.p, vec![v.f, v.g]), (v.q, vec![v.p])]);
        assert!(s1.is_subsumed_by(&s2));

        let others = [
            state(&[(v.p, vec![v.g])]),
            state(&[(v.q, vec![v.f])]),
            state(&[(v.p, vec![]), (v.s, vec![v.x])]),
            PointsToState::new(),
        ];
        for x in others.iter() {
            let left = merge(&s1, x, &v.program);
            let right = merge(&s2, x, &v.program);
            assert!(left.is_subsumed_by(&right));
            // merging never removes pointees
            assert!(s1.is_subsumed_by(&left));
            assert!(x.is_subsumed_by(&left));
        }
    }

    #[test]
    fn merge_resolves_aggregate_chains() {
        let v = values();
        // s -> x -> F on one path, s -> y -> G on the other
        let dest = state(&[(v.s, vec![v.x]), (v.x, vec![v.f])]);
        let src = state(&[(v.s, vec![v.y]), (v.y, vec![v.g])]);

        let merged = merge(&dest, &src, &v.program);

        let (address, root) = merged.resolve_chain(v.s, &v.program);
        assert_eq!(address, v.x);
        assert_eq!(root, [v.f, v.g].into_iter().collect::<PointsToSet>());
        assert_eq!(merged.get(v.s).unwrap(), &PointsToSet::singleton(v.x));
    }

    #[test]
    fn merged_slot_policy_unions_aggregates() {
        let v = values();
        let dest = state(&[(v.s, vec![v.x]), (v.x, vec![v.f])]);
        let src = state(&[(v.s, vec![v.y]), (v.y, vec![v.g])]);

        let mut merged = dest.clone();
        let mut diagnostics = Diagnostics::new();
        merged.merge(&src, &v.program, AggregatePolicy::MergedSlot, &mut diagnostics);

        assert_eq!(merged.get(v.s).unwrap(), &[v.x, v.y].into_iter().collect::<PointsToSet>());
        assert_eq!(merged.get(v.x).unwrap(), &PointsToSet::singleton(v.f));
    }

    #[test]
    fn ambiguous_aggregate_is_reported() {
        let v = values();
        let dest = state(&[(v.s, vec![v.x, v.y])]);
        let src = state(&[(v.s, vec![v.x])]);

        let mut merged = dest.clone();
        let mut diagnostics = Diagnostics::new();
        merged.merge(&src, &v.program, AggregatePolicy::ResolveChains, &mut diagnostics);

        assert_eq!(merged, dest);
        assert_eq!(diagnostics.count(WarningKind::AmbiguousAggregate), 1);
    }

    #[test]
    fn resolve_chain_stops_on_cycles() {
        let v = values();
        let cyclic = state(&[(v.x, vec![v.y]), (v.y, vec![v.x])]);

        let (address, pointees) = cyclic.resolve_chain(v.x, &v.program);
        assert_eq!(address, v.y);
        assert_eq!(pointees, PointsToSet::singleton(v.x));
    }
}
