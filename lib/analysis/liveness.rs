use crate::analysis::fixed_point::{self, DataflowResult};
use crate::il;
use crate::Error;
use std::collections::BTreeSet;

/// Compute the SSA values live at the entry and exit of every block of the
/// given function.
pub fn liveness(
    program: &il::Program,
    function: il::ValueId,
) -> Result<DataflowResult<BTreeSet<il::ValueId>>, Error> {
    let function = program.function(function)?;
    let mut analysis = LivenessAnalysis { program };
    fixed_point::fixed_point_backward(&mut analysis, function, BTreeSet::new())
}

// We require a struct to implement methods for our analysis over.
struct LivenessAnalysis<'p> {
    program: &'p il::Program,
}

impl<'p> fixed_point::FixedPointAnalysis<BTreeSet<il::ValueId>> for LivenessAnalysis<'p> {
    fn trans(
        &mut self,
        location: &il::InstructionLocation,
        state: &mut BTreeSet<il::ValueId>,
    ) -> Result<(), Error> {
        let operation = location.instruction().operation();
        if let il::Operation::Debug = operation {
            return Ok(());
        }

        if let Some(value) = operation.value_written() {
            state.remove(&value);
        }

        for value in operation.values_read() {
            match self.program.value(value)?.kind() {
                il::ValueKind::Local | il::ValueKind::Argument => {
                    state.insert(value);
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn join(
        &mut self,
        state0: &mut BTreeSet<il::ValueId>,
        state1: &BTreeSet<il::ValueId>,
    ) -> Result<(), Error> {
        state0.extend(state1.iter().cloned());
        Ok(())
    }
}

#[test]
fn liveness_test() {
    /*
    head:
        p = alloca
        q = alloca
    left:
        store F -> p
    right:
        store G -> q
    tail:
        r = load p
        call r()
    */
    let mut program = il::Program::new();
    let f = program.new_function("F", il::TypeClass::NonPointer, &[]);
    let g = program.new_function("G", il::TypeClass::NonPointer, &[]);
    let main = program.new_function("main", il::TypeClass::NonPointer, &[]);
    let p = program.new_value("p", il::ValueKind::Local, il::TypeClass::ScalarPointer);
    let q = program.new_value("q", il::ValueKind::Local, il::TypeClass::ScalarPointer);
    let r = program.new_value("r", il::ValueKind::Local, il::TypeClass::ScalarPointer);

    {
        let cfg = program
            .function_mut(main)
            .unwrap()
            .control_flow_graph_mut();

        let head = {
            let block = cfg.new_block().unwrap();
            block.alloca(p);
            block.alloca(q);
            block.index()
        };
        let left = {
            let block = cfg.new_block().unwrap();
            block.store(f, p);
            block.index()
        };
        let right = {
            let block = cfg.new_block().unwrap();
            block.debug();
            block.store(g, q);
            block.index()
        };
        let tail = {
            let block = cfg.new_block().unwrap();
            block.load(r, p);
            block.call(None, r, Vec::new());
            block.ret(None);
            block.index()
        };

        cfg.unconditional_edge(head, left).unwrap();
        cfg.unconditional_edge(head, right).unwrap();
        cfg.unconditional_edge(left, tail).unwrap();
        cfg.unconditional_edge(right, tail).unwrap();
        cfg.set_entry(head).unwrap();
    }

    let live = liveness(&program, main).unwrap();

    let set = |values: &[il::ValueId]| values.iter().cloned().collect::<BTreeSet<il::ValueId>>();

    // r is defined and consumed inside tail
    assert_eq!(live.in_state(3).unwrap(), &set(&[p]));
    assert!(live.out_state(3).unwrap().is_empty());

    assert_eq!(live.in_state(1).unwrap(), &set(&[p]));
    assert_eq!(live.in_state(2).unwrap(), &set(&[p, q]));
    assert_eq!(live.out_state(0).unwrap(), &set(&[p, q]));

    // Nothing is live before the allocations
    assert!(live.in_state(0).unwrap().is_empty());
}
