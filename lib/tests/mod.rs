use crate::analysis::points_to::{points_to, Options, PointsToResult};
use crate::il::{self, Program, TypeClass, ValueId, ValueKind};


/// Give `function` a body of a single block, filled in by `build`.
fn single_block<F>(program: &mut Program, function: ValueId, build: F)
where
    F: FnOnce(&mut il::Block),
{
    let cfg = program
        .function_mut(function)
        .unwrap()
        .control_flow_graph_mut();
    let block = cfg.new_block().unwrap();
    let index = block.index();
    build(block);
    cfg.set_entry(index).unwrap();
}

/// A function whose body only returns.
fn leaf(program: &mut Program, name: &str) -> ValueId {
    let function = program.new_function(name, TypeClass::NonPointer, &[]);
    single_block(program, function, |block| {
        block.ret(None);
    });
    function
}

fn pointer(program: &mut Program, name: &str) -> ValueId {
    program.new_value(name, ValueKind::Local, TypeClass::ScalarPointer)
}

fn aggregate(program: &mut Program, name: &str) -> ValueId {
    program.new_value(name, ValueKind::Local, TypeClass::AggregatePointer)
}

/// The candidate names recorded for the call at `line`.
fn callees(result: &PointsToResult, line: u32) -> Vec<String> {
    result
        .call_sites()
        .line(line)
        .map(|names| names.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn direct_call() {
    let mut program = Program::new();
    let f = leaf(&mut program, "F");
    let main = program.new_function("main", TypeClass::NonPointer, &[]);
    single_block(&mut program, main, |block| {
        block.call(None, f, Vec::new()).set_line(Some(3));
        block.ret(None);
    });

    let result = points_to(&program, main, &Options::default()).unwrap();
    assert_eq!(callees(&result, 3), vec!["F"]);
    assert!(result.diagnostics().is_empty());
}

#[test]
fn entry_must_be_a_function() {
    let mut program = Program::new();
    let p = pointer(&mut program, "p");
    assert!(points_to(&program, p, &Options::default()).is_err());
}

#[test]
fn entry_must_have_a_body() {
    let mut program = Program::new();
    let main = program.new_function("main", TypeClass::NonPointer, &[]);
    assert!(points_to(&program, main, &Options::default()).is_err());
}

#[test]
fn display_names_values() {
    let mut program = Program::new();
    let f = leaf(&mut program, "F");
    let main = program.new_function("main", TypeClass::NonPointer, &[]);
    let p = pointer(&mut program, "p");
    single_block(&mut program, main, |block| {
        block.alloca(p);
        block.store(f, p);
        block.call(None, p, Vec::new()).set_line(Some(7));
        block.ret(None);
    });

    let result = points_to(&program, main, &Options::default()).unwrap();
    let text = result.to_string();
    assert!(text.contains("[ Block: 0x0 ]"));
    assert!(text.contains("p -> {F}"));
    assert!(text.contains("7 : F"));
}

#[test]
fn json_dump() {
    let mut program = Program::new();
    let f = leaf(&mut program, "F");
    let main = program.new_function("main", TypeClass::NonPointer, &[]);
    let p = pointer(&mut program, "p");
    single_block(&mut program, main, |block| {
        block.alloca(p);
        block.store(f, p);
        block.call(None, p, Vec::new()).set_line(Some(9));
        block.ret(None);
    });

    let result = points_to(&program, main, &Options::default()).unwrap();
    let dump: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(dump["function"], "main");
    assert_eq!(dump["call_sites"][0]["line"], 9);
    assert_eq!(dump["call_sites"][0]["callees"][0], "F");
    assert_eq!(dump["blocks"][0]["out"][0]["pointer"], "p");
    assert_eq!(dump["blocks"][0]["out"][0]["pointees"][0], "F");
}
