use super::*;
use crate::{buffer_handler, MachineBuilder};
use opal_compile::assemble;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn program(listing: &str) -> Program {
    match assemble(listing) {
        Ok(program) => program,
        Err(err) => panic!("bad listing: {err}"),
    }
}

/// Run a listing; returns printed output and the final stack.
fn run(listing: &str) -> (String, Result<RunOutcome, EvalError>) {
    let output = buffer_handler();
    let machine = MachineBuilder::new().print_handler(output.clone()).build();
    let result = machine.run(&program(listing));
    (output.get_output(), result)
}

fn run_ok(listing: &str) -> (String, Vec<Value>) {
    match run(listing) {
        (printed, Ok(outcome)) => (printed, outcome.stack),
        (_, Err(err)) => panic!("run failed: {err:?}"),
    }
}

fn run_err(listing: &str) -> EvalError {
    match run(listing) {
        (_, Err(err)) => err,
        (_, Ok(outcome)) => panic!("expected failure, got {:?}", outcome.stack),
    }
}

const SUB: &str = "
.fn sub p q :
    ident q var
    ident p var
    -
    return
.endfn
";

#[test]
fn test_literals_push_in_order() {
    let (_, stack) = run_ok("number 1.5 string hi bool true bool nope ident x");
    assert_eq!(
        stack,
        vec![
            Value::Number(1.5),
            Value::text("hi"),
            Value::Boolean(true),
            Value::Boolean(false),
            Value::name("x"),
        ]
    );
}

#[test]
fn test_binary_pops_left_first() {
    // L is the top of the stack.
    let (_, stack) = run_ok("number 3 number 10 - number 2 number 8 /");
    assert_eq!(stack, vec![Value::Number(7.0), Value::Number(4.0)]);
}

#[test]
fn test_comparison_order() {
    let (_, stack) = run_ok("number 1 number 5 > number 1 number 5 <=");
    assert_eq!(stack, vec![Value::Boolean(true), Value::Boolean(false)]);
}

#[test]
fn test_let_then_var() {
    let (printed, stack) =
        run_ok("number 5 ident x let number 1 ident x var + print ident x var");
    assert_eq!(printed, "6\n");
    assert_eq!(stack, vec![Value::Number(5.0)]);
}

#[test]
fn test_let_overwrites() {
    let (printed, _) = run_ok("number 1 ident x let number 2 ident x let ident x var print");
    assert_eq!(printed, "2\n");
}

#[test]
fn test_take_then_branch() {
    let (printed, stack) =
        run_ok("bool true if string A print else string B print end number 1");
    assert_eq!(printed, "A\n");
    assert_eq!(stack, vec![Value::Number(1.0)]);
}

#[test]
fn test_take_else_branch() {
    let (printed, stack) =
        run_ok("bool false if string A print else string B print end number 1");
    assert_eq!(printed, "B\n");
    assert_eq!(stack, vec![Value::Number(1.0)]);
}

#[test]
fn test_false_without_else() {
    let (printed, _) = run_ok("bool false if string A print end string C print");
    assert_eq!(printed, "C\n");
}

#[test]
fn test_nested_if_in_skipped_branch() {
    let listing = "
        bool false if
            bool true if string inner print else string other print end
            string A print
        else
            bool false if string X print else string Y print end
            string B print
        end
        string done print
    ";
    let (printed, _) = run_ok(listing);
    assert_eq!(printed, "Y\nB\ndone\n");
}

#[test]
fn test_operand_spelled_like_marker() {
    let (printed, _) = run_ok("bool false if string end print else string else print end");
    assert_eq!(printed, "else\n");
}

#[test]
fn test_call_binds_first_param_from_top() {
    let listing = format!("{SUB} number 3 number 10 ident sub call print");
    let (printed, stack) = run_ok(&listing);
    assert_eq!(printed, "7\n");
    assert!(stack.is_empty());
}

#[test]
fn test_callee_let_does_not_leak() {
    let listing = "
        .fn shadow :
            number 99 ident x let
            ident x var print
        .endfn
        number 1 ident x let
        ident shadow call
        ident x var print
    ";
    let (printed, stack) = run_ok(listing);
    assert_eq!(printed, "99\n1\n");
    assert!(stack.is_empty());
}

#[test]
fn test_callee_sees_caller_bindings() {
    let listing = "
        .fn peek : ident x var return .endfn
        number 4 ident x let ident peek call print
    ";
    assert_eq!(run_ok(listing).0, "4\n");
}

#[test]
fn test_fall_off_end_pushes_nothing() {
    let listing = "
        .fn noop : number 1 print .endfn
        number 7 ident noop call
    ";
    let (printed, stack) = run_ok(listing);
    assert_eq!(printed, "1\n");
    assert_eq!(stack, vec![Value::Number(7.0)]);
}

#[test]
fn test_empty_streams_finish_cleanly() {
    let (printed, stack) = run_ok("");
    assert_eq!(printed, "");
    assert!(stack.is_empty());

    let (_, stack) = run_ok(".fn nothing : .endfn number 2 ident nothing call ident nothing call");
    assert_eq!(stack, vec![Value::Number(2.0)]);
}

#[test]
fn test_return_unwinds_callee_blocks_only() {
    let listing = "
        .fn pick n :
            number 0 ident n var >
            if
                bool true if string pos return end
            end
            string neg return
        .endfn
        number 100
        bool true if
            number 5 ident pick call print
        end
        string after print
    ";
    let (printed, stack) = run_ok(listing);
    assert_eq!(printed, "pos\nafter\n");
    assert_eq!(stack, vec![Value::Number(100.0)]);
}

#[test]
fn test_return_pushes_exactly_one() {
    let listing = "
        .fn one : number 1 number 2 number 3 return .endfn
        number 0 ident one call
    ";
    let (_, stack) = run_ok(listing);
    assert_eq!(
        stack,
        vec![Value::Number(0.0), Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]
    );
}

#[test]
fn test_recursion() {
    let listing = "
        .fn fact n :
            number 2 ident n var <
            if
                number 1 return
            end
            number 1 ident n var - ident fact call
            ident n var *
            return
        .endfn
        number 10 ident fact call print
    ";
    assert_eq!(run_ok(listing).0, "3628800\n");
}

#[test]
fn test_counters() {
    let listing = format!("{SUB} number 3 number 10 ident sub call bool false if print end");
    let Ok(outcome) = run(&listing).1 else {
        panic!("run failed");
    };
    assert_eq!(
        outcome.counters,
        EvalCounters {
            instructions: 12,
            calls: 1,
            returns: 1,
            skipped_tokens: 2,
            max_call_depth: 1,
        }
    );
}

#[test]
fn test_unknown_opcode() {
    let err = run_err("number 1 print frobnicate number 2 print");
    assert_eq!(err.kind, EvalErrorKind::UnknownOpcode { tag: "frobnicate".into() });
    assert_eq!(err.position, 3);
    assert_eq!(err.opcode.as_deref(), Some("frobnicate"));
}

#[test]
fn test_unknown_opcode_inside_skipped_branch() {
    let err = run_err("bool false if number 1 frobnicate print end");
    assert_eq!(err.kind, EvalErrorKind::UnknownOpcode { tag: "frobnicate".into() });
    assert_eq!(err.position, 5);
}

#[test]
fn test_stack_underflow() {
    let err = run_err("number 1 +");
    assert_eq!(err.kind, EvalErrorKind::StackUnderflow);
    assert_eq!(err.opcode.as_deref(), Some("+"));
    assert_eq!(err.position, 2);
}

#[test]
fn test_stream_underflow_on_missing_operand() {
    assert_eq!(run_err("number").kind, EvalErrorKind::StreamUnderflow);
    assert_eq!(run_err("bool false if print").kind, EvalErrorKind::StreamUnderflow);
}

#[test]
fn test_unbound_name() {
    let err = run_err("ident ghost var");
    assert_eq!(err.kind, EvalErrorKind::UnboundName { name: "ghost".into() });
}

#[test]
fn test_undefined_function() {
    let err = run_err("ident nothing call");
    assert_eq!(err.kind, EvalErrorKind::UndefinedFunction { name: "nothing".into() });
}

#[test]
fn test_return_outside_call() {
    assert_eq!(run_err("number 1 return").kind, EvalErrorKind::ReturnOutsideCall);
}

#[test]
fn test_type_mismatches() {
    let cases = [
        ("number 1 if end", "if"),
        ("number 1 var", "var"),
        ("number 1 number 2 let", "let"),
        ("ident x print", "print"),
        ("bool true number 1 +", "+"),
        ("number 1 call", "call"),
    ];
    for (listing, operation) in cases {
        match run_err(listing).kind {
            EvalErrorKind::TypeMismatch { operation: op, .. } => assert_eq!(op, operation),
            other => panic!("{listing}: unexpected {other:?}"),
        }
    }
}

#[test]
fn test_malformed_number() {
    let err = run_err("number 1x");
    assert_eq!(
        err.kind,
        EvalErrorKind::MalformedLiteral { tag: "number", text: "1x".into() }
    );
}

#[test]
fn test_stray_markers() {
    assert!(matches!(run_err("end").kind, EvalErrorKind::StructuralError { .. }));
    assert!(matches!(run_err("else").kind, EvalErrorKind::StructuralError { .. }));
    // An else-block cannot be closed by another else.
    let err = run_err("bool false if else else end");
    assert!(matches!(err.kind, EvalErrorKind::StructuralError { .. }));
    // The second else is found while skipping the taken then-block's tail.
    let err = run_err("bool true if else else end");
    assert!(matches!(err.kind, EvalErrorKind::StructuralError { .. }));
}

#[test]
fn test_unclosed_block() {
    let err = run_err("bool true if number 1");
    assert_eq!(
        err.kind,
        EvalErrorKind::DepthInvariantViolated { open_blocks: 1, open_calls: 0 }
    );
    let err = run_err(".fn f : bool true if .endfn ident f call");
    assert_eq!(
        err.kind,
        EvalErrorKind::DepthInvariantViolated { open_blocks: 1, open_calls: 1 }
    );
}

#[test]
fn test_recursion_limit() {
    let output = buffer_handler();
    let machine = MachineBuilder::new()
        .max_call_depth(50)
        .print_handler(output)
        .build();
    let forever = program(".fn loop : ident loop call .endfn ident loop call");
    let Err(err) = machine.run(&forever) else {
        panic!("unbounded recursion must fail");
    };
    assert_eq!(err.kind, EvalErrorKind::RecursionLimitExceeded { limit: 50 });
    assert_eq!(err.backtrace.len(), 50);
    assert_eq!(err.backtrace.frames()[0].name, "loop");
}

#[test]
fn test_deep_recursion_within_default_limit() {
    let listing = "
        .fn down n :
            ident n var number 0 ==
            if number 0 return end
            number 1 ident n var - ident down call
            return
        .endfn
        number 5000 ident down call
    ";
    assert_eq!(run_ok(listing).1, vec![Value::Number(0.0)]);
}

#[test]
fn test_error_backtrace_most_recent_first() {
    let listing = "
        .fn inner : ident missing var .endfn
        .fn outer : ident inner call .endfn
        ident outer call
    ";
    let err = run_err(listing);
    let names: Vec<&str> = err.backtrace.frames().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer"]);
}

#[test]
fn test_runs_are_independent() {
    let output = buffer_handler();
    let machine = MachineBuilder::new().print_handler(output.clone()).build();
    let first = program("number 1 ident x let");
    let second = program("ident x var");
    assert!(machine.run(&first).is_ok());
    assert!(machine.run(&second).is_err());
}

proptest! {
    /// Taking either branch leaves the cursor past the matching `end`.
    #[test]
    fn prop_branches_converge(cond in any::<bool>(), depth in 0usize..6) {
        let mut nested = String::from("string t print");
        for _ in 0..depth {
            nested = format!("bool {cond} if {nested} else {nested} end");
        }
        let listing = format!(
            "bool {cond} if {nested} else string f print {nested} end number 42"
        );
        let (printed, stack) = run_ok(&listing);
        prop_assert_eq!(stack, vec![Value::Number(42.0)]);
        let expected = if cond { "t\n" } else { "f\nt\n" };
        prop_assert_eq!(printed, expected);
    }

    #[test]
    fn prop_subtraction_order(a in -1000i32..1000, b in -1000i32..1000) {
        let listing = format!("{SUB} number {b} number {a} ident sub call");
        let (_, stack) = run_ok(&listing);
        prop_assert_eq!(stack, vec![Value::Number(f64::from(a) - f64::from(b))]);
    }
}

#[test]
fn test_counters_report() {
    let counters = EvalCounters {
        instructions: 9,
        calls: 2,
        returns: 1,
        skipped_tokens: 4,
        max_call_depth: 2,
    };
    let report = counters.report();
    assert!(report.starts_with("Evaluation profile:\n"));
    assert!(report.contains("Instructions executed: 9\n"));
    assert!(report.ends_with("Deepest call stack:    2"));
}
