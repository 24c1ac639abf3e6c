use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_codes() {
    assert_eq!(EvalErrorKind::StreamUnderflow.code(), ErrorCode::E6001);
    assert_eq!(EvalErrorKind::ReturnOutsideCall.code(), ErrorCode::E6005);
    assert_eq!(
        EvalErrorKind::DepthInvariantViolated {
            open_blocks: 1,
            open_calls: 0
        }
        .code(),
        ErrorCode::E9001
    );
}

#[test]
fn test_builder_ignores_dummy_span() {
    let err = EvalError::new(EvalErrorKind::StackUnderflow, 3)
        .with_opcode("print")
        .with_span(Span::DUMMY);
    assert_eq!(err.span, None);
    assert_eq!(err.opcode.as_deref(), Some("print"));
    assert_eq!(err.to_string(), "evaluation stack is empty");
}

#[test]
fn test_diagnostic_with_span_and_backtrace() {
    let err = EvalError::new(
        EvalErrorKind::UnboundName { name: "y".into() },
        2,
    )
    .with_opcode("var")
    .with_span(Span::new(10, 11))
    .with_backtrace(EvalBacktrace::new(vec![BacktraceFrame {
        name: "f".into(),
        call_span: Span::new(20, 25),
    }]));

    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E6003);
    assert_eq!(diag.message, "unbound variable `y`");
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.labels[0].message, "while executing `var` (token 2)");
    assert!(!diag.labels[1].is_primary);
}

#[test]
fn test_diagnostic_without_span_uses_note() {
    let err = EvalError::new(EvalErrorKind::StreamUnderflow, 7);
    let diag = err.to_diagnostic();
    assert!(diag.labels.is_empty());
    assert_eq!(diag.notes, vec!["at token 7".to_string()]);
}

#[test]
fn test_backtrace_display() {
    let backtrace = EvalBacktrace::new(vec![
        BacktraceFrame {
            name: "inner".into(),
            call_span: Span::new(5, 9),
        },
        BacktraceFrame {
            name: "outer".into(),
            call_span: Span::new(1, 3),
        },
    ]);
    assert_eq!(
        backtrace.to_string(),
        "call backtrace:\n  0: inner called at 5..9\n  1: outer called at 1..3\n"
    );
    assert_eq!(EvalBacktrace::default().to_string(), "");
}
