use super::*;
use opal_eval::{buffer_handler, MachineBuilder, Value};
use pretty_assertions::assert_eq;

#[test]
fn test_compile_source() {
    let Ok(program) = compile_source("(fn f (x) (return x)) (print (f 1))") else {
        panic!("program should compile");
    };
    assert!(program.functions.contains("f"));
    assert!(!program.main.is_empty());
}

#[test]
fn test_errors_keep_their_phase() {
    assert!(matches!(compile_source("(print"), Err(PipelineError::Read(_))));
    assert!(matches!(compile_source("()"), Err(PipelineError::Compile(_))));
    assert!(matches!(assemble_source(".fn f"), Err(PipelineError::Assemble(_))));
    assert!(matches!(assemble_source("bool true if"), Err(PipelineError::Verify(_))));
}

#[test]
fn test_codes_by_phase() {
    let code = |result: Result<Program, PipelineError>| result.err().map(|e| e.code());
    assert_eq!(code(compile_source("(print")), Some(ErrorCode::E0005));
    assert_eq!(code(compile_source("(let 1 2)")), Some(ErrorCode::E1003));
    assert_eq!(code(assemble_source("end")), Some(ErrorCode::E2003));
}

#[test]
fn test_run_program_reports_eval_errors() {
    let machine = MachineBuilder::new().print_handler(buffer_handler()).build();
    let Ok(program) = compile_source("(print y)") else {
        panic!("program should compile");
    };
    let err = run_program(&machine, &program).err();
    assert_eq!(err.map(|e| e.code()), Some(ErrorCode::E6003));
}

#[test]
fn test_assembled_and_compiled_agree() {
    let output = buffer_handler();
    let machine = MachineBuilder::new().print_handler(output.clone()).build();
    let listing = "number 2 number 40 + print number 1";
    let (Ok(compiled), Ok(assembled)) =
        (compile_source("(print (+ 40 2)) 1"), assemble_source(listing))
    else {
        panic!("both inputs should build");
    };
    let a = run_program(&machine, &compiled).map(|o| o.stack);
    let b = run_program(&machine, &assembled).map(|o| o.stack);
    assert_eq!(a, Ok(vec![Value::Number(1.0)]));
    assert_eq!(a, b);
    assert_eq!(output.get_output(), "42\n42\n");
}

/// Log sink for reading back what the pipeline traced.
#[derive(Clone, Default)]
struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut bytes) = self.0.lock() {
            bytes.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        self.0
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

#[test]
fn test_phases_are_traced() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let Ok(program) = compile_source("(print 1)") else {
            panic!("program should compile");
        };
        let machine = MachineBuilder::new().print_handler(buffer_handler()).build();
        assert!(run_program(&machine, &program).is_ok());
    });

    let log = captured.text();
    assert!(log.contains("compiled"), "{log}");
    assert!(log.contains("main_tokens=3"), "{log}");
    assert!(log.contains("program finished"), "{log}");
    assert!(log.contains("instructions=2"), "{log}");
}
