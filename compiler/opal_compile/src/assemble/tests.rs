use super::*;
use pretty_assertions::assert_eq;

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(Token::as_str).collect()
}

fn assembled(source: &str) -> Program {
    match assemble(source) {
        Ok(program) => program,
        Err(e) => panic!("assemble failed: {e}"),
    }
}

#[test]
fn test_plain_listing() {
    let program = assembled("number 3\nnumber 10 -\nprint # show it\n");
    assert_eq!(
        texts(&program.main),
        vec!["number", "3", "number", "10", "-", "print"]
    );
    assert!(program.functions.is_empty());
}

#[test]
fn test_word_spans() {
    let program = assembled("  number 42");
    assert_eq!(program.main[0].span, Span::new(2, 8));
    assert_eq!(program.main[1].span, Span::new(9, 11));
}

#[test]
fn test_quoted_words() {
    let program = assembled(r#"string "hello world" string "say \"hi\"\n" string "" string ".fn""#);
    assert_eq!(
        texts(&program.main),
        vec!["string", "hello world", "string", "say \"hi\"\n", "string", "", "string", ".fn"]
    );
}

#[test]
fn test_function_block() {
    let program = assembled(
        ".fn sub p q :\n  ident q var ident p var - return\n.endfn\nnumber 3 number 10 ident sub call print",
    );
    let sub = program.functions.get("sub");
    assert_eq!(
        sub.map(|f| f.params.to_vec()),
        Some(vec!["p".to_string(), "q".to_string()])
    );
    assert_eq!(
        sub.map(|f| texts(&f.body).join(" ")),
        Some("ident q var ident p var - return".to_string())
    );
    assert_eq!(
        texts(&program.main),
        vec!["number", "3", "number", "10", "ident", "sub", "call", "print"]
    );
}

#[test]
fn test_function_without_params() {
    let program = assembled(".fn one : number 1 return .endfn");
    assert_eq!(program.functions.get("one").map(FunctionDef::arity), Some(0));
}

#[test]
fn test_unknown_tags_are_kept() {
    let program = assembled("number 1 frobnicate print");
    assert_eq!(texts(&program.main), vec!["number", "1", "frobnicate", "print"]);
}

#[test]
fn test_errors() {
    assert!(matches!(
        assemble(r#"string "open"#),
        Err(AssembleError::UnterminatedQuote { span }) if span == Span::new(7, 12)
    ));
    assert!(matches!(
        assemble(r#"string "a\qb""#),
        Err(AssembleError::InvalidEscape { escape: 'q', .. })
    ));
    assert!(matches!(
        assemble(".fn f : number 1"),
        Err(AssembleError::MalformedFunction { reason: "missing `.endfn`", .. })
    ));
    assert!(matches!(
        assemble(".fn f : .fn g : .endfn .endfn"),
        Err(AssembleError::MalformedFunction { reason: "function blocks cannot nest", .. })
    ));
    assert!(matches!(
        assemble("print .endfn"),
        Err(AssembleError::MalformedFunction { .. })
    ));
    assert!(matches!(
        assemble(".fn"),
        Err(AssembleError::MalformedFunction { .. })
    ));
    assert!(matches!(
        assemble(".fn f : .endfn .fn f : .endfn"),
        Err(AssembleError::DuplicateFunction { .. })
    ));
}

#[test]
fn test_disassemble_format() {
    let program = assembled(".fn neg x : ident x var number 0 - return .endfn string \"a b\" print");
    assert_eq!(
        disassemble(&program),
        "\
.fn neg x :
    ident x
    var
    number 0
    -
    return
.endfn

string \"a b\"
print
"
    );
}

#[test]
fn test_disassembled_compiler_output_reassembles() {
    let source = r#"
        (fn fact (n) (if (<= n 1) (return 1) (return (* n (fact (- n 1))))))
        (let greeting "hello, world")
        (print greeting)
        (print (fact 5))
    "#;
    let forms = opal_reader::read_program(source).unwrap_or_default();
    let program = crate::compile(&forms).unwrap_or_default();
    let again = assembled(&disassemble(&program));

    assert_eq!(texts(&again.main), texts(&program.main));
    let fact = |p: &Program| p.functions.get("fact").map(|f| f.body.to_vec());
    assert_eq!(
        fact(&again).map(|body| texts(&body).join(" ")),
        fact(&program).map(|body| texts(&body).join(" "))
    );
}

#[test]
fn test_error_codes() {
    let code = |src: &str| assemble(src).err().map(|e| e.to_diagnostic().code);
    assert_eq!(code("\"x"), Some(ErrorCode::E2006));
    assert_eq!(code(".endfn"), Some(ErrorCode::E2005));
    assert_eq!(code(".fn f : .endfn .fn f : .endfn"), Some(ErrorCode::E1007));
}
