use super::*;
use opal_ir::SexpKind;
use pretty_assertions::assert_eq;

fn read_one(source: &str) -> Sexp {
    match read(source) {
        Ok(mut forms) if forms.len() == 1 => forms.remove(0),
        other => panic!("expected one form, got {other:?}"),
    }
}

fn render(source: &str) -> String {
    read(source)
        .map(|forms| {
            forms
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_else(|e| format!("error: {e}"))
}

#[test]
fn test_reads_nested_lists() {
    assert_eq!(render("(print (+ 1 2))"), "(print (+ 1 2))");
    assert_eq!(render("(let x 1) (print x)"), "(let x 1) (print x)");
    assert_eq!(render("()"), "()");
}

#[test]
fn test_atoms_classified() {
    let form = read_one("(f 1 -2.5 +3 1e3 .5 - x1 1- inf nan)");
    let items = form.as_list().unwrap_or_default();
    let kinds: Vec<&str> = items
        .iter()
        .map(|s| match &s.kind {
            SexpKind::Number(_) => "num",
            SexpKind::Symbol(_) => "sym",
            SexpKind::Str(_) => "str",
            SexpKind::List(_) => "list",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["sym", "num", "num", "num", "num", "num", "sym", "sym", "sym", "sym", "sym"]
    );
}

#[test]
fn test_number_keeps_raw_text() {
    let form = read_one("1.50");
    assert_eq!(form.kind, SexpKind::Number("1.50".into()));
}

#[test]
fn test_string_escapes() {
    let form = read_one(r#""a\"b\\c\nd\te\r""#);
    assert_eq!(form.kind, SexpKind::Str("a\"b\\c\nd\te\r".into()));
}

#[test]
fn test_spans() {
    let form = read_one("  (print x)");
    assert_eq!(form.span, Span::new(2, 11));
    let items = form.as_list().unwrap_or_default();
    assert_eq!(items[1].span, Span::new(9, 10));
}

#[test]
fn test_comments_ignored() {
    assert_eq!(render("; nothing\n(print 1) ; done"), "(print 1)");
    assert_eq!(render("; only a comment"), "");
}

#[test]
fn test_unexpected_close_paren() {
    assert_eq!(
        read("(print 1))"),
        Err(ReadError::UnexpectedCloseParen {
            span: Span::new(9, 10)
        })
    );
}

#[test]
fn test_unclosed_paren_reports_opener() {
    assert_eq!(
        read("(print (+ 1 2)"),
        Err(ReadError::UnclosedParen {
            span: Span::new(0, 1)
        })
    );
}

#[test]
fn test_unterminated_string() {
    assert!(matches!(
        read("(print \"abc)"),
        Err(ReadError::UnterminatedString { .. })
    ));
}

#[test]
fn test_invalid_escape_span() {
    assert_eq!(
        read(r#"(print "a\qb")"#),
        Err(ReadError::InvalidEscape {
            escape: 'q',
            span: Span::new(9, 11)
        })
    );
}

#[test]
fn test_unrecognized_character() {
    assert_eq!(
        read("(print \u{1})"),
        Err(ReadError::UnrecognizedCharacter {
            ch: '\u{1}',
            span: Span::new(7, 8)
        })
    );
}

#[test]
fn test_nesting_limit() {
    let ok = format!("{}{}", "(".repeat(MAX_NESTING_DEPTH), ")".repeat(MAX_NESTING_DEPTH));
    assert!(read(&ok).is_ok());

    let deep = MAX_NESTING_DEPTH + 1;
    let too_deep = format!("{}{}", "(".repeat(deep), ")".repeat(deep));
    assert!(matches!(
        read(&too_deep),
        Err(ReadError::NestingTooDeep { limit: MAX_NESTING_DEPTH, .. })
    ));
}

#[test]
fn test_diagnostic_codes() {
    let err = read("(").err();
    let diag = err.map(|e| e.to_diagnostic());
    assert_eq!(diag.as_ref().map(|d| d.code.as_str()), Some("E0005"));
    assert_eq!(
        diag.and_then(|d| d.labels.iter().find(|l| l.is_primary).map(|l| l.span)),
        Some(Span::new(0, 1))
    );
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    /// Span-free view of a tree for structural comparison.
    fn shape(sexp: &Sexp) -> String {
        match &sexp.kind {
            SexpKind::Number(n) => format!("N{n}"),
            SexpKind::Str(s) => format!("S{s:?}"),
            SexpKind::Symbol(s) => format!("Y{s}"),
            SexpKind::List(items) => {
                let inner: Vec<String> = items.iter().map(shape).collect();
                format!("[{}]", inner.join(","))
            }
        }
    }

    fn arb_sexp() -> impl Strategy<Value = Sexp> {
        let leaf = prop_oneof![
            (0u32..10_000).prop_map(|n| Sexp::number(n.to_string(), Span::DUMMY)),
            "[a-z][a-z0-9_?!-]{0,6}".prop_map(|s| Sexp::symbol(s, Span::DUMMY)),
            "[ -~\n\t]{0,8}".prop_map(|s| Sexp::string(s, Span::DUMMY)),
        ];
        leaf.prop_recursive(4, 32, 5, |inner| {
            prop::collection::vec(inner, 0..5).prop_map(|items| Sexp::list(items, Span::DUMMY))
        })
    }

    proptest! {
        #[test]
        fn printed_forms_read_back(form in arb_sexp()) {
            let printed = form.to_string();
            let read_back = read(&printed);
            prop_assert!(read_back.is_ok(), "failed to read {printed}");
            let forms = read_back.unwrap_or_default();
            prop_assert_eq!(forms.len(), 1);
            prop_assert_eq!(shape(&forms[0]), shape(&form));
        }

        #[test]
        fn reader_never_panics(source in "[ -~\n]{0,64}") {
            let _ = read(&source);
        }
    }
}
