//! Desugaring pass.
//!
//! Run between the reader and the compiler. Two rewrites:
//!
//! - variadic arithmetic nests to the right until every application is
//!   binary: `(+ 1 2 3 4)` becomes `(+ 1 (+ 2 (+ 3 4)))`
//! - string leaves are wrapped: `"hi"` becomes `(quote "hi")`
//!
//! An existing `(quote x)` is left untouched. The pass never fails.

use opal_ir::{Sexp, SexpKind, Span};
use opal_stack::ensure_sufficient_stack;

/// Operators whose n-ary applications are nested into binary ones.
pub const VARIADIC_OPERATORS: [&str; 4] = ["+", "-", "*", "/"];

#[tracing::instrument(level = "debug", skip_all, fields(forms = forms.len()))]
pub fn desugar(forms: Vec<Sexp>) -> Vec<Sexp> {
    forms.into_iter().map(desugar_form).collect()
}

pub fn desugar_form(form: Sexp) -> Sexp {
    match form.kind {
        SexpKind::Str(_) => quote(form),
        SexpKind::Number(_) | SexpKind::Symbol(_) => form,
        SexpKind::List(_) if is_quote_form(&form) => form,
        SexpKind::List(items) => ensure_sufficient_stack(|| {
            let items: Vec<Sexp> = items.into_iter().map(desugar_form).collect();
            nest_variadic(items, form.span)
        }),
    }
}

fn is_quote_form(form: &Sexp) -> bool {
    matches!(form.as_list(), Some([head, _]) if head.is_symbol("quote"))
}

fn quote(leaf: Sexp) -> Sexp {
    let span = leaf.span;
    Sexp::list(vec![Sexp::symbol("quote", span), leaf], span)
}

/// `(op a1 … an)`, n > 2, becomes `(op a1 (op a2 … an))` applied until binary.
fn nest_variadic(mut items: Vec<Sexp>, span: Span) -> Sexp {
    let is_variadic = items.len() > 3
        && items[0]
            .as_symbol()
            .is_some_and(|op| VARIADIC_OPERATORS.contains(&op));
    if !is_variadic {
        return Sexp::list(items, span);
    }

    let head = items.remove(0);
    let mut args = items.into_iter().rev();
    let (Some(last), Some(second_last)) = (args.next(), args.next()) else {
        return Sexp::list(vec![head], span);
    };

    let mut nested = binary(&head, second_last, last);
    for arg in args {
        nested = binary(&head, arg, nested);
    }
    Sexp { span, ..nested }
}

fn binary(head: &Sexp, lhs: Sexp, rhs: Sexp) -> Sexp {
    let span = lhs.span.merge(rhs.span);
    Sexp::list(vec![head.clone(), lhs, rhs], span)
}
