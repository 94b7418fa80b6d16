use std::rc::Rc;

use crate::context::ParseContext;
use crate::expr::{attempt_body, is_composite, Expr};
use crate::tree::{NonTerminal, ParseTree};

/// Zero-sized control-flow marker for a failed match attempt. The actual
/// failure information (expected label, position) lives in
/// `ParseContext::best_error`, not in this value - see spec.md §4.2's
/// furthest-failure tracking.
pub(crate) struct Signal;

pub(crate) type StepResult = Result<Vec<ParseTree>, Signal>;

/// Drive a single expression node through the uniform attempt protocol of
/// spec.md §4.2: skip whitespace, record the start position, consult the
/// memo table, delegate to the node's variant-specific body, then wrap a
/// successful rule-root result or relabel a propagating failure.
pub(crate) fn run(expr: &Rc<Expr>, ctx: &mut ParseContext) -> StepResult {
    if !ctx.in_comment_parse {
        ctx.skip_ws();
    }
    let c_pos = ctx.position;

    if let Some((children, end_pos)) = ctx.memo.get(&(expr.id, c_pos)) {
        let children = children.clone();
        ctx.position = *end_pos;
        return Ok(children);
    }

    ctx.mark_descending();

    match attempt_body(expr, ctx, c_pos) {
        Ok(children) => {
            let wrapped = wrap_on_success(expr, c_pos, children, ctx.reduce_tree);
            ctx.memo.insert((expr.id, c_pos), (wrapped.clone(), ctx.position));
            Ok(wrapped)
        }
        Err(signal) => {
            if expr.is_root.get() {
                if let Some(name) = expr.rule_name.get() {
                    ctx.relabel_if_propagating(name, c_pos);
                }
            }
            Err(signal)
        }
    }
}

/// §4.2 step 6: a rule-root composite expression that produced a non-empty
/// list of children is wrapped as a single `NonTerminal`. With `reduce_tree`
/// on, a singleton child list collapses into that one child instead of being
/// wrapped again. Terminal kinds tag themselves directly in `attempt_body`
/// and are left untouched here (see `ExprKind::is_composite`).
fn wrap_on_success(
    expr: &Rc<Expr>,
    c_pos: usize,
    children: Vec<ParseTree>,
    reduce_tree: bool,
) -> Vec<ParseTree> {
    if children.is_empty() || !expr.is_root.get() || !is_composite(expr) {
        return children;
    }
    let rule_name = match expr.rule_name.get() {
        Some(name) => name,
        None => return children,
    };
    if reduce_tree && children.len() == 1 {
        children
    } else {
        vec![ParseTree::NonTerminal(NonTerminal {
            ty: rule_name,
            position: c_pos,
            children,
            comments: None,
        })]
    }
}

/// §4.4: when a terminal match fails outside of comment parsing, repeatedly
/// try the comment grammar at the current position (skipping whitespace
/// between occurrences) until it stops matching. Returns the collected
/// comment nodes wrapped as a `NonTerminal("comment", ...)`, or `None` if no
/// comment grammar is configured or none matched.
pub(crate) fn try_consume_comments(ctx: &mut ParseContext, c_pos: usize) -> Option<NonTerminal> {
    let comments_model = ctx.comments_model.clone()?;

    ctx.in_comment_parse = true;
    let mut collected = Vec::new();
    loop {
        ctx.skip_ws();
        match run(&comments_model, ctx) {
            Ok(mut nodes) => collected.append(&mut nodes),
            Err(_) => break,
        }
    }
    ctx.in_comment_parse = false;

    if collected.is_empty() {
        None
    } else {
        Some(NonTerminal {
            ty: "comment",
            position: c_pos,
            children: collected,
            comments: None,
        })
    }
}
