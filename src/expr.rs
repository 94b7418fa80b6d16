use std::cell::{Cell, RefCell};
use std::rc::Rc;

use regex::Regex;

use crate::context::ParseContext;
use crate::engine::{run, Signal, StepResult};
use crate::error::GrammarError;
use crate::log::Log;
use crate::tree::{ParseTree, Terminal};

/// One node of the expression graph (spec.md §3 "Expression node").
///
/// `rule_name`/`is_root` are set once a node is determined to be the direct
/// body of a named rule (see `GrammarBuilder::stamp_root` in `builder.rs`);
/// they use `Cell` rather than being fixed at construction because the
/// grammar builder may only learn a node is a rule root after building it.
pub struct Expr {
    pub(crate) id: usize,
    pub(crate) rule_name: Cell<Option<&'static str>>,
    pub(crate) is_root: Cell<bool>,
    pub(crate) debugger: Cell<Log<&'static str>>,
    pub(crate) kind: ExprKind,
}

pub(crate) enum ExprKind {
    Sequence(RefCell<Vec<Rc<Expr>>>),
    OrderedChoice(RefCell<Vec<Rc<Expr>>>),
    Optional(RefCell<Vec<Rc<Expr>>>),
    ZeroOrMore(RefCell<Vec<Rc<Expr>>>),
    OneOrMore(RefCell<Vec<Rc<Expr>>>),
    And(RefCell<Vec<Rc<Expr>>>),
    Not(RefCell<Vec<Rc<Expr>>>),
    StrMatch(String),
    Keyword(String),
    RegexMatch(Regex),
    EndOfFile,
    /// Forward-reference placeholder used only while the grammar builder is
    /// resolving recursive rules (spec.md §4.3 / §9). Never reached once a
    /// `Parser` has been built - `GrammarBuilder::build` rejects any grammar
    /// that leaves one unresolved.
    CrossRef(&'static str),
}

impl ExprKind {
    /// Composite kinds produce a *list* of children that the engine wraps
    /// into a `NonTerminal` when the node is a rule root (§4.2 step 6).
    /// Terminal kinds tag themselves directly and are never wrapped again.
    fn is_composite(&self) -> bool {
        !matches!(
            self,
            ExprKind::StrMatch(_) | ExprKind::Keyword(_) | ExprKind::RegexMatch(_) | ExprKind::EndOfFile
        )
    }
}

impl Expr {
    fn leaf(id: usize, kind: ExprKind) -> Rc<Self> {
        Rc::new(Self {
            id,
            rule_name: Cell::new(None),
            is_root: Cell::new(false),
            debugger: Cell::new(Log::None),
            kind,
        })
    }

    pub(crate) fn sequence(id: usize, children: Vec<Rc<Expr>>) -> Rc<Self> {
        Self::leaf(id, ExprKind::Sequence(RefCell::new(children)))
    }
    pub(crate) fn ordered_choice(id: usize, children: Vec<Rc<Expr>>) -> Rc<Self> {
        Self::leaf(id, ExprKind::OrderedChoice(RefCell::new(children)))
    }
    pub(crate) fn optional(id: usize, child: Rc<Expr>) -> Rc<Self> {
        Self::leaf(id, ExprKind::Optional(RefCell::new(vec![child])))
    }
    pub(crate) fn zero_or_more(id: usize, child: Rc<Expr>) -> Rc<Self> {
        Self::leaf(id, ExprKind::ZeroOrMore(RefCell::new(vec![child])))
    }
    pub(crate) fn one_or_more(id: usize, child: Rc<Expr>) -> Rc<Self> {
        Self::leaf(id, ExprKind::OneOrMore(RefCell::new(vec![child])))
    }
    pub(crate) fn and_predicate(id: usize, child: Rc<Expr>) -> Rc<Self> {
        Self::leaf(id, ExprKind::And(RefCell::new(vec![child])))
    }
    pub(crate) fn not_predicate(id: usize, child: Rc<Expr>) -> Rc<Self> {
        Self::leaf(id, ExprKind::Not(RefCell::new(vec![child])))
    }
    pub(crate) fn str_match(id: usize, literal: &str) -> Rc<Self> {
        Self::leaf(id, ExprKind::StrMatch(literal.to_string()))
    }
    pub(crate) fn regex_match(id: usize, pattern: &str) -> Result<Rc<Self>, GrammarError> {
        let regexp = Regex::new(pattern)
            .map_err(|err| GrammarError::new(format!("invalid regex /{}/: {}", pattern, err)))?;
        Ok(Self::leaf(id, ExprKind::RegexMatch(regexp)))
    }
    pub(crate) fn end_of_file(id: usize) -> Rc<Self> {
        Self::leaf(id, ExprKind::EndOfFile)
    }
    /// A keyword always tags itself `"keyword"` and is always a rule root,
    /// regardless of where in the grammar it is used (spec.md §3, §9 open
    /// question - we preserve the source behavior).
    pub(crate) fn keyword(id: usize, literal: &str) -> Rc<Self> {
        let expr = Self::leaf(id, ExprKind::Keyword(literal.to_string()));
        expr.rule_name.set(Some("keyword"));
        expr.is_root.set(true);
        expr
    }
    pub(crate) fn cross_ref(id: usize, rule_name: &'static str) -> Rc<Self> {
        Self::leaf(id, ExprKind::CrossRef(rule_name))
    }

    /// Stamp this node as the direct body of a named rule. Unconditional, by
    /// design: mirrors the reference builder overwriting whatever the rule's
    /// body resolved to, including a `Keyword` node's own self-assigned
    /// `"keyword"` tag if it is used directly as a rule body.
    pub(crate) fn stamp_root(&self, rule_name: &'static str) {
        self.rule_name.set(Some(rule_name));
        self.is_root.set(true);
    }

    pub(crate) fn set_log(&self, debugger: Log<&'static str>) {
        self.debugger.set(debugger);
    }

    fn raw_terminal_match(&self, ctx: &ParseContext) -> Option<(usize, String)> {
        match &self.kind {
            ExprKind::StrMatch(lit) | ExprKind::Keyword(lit) => {
                if ctx.input[ctx.position..].starts_with(lit.as_str()) {
                    Some((ctx.position + lit.len(), lit.clone()))
                } else {
                    None
                }
            }
            ExprKind::RegexMatch(re) => re.find(&ctx.input[ctx.position..]).and_then(|m| {
                if m.start() == 0 {
                    Some((ctx.position + m.end(), m.as_str().to_string()))
                } else {
                    None
                }
            }),
            ExprKind::EndOfFile => {
                if ctx.position == ctx.input.len() {
                    Some((ctx.position, "EOF".to_string()))
                } else {
                    None
                }
            }
            _ => unreachable!("raw_terminal_match called on a non-terminal expression"),
        }
    }

    fn expected_label(&self) -> String {
        match &self.kind {
            ExprKind::StrMatch(lit) | ExprKind::Keyword(lit) => lit.clone(),
            ExprKind::RegexMatch(re) => format!("/{}/", re.as_str()),
            ExprKind::EndOfFile => "EOF".to_string(),
            _ => unreachable!("expected_label called on a non-terminal expression"),
        }
    }

    fn tag(&self) -> &'static str {
        if self.is_root.get() {
            self.rule_name.get().unwrap_or("")
        } else {
            ""
        }
    }
}

/// Variant bodies of §4.1: the part of `attempt` specific to each kind of
/// expression node. Whitespace skipping, memoization, and root-wrapping are
/// handled uniformly by [`crate::engine::run`] - this function only
/// implements the per-variant matching rule.
pub(crate) fn attempt_body(expr: &Rc<Expr>, ctx: &mut ParseContext, c_pos: usize) -> StepResult {
    match &expr.kind {
        ExprKind::Sequence(children) => {
            let mut out = Vec::new();
            let snapshot = children.borrow().clone();
            for child in &snapshot {
                let mut result = run(child, ctx)?;
                out.append(&mut result);
            }
            Ok(out)
        }
        ExprKind::OrderedChoice(children) => {
            let snapshot = children.borrow().clone();
            for child in &snapshot {
                ctx.position = c_pos;
                if let Ok(result) = run(child, ctx) {
                    return Ok(result);
                }
            }
            ctx.position = c_pos;
            Err(Signal)
        }
        ExprKind::Optional(children) => {
            let child = children.borrow()[0].clone();
            ctx.position = c_pos;
            match run(&child, ctx) {
                Ok(result) => Ok(result),
                Err(_) => {
                    ctx.position = c_pos;
                    Ok(Vec::new())
                }
            }
        }
        ExprKind::ZeroOrMore(children) => {
            let child = children.borrow()[0].clone();
            let mut out = Vec::new();
            loop {
                let attempt_pos = ctx.position;
                match run(&child, ctx) {
                    Ok(mut result) => out.append(&mut result),
                    Err(_) => {
                        ctx.position = attempt_pos;
                        break;
                    }
                }
            }
            Ok(out)
        }
        ExprKind::OneOrMore(children) => {
            let child = children.borrow()[0].clone();
            let mut out = Vec::new();
            let mut matched_once = false;
            loop {
                let attempt_pos = ctx.position;
                match run(&child, ctx) {
                    Ok(mut result) => {
                        out.append(&mut result);
                        matched_once = true;
                    }
                    Err(_) => {
                        ctx.position = attempt_pos;
                        break;
                    }
                }
            }
            if matched_once {
                Ok(out)
            } else {
                Err(Signal)
            }
        }
        ExprKind::And(children) => {
            let child = children.borrow()[0].clone();
            let result = run(&child, ctx);
            ctx.position = c_pos;
            result.map(|_| Vec::new())
        }
        ExprKind::Not(children) => {
            let child = children.borrow()[0].clone();
            let result = run(&child, ctx);
            ctx.position = c_pos;
            match result {
                Ok(_) => {
                    ctx.record_failure("not predicate", c_pos);
                    Err(Signal)
                }
                Err(_) => Ok(Vec::new()),
            }
        }
        ExprKind::StrMatch(_) | ExprKind::Keyword(_) | ExprKind::RegexMatch(_) | ExprKind::EndOfFile => {
            attempt_terminal(expr, ctx, c_pos)
        }
        ExprKind::CrossRef(name) => {
            unreachable!("unresolved cross-reference to rule '{}' reached the engine", name)
        }
    }
}

fn attempt_terminal(expr: &Rc<Expr>, ctx: &mut ParseContext, c_pos: usize) -> StepResult {
    #[cfg(debug_assertions)]
    expr.debugger.get().log_entry();

    if let Some((new_pos, text)) = expr.raw_terminal_match(ctx) {
        ctx.position = new_pos;
        #[cfg(debug_assertions)]
        expr.debugger.get().log_success(c_pos, new_pos);
        return Ok(vec![make_terminal(expr, c_pos, text)]);
    }

    if !ctx.in_comment_parse {
        if let Some(comments) = crate::engine::try_consume_comments(ctx, c_pos) {
            if let Some((new_pos, text)) = expr.raw_terminal_match(ctx) {
                ctx.position = new_pos;
                let mut node = make_terminal(expr, c_pos, text);
                node.attach_comments(comments);
                return Ok(vec![node]);
            }
        }
    }

    ctx.position = c_pos;
    #[cfg(debug_assertions)]
    expr.debugger.get().log_failure(c_pos);
    ctx.record_failure(expr.expected_label(), c_pos);
    Err(Signal)
}

fn make_terminal(expr: &Rc<Expr>, c_pos: usize, value: String) -> ParseTree {
    ParseTree::Terminal(Terminal {
        ty: expr.tag(),
        position: c_pos,
        value,
        comments: None,
    })
}

pub(crate) fn is_composite(expr: &Expr) -> bool {
    expr.kind.is_composite()
}
