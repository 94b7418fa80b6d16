//! A packrat PEG parser interpreter.
//!
//! Build a parsing expression graph in Rust with [`GrammarBuilder`] (or the
//! [`rule!`] macro plus [`RuleBody`] combinators), then run it against an
//! input string with [`Parser::parse`] to get back a [`ParseTree`]. An
//! optional two-pass rewrite ([`asg::tree_to_asg`]) turns that parse tree into
//! an application-defined abstract semantic graph.

mod asg;
mod builder;
mod context;
mod engine;
mod error;
mod expr;
mod log;
mod source;
mod tree;

use std::collections::HashMap;
use std::rc::Rc;

pub use asg::{tree_to_asg, AsgContext, AsgMirror, SemanticAction};
pub use builder::{GrammarBuilder, RuleBody};
pub use context::{ParserOptions, DEFAULT_WS};
pub use error::{GrammarError, NoMatch, SemanticError};
pub use log::Log;
pub use source::{LineColumn, Source};
pub use tree::{NonTerminal, ParseTree, Terminal};

use context::ParseContext;
use expr::Expr;

/// A compiled grammar, ready to parse any number of inputs.
///
/// Cheap to build once and reuse: the expression graph is immutable once
/// built, and every parse gets its own [`ParseContext`] (memo table, cursor,
/// furthest-failure tracker), so the same `Parser` can drive unrelated
/// parses without interference (spec.md §9).
pub struct Parser {
    root: Rc<Expr>,
    comments_model: Option<Rc<Expr>>,
    options: ParserOptions,
    rule_exprs: HashMap<&'static str, Rc<Expr>>,
}

impl Parser {
    pub(crate) fn new(
        root: Rc<Expr>,
        comments_model: Option<Rc<Expr>>,
        options: ParserOptions,
        rule_exprs: HashMap<&'static str, Rc<Expr>>,
    ) -> Self {
        Self {
            root,
            comments_model,
            options,
            rule_exprs,
        }
    }

    /// Raise a named rule's debug-build tracing level, the equivalent of the
    /// teacher's per-production `set_log`/`assign_debugger`. Returns `false`
    /// if no rule with that name was built. Only has an observable effect in
    /// debug builds - see [`Log`].
    pub fn set_log(&self, rule_name: &str, debugger: Log<&'static str>) -> bool {
        match self.rule_exprs.get(rule_name) {
            Some(expr) => {
                expr.set_log(debugger);
                true
            }
            None => false,
        }
    }

    /// Parse `input` against this grammar's root rule.
    ///
    /// On success, returns the single [`ParseTree`] node produced by the
    /// root rule. On failure, returns the furthest-reaching [`NoMatch`] seen
    /// during the attempt (spec.md §4.2's "best error" heuristic), which is
    /// usually a far more useful diagnostic than the error at the point
    /// backtracking finally gave up.
    pub fn parse<'s>(&self, input: &'s str) -> Result<ParseTree, NoMatch> {
        let mut ctx = ParseContext::new(input, &self.options, self.comments_model.clone());
        match engine::run(&self.root, &mut ctx) {
            // A rule root normally wraps into exactly one `NonTerminal`, but a
            // root that matched nothing - `ZeroOrMore` over zero repetitions,
            // a bare `And`/`Not` predicate - stays an empty list, since
            // `engine::wrap_on_success` only wraps non-empty children. Mirror
            // that result as an empty node instead of assuming a pop.
            Ok(mut children) => Ok(children.pop().unwrap_or_else(|| {
                ParseTree::NonTerminal(NonTerminal {
                    ty: self.root.rule_name.get().unwrap_or(""),
                    position: 0,
                    children: Vec::new(),
                    comments: None,
                })
            })),
            Err(_) => Err(ctx
                .best_error
                .unwrap_or_else(|| NoMatch::new("<grammar produced no failure detail>", 0))),
        }
    }
}

/// Build a [`Parser`] from a root rule, an optional comment grammar, and
/// whitespace/tree-shape options. A thin wrapper over
/// [`GrammarBuilder::build`] for callers who don't need to reuse the builder
/// itself.
pub fn build_parser(
    root: RuleBody,
    comments: Option<RuleBody>,
    options: ParserOptions,
) -> Result<Parser, GrammarError> {
    GrammarBuilder::build(root, comments, options)
}
