use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::NoMatch;
use crate::expr::Expr;
use crate::tree::ParseTree;

/// Default whitespace character set, matching the reference parser's default.
pub const DEFAULT_WS: &str = "\t\n\r ";

/// Options controlling how [`crate::Parser::parse`] drives the engine.
#[derive(Clone)]
pub struct ParserOptions {
    pub skipws: bool,
    pub ws_chars: HashSet<char>,
    pub reduce_tree: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            skipws: true,
            ws_chars: DEFAULT_WS.chars().collect(),
            reduce_tree: false,
        }
    }
}

pub(crate) type MemoEntry = (Vec<ParseTree>, usize);

/// Mutable state owned by a single `parse` invocation: the cursor, the
/// packrat memo tables, the furthest-failure tracker and the comment
/// re-entry guard.
///
/// Memo tables and the per-node scratch position live here rather than on
/// the expression nodes themselves (see spec.md §9 "Per-node scratch state is
/// a hazard") so the same compiled grammar can be reused across parses -
/// including, in principle, concurrent ones, each with its own `ParseContext`.
pub struct ParseContext<'s> {
    pub(crate) input: &'s str,
    pub position: usize,
    pub(crate) best_error: Option<NoMatch>,
    pub(crate) in_comment_parse: bool,
    pub(crate) skipws: bool,
    pub(crate) ws_chars: HashSet<char>,
    pub(crate) reduce_tree: bool,
    pub(crate) comments_model: Option<Rc<Expr>>,
    pub(crate) memo: HashMap<(usize, usize), MemoEntry>,
}

impl<'s> ParseContext<'s> {
    pub(crate) fn new(
        input: &'s str,
        options: &ParserOptions,
        comments_model: Option<Rc<Expr>>,
    ) -> Self {
        Self {
            input,
            position: 0,
            best_error: None,
            in_comment_parse: false,
            skipws: options.skipws,
            ws_chars: options.ws_chars.clone(),
            reduce_tree: options.reduce_tree,
            comments_model,
            memo: HashMap::new(),
        }
    }

    pub(crate) fn skip_ws(&mut self) {
        if !self.skipws {
            return;
        }
        while let Some(c) = self.input[self.position..].chars().next() {
            if self.ws_chars.contains(&c) {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Record (or ignore) a parse-time failure, tracking the furthest one
    /// seen so far. Mirrors the reference parser's single mutable `nm` slot:
    /// a strictly-further position replaces it (and starts life eligible for
    /// relabeling); an equal-or-nearer position leaves the existing label and
    /// `propagating_up` state untouched. While replaying input to match
    /// comments, failures are not recorded at all (§4.4).
    pub(crate) fn record_failure(&mut self, expected: impl Into<String>, position: usize) {
        if self.in_comment_parse {
            return;
        }
        let replace = match &self.best_error {
            Some(existing) => position > existing.position,
            None => true,
        };
        if replace {
            self.best_error = Some(NoMatch::new(expected, position));
        }
    }

    /// Clear the furthest-error's `propagating_up` latch: called on every
    /// expression attempt to mark that we are descending into new territory.
    pub(crate) fn mark_descending(&mut self) {
        if let Some(err) = self.best_error.as_mut() {
            err.propagating_up = false;
        }
    }

    /// Relabel the furthest error to `rule_name` if it is still propagating
    /// up unchanged from exactly this node's starting position - the "most
    /// generic enclosing rule" heuristic (§4.2 step 8).
    pub(crate) fn relabel_if_propagating(&mut self, rule_name: &'static str, c_pos: usize) {
        if let Some(err) = self.best_error.as_mut() {
            if err.position == c_pos && err.propagating_up {
                err.expected = rule_name.to_string();
            }
        }
    }
}
