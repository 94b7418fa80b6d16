use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::context::ParserOptions;
use crate::error::GrammarError;
use crate::expr::{Expr, ExprKind};
use crate::Parser;

/// A grammar rule expressed in the embedded DSL. Rule references (`Rule`)
/// carry both the rule's name and the function that produces its body -
/// `rule!` fills in the name via `stringify!` so callers never repeat it by
/// hand.
pub enum RuleBody {
    Seq(Vec<RuleBody>),
    Choice(Vec<RuleBody>),
    Opt(Box<RuleBody>),
    ZeroOrMore(Box<RuleBody>),
    OneOrMore(Box<RuleBody>),
    And(Box<RuleBody>),
    Not(Box<RuleBody>),
    Lit(&'static str),
    Keyword(&'static str),
    Regex(&'static str),
    Eof,
    Rule(&'static str, fn() -> RuleBody),
}

/// Capture a rule-defining function's name at the call site, the Rust
/// equivalent of reflecting on a Python callable's `__name__`.
#[macro_export]
macro_rules! rule {
    ($name:ident) => {
        $crate::builder::RuleBody::Rule(stringify!($name), $name)
    };
}

enum Patch {
    Child(Rc<Expr>, usize, &'static str),
}

/// Resolves a [`RuleBody`] grammar - including mutually- and
/// self-recursive rules - into a connected expression graph (spec.md §4.3).
///
/// Recursive references are broken with a transient [`ExprKind::CrossRef`]
/// placeholder inserted in place of the not-yet-built rule; once every rule
/// has been built, every placeholder is patched in place with the rule it
/// actually refers to. A rule referenced but never defined surfaces as a
/// [`GrammarError`] at patch time rather than as a panic during parsing.
pub struct GrammarBuilder {
    next_id: Cell<usize>,
    built: RefCell<HashMap<&'static str, Rc<Expr>>>,
    in_progress: RefCell<HashSet<&'static str>>,
    patches: RefCell<Vec<Patch>>,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            built: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
            patches: RefCell::new(Vec::new()),
        }
    }

    fn alloc_id(&self) -> usize {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn record_child_patches(&self, parent: &Rc<Expr>, children: &[Rc<Expr>]) {
        for (idx, child) in children.iter().enumerate() {
            if let ExprKind::CrossRef(name) = &child.kind {
                self.patches.borrow_mut().push(Patch::Child(parent.clone(), idx, name));
            }
        }
    }

    fn build_composite(
        &self,
        items: &[RuleBody],
        make: impl FnOnce(usize, Vec<Rc<Expr>>) -> Rc<Expr>,
    ) -> Result<Rc<Expr>, GrammarError> {
        let mut children = Vec::with_capacity(items.len());
        for item in items {
            children.push(self.build_body(item)?);
        }
        let node = make(self.alloc_id(), children.clone());
        self.record_child_patches(&node, &children);
        Ok(node)
    }

    fn build_unary(
        &self,
        inner: &RuleBody,
        make: impl FnOnce(usize, Rc<Expr>) -> Rc<Expr>,
    ) -> Result<Rc<Expr>, GrammarError> {
        let child = self.build_body(inner)?;
        let node = make(self.alloc_id(), child.clone());
        self.record_child_patches(&node, std::slice::from_ref(&child));
        Ok(node)
    }

    fn build_body(&self, body: &RuleBody) -> Result<Rc<Expr>, GrammarError> {
        match body {
            RuleBody::Seq(items) => self.build_composite(items, Expr::sequence),
            RuleBody::Choice(items) => self.build_composite(items, Expr::ordered_choice),
            RuleBody::Opt(inner) => self.build_unary(inner, Expr::optional),
            RuleBody::ZeroOrMore(inner) => self.build_unary(inner, Expr::zero_or_more),
            RuleBody::OneOrMore(inner) => self.build_unary(inner, Expr::one_or_more),
            RuleBody::And(inner) => self.build_unary(inner, Expr::and_predicate),
            RuleBody::Not(inner) => self.build_unary(inner, Expr::not_predicate),
            RuleBody::Lit(literal) => Ok(Expr::str_match(self.alloc_id(), literal)),
            RuleBody::Keyword(literal) => Ok(Expr::keyword(self.alloc_id(), literal)),
            RuleBody::Regex(pattern) => Expr::regex_match(self.alloc_id(), pattern),
            RuleBody::Eof => Ok(Expr::end_of_file(self.alloc_id())),
            RuleBody::Rule(name, producer) => self.build_rule(name, *producer),
        }
    }

    fn build_rule(&self, name: &'static str, producer: fn() -> RuleBody) -> Result<Rc<Expr>, GrammarError> {
        if let Some(existing) = self.built.borrow().get(name) {
            return Ok(existing.clone());
        }
        if self.in_progress.borrow().contains(name) {
            return Ok(Expr::cross_ref(self.alloc_id(), name));
        }

        self.in_progress.borrow_mut().insert(name);
        let body = producer();
        if matches!(body, RuleBody::Rule(..)) {
            self.in_progress.borrow_mut().remove(name);
            return Err(GrammarError::new(format!(
                "rule element can't be just another rule in '{}'",
                name
            )));
        }
        let built = self.build_body(&body);
        self.in_progress.borrow_mut().remove(name);

        let expr = built?;
        expr.stamp_root(name);
        self.built.borrow_mut().insert(name, expr.clone());
        Ok(expr)
    }

    fn apply_patches(&self) -> Result<(), GrammarError> {
        for patch in self.patches.borrow().drain(..) {
            let Patch::Child(parent, idx, name) = patch;
            let resolved = self.built.borrow().get(name).cloned().ok_or_else(|| {
                GrammarError::new(format!("rule '{}' is referenced but never defined", name))
            })?;
            match &parent.kind {
                ExprKind::Sequence(cell)
                | ExprKind::OrderedChoice(cell)
                | ExprKind::Optional(cell)
                | ExprKind::ZeroOrMore(cell)
                | ExprKind::OneOrMore(cell)
                | ExprKind::And(cell)
                | ExprKind::Not(cell) => {
                    cell.borrow_mut()[idx] = resolved;
                }
                _ => unreachable!("cross-reference patch target is not a composite expression"),
            }
        }
        Ok(())
    }

    /// Build a complete [`Parser`] from a root rule, an optional comment
    /// grammar, and whitespace/tree-shape options (spec.md §4, §4.4).
    pub fn build(
        root: RuleBody,
        comments: Option<RuleBody>,
        options: ParserOptions,
    ) -> Result<Parser, GrammarError> {
        let builder = GrammarBuilder::new();
        let root_expr = builder.build_body(&root)?;
        let comments_expr = match comments {
            Some(body) => Some(builder.build_body(&body)?),
            None => None,
        };
        builder.apply_patches()?;

        let rule_exprs = builder.built.into_inner();
        Ok(Parser::new(root_expr, comments_expr, options, rule_exprs))
    }
}
