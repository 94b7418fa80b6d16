use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::SemanticError;
use crate::tree::ParseTree;

/// A semantic action attached to one rule name, rewriting parse-tree nodes of
/// that rule into an application-defined ASG node (spec.md §6, component F).
///
/// `first_pass` runs bottom-up over the parse tree: by the time it is called
/// for a node, every child has already produced its product. `second_pass` is
/// optional and runs afterwards, over every node in the order its `first_pass`
/// committed a product, with the full ASG visible through `ctx` - this is
/// the hook for resolving a forward reference (e.g. a variable used before
/// its declaration appears later in the same scope).
pub trait SemanticAction {
    fn first_pass(
        &self,
        ctx: &AsgContext,
        node: &ParseTree,
        children: Vec<Rc<dyn Any>>,
    ) -> Result<Rc<dyn Any>, SemanticError>;

    fn second_pass(
        &self,
        _ctx: &AsgContext,
        product: Rc<dyn Any>,
    ) -> Result<Rc<dyn Any>, SemanticError> {
        Ok(product)
    }
}

/// Registry of every node's current product, keyed by the rule name that
/// produced it, built up during `first_pass` and available for lookups
/// during `second_pass`.
#[derive(Default)]
pub struct AsgContext {
    entries: RefCell<Vec<(&'static str, Rc<dyn Any>)>>,
}

impl AsgContext {
    /// All products so far committed for nodes of the given rule name, in
    /// first-pass (post-order) commit order.
    pub fn find_by_type(&self, ty: &str) -> Vec<Rc<dyn Any>> {
        self.entries
            .borrow()
            .iter()
            .filter(|(entry_ty, _)| *entry_ty == ty)
            .map(|(_, product)| product.clone())
            .collect()
    }

    fn push(&self, ty: &'static str, product: Rc<dyn Any>) -> usize {
        let mut entries = self.entries.borrow_mut();
        entries.push((ty, product));
        entries.len() - 1
    }

    fn get(&self, index: usize) -> Rc<dyn Any> {
        self.entries.borrow()[index].1.clone()
    }

    fn set(&self, index: usize, product: Rc<dyn Any>) {
        self.entries.borrow_mut()[index].1 = product;
    }
}

type ActionTable = HashMap<&'static str, Box<dyn SemanticAction>>;

/// Mirror of a [`crate::tree::NonTerminal`] produced when no [`SemanticAction`]
/// is registered for its rule name: its `children` are the already-rewritten
/// products of its own children, not raw parse-tree nodes (spec.md §4.5 "For
/// a NonTerminal without a matching action, rebuild a mirror NonTerminal").
/// This is what lets an action further up the tree see past an unregistered
/// rule to the real products underneath it.
pub struct AsgMirror {
    pub ty: &'static str,
    pub position: usize,
    pub children: Vec<Rc<dyn Any>>,
}

/// Rewrite a parse tree into an ASG by running each node's rule-named
/// [`SemanticAction`], depth-first, then giving every action with a
/// `second_pass` a chance to resolve forward references once the whole tree
/// has a first-pass product. A rule name with no registered action passes its
/// node through unchanged (a `Terminal` is cloned as-is; a `NonTerminal`
/// becomes an [`AsgMirror`] wrapping its children's already-rewritten
/// products) so a caller only needs actions for the rules it actually cares
/// about.
pub fn tree_to_asg(tree: &ParseTree, actions: &ActionTable) -> Result<Rc<dyn Any>, SemanticError> {
    let ctx = AsgContext::default();
    let (_, root_index) = first_pass(tree, actions, &ctx)?;
    second_pass(&ctx, actions)?;
    Ok(ctx.get(root_index))
}

fn first_pass(
    node: &ParseTree,
    actions: &ActionTable,
    ctx: &AsgContext,
) -> Result<(Rc<dyn Any>, usize), SemanticError> {
    let mut child_products = Vec::with_capacity(node.children().len());
    for child in node.children() {
        let (product, _) = first_pass(child, actions, ctx)?;
        child_products.push(product);
    }

    let ty = node.ty();
    let product: Rc<dyn Any> = match actions.get(ty) {
        Some(action) => action.first_pass(ctx, node, child_products)?,
        None => match node {
            ParseTree::Terminal(terminal) => Rc::new(terminal.clone()),
            ParseTree::NonTerminal(nt) => Rc::new(AsgMirror {
                ty: nt.ty,
                position: nt.position,
                children: child_products,
            }),
        },
    };
    let index = ctx.push(ty, product.clone());
    Ok((product, index))
}

fn second_pass(ctx: &AsgContext, actions: &ActionTable) -> Result<(), SemanticError> {
    let order: Vec<(usize, &'static str)> = ctx
        .entries
        .borrow()
        .iter()
        .enumerate()
        .map(|(index, (ty, _))| (index, *ty))
        .collect();

    for (index, ty) in order {
        if let Some(action) = actions.get(ty) {
            let current = ctx.get(index);
            let updated = action.second_pass(ctx, current)?;
            ctx.set(index, updated);
        }
    }
    Ok(())
}
