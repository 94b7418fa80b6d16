//! S6 (two-pass ASG rewrite resolving a forward reference) from spec.md §8.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use packrat_peg::{build_parser, rule, tree_to_asg, AsgContext, AsgMirror, ParseTree, ParserOptions, RuleBody, SemanticAction, SemanticError};

fn program() -> RuleBody {
    RuleBody::ZeroOrMore(Box::new(rule!(stmt)))
}

fn stmt() -> RuleBody {
    RuleBody::Choice(vec![rule!(decl), rule!(reference)])
}

fn decl() -> RuleBody {
    RuleBody::Seq(vec![RuleBody::Lit("let "), rule!(name)])
}

fn reference() -> RuleBody {
    RuleBody::Seq(vec![RuleBody::Lit("use "), rule!(name)])
}

fn name() -> RuleBody {
    RuleBody::Regex(r"[a-zA-Z_][a-zA-Z0-9_]*")
}

fn name_of(node: &ParseTree) -> String {
    node.children()
        .iter()
        .find(|c| c.ty() == "name")
        .and_then(|c| match c {
            ParseTree::Terminal(t) => Some(t.value.clone()),
            _ => None,
        })
        .expect("decl/reference always has a name child")
}

#[derive(Default)]
struct Registry {
    declared: RefCell<HashMap<String, usize>>,
}

struct DeclNode {
    name: String,
    id: usize,
}

struct RefNode {
    name: String,
    resolved: Option<usize>,
}

struct DeclAction {
    registry: Rc<Registry>,
}

impl SemanticAction for DeclAction {
    fn first_pass(
        &self,
        _ctx: &AsgContext,
        node: &ParseTree,
        _children: Vec<Rc<dyn Any>>,
    ) -> Result<Rc<dyn Any>, SemanticError> {
        let name = name_of(node);
        let id = self.registry.declared.borrow().len();
        self.registry.declared.borrow_mut().insert(name.clone(), id);
        Ok(Rc::new(DeclNode { name, id }))
    }
}

struct RefAction {
    registry: Rc<Registry>,
}

impl SemanticAction for RefAction {
    fn first_pass(
        &self,
        _ctx: &AsgContext,
        node: &ParseTree,
        _children: Vec<Rc<dyn Any>>,
    ) -> Result<Rc<dyn Any>, SemanticError> {
        let name = name_of(node);
        Ok(Rc::new(RefCell::new(RefNode { name, resolved: None })))
    }

    fn second_pass(&self, _ctx: &AsgContext, product: Rc<dyn Any>) -> Result<Rc<dyn Any>, SemanticError> {
        let cell = product
            .downcast_ref::<RefCell<RefNode>>()
            .expect("ref first_pass always returns a RefCell<RefNode>");
        let resolved = self.registry.declared.borrow().get(&cell.borrow().name).copied();
        cell.borrow_mut().resolved = resolved;
        Ok(product)
    }
}

#[test]
fn s6_reference_before_declaration_resolves_in_the_second_pass() {
    let parser = build_parser(rule!(program), None, ParserOptions::default()).unwrap();
    let tree = parser.parse("use a let a").unwrap();

    let registry = Rc::new(Registry::default());
    let mut actions: HashMap<&'static str, Box<dyn SemanticAction>> = HashMap::new();
    actions.insert(
        "decl",
        Box::new(DeclAction {
            registry: registry.clone(),
        }),
    );
    actions.insert(
        "reference",
        Box::new(RefAction {
            registry: registry.clone(),
        }),
    );

    let asg = tree_to_asg(&tree, &actions).unwrap();

    let program_mirror = asg
        .downcast_ref::<AsgMirror>()
        .expect("program has no action, so it mirrors into an AsgMirror");
    assert_eq!(program_mirror.children.len(), 2);

    // Each `stmt` alternative also has no action, so it mirrors its single
    // real child through unchanged.
    let first_stmt = program_mirror.children[0]
        .downcast_ref::<AsgMirror>()
        .expect("stmt mirrors too");
    let reference_product = first_stmt.children[0]
        .downcast_ref::<RefCell<RefNode>>()
        .expect("first statement is the reference");
    assert_eq!(reference_product.borrow().name, "a");
    assert_eq!(
        reference_product.borrow().resolved,
        Some(0),
        "reference should resolve to the declaration discovered later in the first pass"
    );

    let second_stmt = program_mirror.children[1]
        .downcast_ref::<AsgMirror>()
        .expect("stmt mirrors too");
    let decl_product = second_stmt.children[0]
        .downcast_ref::<DeclNode>()
        .expect("second statement is the declaration");
    assert_eq!(decl_product.name, "a");
    assert_eq!(decl_product.id, 0);
}
