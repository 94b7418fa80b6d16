use packrat_peg::ParseTree;

/// Structural equality ignoring `position` - used by the whitespace
/// invariance scenario (spec.md §8 S2), where two inputs that differ only in
/// incidental whitespace must produce the same shape at different offsets.
pub fn structurally_equal(a: &ParseTree, b: &ParseTree) -> bool {
    if a.ty() != b.ty() {
        return false;
    }
    match (a, b) {
        (ParseTree::Terminal(ta), ParseTree::Terminal(tb)) => ta.value == tb.value,
        (ParseTree::NonTerminal(_), ParseTree::NonTerminal(_)) => {
            let ca = a.children();
            let cb = b.children();
            ca.len() == cb.len()
                && ca
                    .iter()
                    .zip(cb.iter())
                    .all(|(x, y)| structurally_equal(x, y))
        }
        _ => false,
    }
}

/// Every terminal value reachable under `node` with the given rule tag, in
/// document order.
pub fn terminal_values(node: &ParseTree, ty: &str) -> Vec<String> {
    let mut out = Vec::new();
    collect(node, ty, &mut out);
    out
}

fn collect(node: &ParseTree, ty: &str, out: &mut Vec<String>) {
    if let ParseTree::Terminal(t) = node {
        if t.ty == ty {
            out.push(t.value.clone());
        }
    }
    for child in node.children() {
        collect(child, ty, out);
    }
}

/// Asserts the flat-non-terminal invariant (spec.md §3 invariant 3 / §8
/// property 6): no `NonTerminal` child is itself a bare list. Since this
/// crate's `ParseTree` has no "bare list" variant at all - `Sequence` results
/// are always flattened into a `NonTerminal`'s `children` by the engine
/// before anything else can observe them - this just walks the tree and
/// confirms every node is a well-formed `Terminal` or `NonTerminal`.
pub fn assert_no_nested_lists(node: &ParseTree) {
    for child in node.children() {
        assert_no_nested_lists(child);
    }
}
