use std::fmt::{Debug, Formatter};

/// Concrete parse tree produced by the engine driver.
///
/// A [`ParseTree::Terminal`] is a leaf matched by a `StrMatch`, `RegexMatch`,
/// `EndOfFile` or `Keyword` expression node. A [`ParseTree::NonTerminal`] is
/// produced whenever a rule-root expression succeeds with a non-empty list of
/// children (§4.2 of the design); its `children` are always flat — no
/// `NonTerminal` ever holds a bare list of further lists.
#[derive(Clone)]
pub enum ParseTree {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

#[derive(Clone)]
pub struct Terminal {
    /// Rule name that produced this terminal, or `""` when produced by a
    /// non-root expression.
    pub ty: &'static str,
    pub position: usize,
    pub value: String,
    pub comments: Option<Box<NonTerminal>>,
}

#[derive(Clone)]
pub struct NonTerminal {
    pub ty: &'static str,
    pub position: usize,
    pub children: Vec<ParseTree>,
    pub comments: Option<Box<NonTerminal>>,
}

impl ParseTree {
    pub fn ty(&self) -> &'static str {
        match self {
            ParseTree::Terminal(t) => t.ty,
            ParseTree::NonTerminal(nt) => nt.ty,
        }
    }
    pub fn position(&self) -> usize {
        match self {
            ParseTree::Terminal(t) => t.position,
            ParseTree::NonTerminal(nt) => nt.position,
        }
    }
    pub fn children(&self) -> &[ParseTree] {
        match self {
            ParseTree::Terminal(_) => &[],
            ParseTree::NonTerminal(nt) => &nt.children,
        }
    }
    pub fn comments(&self) -> Option<&NonTerminal> {
        match self {
            ParseTree::Terminal(t) => t.comments.as_deref(),
            ParseTree::NonTerminal(nt) => nt.comments.as_deref(),
        }
    }

    pub(crate) fn attach_comments(&mut self, comments: NonTerminal) {
        match self {
            ParseTree::Terminal(t) => t.comments = Some(Box::new(comments)),
            ParseTree::NonTerminal(nt) => nt.comments = Some(Box::new(comments)),
        }
    }
}

impl Debug for ParseTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTree::Terminal(t) => f
                .debug_struct("Terminal")
                .field("ty", &t.ty)
                .field("position", &t.position)
                .field("value", &t.value)
                .finish(),
            ParseTree::NonTerminal(nt) => f
                .debug_struct("NonTerminal")
                .field("ty", &nt.ty)
                .field("position", &nt.position)
                .field("children", &nt.children)
                .finish(),
        }
    }
}

impl ptree::TreeItem for ParseTree {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self {
            ParseTree::Terminal(t) => write!(f, "{} '{}' # {}", t.ty, t.value, t.position),
            ParseTree::NonTerminal(nt) => write!(f, "{} # {}", nt.ty, nt.position),
        }
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(self.children())
    }
}

impl ParseTree {
    /// Dump the tree to stdout for inspection during development.
    pub fn print(&self) -> std::io::Result<()> {
        ptree::print_tree(self)
    }

    /// Depth-first search for the first node with the given rule name.
    pub fn find(&self, ty: &str) -> Option<&ParseTree> {
        if self.ty() == ty {
            Some(self)
        } else {
            self.children().iter().find_map(|child| child.find(ty))
        }
    }

    /// All descendant nodes (inclusive) matching the given rule name.
    pub fn find_all<'a>(&'a self, ty: &str, out: &mut Vec<&'a ParseTree>) {
        if self.ty() == ty {
            out.push(self);
        }
        for child in self.children() {
            child.find_all(ty, out);
        }
    }
}
