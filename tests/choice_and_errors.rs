//! S4 (ordered choice priority) and S5 (furthest-error reporting) from
//! spec.md §8.

use packrat_peg::{build_parser, rule, ParserOptions, ParseTree, RuleBody};

fn a_rule() -> RuleBody {
    RuleBody::Choice(vec![RuleBody::Lit("ab"), RuleBody::Lit("a")])
}

#[test]
fn s4_ordered_choice_commits_to_the_first_success() {
    let mut options = ParserOptions::default();
    options.reduce_tree = true;
    let parser = build_parser(rule!(a_rule), None, options).unwrap();

    let matched_ab = parser.parse("ab").unwrap();
    match &matched_ab {
        ParseTree::Terminal(t) => assert_eq!(t.value, "ab"),
        ParseTree::NonTerminal(_) => panic!("expected a terminal"),
    }

    let matched_a = parser.parse("ac").unwrap();
    match &matched_a {
        ParseTree::Terminal(t) => {
            assert_eq!(t.value, "a");
            assert_eq!(t.position, 0);
        }
        ParseTree::NonTerminal(_) => panic!("expected a terminal"),
    }
}

fn stmt() -> RuleBody {
    RuleBody::Choice(vec![
        RuleBody::Seq(vec![
            RuleBody::Lit("if"),
            rule!(cond),
            RuleBody::Lit("then"),
            rule!(body),
        ]),
        RuleBody::Seq(vec![
            RuleBody::Lit("while"),
            rule!(cond),
            RuleBody::Lit("do"),
            rule!(body),
        ]),
    ])
}

fn cond() -> RuleBody {
    RuleBody::Regex(r"[a-zA-Z_][a-zA-Z0-9_]*")
}

fn body() -> RuleBody {
    RuleBody::Regex(r"[a-zA-Z_][a-zA-Z0-9_]*")
}

#[test]
fn s5_furthest_error_reports_the_deepest_enclosing_rule() {
    let parser = build_parser(rule!(stmt), None, ParserOptions::default()).unwrap();

    let err = parser.parse("if x then <garbage>").unwrap_err();

    // The furthest point reached is inside `body`, not the unrelated
    // `while` alternative that never got past its own keyword.
    assert_eq!(err.expected(), "body");
    assert_eq!(err.position(), 10);
}

#[test]
fn predicate_neutrality_and_and_not_never_move_the_cursor() {
    fn guarded() -> RuleBody {
        RuleBody::Seq(vec![
            RuleBody::And(Box::new(RuleBody::Lit("ab"))),
            RuleBody::Not(Box::new(RuleBody::Lit("xy"))),
            RuleBody::Lit("ab"),
        ])
    }

    let parser = build_parser(rule!(guarded), None, ParserOptions::default()).unwrap();
    let tree = parser.parse("ab").unwrap();
    // And/Not themselves never contribute tree nodes or consume input; only
    // the final literal match should appear.
    assert_eq!(tree.children().len(), 1);
}

#[test]
fn greediness_zero_or_more_does_not_backtrack_past_its_own_match() {
    // `ZeroOrMore("a") "ab"` can never succeed on "aaab": ZeroOrMore greedily
    // consumes every "a" and there is no retry that gives one back to the
    // literal that follows.
    fn greedy() -> RuleBody {
        RuleBody::Seq(vec![
            RuleBody::ZeroOrMore(Box::new(RuleBody::Lit("a"))),
            RuleBody::Lit("ab"),
        ])
    }

    let parser = build_parser(rule!(greedy), None, ParserOptions::default()).unwrap();
    assert!(parser.parse("aaab").is_err());
}
