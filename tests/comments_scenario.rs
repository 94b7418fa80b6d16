//! S3 (comment interleaving) from spec.md §8.

mod common;

use packrat_peg::{build_parser, rule, ParserOptions, RuleBody};

fn integers() -> RuleBody {
    RuleBody::Seq(vec![
        RuleBody::OneOrMore(Box::new(rule!(integer))),
        RuleBody::Eof,
    ])
}

fn integer() -> RuleBody {
    RuleBody::Regex(r"[0-9]+")
}

fn comment() -> RuleBody {
    RuleBody::Regex(r"(?s)/\*.*?\*/")
}

#[test]
fn s3_comment_interleaving_attaches_to_the_following_terminal() {
    let parser = build_parser(rule!(integers), Some(rule!(comment)), ParserOptions::default()).unwrap();

    let tree = parser.parse("1 /* hi */ 2").unwrap();
    common::assert_no_nested_lists(&tree);

    let ints = common::terminal_values(&tree, "integer");
    assert_eq!(ints, vec!["1".to_string(), "2".to_string()]);

    // The first integer has no preceding comment; the second carries one.
    let mut matches = Vec::new();
    tree.find_all("integer", &mut matches);
    assert_eq!(matches.len(), 2);
    assert!(matches[0].comments().is_none());
    let comments = matches[1].comments().expect("second integer should carry a comment");
    assert_eq!(comments.ty, "comment");
    assert_eq!(comments.children.len(), 1);
}

#[test]
fn no_comment_grammar_means_comment_like_text_is_rejected() {
    let parser = build_parser(rule!(integers), None, ParserOptions::default()).unwrap();
    assert!(parser.parse("1 /* hi */ 2").is_err());
}
