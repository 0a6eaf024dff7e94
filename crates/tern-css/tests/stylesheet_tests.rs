//! Tests for the recovering style sheet splitter.

use tern_css::parser::{Declaration, parse_declarations, parse_stylesheet};
use tern_css::Specificity;
use tern_dom::{NodeId, NodeRef};
use tern_sgml::parse;

fn declaration(name: &str, value: &str, important: bool) -> Declaration {
    Declaration {
        name: name.to_owned(),
        value: value.to_owned(),
        important,
    }
}

fn messages(sheet: &tern_css::parser::Stylesheet) -> Vec<&str> {
    sheet.issues.iter().map(|i| i.message.as_str()).collect()
}

#[test]
fn test_basic_rules() {
    let sheet = parse_stylesheet("h1, h2 { color: red; Font-Weight: bold !important }\np{}");
    assert!(sheet.issues.is_empty());
    assert_eq!(sheet.rules.len(), 2);

    let first = &sheet.rules[0];
    let texts: Vec<_> = first.selectors.iter().map(ToString::to_string).collect();
    assert_eq!(texts, vec!["h1", "h2"]);
    assert_eq!(
        first.declarations,
        vec![
            declaration("color", "red", false),
            declaration("font-weight", "bold", true),
        ]
    );
    assert!(sheet.rules[1].declarations.is_empty());
}

#[test]
fn test_important_with_space_and_case() {
    let (declarations, issues) = parse_declarations("margin: 0 auto ! IMPORTANT; color: red!important");
    assert!(issues.is_empty());
    assert_eq!(
        declarations,
        vec![
            declaration("margin", "0 auto", true),
            declaration("color", "red", true),
        ]
    );
}

#[test]
fn test_bad_declarations_are_skipped() {
    let sheet = parse_stylesheet("p { color red; font-size: 12px } div { x }");
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(
        sheet.rules[0].declarations,
        vec![declaration("font-size", "12px", false)]
    );
    assert!(sheet.rules[1].declarations.is_empty());
    assert_eq!(
        messages(&sheet),
        vec![
            "expected `:` after property name",
            "expected `:` after property name"
        ]
    );
    assert_eq!(sheet.issues[0].offset, 9);
}

#[test]
fn test_bad_selector_drops_only_its_rule() {
    let sheet = parse_stylesheet("p:unknown { color: red } a { color: blue }");
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(sheet.rules[0].selectors[0].text, "a");
    assert_eq!(sheet.issues.len(), 1);
    assert_eq!(sheet.issues[0].offset, 1);
    assert!(sheet.issues[0].message.starts_with("rule dropped: "));
}

#[test]
fn test_at_rules_are_skipped() {
    let sheet = parse_stylesheet(
        "@charset \"utf-8\";\n@import url(x.css);\n@media screen { p { color: red } }\nh1 { color: blue }",
    );
    assert!(sheet.issues.is_empty());
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(sheet.rules[0].selectors[0].text, "h1");
}

#[test]
fn test_stray_closing_brace() {
    let sheet = parse_stylesheet("} p { a: b }");
    assert_eq!(messages(&sheet), vec!["unmatched `}`"]);
    assert_eq!(sheet.issues[0].offset, 0);
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_unterminated_block_keeps_its_declarations() {
    let source = "p { color: red";
    let sheet = parse_stylesheet(source);
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(
        sheet.rules[0].declarations,
        vec![declaration("color", "red", false)]
    );
    assert_eq!(messages(&sheet), vec!["unterminated block"]);
    assert_eq!(sheet.issues[0].offset, source.len());
}

#[test]
fn test_missing_block() {
    let sheet = parse_stylesheet("p, a");
    assert!(sheet.rules.is_empty());
    assert_eq!(messages(&sheet), vec!["expected `{` after selector"]);
}

#[test]
fn test_block_inside_a_value() {
    let sheet = parse_stylesheet("p { color: { red } ; margin: 0 }");
    assert_eq!(
        sheet.rules[0].declarations,
        vec![declaration("margin", "0", false)]
    );
    assert_eq!(messages(&sheet), vec!["unexpected block in declaration"]);
    assert_eq!(sheet.issues[0].offset, 11);
}

#[test]
fn test_empty_value() {
    let (declarations, issues) = parse_declarations("color: ; width: 1px");
    assert_eq!(declarations, vec![declaration("width", "1px", false)]);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message, "empty declaration value");
}

#[test]
fn test_comments_are_ignored() {
    let sheet = parse_stylesheet("/* head */ p /* x */ { color: /* c */ red /* d */ ; }");
    assert!(sheet.issues.is_empty());
    assert_eq!(sheet.rules[0].selectors[0].text, "p");
    assert_eq!(
        sheet.rules[0].declarations,
        vec![declaration("color", "red", false)]
    );
}

#[test]
fn test_declarations_outside_a_block() {
    let (declarations, issues) = parse_declarations("color: red; } width: 2em");
    assert_eq!(
        declarations,
        vec![
            declaration("color", "red", false),
            declaration("width", "2em", false),
        ]
    );
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message, "unmatched `}`");
    assert_eq!(issues[0].offset, 12);
}

#[test]
fn test_matching_rules_by_specificity() {
    let sheet = parse_stylesheet("p { a: 1 } #x { a: 2 } .c { a: 3 } div p { a: 4 } span { a: 5 }");
    let tree = parse("<div><p id=x class=c></p></div>").tree;
    let p = tree
        .descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).is_some_and(|e| e.is("p")))
        .unwrap();

    let matched = sheet.matching_rules(NodeRef::new(&tree, p));
    let values: Vec<_> = matched
        .iter()
        .map(|(_, rule)| rule.declarations[0].value.as_str())
        .collect();
    assert_eq!(values, vec!["1", "4", "3", "2"]);
    assert_eq!(matched[0].0, Specificity(0, 0, 1));
    assert_eq!(matched[3].0, Specificity(1, 0, 0));
}

#[test]
fn test_matching_rules_uses_the_best_selector_of_a_group() {
    let sheet = parse_stylesheet(".c { a: 1 } p, #x { a: 2 }");
    let tree = parse("<p id=x class=c></p>").tree;
    let p = tree.document_element().unwrap();

    let matched = sheet.matching_rules(NodeRef::new(&tree, p));
    assert_eq!(matched.len(), 2);
    assert_eq!(matched[0].0, Specificity(0, 1, 0));
    assert_eq!(matched[1].0, Specificity(1, 0, 0));
}
