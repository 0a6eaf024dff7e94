//! Integration tests for the SGML tree builder.

use tern_dom::{DomTree, NodeId, NodeType};
use tern_scanner::ScannerConfig;
use tern_sgml::{TreeBuilderConfig, format_tree, parse, parse_document};

/// First element named `tag`, depth-first.
fn find(tree: &DomTree, tag: &str) -> Option<NodeId> {
    tree.descendants(NodeId::ROOT)
        .find(|&id| tree.as_element(id).is_some_and(|e| e.is(tag)))
}

fn tag_of(tree: &DomTree, id: NodeId) -> &str {
    tree.as_element(id).map_or("", |e| e.tag_name.as_str())
}

fn child_tags(tree: &DomTree, id: NodeId) -> Vec<&str> {
    tree.children(id)
        .iter()
        .filter_map(|&c| tree.as_element(c))
        .map(|e| e.tag_name.as_str())
        .collect()
}

#[test]
fn test_nested_elements() {
    let doc = parse("<div><p>one</p><span>two</span></div>");
    let tree = &doc.tree;
    let div = tree.document_element().unwrap();
    assert_eq!(tag_of(tree, div), "div");
    assert_eq!(child_tags(tree, div), vec!["p", "span"]);
    assert_eq!(tree.text_content(div), "onetwo");
    assert!(doc.issues.is_empty());
}

#[test]
fn test_attribute_forms() {
    let doc = parse(r#"<input type="text" name='q' size=10 disabled value=a/b>"#);
    let input = find(&doc.tree, "input").unwrap();
    let data = doc.tree.as_element(input).unwrap();
    assert_eq!(data.attribute("type"), Some("text"));
    assert_eq!(data.attribute("name"), Some("q"));
    assert_eq!(data.attribute("size"), Some("10"));
    assert_eq!(data.attribute("disabled"), Some(""));
    assert_eq!(data.attribute("value"), Some("a/b"));
}

#[test]
fn test_tag_and_attribute_names_are_lowercased() {
    let doc = parse(r#"<DIV CLASS="Big"></DIV>"#);
    let div = find(&doc.tree, "div").unwrap();
    let data = doc.tree.as_element(div).unwrap();
    assert_eq!(data.tag_name, "div");
    assert_eq!(data.attrs.get("class").map(String::as_str), Some("Big"));
    assert!(doc.issues.is_empty());
}

#[test]
fn test_first_duplicate_attribute_wins() {
    let doc = parse(r#"<a href="1" href="2">"#);
    let a = find(&doc.tree, "a").unwrap();
    assert_eq!(doc.tree.as_element(a).unwrap().attribute("href"), Some("1"));
}

#[test]
fn test_self_closing_and_void_elements() {
    let doc = parse("<div><p/><br>after<img src=x.png>tail</div>");
    let tree = &doc.tree;
    let div = find(tree, "div").unwrap();
    assert_eq!(child_tags(tree, div), vec!["p", "br", "img"]);
    let p = find(tree, "p").unwrap();
    let br = find(tree, "br").unwrap();
    assert!(tree.children(p).is_empty());
    assert!(tree.children(br).is_empty());
    assert_eq!(tree.text_content(div), "aftertail");
}

#[test]
fn test_end_tag_closes_inner_elements() {
    let doc = parse("<ul><li>one<li>two</ul><p>next</p>");
    let tree = &doc.tree;
    assert_eq!(child_tags(tree, NodeId::ROOT), vec!["ul", "p"]);
    let ul = find(tree, "ul").unwrap();
    assert_eq!(child_tags(tree, ul), vec!["li"]);
}

#[test]
fn test_unmatched_end_tag_is_ignored() {
    let doc = parse("<div>a</span>b</div>");
    let div = find(&doc.tree, "div").unwrap();
    assert_eq!(doc.tree.text_content(div), "ab");
    assert_eq!(doc.issues.len(), 1);
    assert!(doc.issues[0].message.contains("</span>"));
    assert_eq!(doc.issues[0].offset, 6);
}

#[test]
fn test_void_end_tag_is_silent() {
    let doc = parse("<p>a<br></br>b</p>");
    assert!(doc.issues.is_empty());
}

#[test]
fn test_anonymous_end_tag_closes_current() {
    let doc = parse("<b>bold</>plain");
    let tree = &doc.tree;
    let b = find(tree, "b").unwrap();
    assert_eq!(tree.text_content(b), "bold");
    let last = *tree.children(NodeId::ROOT).last().unwrap();
    assert_eq!(tree.as_text(last), Some("plain"));

    let stray = parse("</>");
    assert_eq!(stray.issues.len(), 1);
}

#[test]
fn test_comments_and_cdata() {
    let doc = parse("<p><!-- note --><![CDATA[a < b]]></p>");
    let tree = &doc.tree;
    let p = find(tree, "p").unwrap();
    let kinds: Vec<_> = tree
        .children(p)
        .iter()
        .map(|&c| tree.get(c).unwrap().node_type.clone())
        .collect();
    assert!(matches!(&kinds[0], NodeType::Comment(c) if c == " note "));
    assert!(matches!(&kinds[1], NodeType::CData(c) if c == "a < b"));
    assert_eq!(tree.text_content(p), "a < b");

    let without = parse_document(
        "<p><!-- note --></p>",
        TreeBuilderConfig::default().keep_comments(false),
    );
    let p = find(&without.tree, "p").unwrap();
    assert!(without.tree.children(p).is_empty());
}

#[test]
fn test_entities_merge_into_text() {
    let doc = parse("<p>fish &amp; chips &#33;</p>");
    let tree = &doc.tree;
    let p = find(tree, "p").unwrap();
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "fish & chips !");
}

#[test]
fn test_unknown_entity_is_kept() {
    let doc = parse("<p>&bogus;</p>");
    let p = find(&doc.tree, "p").unwrap();
    assert_eq!(doc.tree.text_content(p), "&bogus;");
    assert_eq!(doc.issues.len(), 1);
}

#[test]
fn test_whitespace_between_tags() {
    let source = "<ul>\n  <li>a</li>\n</ul>";
    let doc = parse(source);
    let ul = find(&doc.tree, "ul").unwrap();
    assert_eq!(doc.tree.children(ul).len(), 1);

    let kept = parse_document(source, TreeBuilderConfig::default().keep_whitespace(true));
    let ul = find(&kept.tree, "ul").unwrap();
    assert_eq!(kept.tree.children(ul).len(), 3);
}

#[test]
fn test_space_between_entities_is_kept() {
    let doc = parse("<p>&lt; &gt;</p>");
    let p = find(&doc.tree, "p").unwrap();
    assert_eq!(doc.tree.text_content(p), "< >");
}

#[test]
fn test_doctype_is_skipped_and_pi_is_recorded() {
    let doc = parse("<!DOCTYPE html><?xml version=\"1.0\"?><html></html>");
    assert_eq!(child_tags(&doc.tree, NodeId::ROOT), vec!["html"]);
    assert_eq!(doc.tree.children(NodeId::ROOT).len(), 1);
    assert_eq!(doc.issues.len(), 1);
    assert!(doc.issues[0].message.contains("version=\"1.0\""));
    assert!(!doc.issues[0].is_error);
}

#[test]
fn test_tag_soup_recovers_at_next_tag() {
    let doc = parse("<a href=x <b>y</b></a>");
    let tree = &doc.tree;
    let a = find(tree, "a").unwrap();
    assert_eq!(tree.as_element(a).unwrap().attribute("href"), Some("x"));
    assert_eq!(child_tags(tree, a), vec!["b"]);
}

#[test]
fn test_malformed_tag_skips_to_tag_end() {
    let doc = parse(r#"<p "odd" class=x>text</p>"#);
    let tree = &doc.tree;
    let p = find(tree, "p").unwrap();
    assert!(tree.as_element(p).unwrap().attrs.is_empty());
    assert_eq!(tree.text_content(p), "text");
    assert_eq!(doc.issues.len(), 1);
    assert!(doc.issues[0].message.contains("malformed tag"));
}

#[test]
fn test_malformed_self_closing_tag() {
    let doc = parse(r#"<p = />after"#);
    let tree = &doc.tree;
    let p = find(tree, "p").unwrap();
    assert!(tree.children(p).is_empty());
    assert_eq!(doc.issues.len(), 1);
}

#[test]
fn test_stray_angle_bracket_is_text() {
    let doc = parse("<p>1 < 2</p>");
    let p = find(&doc.tree, "p").unwrap();
    assert_eq!(doc.tree.text_content(p), "1 < 2");
    assert_eq!(doc.issues.len(), 1);
}

#[test]
fn test_partial_input_reports_resume_offset() {
    let config = TreeBuilderConfig::default().with_scanner(ScannerConfig::default().partial(true));
    let doc = parse_document("<div><p cla", config);
    assert_eq!(doc.incomplete_at, Some(8));
    assert!(find(&doc.tree, "div").is_some());

    let complete = parse_document("<div><p class=a>", config);
    assert_eq!(complete.incomplete_at, None);
}

#[test]
fn test_unterminated_comment_with_error_detection() {
    let config =
        TreeBuilderConfig::default().with_scanner(ScannerConfig::default().detect_errors(true));
    let doc = parse_document("<p>a<!-- never closed", config);
    assert_eq!(doc.issues.len(), 1);
    assert!(doc.issues[0].is_error);
    assert_eq!(doc.issues[0].offset, 4);
}

#[test]
fn test_format_tree() {
    let doc = parse(r#"<div b="2" a>hi there<!--c--></div>"#);
    let dump = format_tree(&doc.tree, NodeId::ROOT, 0);
    assert_eq!(
        dump,
        "Document\n  <div a b=\"2\">\n    \"hi\u{00B7}there\"\n    <!--c-->\n"
    );
}
