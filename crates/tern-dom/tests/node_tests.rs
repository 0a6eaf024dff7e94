//! Tests for tree construction and the `TreeNode` view of the arena.

use tern_dom::{DomTree, ElementData, NodeId, NodeKind, NodeType, TreeNode};

/// Helper to create an element node under `parent` and return its NodeId.
fn append_element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    tree.append_element(parent, ElementData::new(tag))
}

fn append_text(tree: &mut DomTree, parent: NodeId, text: &str) -> NodeId {
    let id = tree.alloc(NodeType::Text(text.to_string()));
    tree.append_child(parent, id);
    id
}

// ========== arena links ==========

#[test]
fn test_append_child_links_siblings() {
    let mut tree = DomTree::new();
    let div = append_element(&mut tree, NodeId::ROOT, "div");
    let a = append_element(&mut tree, div, "a");
    let b = append_element(&mut tree, div, "b");
    let c = append_element(&mut tree, div, "c");

    assert_eq!(tree.children(div), &[a, b, c]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.parent(b), Some(div));
    assert_eq!(tree.document_element(), Some(div));
}

#[test]
fn test_ancestors_and_preceding_siblings() {
    let mut tree = DomTree::new();
    let html = append_element(&mut tree, NodeId::ROOT, "html");
    let body = append_element(&mut tree, html, "body");
    let first = append_element(&mut tree, body, "p");
    let second = append_element(&mut tree, body, "p");
    let third = append_element(&mut tree, body, "p");

    let ancestors: Vec<_> = tree.ancestors(third).collect();
    assert_eq!(ancestors, vec![body, html, NodeId::ROOT]);

    let preceding: Vec<_> = tree.preceding_siblings(third).collect();
    assert_eq!(preceding, vec![second, first]);
}

#[test]
fn test_descendants_are_preorder() {
    let mut tree = DomTree::new();
    let div = append_element(&mut tree, NodeId::ROOT, "div");
    let p = append_element(&mut tree, div, "p");
    let em = append_element(&mut tree, p, "em");
    let span = append_element(&mut tree, div, "span");

    let order: Vec<_> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![NodeId::ROOT, div, p, em, span]);
}

#[test]
fn test_text_content_concatenates_text_and_cdata() {
    let mut tree = DomTree::new();
    let p = append_element(&mut tree, NodeId::ROOT, "p");
    let _ = append_text(&mut tree, p, "Hello, ");
    let b = append_element(&mut tree, p, "b");
    let _ = append_text(&mut tree, b, "world");
    let cdata = tree.alloc(NodeType::CData("!".to_string()));
    tree.append_child(p, cdata);
    let comment = tree.alloc(NodeType::Comment("hidden".to_string()));
    tree.append_child(p, comment);

    assert_eq!(tree.text_content(p), "Hello, world!");
}

// ========== element data ==========

#[test]
fn test_attribute_lookup_ignores_name_case() {
    let mut data = ElementData::new("A");
    let _ = data.attrs.insert("HREF".to_string(), "/index".to_string());
    let _ = data
        .attrs
        .insert("class".to_string(), "  nav   active ".to_string());

    assert_eq!(data.attribute("href"), Some("/index"));
    assert_eq!(data.attribute("missing"), None);
    assert!(data.is("a"));
    assert_eq!(data.classes().collect::<Vec<_>>(), vec!["nav", "active"]);
}

// ========== TreeNode ==========

#[test]
fn test_node_ref_kinds() {
    let mut tree = DomTree::new();
    let p = append_element(&mut tree, NodeId::ROOT, "p");
    let text = append_text(&mut tree, p, "hi");

    assert_eq!(tree.root_node().node_type(), NodeKind::Root);
    assert_eq!(tree.node(p).node_type(), NodeKind::Element);
    assert_eq!(tree.node(text).node_type(), NodeKind::Text);
    assert_eq!(tree.node(p).tag_name(), Some("p"));
    assert_eq!(tree.node(text).tag_name(), None);
    assert!(tree.node(p).is_element());
}

#[test]
fn test_node_ref_navigation() {
    let mut tree = DomTree::new();
    let ul = append_element(&mut tree, NodeId::ROOT, "ul");
    let one = append_element(&mut tree, ul, "li");
    let two = append_element(&mut tree, ul, "li");

    let node = tree.node(two);
    assert_eq!(node.parent(), Some(tree.node(ul)));
    assert_eq!(
        node.preceding_siblings().collect::<Vec<_>>(),
        vec![tree.node(one)]
    );
    assert_eq!(tree.node(ul).children().count(), 2);
    assert_eq!(tree.root_node().parent(), None);
}

#[test]
fn test_node_ref_text_content() {
    let mut tree = DomTree::new();
    let p = append_element(&mut tree, NodeId::ROOT, "p");
    let text = append_text(&mut tree, p, "plain");

    assert_eq!(tree.node(text).text_content(), "plain");
    assert_eq!(tree.node(p).text_content(), "plain");
}

#[test]
fn test_node_ref_equality_is_per_tree() {
    let mut first = DomTree::new();
    let mut second = DomTree::new();
    let a = append_element(&mut first, NodeId::ROOT, "a");
    let b = append_element(&mut second, NodeId::ROOT, "a");

    assert_eq!(a, b);
    assert_eq!(first.node(a), first.node(a));
    assert_ne!(first.node(a), second.node(b));
}
