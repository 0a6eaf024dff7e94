//! Indented tree dumps for debugging and the command line.

use std::fmt::Write;

use tern_dom::{DomTree, NodeId, NodeType};

/// Print the subtree at `id` to stdout, one node per line, indented two
/// spaces per level starting at `indent`.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    print!("{}", format_tree(tree, id, indent));
}

/// The dump [`print_tree`] prints. Attributes are sorted by name, spaces in
/// text are shown as `·` and newlines as `\n`.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId, indent: usize) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, id, indent);
    out
}

fn write_node(out: &mut String, tree: &DomTree, id: NodeId, indent: usize) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}Document"),
        NodeType::Element(data) => {
            let mut attrs: Vec<_> = data.attrs.iter().collect();
            attrs.sort();
            let mut line = format!("{prefix}<{}", data.tag_name);
            for (k, v) in attrs {
                let _ = if v.is_empty() {
                    write!(line, " {k}")
                } else {
                    write!(line, " {k}=\"{v}\"")
                };
            }
            writeln!(out, "{line}>")
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!--{data}-->"),
        NodeType::CData(data) => writeln!(out, "{prefix}<![CDATA[{data}]]>"),
    };
    for &child in tree.children(id) {
        write_node(out, tree, child, indent + 1);
    }
}
