//! tern: scan markup, run selectors against it and split style sheets.
//!
//! ```text
//! tern page.html                       # print the parsed tree
//! tern page.html --select 'div > p'    # list matching elements
//! tern page.html --path '//p[@id]'     # the same with path syntax
//! tern --html '<p>hi</p>' --tokens     # dump the SGML token stream
//! tern style.css --rules               # list style rules
//! ```

mod logging;

use std::fs;
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use tern_common::warning::clear_warnings;
use tern_css::parser::parse_stylesheet;
use tern_css::{Selector, Syntax, compile, select};
use tern_dom::{DomTree, NodeId, TreeNode};
use tern_scanner::{ScanMode, Scanner, ScannerConfig, Span, TokenKind};
use tern_sgml::{ParsedDocument, parse, print_tree};

/// tern: a precedence-aware markup scanner and selector engine
#[derive(Parser, Debug)]
#[command(name = "tern")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the parsed tree
    tern index.html

    # Elements matching a CSS selector, with specificity
    tern index.html --select 'ul > li:nth-child(odd)'

    # Path syntax
    tern --html '<a><b id=x/></a>' --path '/a/b[@id]'

    # Token stream as JSON
    tern --html '<p class=x>hi' --tokens --json

    # Style rules of a style sheet
    tern site.css --rules
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input file
    #[arg(value_name = "FILE")]
    path: Option<String>,

    /// Use this text as input instead of a file
    #[arg(long, value_name = "TEXT")]
    html: Option<String>,

    /// Select elements with a CSS selector
    #[arg(short, long, value_name = "SELECTOR", conflicts_with = "path_selector")]
    select: Option<String>,

    /// Select elements with a path selector such as `//div/p[1]`
    #[arg(short, long = "path", value_name = "SELECTOR")]
    path_selector: Option<String>,

    /// Print the token stream instead of the tree
    #[arg(short, long)]
    tokens: bool,

    /// Scan the input as CSS (with --tokens)
    #[arg(long)]
    css: bool,

    /// Treat the input as a style sheet and print its rules
    #[arg(short, long, conflicts_with_all = ["select", "path_selector", "tokens"])]
    rules: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// More tracing output (-v debug, -vv trace); `RUST_LOG` overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    clear_warnings();

    let input = read_input(&cli)?;

    if cli.tokens {
        let mode = if cli.css { ScanMode::Css } else { ScanMode::Sgml };
        return print_tokens(&input, mode, cli.json);
    }
    if cli.rules {
        return print_rules(&input, cli.json);
    }

    let query = cli
        .select
        .as_deref()
        .map(|text| (text, Syntax::Css))
        .or_else(|| cli.path_selector.as_deref().map(|text| (text, Syntax::Path)));
    let document = parse(&input);

    match query {
        Some((text, syntax)) => {
            let selector = match compile(text, syntax) {
                Ok(selector) => selector,
                Err(err) => {
                    eprintln!("{} {err}", "error:".red().bold());
                    process::exit(1);
                }
            };
            print_matches(&document.tree, &selector, cli.json)
        }
        None => {
            print_document(&document);
            Ok(())
        }
    }
}

/// Input text from `--html` or the file argument.
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(ref text) = cli.html {
        Ok(text.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    } else {
        bail!("expected a file path or --html")
    }
}

/// One token of `--tokens` output.
#[derive(Debug, Serialize)]
struct TokenReport {
    kind: TokenKind,
    span: Span,
    line: usize,
    text: String,
    value: String,
}

fn print_tokens(input: &str, mode: ScanMode, json: bool) -> Result<()> {
    let source = input.as_bytes();
    let config = ScannerConfig::default().count_lines(true);
    let tokens: Vec<TokenReport> = Scanner::with_config(source, mode, config)
        .map(|token| TokenReport {
            kind: token.kind,
            span: token.span,
            line: token.line,
            text: String::from_utf8_lossy(token.text(source)).into_owned(),
            value: token.value_str(source).into_owned(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }
    for token in &tokens {
        let position = format!("{}:{}..{}", token.line, token.span.start, token.span.end);
        let kind = token.kind.to_string();
        if token.kind.is_error() {
            println!("{position:>14} {:<22} {:?}", kind.red(), token.text);
        } else if token.value == token.text {
            println!("{position:>14} {kind:<22} {:?}", token.text);
        } else {
            println!("{position:>14} {kind:<22} {:?} value={:?}", token.text, token.value);
        }
    }
    Ok(())
}

/// A selected element in `--select`/`--path` output.
#[derive(Debug, Serialize)]
struct MatchedElement {
    /// `html > body > p#intro.lead`
    path: String,
    tag: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct MatchReport {
    selector: String,
    specificity: String,
    weight: u64,
    pseudo_element: Option<String>,
    matches: Vec<MatchedElement>,
}

fn print_matches(tree: &DomTree, selector: &Selector, json: bool) -> Result<()> {
    let matches: Vec<MatchedElement> = select(selector, tree.root_node())
        .into_iter()
        .map(|node| MatchedElement {
            path: ancestry(tree, node.id()),
            tag: node.tag_name().unwrap_or_default().to_owned(),
            text: node.text_content().trim().to_owned(),
        })
        .collect();
    let report = MatchReport {
        selector: selector.to_string(),
        specificity: selector.specificity_parts().to_string(),
        weight: selector.specificity(),
        pseudo_element: selector.pseudo_element().map(ToString::to_string),
        matches,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!(
        "{} specificity {} ({})",
        report.selector.bold(),
        report.specificity,
        report.weight
    );
    if let Some(ref pseudo) = report.pseudo_element {
        println!("pseudo-element ::{pseudo}");
    }
    println!("{} match(es)", report.matches.len());
    for element in &report.matches {
        if element.text.is_empty() {
            println!("  {}", element.path);
        } else {
            println!("  {}  {:?}", element.path, element.text);
        }
    }
    Ok(())
}

/// `tag#id.class` of each element from the document element down to `id`.
fn ancestry(tree: &DomTree, id: NodeId) -> String {
    let mut chain: Vec<NodeId> = tree.ancestors(id).collect();
    chain.reverse();
    chain.push(id);
    chain
        .into_iter()
        .filter_map(|node| tree.as_element(node))
        .map(|element| {
            let mut label = element.tag_name.clone();
            if let Some(id) = element.id() {
                label.push('#');
                label.push_str(id);
            }
            for class in element.classes() {
                label.push('.');
                label.push_str(class);
            }
            label
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

#[derive(Debug, Serialize)]
struct RuleReport {
    selectors: Vec<SelectorReport>,
    declarations: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SelectorReport {
    text: String,
    specificity: String,
}

#[derive(Debug, Serialize)]
struct IssueReport {
    offset: usize,
    message: String,
}

#[derive(Debug, Serialize)]
struct StylesheetReport {
    rules: Vec<RuleReport>,
    issues: Vec<IssueReport>,
}

fn print_rules(input: &str, json: bool) -> Result<()> {
    let sheet = parse_stylesheet(input);
    let report = StylesheetReport {
        rules: sheet
            .rules
            .iter()
            .map(|rule| RuleReport {
                selectors: rule
                    .selectors
                    .iter()
                    .map(|s| SelectorReport {
                        text: s.to_string(),
                        specificity: s.specificity_parts().to_string(),
                    })
                    .collect(),
                declarations: rule
                    .declarations
                    .iter()
                    .map(|d| {
                        let important = if d.important { " !important" } else { "" };
                        format!("{}: {}{important}", d.name, d.value)
                    })
                    .collect(),
            })
            .collect(),
        issues: sheet
            .issues
            .iter()
            .map(|i| IssueReport {
                offset: i.offset,
                message: i.message.clone(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("=== Rules ({}) ===", report.rules.len());
    for rule in &report.rules {
        let selectors: Vec<String> = rule
            .selectors
            .iter()
            .map(|s| format!("{} {}", s.text.bold(), s.specificity))
            .collect();
        println!("{}", selectors.join(", "));
        for declaration in &rule.declarations {
            println!("  {declaration};");
        }
    }
    if !report.issues.is_empty() {
        println!("\n=== Issues ===");
        for issue in &report.issues {
            println!("  - {} at byte {}", issue.message.yellow(), issue.offset);
        }
    }
    Ok(())
}

fn print_document(document: &ParsedDocument) {
    println!("=== DOM Tree ===");
    print_tree(&document.tree, document.tree.root(), 0);

    if !document.issues.is_empty() {
        println!("\n=== Parse Issues ===");
        for issue in &document.issues {
            let message = if issue.is_error {
                issue.message.red().to_string()
            } else {
                issue.message.yellow().to_string()
            };
            println!("  - {message} at byte {}", issue.offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestry_labels_ids_and_classes() {
        let tree = parse("<html><body><p id=intro class='lead big'>hi</p></body></html>").tree;
        let p = tree
            .descendants(NodeId::ROOT)
            .find(|&n| tree.as_element(n).is_some_and(|e| e.is("p")))
            .unwrap();
        let path = ancestry(&tree, p);
        assert!(path.starts_with("html > body > p#intro."));
        assert!(path.contains(".lead"));
        assert!(path.contains(".big"));
    }

    #[test]
    fn cli_rejects_two_selectors() {
        let result = Cli::try_parse_from(["tern", "x.html", "--select", "p", "--path", "//p"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_counts_verbosity() {
        let cli = Cli::try_parse_from(["tern", "--html", "<p>", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(read_input(&cli).unwrap(), "<p>");
    }

    #[test]
    fn match_report_is_json() {
        let tree = parse("<ul><li>a</li><li>b</li></ul>").tree;
        let selector = compile("li:last-child", Syntax::Css).unwrap();
        let matches: Vec<_> = select(&selector, tern_dom::NodeRef::new(&tree, NodeId::ROOT))
            .into_iter()
            .map(|node| ancestry(&tree, node.id()))
            .collect();
        assert_eq!(matches, vec!["ul > li"]);
        let element = MatchedElement {
            path: matches[0].clone(),
            tag: "li".to_owned(),
            text: "b".to_owned(),
        };
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["path"], "ul > li");
    }
}
