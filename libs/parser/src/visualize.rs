//! Visualization of annotated ASTs
//!
//! Supports multiple output formats:
//! - Mermaid diagrams (for markdown/web rendering)
//! - DOT/Graphviz (for generating PNG/SVG)
//! - ASCII tree (for terminal viewing)
//!
//! Labels carry the node kind, its value where known, its dimensions and
//! the parameter number of free identifiers.

use crate::ast::{AstNode, NodeKind};
use std::fmt::Write as FmtWrite;

/// Visualization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationFormat {
    /// Mermaid diagram format (renders in markdown, GitHub, etc.)
    Mermaid,
    /// DOT/Graphviz format (can be rendered with `dot` command)
    Dot,
    /// ASCII tree format (for terminal viewing)
    AsciiTree,
}

/// Trait for types that can be visualized
pub trait Visualize {
    /// Generate visualization in the specified format
    fn visualize(&self, format: VisualizationFormat) -> String;
}

impl Visualize for AstNode {
    fn visualize(&self, format: VisualizationFormat) -> String {
        match format {
            VisualizationFormat::Mermaid => visualize_ast_mermaid(self),
            VisualizationFormat::Dot => visualize_ast_dot(self),
            VisualizationFormat::AsciiTree => {
                let mut output = String::new();
                visit_ast_ascii(self, 0, &mut output);
                output
            }
        }
    }
}

fn visualize_ast_mermaid(node: &AstNode) -> String {
    let mut output = String::from("graph TD\n");
    let mut counter = 0;
    visit_ast_mermaid(node, &mut counter, None, &mut output);
    output
}

fn visit_ast_mermaid(
    node: &AstNode,
    counter: &mut usize,
    parent_id: Option<usize>,
    output: &mut String,
) {
    let current_id = *counter;
    *counter += 1;

    let _ = writeln!(output, "    n{}[\"{}\"]", current_id, ast_node_label(node));
    if let Some(parent) = parent_id {
        let _ = writeln!(output, "    n{} --> n{}", parent, current_id);
    }

    for child in &node.children {
        visit_ast_mermaid(child, counter, Some(current_id), output);
    }
}

fn visualize_ast_dot(node: &AstNode) -> String {
    let mut output = String::from("digraph AST {\n");
    output.push_str("    node [shape=box, style=rounded];\n");
    let mut counter = 0;
    visit_ast_dot(node, &mut counter, None, &mut output);
    output.push_str("}\n");
    output
}

fn visit_ast_dot(node: &AstNode, counter: &mut usize, parent_id: Option<usize>, output: &mut String) {
    let current_id = *counter;
    *counter += 1;

    let _ = writeln!(
        output,
        "    n{} [label=\"{}\"];",
        current_id,
        ast_node_label(node).replace('"', "\\\"")
    );
    if let Some(parent) = parent_id {
        let _ = writeln!(output, "    n{} -> n{};", parent, current_id);
    }

    for child in &node.children {
        visit_ast_dot(child, counter, Some(current_id), output);
    }
}

fn visit_ast_ascii(node: &AstNode, depth: usize, output: &mut String) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(output, "{}├─ {}", indent, ast_node_label(node));
    for child in &node.children {
        visit_ast_ascii(child, depth + 1, output);
    }
}

fn ast_node_label(node: &AstNode) -> String {
    let mut label = match (&node.kind, node.identifier.as_deref(), node.kind.operator()) {
        (_, Some(identifier), _) => format!("{}: {}", node.kind.name(), identifier),
        (NodeKind::Terminal(_), None, _) => format!("{}: {}", node.kind.name(), node.value),
        (_, None, Some(op)) => format!("{}: {}", node.kind.name(), op),
        _ => node.kind.name().to_string(),
    };

    if let Some(physics) = node.physics() {
        let _ = write!(label, " [{}]", physics);
        if physics.is_constant && !matches!(node.kind, NodeKind::Terminal(_)) {
            let _ = write!(label, " = {}", physics.value);
        }
        if physics.is_vector {
            label.push_str(" (vector)");
        }
    } else if matches!(node.kind, NodeKind::NumericExpression | NodeKind::Integer) {
        let _ = write!(label, " = {}", node.value);
    }

    if let Some(number) = node.parameter_number {
        let _ = write!(label, " #{}", number);
    }
    label
}
