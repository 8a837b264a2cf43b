//! Rendering of compiled expressions for the terminal

use clap::ValueEnum;
use newton_parser::{AstNode, VisualizationFormat, Visualize};
use std::fmt::Write as FmtWrite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per expression: location, value, dimensions, parameters
    Summary,
    /// Indented AST
    Tree,
    /// Graphviz DOT
    Dot,
    /// Mermaid flowchart
    Mermaid,
}

pub fn render(file: &str, statements: &[AstNode], format: OutputFormat) -> String {
    let mut output = String::new();
    for statement in statements {
        match format {
            OutputFormat::Summary => summarize(&mut output, file, statement),
            OutputFormat::Tree => {
                output.push_str(&statement.visualize(VisualizationFormat::AsciiTree))
            }
            OutputFormat::Dot => output.push_str(&statement.visualize(VisualizationFormat::Dot)),
            OutputFormat::Mermaid => {
                output.push_str(&statement.visualize(VisualizationFormat::Mermaid))
            }
        }
    }
    output
}

fn summarize(output: &mut String, file: &str, statement: &AstNode) {
    let location = statement.location;
    let _ = write!(
        output,
        "{}:{}:{}\tvalue={}",
        file, location.line, location.column, statement.value
    );

    if let Some(physics) = statement.physics() {
        let _ = write!(output, "\tdimensions={}", physics);
        if physics.is_constant {
            output.push_str("\tconstant");
        }
        if physics.is_vector {
            output.push_str("\tvector");
        }
    }

    let parameters = statement.parameters();
    if !parameters.is_empty() {
        let list: Vec<String> = parameters
            .iter()
            .map(|(name, number)| format!("{}={}", name, number))
            .collect();
        let _ = write!(output, "\tparameters={}", list.join(","));
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use newton_parser::{Engine, ExpressionKind};

    #[test]
    fn test_summary_line() {
        let engine = Engine::default();
        let statements = engine
            .compile_statements("3 kg + 2 kg;\n2 * Pi", ExpressionKind::Quantity)
            .unwrap();
        let text = render("a.nt", &statements, OutputFormat::Summary);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a.nt:1:1\tvalue=5\tdimensions=kg");
        assert!(lines[1].starts_with("a.nt:2:1\tvalue=6.28"));
        assert!(lines[1].ends_with("\tdimensions=1\tconstant"));
    }

    #[test]
    fn test_numeric_summary_has_no_dimensions() {
        let engine = Engine::default();
        let statements = engine
            .compile_statements("(2 + 3) * 4", ExpressionKind::Numeric)
            .unwrap();
        assert_eq!(
            render("b.nt", &statements, OutputFormat::Summary),
            "b.nt:1:1\tvalue=20\n"
        );
    }
}
