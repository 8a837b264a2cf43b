//! Abstract Syntax Tree (AST) representation
//!
//! The tree mirrors the Newton expression grammar one node per production:
//!
//! ```text
//! numericExpression  := numericTerm  (('+' | '-') numericTerm)*
//! numericTerm        := ['-'] numericFactor (('*' | '/') numericFactor)*
//! numericFactor      := (identifier | number | '(' numericExpression ')') ['**' exponent]
//!
//! quantityExpression := quantityTerm (('+' | '-') quantityTerm)*
//! quantityTerm       := ['-'] quantityFactor (('*' | '/') quantityFactor)*
//! quantityFactor     := (identifier | number | vectorOp | '(' quantityExpression ')') ['**' exponent]
//! vectorOp           := ('dot' | 'cross') '(' quantityExpression ',' quantityExpression ')'
//!
//! exponent           := integer | '(' numericExpression ')'
//! integer            := ['-'] number
//! ```
//!
//! Operator tokens are kept as leaf nodes between their operands, so a term's
//! children alternate factor, operator, factor, ...

use crate::token::{SourceLocation, Token};
use newton_physics::{AdditiveOp, MultiplicativeOp, PhysicsModel, VectorOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    Identifier,
    Number,
}

/// Node kinds, one per grammar production plus the operator leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    NumericExpression,
    QuantityExpression,
    Term,
    Factor,
    /// Leading `-` of a term or integer
    UnaryOp,
    /// `+` or `-` between terms
    LowPrecedenceBinaryOp(AdditiveOp),
    /// `*` or `/` between factors
    MidPrecedenceBinaryOp(MultiplicativeOp),
    /// `**`
    HighPrecedenceBinaryOp,
    Integer,
    VectorOp(VectorOp),
    Terminal(TerminalKind),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::NumericExpression => "NumericExpression",
            NodeKind::QuantityExpression => "QuantityExpression",
            NodeKind::Term => "Term",
            NodeKind::Factor => "Factor",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::LowPrecedenceBinaryOp(_) => "LowPrecedenceBinaryOp",
            NodeKind::MidPrecedenceBinaryOp(_) => "MidPrecedenceBinaryOp",
            NodeKind::HighPrecedenceBinaryOp => "HighPrecedenceBinaryOp",
            NodeKind::Integer => "Integer",
            NodeKind::VectorOp(_) => "VectorOp",
            NodeKind::Terminal(TerminalKind::Identifier) => "Identifier",
            NodeKind::Terminal(TerminalKind::Number) => "Number",
        }
    }

    /// Source text of an operator node, if this is one.
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            NodeKind::UnaryOp => Some("-"),
            NodeKind::LowPrecedenceBinaryOp(op) => Some(op.symbol()),
            NodeKind::MidPrecedenceBinaryOp(op) => Some(op.symbol()),
            NodeKind::HighPrecedenceBinaryOp => Some("**"),
            NodeKind::VectorOp(op) => Some(op.keyword()),
            _ => None,
        }
    }
}

/// AST node for a Newton expression
///
/// Each node owns its children and, for nodes with physical meaning, its own
/// [`PhysicsModel`]. Models are never shared between nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub children: Vec<AstNode>,
    pub physics: Option<PhysicsModel>,
    pub value: f64,
    /// Position of a free identifier among the expression's parameters
    pub parameter_number: Option<usize>,
    pub identifier: Option<String>,
    pub location: SourceLocation,
}

impl AstNode {
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Self {
            kind,
            children: Vec::new(),
            physics: None,
            value: 0.0,
            parameter_number: None,
            identifier: None,
            location,
        }
    }

    /// Leaf for an identifier or number token.
    pub fn terminal(kind: TerminalKind, token: &Token) -> Self {
        let mut node = Self::new(NodeKind::Terminal(kind), token.location());
        if kind == TerminalKind::Identifier {
            node.identifier = Some(token.value.clone());
        }
        node
    }

    pub fn add_child(&mut self, child: AstNode) {
        self.children.push(child);
    }

    pub fn with_physics(mut self, physics: PhysicsModel) -> Self {
        self.value = physics.value;
        self.physics = Some(physics);
        self
    }

    pub fn physics(&self) -> Option<&PhysicsModel> {
        self.physics.as_ref()
    }

    pub fn take_physics(&mut self) -> Option<PhysicsModel> {
        self.physics.take()
    }

    /// Install a new model, returning the old one. The node's value follows
    /// the new model.
    pub fn replace_physics(&mut self, physics: PhysicsModel) -> Option<PhysicsModel> {
        self.value = physics.value;
        self.physics.replace(physics)
    }

    /// Copy of this node's model, or a dimensionless one if it has none.
    pub fn physics_or_default(&self) -> PhysicsModel {
        self.physics.clone().unwrap_or_default()
    }

    pub fn is_constant(&self) -> bool {
        self.physics.as_ref().map_or(true, |p| p.is_constant)
    }

    pub fn is_terminal(&self, kind: TerminalKind) -> bool {
        self.kind == NodeKind::Terminal(kind)
    }

    /// Pre-order traversal of this node and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Free identifiers with their parameter numbers, in number order.
    pub fn parameters(&self) -> Vec<(&str, usize)> {
        let mut parameters: Vec<(&str, usize)> = self
            .walk()
            .filter_map(|node| Some((node.identifier.as_deref()?, node.parameter_number?)))
            .collect();
        parameters.sort_by_key(|(_, number)| *number);
        parameters.dedup();
        parameters
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str, column: usize) -> Token {
        Token::new(TokenType::Identifier, name.into(), column - 1, 1, column)
    }

    #[test]
    fn walk_is_preorder() {
        let mut term = AstNode::new(NodeKind::Term, SourceLocation::default());
        let mut factor = AstNode::new(NodeKind::Factor, SourceLocation::default());
        factor.add_child(AstNode::terminal(TerminalKind::Identifier, &ident("a", 1)));
        term.add_child(factor);
        term.add_child(AstNode::new(
            NodeKind::MidPrecedenceBinaryOp(MultiplicativeOp::Multiply),
            SourceLocation::default(),
        ));
        term.add_child(AstNode::terminal(TerminalKind::Identifier, &ident("b", 5)));

        let kinds: Vec<&str> = term.walk().map(|n| n.kind.name()).collect();
        assert_eq!(
            kinds,
            vec!["Term", "Factor", "Identifier", "MidPrecedenceBinaryOp", "Identifier"]
        );
    }

    #[test]
    fn parameters_are_ordered_and_unique() {
        let mut root = AstNode::new(NodeKind::Term, SourceLocation::default());
        for (name, number) in [("y", 1), ("x", 0), ("x", 0)] {
            let mut leaf = AstNode::terminal(TerminalKind::Identifier, &ident(name, 1));
            leaf.parameter_number = Some(number);
            root.add_child(leaf);
        }
        root.add_child(AstNode::terminal(TerminalKind::Identifier, &ident("Pi", 9)));
        assert_eq!(root.parameters(), vec![("x", 0), ("y", 1)]);
    }

    #[test]
    fn replace_physics_updates_value() {
        let mut node = AstNode::new(NodeKind::Factor, SourceLocation::default())
            .with_physics(PhysicsModel::constant(2.0));
        let old = node.replace_physics(PhysicsModel::constant(8.0)).unwrap();
        assert_eq!(old.value, 2.0);
        assert_eq!(node.value, 8.0);
        assert_eq!(node.take_physics().unwrap().value, 8.0);
        assert!(node.physics().is_none());
    }
}
