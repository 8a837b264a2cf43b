//! Newton parser - converts token streams to annotated ASTs
//!
//! Recursive descent over two grammars that share the same shape:
//! numeric expressions (constants only, folded to a value) and quantity
//! expressions (dimensions propagated alongside the value). Precedence
//! (lowest to highest):
//! 1. additive (+, -)
//! 2. multiplicative (*, /), plus implicit multiplication in `3 kg`
//! 3. unary minus (leading a term)
//! 4. exponent (**)
//! 5. factor (identifier, number, vector operator, parenthesized)
//!
//! Every node with physical meaning gets its own [`PhysicsModel`], computed
//! bottom-up as the node is built. A propagation failure aborts the parse
//! with the location of the operator that caused it.

use crate::ast::{AstNode, NodeKind, TerminalKind};
use crate::error::{Error, Result};
use crate::scope::ScopeResolver;
use crate::token::{SourceLocation, Token, TokenStream, TokenType};
use newton_physics::propagate::{self, fold_additive, fold_multiplicative};
use newton_physics::{
    AdditiveOp, MultiplicativeOp, PhysicsModel, Term, VectorOp, ANGLE_DIMENSION,
};

const MAX_RECURSION_DEPTH: usize = 200;

/// Which grammar a statement list is parsed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Numeric,
    Quantity,
}

/// Assigns parameter numbers to free identifiers, in order of first
/// appearance. A repeated identifier keeps its first number.
#[derive(Debug, Clone, Default)]
pub struct ParameterNumbering {
    assigned: Vec<String>,
}

impl ParameterNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number_for(&mut self, identifier: &str) -> usize {
        if let Some(index) = self.assigned.iter().position(|a| a == identifier) {
            return index;
        }
        self.assigned.push(identifier.to_string());
        self.assigned.len() - 1
    }

    pub fn count(&self) -> usize {
        self.assigned.len()
    }

    pub fn reset(&mut self) {
        self.assigned.clear();
    }
}

/// Parser for Newton expressions
pub struct Parser<'s, R: ScopeResolver + ?Sized> {
    tokens: TokenStream,
    scope: &'s R,
    recursion_depth: usize,
}

impl<'s, R: ScopeResolver + ?Sized> Parser<'s, R> {
    pub fn new(tokens: TokenStream, scope: &'s R) -> Self {
        Self {
            tokens,
            scope,
            recursion_depth: 0,
        }
    }

    /// Tokenize `source` and create a parser over it
    pub fn from_source(source: &str, scope: &'s R) -> Result<Self> {
        Ok(Self::new(TokenStream::from_source(source)?, scope))
    }

    pub fn is_at_end(&self) -> bool {
        self.tokens.is_at_end()
    }

    /// Parse a single quantity expression spanning the whole input
    pub fn parse_quantity(&mut self) -> Result<AstNode> {
        let mut numbering = ParameterNumbering::new();
        let expression = self.parse_quantity_expression(&mut numbering)?;
        self.expect_end()?;
        Ok(expression)
    }

    /// Parse a single numeric expression spanning the whole input
    pub fn parse_numeric(&mut self) -> Result<AstNode> {
        let expression = self.parse_numeric_expression()?;
        self.expect_end()?;
        Ok(expression)
    }

    /// Parse `;`-separated expressions until end of input. Parameter
    /// numbering restarts for every statement.
    pub fn parse_statements(&mut self, kind: ExpressionKind) -> Result<Vec<AstNode>> {
        let mut statements = Vec::new();
        while !self.tokens.is_at_end() {
            if self.tokens.peek_is(1, TokenType::Semicolon) {
                self.tokens.advance();
                continue;
            }

            let statement = match kind {
                ExpressionKind::Numeric => self.parse_numeric_expression()?,
                ExpressionKind::Quantity => {
                    let mut numbering = ParameterNumbering::new();
                    self.parse_quantity_expression(&mut numbering)?
                }
            };
            statements.push(statement);

            if !self.tokens.is_at_end() {
                self.tokens.expect(TokenType::Semicolon)?;
            }
        }
        tracing::debug!(statements = statements.len(), ?kind, "parsed statements");
        Ok(statements)
    }

    fn expect_end(&self) -> Result<()> {
        if self.tokens.is_at_end() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn check_recursion_depth(&mut self) -> Result<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(Error::TooDeep(MAX_RECURSION_DEPTH));
        }
        Ok(())
    }

    fn decrement_recursion_depth(&mut self) {
        self.recursion_depth -= 1;
    }

    fn location(&self) -> SourceLocation {
        self.tokens.peek(1).location()
    }

    fn current_token_is(&self, token_type: TokenType) -> bool {
        self.tokens.peek_is(1, token_type)
    }

    fn current_token_is_one_of(&self, types: &[TokenType]) -> bool {
        types.contains(&self.tokens.peek(1).token_type)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = self.tokens.peek(1);
        Error::Syntax {
            expected: expected.to_string(),
            found: found.describe(),
            location: found.location(),
        }
    }

    fn peek_additive(&self) -> Option<AdditiveOp> {
        match self.tokens.peek(1).token_type {
            TokenType::Plus => Some(AdditiveOp::Plus),
            TokenType::Minus => Some(AdditiveOp::Minus),
            _ => None,
        }
    }

    fn peek_multiplicative(&self) -> Option<MultiplicativeOp> {
        match self.tokens.peek(1).token_type {
            TokenType::Multiply => Some(MultiplicativeOp::Multiply),
            TokenType::Divide => Some(MultiplicativeOp::Divide),
            _ => None,
        }
    }

    // ============================================
    // Numeric grammar
    // ============================================

    /// Parse numeric expression: numericTerm (('+' | '-') numericTerm)*
    pub fn parse_numeric_expression(&mut self) -> Result<AstNode> {
        self.check_recursion_depth()?;

        if !self.current_token_is_one_of(&[
            TokenType::Minus,
            TokenType::Identifier,
            TokenType::Number,
            TokenType::OpenParen,
        ]) {
            return Err(self.unexpected("numeric expression"));
        }

        let mut expression = AstNode::new(NodeKind::NumericExpression, self.location());
        let first = self.parse_numeric_term()?;
        let mut value = first.value;
        expression.add_child(first);

        while let Some(op) = self.peek_additive() {
            expression.add_child(self.parse_low_precedence_binary_op()?);
            let term = self.parse_numeric_term()?;
            value = fold_additive(value, op, term.value);
            expression.add_child(term);
        }

        expression.value = value;
        self.decrement_recursion_depth();
        Ok(expression)
    }

    /// Parse numeric term: ['-'] numericFactor (('*' | '/') numericFactor)*
    fn parse_numeric_term(&mut self) -> Result<AstNode> {
        let mut term = AstNode::new(NodeKind::Term, self.location());

        let mut sign = 1.0;
        if self.current_token_is(TokenType::Minus) {
            term.add_child(self.parse_unary_op()?);
            sign = -1.0;
        }

        let first = self.parse_numeric_factor()?;
        let mut value = sign * first.value;
        term.add_child(first);

        while let Some(op) = self.peek_multiplicative() {
            term.add_child(self.parse_mid_precedence_binary_op()?);
            let factor = self.parse_numeric_factor()?;
            value = fold_multiplicative(value, op, factor.value);
            term.add_child(factor);
        }

        term.value = value;
        Ok(term)
    }

    /// Parse numeric factor: (identifier | number | '(' numericExpression ')') ['**' exponent]
    fn parse_numeric_factor(&mut self) -> Result<AstNode> {
        let mut factor = AstNode::new(NodeKind::Factor, self.location());

        let atom = match self.tokens.peek(1).token_type {
            TokenType::Identifier => {
                let token = self.tokens.advance();
                let physics = self.resolve_identifier(&token)?;
                if !physics.is_constant {
                    return Err(Error::NotConstant {
                        location: token.location(),
                        name: token.value,
                    });
                }
                if !physics.is_dimensionless() {
                    return Err(Error::NotDimensionless {
                        location: token.location(),
                        dimensions: physics.to_string(),
                        name: token.value,
                    });
                }
                AstNode::terminal(TerminalKind::Identifier, &token).with_physics(physics)
            }
            TokenType::Number => self.parse_number()?,
            TokenType::OpenParen => {
                self.tokens.advance();
                let inner = self.parse_numeric_expression()?;
                self.tokens.expect(TokenType::CloseParen)?;
                inner
            }
            _ => return Err(self.unexpected("identifier, number or '('")),
        };
        factor.value = atom.value;
        factor.add_child(atom);

        if self.current_token_is(TokenType::Exponent) {
            factor.add_child(self.parse_high_precedence_binary_op()?);
            let exponent = self.parse_exponent()?;
            if factor.value == 0.0 && exponent.value == 0.0 {
                return Err(Error::Dimension {
                    source: newton_physics::Error::ZeroToTheZero,
                    location: exponent.location,
                });
            }
            factor.value = factor.value.powf(exponent.value);
            factor.add_child(exponent);
        }

        Ok(factor)
    }

    /// Parse exponent: integer | '(' numericExpression ')'
    fn parse_exponent(&mut self) -> Result<AstNode> {
        if self.current_token_is(TokenType::OpenParen) {
            self.tokens.advance();
            let inner = self.parse_numeric_expression()?;
            self.tokens.expect(TokenType::CloseParen)?;
            Ok(inner)
        } else {
            self.parse_integer()
        }
    }

    /// Parse integer: ['-'] number
    fn parse_integer(&mut self) -> Result<AstNode> {
        let mut integer = AstNode::new(NodeKind::Integer, self.location());

        let mut sign = 1.0;
        if self.current_token_is(TokenType::Minus) {
            integer.add_child(self.parse_unary_op()?);
            sign = -1.0;
        }

        if !self.current_token_is(TokenType::Number) {
            return Err(self.unexpected("integer exponent or '('"));
        }
        let number = self.parse_number()?;
        integer.value = sign * number.value;
        integer.add_child(number);
        Ok(integer)
    }

    fn parse_number(&mut self) -> Result<AstNode> {
        let token = self.tokens.expect(TokenType::Number)?;
        let value: f64 = token.value.parse().map_err(|_| Error::Lex {
            message: format!("Invalid number: {}", token.value),
            location: token.location(),
        })?;
        Ok(AstNode::terminal(TerminalKind::Number, &token).with_physics(PhysicsModel::constant(value)))
    }

    // ============================================
    // Quantity grammar
    // ============================================

    /// Parse quantity expression: quantityTerm (('+' | '-') quantityTerm)*
    ///
    /// All terms must be dimensionally equal.
    pub fn parse_quantity_expression(
        &mut self,
        numbering: &mut ParameterNumbering,
    ) -> Result<AstNode> {
        self.check_recursion_depth()?;

        if !self.current_token_is_one_of(&[
            TokenType::Minus,
            TokenType::Identifier,
            TokenType::Number,
            TokenType::OpenParen,
            TokenType::Dot,
            TokenType::Cross,
        ]) {
            return Err(self.unexpected("quantity expression"));
        }

        let mut expression = AstNode::new(NodeKind::QuantityExpression, self.location());
        let first = self.parse_quantity_term(numbering)?;
        let mut physics = first.physics_or_default();
        expression.add_child(first);

        while let Some(op) = self.peek_additive() {
            let operator = self.parse_low_precedence_binary_op()?;
            let location = operator.location;
            expression.add_child(operator);

            let term = self.parse_quantity_term(numbering)?;
            physics = propagate::add(physics, op, &term.physics_or_default())
                .map_err(|source| Error::Dimension { source, location })?;
            expression.add_child(term);
        }

        self.decrement_recursion_depth();
        Ok(expression.with_physics(physics))
    }

    /// Parse quantity term: ['-'] quantityFactor (('*' | '/') quantityFactor)*
    ///
    /// A number directly followed by a dimension name (`3 kg`) multiplies
    /// implicitly.
    fn parse_quantity_term(&mut self, numbering: &mut ParameterNumbering) -> Result<AstNode> {
        let mut node = AstNode::new(NodeKind::Term, self.location());

        let negated = self.current_token_is(TokenType::Minus);
        if negated {
            node.add_child(self.parse_unary_op()?);
        }

        let first = self.parse_quantity_factor(numbering)?;
        let mut previous_is_literal = is_number_literal(&first);
        let mut term = Term::new(negated, &first.physics_or_default()).map_err(|source| {
            Error::Dimension {
                source,
                location: first.location,
            }
        })?;
        node.add_child(first);

        loop {
            let (op, operator) = if let Some(op) = self.peek_multiplicative() {
                (op, self.parse_mid_precedence_binary_op()?)
            } else if previous_is_literal && self.next_is_dimension() {
                let op = MultiplicativeOp::Multiply;
                (op, AstNode::new(NodeKind::MidPrecedenceBinaryOp(op), self.location()))
            } else {
                break;
            };
            let location = operator.location;
            node.add_child(operator);

            let factor = self.parse_quantity_factor(numbering)?;
            term.apply(op, &factor.physics_or_default())
                .map_err(|source| Error::Dimension { source, location })?;
            previous_is_literal = is_number_literal(&factor);
            node.add_child(factor);
        }

        tracing::trace!(vectors = term.vector_count(), "finished term");
        Ok(node.with_physics(term.finish()))
    }

    fn next_is_dimension(&self) -> bool {
        let next = self.tokens.peek(1);
        next.token_type == TokenType::Identifier
            && self.scope.lookup_dimension(&next.value).is_some()
    }

    /// Parse quantity factor:
    /// (identifier | number | vectorOp | '(' quantityExpression ')') ['**' exponent]
    ///
    /// The exponent consumes the factor's model and replaces it.
    fn parse_quantity_factor(&mut self, numbering: &mut ParameterNumbering) -> Result<AstNode> {
        let mut factor = AstNode::new(NodeKind::Factor, self.location());

        let atom = match self.tokens.peek(1).token_type {
            TokenType::Identifier => self.parse_identifier_usage(numbering)?,
            TokenType::Number => self.parse_number()?,
            TokenType::Dot | TokenType::Cross => self.parse_vector_op(numbering)?,
            TokenType::OpenParen => {
                self.tokens.advance();
                let inner = self.parse_quantity_expression(numbering)?;
                self.tokens.expect(TokenType::CloseParen)?;
                inner
            }
            _ => return Err(self.unexpected("identifier, number, '(' or vector operator")),
        };
        factor.replace_physics(atom.physics_or_default());
        factor.add_child(atom);

        if self.current_token_is(TokenType::Exponent) {
            factor.add_child(self.parse_high_precedence_binary_op()?);
            let exponent = self.parse_exponent()?;
            let base = factor.take_physics().unwrap_or_default();
            let raised = propagate::power(base, exponent.value).map_err(|source| {
                Error::Dimension {
                    source,
                    location: exponent.location,
                }
            })?;
            factor.replace_physics(raised);
            factor.add_child(exponent);
        }

        Ok(factor)
    }

    /// Identifier used inside a quantity expression. Free identifiers get a
    /// parameter number: those that are not constants, carry dimensions and
    /// are not themselves dimension names.
    fn parse_identifier_usage(&mut self, numbering: &mut ParameterNumbering) -> Result<AstNode> {
        let token = self.tokens.expect(TokenType::Identifier)?;
        let physics = self.resolve_identifier(&token)?;
        let mut node = AstNode::terminal(TerminalKind::Identifier, &token);

        let is_dimension_name = self.scope.lookup_dimension(&token.value).is_some();
        if !physics.is_constant && !physics.is_dimensionless() && !is_dimension_name {
            let number = numbering.number_for(&token.value);
            tracing::trace!(identifier = %token.value, parameter = number, "numbered parameter");
            node.parameter_number = Some(number);
        }

        Ok(node.with_physics(physics))
    }

    /// Bound quantities shadow dimension names.
    fn resolve_identifier(&self, token: &Token) -> Result<PhysicsModel> {
        if let Some(physics) = self.scope.lookup_physics(&token.value) {
            return Ok(physics.deep_copy());
        }
        if let Some(dimension) = self.scope.lookup_dimension(&token.value) {
            return Ok(PhysicsModel::from_dimension(dimension));
        }
        Err(Error::UnknownIdentifier {
            name: token.value.clone(),
            location: token.location(),
        })
    }

    /// Parse vector operator: ('dot' | 'cross') '(' quantityExpression ',' quantityExpression ')'
    fn parse_vector_op(&mut self, numbering: &mut ParameterNumbering) -> Result<AstNode> {
        let op = match self.tokens.peek(1).token_type {
            TokenType::Dot => VectorOp::Dot,
            TokenType::Cross => VectorOp::Cross,
            _ => return Err(self.unexpected("'dot' or 'cross'")),
        };
        let keyword = self.tokens.advance();
        let mut node = AstNode::new(NodeKind::VectorOp(op), keyword.location());

        self.tokens.expect(TokenType::OpenParen)?;
        let left = self.parse_quantity_expression(numbering)?;
        self.tokens.expect(TokenType::Comma)?;
        let right = self.parse_quantity_expression(numbering)?;
        self.tokens.expect(TokenType::CloseParen)?;

        let angle = self.scope.lookup_dimension(ANGLE_DIMENSION);
        let physics = propagate::vector_product(
            op,
            &left.physics_or_default(),
            &right.physics_or_default(),
            angle,
        )
        .map_err(|source| Error::Dimension {
            source,
            location: node.location,
        })?;

        node.add_child(left);
        node.add_child(right);
        Ok(node.with_physics(physics))
    }

    // ============================================
    // Operator leaves
    // ============================================

    fn parse_unary_op(&mut self) -> Result<AstNode> {
        let token = self.tokens.expect(TokenType::Minus)?;
        Ok(AstNode::new(NodeKind::UnaryOp, token.location()))
    }

    fn parse_low_precedence_binary_op(&mut self) -> Result<AstNode> {
        let op = self
            .peek_additive()
            .ok_or_else(|| self.unexpected("'+' or '-'"))?;
        let token = self.tokens.advance();
        Ok(AstNode::new(NodeKind::LowPrecedenceBinaryOp(op), token.location()))
    }

    fn parse_mid_precedence_binary_op(&mut self) -> Result<AstNode> {
        let op = self
            .peek_multiplicative()
            .ok_or_else(|| self.unexpected("'*' or '/'"))?;
        let token = self.tokens.advance();
        Ok(AstNode::new(NodeKind::MidPrecedenceBinaryOp(op), token.location()))
    }

    fn parse_high_precedence_binary_op(&mut self) -> Result<AstNode> {
        let token = self.tokens.expect(TokenType::Exponent)?;
        Ok(AstNode::new(NodeKind::HighPrecedenceBinaryOp, token.location()))
    }
}

/// A factor that is a bare numeric literal with no exponent.
fn is_number_literal(factor: &AstNode) -> bool {
    factor.children.len() == 1 && factor.children[0].is_terminal(TerminalKind::Number)
}
