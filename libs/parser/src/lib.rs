//! Newton expression parser
//!
//! Turns the text of Newton invariant and constraint expressions into ASTs
//! annotated with dimensional information.
//!
//! # Architecture Overview
//!
//! ```text
//! Expression String
//!      |
//!   Lexer -> TokenStream
//!      |
//!   Parser (+ ScopeResolver) -> AST, each node carrying a PhysicsModel
//!      |
//!   Visualize -> ASCII / DOT / Mermaid
//! ```
//!
//! Dimensional mistakes, such as adding a mass to a length, are reported
//! while parsing, with the location of the offending operator.
//!
//! ```rust,ignore
//! use newton_parser::{Engine, Scope};
//!
//! let engine = Engine::new(Scope::si());
//! let ast = engine.compile_quantity("3 kg + 2 kg")?;
//! assert_eq!(ast.value, 5.0);
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token;
pub mod visualize;

// Re-export main types
pub use ast::{AstNode, NodeKind, TerminalKind};
pub use engine::Engine;
pub use error::{Error, Result};
pub use newton_physics::{Dimension, DimensionTable, PhysicsModel};
pub use parser::{ExpressionKind, ParameterNumbering, Parser};
pub use scope::{Scope, ScopeConfig, ScopeResolver};
pub use token::{SourceLocation, Token, TokenStream, TokenType};
pub use visualize::{VisualizationFormat, Visualize};
