//! Compilation front door
//!
//! [`Engine`] owns a [`Scope`] and caches compiled quantity expressions by
//! source text, so repeated invariants are only parsed once.

use crate::ast::AstNode;
use crate::error::Result;
use crate::parser::{ExpressionKind, Parser};
use crate::scope::Scope;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Parses Newton expressions against a fixed scope
pub struct Engine {
    scope: Scope,
    cache: Arc<Mutex<LruCache<String, Arc<AstNode>>>>,
}

impl Engine {
    pub fn new(scope: Scope) -> Self {
        Self::with_cache_capacity(scope, DEFAULT_CACHE_CAPACITY)
    }

    /// A capacity of 0 is treated as 1.
    pub fn with_cache_capacity(scope: Scope, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            scope,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Compile one quantity expression, reusing a cached tree when the same
    /// source was compiled before. Failures are not cached.
    pub fn compile_quantity(&self, source: &str) -> Result<Arc<AstNode>> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(ast) = cache.get(source) {
                tracing::trace!(source, "quantity cache hit");
                return Ok(ast.clone());
            }
        }

        let ast = Arc::new(Parser::from_source(source, &self.scope)?.parse_quantity()?);
        tracing::debug!(
            source,
            dimensions = %ast.physics_or_default(),
            parameters = ast.parameters().len(),
            "compiled quantity expression"
        );

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(source.to_string(), ast.clone());
        }
        Ok(ast)
    }

    pub fn compile_numeric(&self, source: &str) -> Result<AstNode> {
        let ast = Parser::from_source(source, &self.scope)?.parse_numeric()?;
        tracing::debug!(source, value = ast.value, "compiled numeric expression");
        Ok(ast)
    }

    /// Compile a `;`-separated list of expressions.
    pub fn compile_statements(&self, source: &str, kind: ExpressionKind) -> Result<Vec<AstNode>> {
        Parser::from_source(source, &self.scope)?.parse_statements(kind)
    }

    pub fn cached_expressions(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Scope::si())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_reuses_trees() {
        let engine = Engine::default();
        let first = engine.compile_quantity("3 kg + 2 kg").unwrap();
        let second = engine.compile_quantity("3 kg + 2 kg").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_expressions(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let engine = Engine::default();
        assert!(engine.compile_quantity("kg + m").is_err());
        assert_eq!(engine.cached_expressions(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let engine = Engine::with_cache_capacity(Scope::si(), 1);
        let kg = engine.compile_quantity("kg").unwrap();
        engine.compile_quantity("m").unwrap();
        assert_eq!(engine.cached_expressions(), 1);
        assert!(!Arc::ptr_eq(&kg, &engine.compile_quantity("kg").unwrap()));
    }
}
