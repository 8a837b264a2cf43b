//! Identifier resolution for the parser
//!
//! The parser never owns symbol tables. It asks a [`ScopeResolver`] what an
//! identifier means: either a bound quantity (variable, parameter or
//! constant) or a base dimension from the dimension table. [`Scope`] is the
//! in-memory implementation, buildable from a JSON [`ScopeConfig`].

use crate::error::{Error, Result};
use newton_physics::{Dimension, DimensionTable, PhysicsModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trait for looking identifiers up during parsing
///
/// Implement this to parse against a symbol table the parser does not know
/// about, e.g. one produced by an earlier pass over invariant declarations.
///
/// # Example
///
/// ```rust,ignore
/// struct Declarations { table: DimensionTable, params: HashMap<String, PhysicsModel> }
///
/// impl ScopeResolver for Declarations {
///     fn lookup_physics(&self, name: &str) -> Option<&PhysicsModel> {
///         self.params.get(name)
///     }
///
///     fn lookup_dimension(&self, name: &str) -> Option<&Dimension> {
///         self.table.get(name)
///     }
/// }
/// ```
pub trait ScopeResolver {
    /// Physics bound to `name` in scope, if any.
    ///
    /// The parser copies the returned model before attaching it to the AST,
    /// so implementations may hand out shared references freely.
    fn lookup_physics(&self, name: &str) -> Option<&PhysicsModel>;

    /// Base dimension named (or symbolised) by `name`, if any.
    fn lookup_dimension(&self, name: &str) -> Option<&Dimension>;
}

/// A symbol table of named quantities over a dimension table
#[derive(Clone, Debug, Default)]
pub struct Scope {
    dimensions: DimensionTable,
    bindings: HashMap<String, PhysicsModel>,
}

impl Scope {
    pub fn new(dimensions: DimensionTable) -> Self {
        Self {
            dimensions,
            bindings: HashMap::new(),
        }
    }

    /// SI base dimensions (plus `rad`) and the constant `Pi`.
    pub fn si() -> Self {
        let mut scope = Self::new(DimensionTable::si());
        scope.bind_constant("Pi", std::f64::consts::PI);
        scope
    }

    pub fn dimensions(&self) -> &DimensionTable {
        &self.dimensions
    }

    pub fn dimensions_mut(&mut self) -> &mut DimensionTable {
        &mut self.dimensions
    }

    pub fn bind(&mut self, name: impl Into<String>, physics: PhysicsModel) {
        let name = name.into();
        tracing::trace!(identifier = %name, dimensions = %physics, "bound identifier");
        let physics = physics.with_identifier(name.clone());
        self.bindings.insert(name, physics);
    }

    pub fn bind_constant(&mut self, name: impl Into<String>, value: f64) {
        self.bind(name, PhysicsModel::constant(value));
    }

    /// Bind `name` to the quantity `numerator / denominator`, each given as
    /// dimension names or symbols. Repeated entries raise the power.
    pub fn bind_quantity(
        &mut self,
        name: impl Into<String>,
        numerator: &[impl AsRef<str>],
        denominator: &[impl AsRef<str>],
    ) -> Result<&PhysicsModel> {
        let name = name.into();
        let mut physics = PhysicsModel::new();
        for key in numerator {
            let dimension = self.require_dimension(key.as_ref())?;
            physics
                .add_numerator_dimension(dimension)
                .map_err(|e| Error::Config(format!("quantity '{}': {}", name, e)))?;
        }
        for key in denominator {
            let dimension = self.require_dimension(key.as_ref())?;
            physics
                .add_denominator_dimension(dimension)
                .map_err(|e| Error::Config(format!("quantity '{}': {}", name, e)))?;
        }
        self.bind(name.clone(), physics);
        self.bindings
            .get(&name)
            .ok_or_else(|| Error::Config(format!("quantity '{}' was not bound", name)))
    }

    fn require_dimension(&self, key: &str) -> Result<&Dimension> {
        self.dimensions
            .get(key)
            .ok_or_else(|| Error::Config(format!("unknown dimension '{}'", key)))
    }

    pub fn get(&self, name: &str) -> Option<&PhysicsModel> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Build a scope from its declarative form. Dimensions are registered
    /// first, in order, so their primes follow declaration order.
    pub fn from_config(config: &ScopeConfig) -> Result<Self> {
        let mut scope = if config.include_si {
            Self::si()
        } else {
            Self::default()
        };

        for dimension in &config.dimensions {
            scope
                .dimensions
                .insert(dimension.name.clone(), dimension.symbol.clone())
                .map_err(|e| Error::Config(e.to_string()))?;
        }
        for constant in &config.constants {
            scope.bind_constant(constant.name.clone(), constant.value);
        }
        for quantity in &config.quantities {
            scope.bind_quantity(
                quantity.name.clone(),
                quantity.numerator.as_slice(),
                quantity.denominator.as_slice(),
            )?;
            if let Some(physics) = scope.bindings.get_mut(&quantity.name) {
                physics.is_vector = quantity.vector;
                if let Some(value) = quantity.value {
                    physics.value = value;
                    physics.is_constant = true;
                    physics.has_value = true;
                }
            }
        }

        tracing::debug!(
            dimensions = scope.dimensions.len(),
            bindings = scope.bindings.len(),
            "loaded scope"
        );
        Ok(scope)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScopeConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }
}

impl ScopeResolver for Scope {
    fn lookup_physics(&self, name: &str) -> Option<&PhysicsModel> {
        self.bindings.get(name)
    }

    fn lookup_dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }
}

/// Declarative scope, as read from a JSON file:
///
/// ```json
/// {
///   "include_si": true,
///   "dimensions": [{ "name": "bit", "symbol": "b" }],
///   "constants": [{ "name": "g", "value": 9.81 }],
///   "quantities": [
///     { "name": "velocity", "numerator": ["m"], "denominator": ["s"], "vector": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub include_si: bool,
    pub dimensions: Vec<DimensionConfig>,
    pub constants: Vec<ConstantConfig>,
    pub quantities: Vec<QuantityConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionConfig {
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantConfig {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityConfig {
    pub name: String,
    #[serde(default)]
    pub numerator: Vec<String>,
    #[serde(default)]
    pub denominator: Vec<String>,
    #[serde(default)]
    pub vector: bool,
    /// A known value makes the quantity a constant.
    #[serde(default)]
    pub value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn si_scope_has_pi() {
        let scope = Scope::si();
        let pi = scope.lookup_physics("Pi").unwrap();
        assert!(pi.is_constant);
        assert!(pi.is_dimensionless());
        assert_eq!(scope.lookup_dimension("kg").unwrap().name, "kilogram");
    }

    #[test]
    fn bind_quantity_builds_dimensions() {
        let mut scope = Scope::si();
        let acceleration = scope
            .bind_quantity("acceleration", &["m"], &["s", "s"])
            .unwrap();
        assert_eq!(acceleration.to_string(), "m / s*s");
        assert_eq!(acceleration.identifier.as_deref(), Some("acceleration"));

        assert!(matches!(
            scope.bind_quantity("bogus", &["furlong"], &[] as &[&str]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn from_json() {
        let scope = Scope::from_json(
            r#"{
                "dimensions": [{ "name": "length", "symbol": "L" }, { "name": "time" }],
                "constants": [{ "name": "two", "value": 2.0 }],
                "quantities": [
                    { "name": "speed", "numerator": ["L"], "denominator": ["time"], "vector": true },
                    { "name": "c", "numerator": ["L"], "denominator": ["time"], "value": 3e8 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scope.dimensions().len(), 2);
        assert_eq!(scope.lookup_dimension("time").unwrap().prime, 3);
        let speed = scope.lookup_physics("speed").unwrap();
        assert!(speed.is_vector);
        assert!(!speed.is_constant);
        let c = scope.lookup_physics("c").unwrap();
        assert!(c.is_constant);
        assert_eq!(c.value, 3e8);
        assert!(c.dimensionally_equal(speed));
    }

    #[test]
    fn config_errors() {
        assert!(matches!(Scope::from_json("{"), Err(Error::Config(_))));
        assert!(matches!(
            Scope::from_json(r#"{ "include_si": true, "dimensions": [{ "name": "meter" }] }"#),
            Err(Error::Config(_))
        ));
    }
}
