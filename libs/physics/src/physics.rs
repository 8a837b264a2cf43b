use crate::dimension::Dimension;
use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;

pub type DimensionList = SmallVec<[Dimension; 4]>;

/// Dimensional and numeric state of a physical quantity.
///
/// The numerator and denominator are kept as separate lists. Each list is
/// summarised by the product of its dimensions' primes, so two models have the
/// same dimensions exactly when both products agree, whatever order the
/// dimensions were appended in. Every mutation goes through the `copy_*` /
/// `add_*` methods, which update list and product together.
///
/// `is_constant` marks literals and named constants. `has_value` is wider: it
/// is also set on any term or expression whose `value` was folded from at least
/// one known operand, such as `(3 kg)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsModel {
    pub identifier: Option<String>,
    numerator: DimensionList,
    denominator: DimensionList,
    numerator_prime_product: u128,
    denominator_prime_product: u128,
    pub is_vector: bool,
    pub is_constant: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_value: bool,
    pub value: f64,
}

impl Default for PhysicsModel {
    fn default() -> Self {
        Self {
            identifier: None,
            numerator: DimensionList::new(),
            denominator: DimensionList::new(),
            numerator_prime_product: 1,
            denominator_prime_product: 1,
            is_vector: false,
            is_constant: false,
            has_value: false,
            value: 0.0,
        }
    }
}

impl PhysicsModel {
    /// Dimensionless, not numerically known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensionless with a compile-time known value, e.g. a numeric literal.
    pub fn constant(value: f64) -> Self {
        Self {
            is_constant: true,
            has_value: true,
            value,
            ..Self::default()
        }
    }

    /// A quantity carrying exactly one base dimension in its numerator.
    pub fn from_dimension(dimension: &Dimension) -> Self {
        let mut model = Self {
            identifier: Some(dimension.name.clone()),
            ..Self::default()
        };
        model.numerator_prime_product = u128::from(dimension.prime);
        model.numerator.push(dimension.clone());
        model
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn vector(mut self) -> Self {
        self.is_vector = true;
        self
    }

    pub fn numerator(&self) -> &[Dimension] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[Dimension] {
        &self.denominator
    }

    pub fn numerator_prime_product(&self) -> u128 {
        self.numerator_prime_product
    }

    pub fn denominator_prime_product(&self) -> u128 {
        self.denominator_prime_product
    }

    pub fn number_of_numerators(&self) -> usize {
        self.numerator.len()
    }

    pub fn number_of_denominators(&self) -> usize {
        self.denominator.len()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.numerator_prime_product == 1 && self.denominator_prime_product == 1
    }

    pub fn dimensionally_equal(&self, other: &PhysicsModel) -> bool {
        self.numerator_prime_product == other.numerator_prime_product
            && self.denominator_prime_product == other.denominator_prime_product
    }

    pub fn add_numerator_dimension(&mut self, dimension: &Dimension) -> Result<()> {
        append(
            &mut self.numerator,
            &mut self.numerator_prime_product,
            std::slice::from_ref(dimension),
        )
    }

    pub fn add_denominator_dimension(&mut self, dimension: &Dimension) -> Result<()> {
        append(
            &mut self.denominator,
            &mut self.denominator_prime_product,
            std::slice::from_ref(dimension),
        )
    }

    pub fn copy_numerator(&mut self, src: &PhysicsModel) -> Result<()> {
        append(&mut self.numerator, &mut self.numerator_prime_product, &src.numerator)
    }

    pub fn copy_denominator(&mut self, src: &PhysicsModel) -> Result<()> {
        append(
            &mut self.denominator,
            &mut self.denominator_prime_product,
            &src.denominator,
        )
    }

    /// Used when `src` sits on the right of a division: its numerator lands in
    /// our denominator.
    pub fn copy_numerator_to_denominator(&mut self, src: &PhysicsModel) -> Result<()> {
        append(
            &mut self.denominator,
            &mut self.denominator_prime_product,
            &src.numerator,
        )
    }

    pub fn copy_denominator_to_numerator(&mut self, src: &PhysicsModel) -> Result<()> {
        append(
            &mut self.numerator,
            &mut self.numerator_prime_product,
            &src.denominator,
        )
    }

    /// Independent copy including both dimension lists.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Copy of the scalar state only: identifier, flags and value. The result
    /// carries no dimensions.
    pub fn shallow_copy(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            is_vector: self.is_vector,
            is_constant: self.is_constant,
            has_value: self.has_value,
            value: self.value,
            ..Self::default()
        }
    }
}

fn append(list: &mut DimensionList, product: &mut u128, dimensions: &[Dimension]) -> Result<()> {
    let updated = dimensions
        .iter()
        .try_fold(*product, |acc, d| acc.checked_mul(u128::from(d.prime)))
        .ok_or(Error::Overflow)?;
    list.extend(dimensions.iter().cloned());
    *product = updated;
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, list: &[Dimension]) -> fmt::Result {
    for (i, dimension) in list.iter().enumerate() {
        if i > 0 {
            f.write_str("*")?;
        }
        f.write_str(dimension.label())?;
    }
    Ok(())
}

impl fmt::Display for PhysicsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numerator.is_empty() {
            f.write_str("1")?;
        } else {
            write_list(f, &self.numerator)?;
        }
        if !self.denominator.is_empty() {
            f.write_str(" / ")?;
            write_list(f, &self.denominator)?;
        }
        Ok(())
    }
}
