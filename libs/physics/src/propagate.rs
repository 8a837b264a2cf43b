//! Dimension propagation rules applied at each operator of a quantity expression.
//!
//! Every function here takes its operands by reference (or consumes them) and
//! returns a fresh [`PhysicsModel`]; operands are never shared into a result.

use crate::dimension::Dimension;
use crate::error::{Error, Result};
use crate::physics::PhysicsModel;

/// Symbol of the angular dimension a cross product divides by.
pub const ANGLE_DIMENSION: &str = "rad";

/// Largest exponent magnitude a dimensioned base may be raised to.
pub const MAX_EXPONENT: f64 = (u128::BITS - 1) as f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdditiveOp {
    Plus,
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MultiplicativeOp {
    Multiply,
    Divide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VectorOp {
    Dot,
    Cross,
}

impl AdditiveOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AdditiveOp::Plus => "+",
            AdditiveOp::Minus => "-",
        }
    }
}

impl MultiplicativeOp {
    pub fn symbol(self) -> &'static str {
        match self {
            MultiplicativeOp::Multiply => "*",
            MultiplicativeOp::Divide => "/",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            MultiplicativeOp::Multiply => "multiplied",
            MultiplicativeOp::Divide => "divided",
        }
    }
}

impl VectorOp {
    pub fn keyword(self) -> &'static str {
        match self {
            VectorOp::Dot => "dot",
            VectorOp::Cross => "cross",
        }
    }
}

pub fn fold_additive(acc: f64, op: AdditiveOp, rhs: f64) -> f64 {
    match op {
        AdditiveOp::Plus => acc + rhs,
        AdditiveOp::Minus => acc - rhs,
    }
}

/// Constant-folds one `*` or `/` step. A zero right operand leaves the
/// accumulator unchanged.
pub fn fold_multiplicative(acc: f64, op: MultiplicativeOp, rhs: f64) -> f64 {
    if rhs == 0.0 {
        return acc;
    }
    match op {
        MultiplicativeOp::Multiply => acc * rhs,
        MultiplicativeOp::Divide => acc / rhs,
    }
}

pub fn ensure_same_dimensions(left: &PhysicsModel, right: &PhysicsModel) -> Result<()> {
    if left.dimensionally_equal(right) {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            left: left.to_string(),
            right: right.to_string(),
        })
    }
}

/// `left + right` or `left - right`. Both sides must carry the same dimensions.
pub fn add(left: PhysicsModel, op: AdditiveOp, right: &PhysicsModel) -> Result<PhysicsModel> {
    ensure_same_dimensions(&left, right)?;

    let mut result = left;
    result.identifier = None;
    result.value = fold_additive(result.value, op, right.value);
    result.is_constant = result.is_constant && right.is_constant;
    result.has_value = result.has_value || right.has_value;
    result.is_vector = result.is_vector || right.is_vector;
    Ok(result)
}

/// Running state of a multiplicative chain `f0 (*|/) f1 (*|/) ...`.
///
/// The value tracked is the product of the factors with a known value, whether
/// literals, constants or parenthesized sub-expressions that folded one.
/// Factors whose value is unknown contribute their dimensions but not their
/// value. A term with no known factor at all has value 0.
#[derive(Clone, Debug)]
pub struct Term {
    physics: PhysicsModel,
    coefficient: f64,
    has_number: bool,
    all_constant: bool,
    vectors: usize,
}

impl Term {
    pub fn new(negated: bool, first: &PhysicsModel) -> Result<Self> {
        let mut term = Self {
            physics: PhysicsModel::new(),
            coefficient: if negated { -1.0 } else { 1.0 },
            has_number: false,
            all_constant: true,
            vectors: 0,
        };
        if first.has_value {
            term.coefficient *= first.value;
            term.has_number = true;
        }
        term.absorb(None, first)?;
        Ok(term)
    }

    pub fn apply(&mut self, op: MultiplicativeOp, factor: &PhysicsModel) -> Result<()> {
        if factor.has_value {
            self.coefficient = fold_multiplicative(self.coefficient, op, factor.value);
            self.has_number = true;
        }
        self.absorb(Some(op), factor)
    }

    fn absorb(&mut self, op: Option<MultiplicativeOp>, factor: &PhysicsModel) -> Result<()> {
        if factor.is_vector {
            self.vectors += 1;
            if self.vectors > 1 {
                let verb = op.map(MultiplicativeOp::past_tense).unwrap_or("multiplied");
                return Err(Error::VectorProduct(verb));
            }
            self.physics.is_vector = true;
        }

        match op {
            None | Some(MultiplicativeOp::Multiply) => {
                self.physics.copy_numerator(factor)?;
                self.physics.copy_denominator(factor)?;
            }
            Some(MultiplicativeOp::Divide) => {
                self.physics.copy_numerator_to_denominator(factor)?;
                self.physics.copy_denominator_to_numerator(factor)?;
            }
        }
        self.all_constant &= factor.is_constant;
        Ok(())
    }

    pub fn value(&self) -> f64 {
        if self.has_number {
            self.coefficient
        } else {
            0.0
        }
    }

    pub fn vector_count(&self) -> usize {
        self.vectors
    }

    pub fn finish(self) -> PhysicsModel {
        let value = self.value();
        let mut physics = self.physics;
        physics.value = value;
        physics.is_constant = self.all_constant;
        physics.has_value = self.has_number;
        physics
    }
}

/// Raises `base` to `exponent`, consuming the base's model and returning its
/// replacement.
///
/// Every repetition multiplies a prime product by at least 2, so a dimensioned
/// base cannot be raised past `MAX_EXPONENT` without overflowing.
pub fn power(base: PhysicsModel, exponent: f64) -> Result<PhysicsModel> {
    if exponent == 0.0 {
        if base.is_constant && base.value == 0.0 {
            return Err(Error::ZeroToTheZero);
        }
        let mut collapsed = base.shallow_copy();
        collapsed.value = 1.0;
        collapsed.is_constant = true;
        collapsed.has_value = true;
        collapsed.is_vector = false;
        return Ok(collapsed);
    }

    let dimensioned = base.number_of_numerators() > 0 || base.number_of_denominators() > 0;
    if dimensioned && exponent != exponent.trunc() {
        return Err(Error::NonIntegerExponent(exponent));
    }
    if dimensioned && exponent.abs() > MAX_EXPONENT {
        return Err(Error::Overflow);
    }

    let mut result = base.shallow_copy();
    if base.value != 0.0 {
        result.value = base.value.powf(exponent);
    }

    if dimensioned {
        let times = exponent.abs() as u32;
        tracing::trace!(base = %base, exponent, "expanding dimensions");
        for _ in 0..times {
            if exponent < 0.0 {
                result.copy_numerator_to_denominator(&base)?;
                result.copy_denominator_to_numerator(&base)?;
            } else {
                result.copy_numerator(&base)?;
                result.copy_denominator(&base)?;
            }
        }
    }

    Ok(result)
}

/// `dot(left, right)` or `cross(left, right)`.
///
/// The result carries the dimensions of both operands. A cross product also
/// divides by `angle` and is itself a vector; a dot product is a scalar.
pub fn vector_product(
    op: VectorOp,
    left: &PhysicsModel,
    right: &PhysicsModel,
    angle: Option<&Dimension>,
) -> Result<PhysicsModel> {
    if !left.is_vector || !right.is_vector {
        return Err(Error::NonVectorOperand(op.keyword()));
    }

    let mut result = PhysicsModel::new();
    result.copy_numerator(left)?;
    result.copy_denominator(left)?;
    result.copy_numerator(right)?;
    result.copy_denominator(right)?;

    if op == VectorOp::Cross {
        let angle = angle.ok_or_else(|| Error::UnknownDimension(ANGLE_DIMENSION.to_string()))?;
        result.add_denominator_dimension(angle)?;
        result.is_vector = true;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::DimensionTable;

    fn quantity(table: &DimensionTable, symbol: &str) -> PhysicsModel {
        PhysicsModel::from_dimension(table.get(symbol).unwrap())
    }

    #[test]
    fn zero_operand_is_skipped() {
        assert_eq!(fold_multiplicative(6.0, MultiplicativeOp::Multiply, 0.0), 6.0);
        assert_eq!(fold_multiplicative(6.0, MultiplicativeOp::Divide, 0.0), 6.0);
        assert_eq!(fold_multiplicative(6.0, MultiplicativeOp::Divide, 2.0), 3.0);
    }

    #[test]
    fn term_tracks_known_coefficient() {
        let table = DimensionTable::si();
        let mut term = Term::new(true, &PhysicsModel::constant(3.0)).unwrap();
        term.apply(MultiplicativeOp::Multiply, &quantity(&table, "kg"))
            .unwrap();
        term.apply(MultiplicativeOp::Divide, &PhysicsModel::constant(2.0))
            .unwrap();
        let physics = term.finish();
        assert_eq!(physics.value, -1.5);
        assert!(!physics.is_constant);
        assert_eq!(physics.numerator_prime_product(), 3);
    }

    #[test]
    fn term_folds_parenthesized_values() {
        let table = DimensionTable::si();

        // (3 kg)
        let mut inner = Term::new(false, &PhysicsModel::constant(3.0)).unwrap();
        inner
            .apply(MultiplicativeOp::Multiply, &quantity(&table, "kg"))
            .unwrap();
        let three_kg = inner.finish();
        assert!(three_kg.has_value);
        assert!(!three_kg.is_constant);

        // 2 * (3 kg)
        let mut term = Term::new(false, &PhysicsModel::constant(2.0)).unwrap();
        term.apply(MultiplicativeOp::Multiply, &three_kg).unwrap();
        assert_eq!(term.finish().value, 6.0);

        // -(3 kg)
        let negated = Term::new(true, &three_kg).unwrap().finish();
        assert_eq!(negated.value, -3.0);

        // (3 kg + 2 kg) * 2
        let mut two_kg = quantity(&table, "kg");
        two_kg.value = 2.0;
        two_kg.has_value = true;
        let sum = add(three_kg, AdditiveOp::Plus, &two_kg).unwrap();
        assert!(sum.has_value);
        let mut term = Term::new(false, &sum).unwrap();
        term.apply(MultiplicativeOp::Multiply, &PhysicsModel::constant(2.0))
            .unwrap();
        assert_eq!(term.finish().value, 10.0);
    }

    #[test]
    fn term_without_numbers_has_zero_value() {
        let table = DimensionTable::si();
        let term = Term::new(false, &quantity(&table, "m")).unwrap();
        assert_eq!(term.value(), 0.0);
    }

    #[test]
    fn second_vector_in_term_is_rejected() {
        let table = DimensionTable::si();
        let velocity = quantity(&table, "m").vector();
        let mut term = Term::new(false, &velocity).unwrap();
        term.apply(MultiplicativeOp::Multiply, &PhysicsModel::constant(2.0))
            .unwrap();
        assert_eq!(
            term.apply(MultiplicativeOp::Divide, &velocity).unwrap_err(),
            Error::VectorProduct("divided")
        );
    }

    #[test]
    fn addition_requires_matching_dimensions() {
        let table = DimensionTable::si();
        let mut kg = quantity(&table, "kg");
        kg.value = 3.0;
        let sum = add(kg.clone(), AdditiveOp::Minus, &kg).unwrap();
        assert_eq!(sum.value, 0.0);
        assert!(matches!(
            add(kg, AdditiveOp::Plus, &quantity(&table, "m")),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn power_rules() {
        let table = DimensionTable::si();
        let mass = quantity(&table, "kg");

        let squared = power(mass.clone(), 2.0).unwrap();
        assert_eq!(squared.number_of_numerators(), 2);
        assert_eq!(squared.numerator_prime_product(), 9);

        let inverse = power(mass.clone(), -1.0).unwrap();
        assert_eq!(inverse.number_of_numerators(), 0);
        assert_eq!(inverse.denominator_prime_product(), 3);

        assert_eq!(
            power(mass, 0.5).unwrap_err(),
            Error::NonIntegerExponent(0.5)
        );
        assert_eq!(
            power(PhysicsModel::constant(0.0), 0.0).unwrap_err(),
            Error::ZeroToTheZero
        );

        let squared_speed = power(quantity(&table, "m").vector(), 2.0).unwrap();
        assert!(squared_speed.is_vector);
        let collapsed = power(quantity(&table, "m").vector(), 0.0).unwrap();
        assert!(!collapsed.is_vector);
        assert!(collapsed.has_value);

        let root = power(PhysicsModel::constant(9.0), 0.5).unwrap();
        assert!((root.value - 3.0).abs() < 1e-12);
        assert!(root.is_constant);
    }

    #[test]
    fn huge_exponent_overflows_up_front() {
        let table = DimensionTable::si();
        let mass = quantity(&table, "kg");
        assert_eq!(power(mass.clone(), 1e20).unwrap_err(), Error::Overflow);
        assert_eq!(power(mass.clone(), -200.0).unwrap_err(), Error::Overflow);
        assert_eq!(power(mass, MAX_EXPONENT + 1.0).unwrap_err(), Error::Overflow);

        // Only dimensioned bases are bounded.
        let big = power(PhysicsModel::constant(1.0), 1e20).unwrap();
        assert_eq!(big.value, 1.0);
    }

    #[test]
    fn cross_product_divides_by_angle() {
        let table = DimensionTable::si();
        let force = quantity(&table, "kg").vector();
        let arm = quantity(&table, "m").vector();
        let rad = table.get(ANGLE_DIMENSION);

        let torque = vector_product(VectorOp::Cross, &arm, &force, rad).unwrap();
        assert!(torque.is_vector);
        assert_eq!(torque.numerator_prime_product(), 6);
        assert_eq!(torque.denominator_prime_product(), 19);

        let work = vector_product(VectorOp::Dot, &arm, &force, rad).unwrap();
        assert!(!work.is_vector);
        assert!(work.denominator().is_empty());

        assert_eq!(
            vector_product(VectorOp::Dot, &arm, &quantity(&table, "s"), rad).unwrap_err(),
            Error::NonVectorOperand("dot")
        );
        assert_eq!(
            vector_product(VectorOp::Cross, &arm, &force, None).unwrap_err(),
            Error::UnknownDimension("rad".into())
        );
    }
}
