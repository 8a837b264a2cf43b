//! Physical dimension algebra for Newton quantity expressions.
//!
//! A [`PhysicsModel`] records which base [`Dimension`]s a quantity carries in
//! its numerator and denominator, whether it is a vector, and its numeric value
//! when that is known at compile time. The [`propagate`] module holds the rules
//! the expression parser applies at every operator.

#![forbid(unsafe_code)]

mod dimension;
mod error;
mod physics;
pub mod propagate;

pub use dimension::{Dimension, DimensionTable};
pub use error::{Error, Result};
pub use physics::{DimensionList, PhysicsModel};
pub use propagate::{
    AdditiveOp, MultiplicativeOp, Term, VectorOp, ANGLE_DIMENSION, MAX_EXPONENT,
};
