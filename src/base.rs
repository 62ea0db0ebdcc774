//! Numeric types a sweep can run over.
//!
//! [`Base`] collects the arithmetic and elementary functions the built-in
//! opcodes need. Real floats get it through [`Float`]; complex numbers get it
//! behind the `complex` feature. Any other type can opt in by implementing
//! the trait directly.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{Float as NumFloat, FromPrimitive, One, Zero};

use crate::float::Float;

/// Numeric base type of a value sweep.
pub trait Base:
    Copy
    + Debug
    + PartialEq
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Embed a real constant (used for `Const` nodes).
    fn from_f64(v: f64) -> Self;
    /// `false` for NaN or infinite values (in any component).
    fn is_finite(self) -> bool;

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn powf(self, exp: Self) -> Self;

    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn asin(self) -> Self;
    fn acos(self) -> Self;
    fn atan(self) -> Self;

    fn sinh(self) -> Self;
    fn cosh(self) -> Self;
    fn tanh(self) -> Self;
}

impl<F: Float> Base for F {
    #[inline]
    fn from_f64(v: f64) -> Self {
        <F as FromPrimitive>::from_f64(v).unwrap_or_else(<F as NumFloat>::nan)
    }

    #[inline]
    fn is_finite(self) -> bool {
        NumFloat::is_finite(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        NumFloat::sqrt(self)
    }

    #[inline]
    fn exp(self) -> Self {
        NumFloat::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        NumFloat::ln(self)
    }

    #[inline]
    fn powf(self, exp: Self) -> Self {
        NumFloat::powf(self, exp)
    }

    #[inline]
    fn sin(self) -> Self {
        NumFloat::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        NumFloat::cos(self)
    }

    #[inline]
    fn tan(self) -> Self {
        NumFloat::tan(self)
    }

    #[inline]
    fn asin(self) -> Self {
        NumFloat::asin(self)
    }

    #[inline]
    fn acos(self) -> Self {
        NumFloat::acos(self)
    }

    #[inline]
    fn atan(self) -> Self {
        NumFloat::atan(self)
    }

    #[inline]
    fn sinh(self) -> Self {
        NumFloat::sinh(self)
    }

    #[inline]
    fn cosh(self) -> Self {
        NumFloat::cosh(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        NumFloat::tanh(self)
    }
}

#[cfg(feature = "complex")]
mod complex {
    use num_complex::Complex;
    use num_traits::Float as NumFloat;

    use super::Base;
    use crate::float::Float;

    impl<F: Float> Base for Complex<F> {
        #[inline]
        fn from_f64(v: f64) -> Self {
            Complex::new(<F as Base>::from_f64(v), F::zero())
        }

        #[inline]
        fn is_finite(self) -> bool {
            NumFloat::is_finite(self.re) && NumFloat::is_finite(self.im)
        }

        #[inline]
        fn sqrt(self) -> Self {
            Complex::sqrt(self)
        }

        #[inline]
        fn exp(self) -> Self {
            Complex::exp(self)
        }

        #[inline]
        fn ln(self) -> Self {
            Complex::ln(self)
        }

        #[inline]
        fn powf(self, exp: Self) -> Self {
            Complex::powc(self, exp)
        }

        #[inline]
        fn sin(self) -> Self {
            Complex::sin(self)
        }

        #[inline]
        fn cos(self) -> Self {
            Complex::cos(self)
        }

        #[inline]
        fn tan(self) -> Self {
            Complex::tan(self)
        }

        #[inline]
        fn asin(self) -> Self {
            Complex::asin(self)
        }

        #[inline]
        fn acos(self) -> Self {
            Complex::acos(self)
        }

        #[inline]
        fn atan(self) -> Self {
            Complex::atan(self)
        }

        #[inline]
        fn sinh(self) -> Self {
            Complex::sinh(self)
        }

        #[inline]
        fn cosh(self) -> Self {
            Complex::cosh(self)
        }

        #[inline]
        fn tanh(self) -> Self {
            Complex::tanh(self)
        }
    }
}
