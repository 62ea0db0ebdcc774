use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive};

/// Marker trait for real floating-point base types (`f32`, `f64`).
///
/// Every `Float` is a [`Base`](crate::Base) through a blanket impl, and is
/// also the component type accepted by the complex base impls.
pub trait Float:
    NumFloat + FloatConst + FromPrimitive + Copy + Send + Sync + Default + Debug + Display + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}
