//! DIOPI scalars (`diopiScalar_t`)

use super::dtype::DiopiDtype;

/// A tagged scalar: integral dtypes carry `ival`, floating dtypes `fval`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiopiScalar {
    pub stype: DiopiDtype,
    pub fval: f64,
    pub ival: i64,
}

impl DiopiScalar {
    pub fn from_f64(value: f64) -> Self {
        DiopiScalar {
            stype: DiopiDtype::Float64,
            fval: value,
            ival: 0,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        DiopiScalar {
            stype: DiopiDtype::Int64,
            fval: 0.0,
            ival: value,
        }
    }

    /// Read the active field and cast it to `T`
    pub fn value<T: FromScalar>(&self) -> T {
        if self.stype.is_integral() {
            T::from_i64(self.ival)
        } else {
            T::from_f64(self.fval)
        }
    }
}

/// Numeric cast out of either scalar field (`as` semantics)
pub trait FromScalar {
    fn from_i64(value: i64) -> Self;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl FromScalar for $ty {
                fn from_i64(value: i64) -> Self {
                    value as $ty
                }

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_from_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl FromScalar for bool {
    fn from_i64(value: i64) -> Self {
        value != 0
    }

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }
}
