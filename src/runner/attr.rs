//! Operator attribute values

use crate::diopi::DiopiScalar;

/// The closed set of attribute kinds ACL operators accept
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    Str(String),
    ListInt(Vec<i64>),
}

impl AttrValue {
    /// Integral scalars become `Int`, floating ones `Float`
    pub fn from_scalar(scalar: &DiopiScalar) -> Self {
        if scalar.stype.is_integral() {
            AttrValue::Int(scalar.value::<i64>())
        } else {
            AttrValue::Float(scalar.value::<f32>())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Bool(_) => "bool",
            AttrValue::Str(_) => "string",
            AttrValue::ListInt(_) => "list_int",
        }
    }
}

macro_rules! int_attr {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    AttrValue::Int(i64::from(value))
                }
            }
        )*
    };
}

int_attr!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Str(value.clone())
    }
}

impl<T: Copy + Into<i64>> From<&[T]> for AttrValue {
    fn from(values: &[T]) -> Self {
        AttrValue::ListInt(values.iter().map(|v| (*v).into()).collect())
    }
}

impl<T: Copy + Into<i64>> From<Vec<T>> for AttrValue {
    fn from(values: Vec<T>) -> Self {
        AttrValue::from(values.as_slice())
    }
}

impl<T: Copy + Into<i64>, const N: usize> From<[T; N]> for AttrValue {
    fn from(values: [T; N]) -> Self {
        AttrValue::from(&values[..])
    }
}
