//! DIOPI element types

use std::fmt;

/// Logical element type of a DIOPI tensor (`diopiDtype_t`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiopiDtype {
    Int8 = 0,
    Uint8 = 1,
    Int16 = 2,
    Uint16 = 3,
    Int32 = 4,
    Uint32 = 5,
    Int64 = 6,
    Uint64 = 7,
    Float16 = 8,
    Float32 = 9,
    Float64 = 10,
    Bool = 11,
    Bfloat16 = 12,
    Tfloat32 = 13,
}

impl DiopiDtype {
    pub const ALL: [DiopiDtype; 14] = [
        DiopiDtype::Int8,
        DiopiDtype::Uint8,
        DiopiDtype::Int16,
        DiopiDtype::Uint16,
        DiopiDtype::Int32,
        DiopiDtype::Uint32,
        DiopiDtype::Int64,
        DiopiDtype::Uint64,
        DiopiDtype::Float16,
        DiopiDtype::Float32,
        DiopiDtype::Float64,
        DiopiDtype::Bool,
        DiopiDtype::Bfloat16,
        DiopiDtype::Tfloat32,
    ];

    /// Decode a raw `diopiDtype_t`; `None` for values outside the enum
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|dtype| *dtype as i32 == raw)
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Integer types, bool included
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            DiopiDtype::Bool
                | DiopiDtype::Int8
                | DiopiDtype::Uint8
                | DiopiDtype::Int16
                | DiopiDtype::Uint16
                | DiopiDtype::Int32
                | DiopiDtype::Uint32
                | DiopiDtype::Int64
                | DiopiDtype::Uint64
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            DiopiDtype::Float16
                | DiopiDtype::Float32
                | DiopiDtype::Float64
                | DiopiDtype::Bfloat16
                | DiopiDtype::Tfloat32
        )
    }

    /// Storage size of one element in bytes
    pub fn element_size(self) -> usize {
        match self {
            DiopiDtype::Int8 | DiopiDtype::Uint8 | DiopiDtype::Bool => 1,
            DiopiDtype::Int16 | DiopiDtype::Uint16 | DiopiDtype::Float16 | DiopiDtype::Bfloat16 => 2,
            DiopiDtype::Int32 | DiopiDtype::Uint32 | DiopiDtype::Float32 | DiopiDtype::Tfloat32 => 4,
            DiopiDtype::Int64 | DiopiDtype::Uint64 | DiopiDtype::Float64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiopiDtype::Int8 => "diopi_dtype_int8",
            DiopiDtype::Uint8 => "diopi_dtype_uint8",
            DiopiDtype::Int16 => "diopi_dtype_int16",
            DiopiDtype::Uint16 => "diopi_dtype_uint16",
            DiopiDtype::Int32 => "diopi_dtype_int32",
            DiopiDtype::Uint32 => "diopi_dtype_uint32",
            DiopiDtype::Int64 => "diopi_dtype_int64",
            DiopiDtype::Uint64 => "diopi_dtype_uint64",
            DiopiDtype::Float16 => "diopi_dtype_float16",
            DiopiDtype::Float32 => "diopi_dtype_float32",
            DiopiDtype::Float64 => "diopi_dtype_float64",
            DiopiDtype::Bool => "diopi_dtype_bool",
            DiopiDtype::Bfloat16 => "diopi_dtype_bfloat16",
            DiopiDtype::Tfloat32 => "diopi_dtype_tfloat32",
        }
    }
}

impl fmt::Display for DiopiDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
