//! ACL enumerations and opaque handle types
//!
//! Discriminants match `acl/acl_base.h` and `acl/acl_op_compiler.h` so the
//! enums can cross the FFI boundary as plain `i32`.

use std::ffi::c_void;
use std::fmt;
use std::ptr::{self, NonNull};

/// `ACL_SUCCESS`
pub const ACL_SUCCESS: i32 = 0;

/// Native ACL element type (`aclDataType`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclDataType {
    Undefined = -1,
    Float = 0,
    Float16 = 1,
    Int8 = 2,
    Int32 = 3,
    Uint8 = 4,
    Int16 = 6,
    Uint16 = 7,
    Uint32 = 8,
    Int64 = 9,
    Uint64 = 10,
    Double = 11,
    Bool = 12,
    String = 13,
}

impl AclDataType {
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for AclDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AclDataType::Undefined => "ACL_DT_UNDEFINED",
            AclDataType::Float => "ACL_FLOAT",
            AclDataType::Float16 => "ACL_FLOAT16",
            AclDataType::Int8 => "ACL_INT8",
            AclDataType::Int32 => "ACL_INT32",
            AclDataType::Uint8 => "ACL_UINT8",
            AclDataType::Int16 => "ACL_INT16",
            AclDataType::Uint16 => "ACL_UINT16",
            AclDataType::Uint32 => "ACL_UINT32",
            AclDataType::Int64 => "ACL_INT64",
            AclDataType::Uint64 => "ACL_UINT64",
            AclDataType::Double => "ACL_DOUBLE",
            AclDataType::Bool => "ACL_BOOL",
            AclDataType::String => "ACL_STRING",
        };
        f.write_str(name)
    }
}

/// Memory layout tag attached to a tensor descriptor (`aclFormat`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclFormat {
    Undefined = -1,
    Nchw = 0,
    Nhwc = 1,
    Nd = 2,
    Nc1hwc0 = 3,
    FractalZ = 4,
    Nc1hwc0C04 = 12,
    Hwcn = 16,
    Ndhwc = 27,
    FractalNz = 29,
    Ncdhw = 30,
    Ndc1hwc0 = 32,
    FractalZ3d = 33,
}

impl AclFormat {
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for AclFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AclFormat::Undefined => "ACL_FORMAT_UNDEFINED",
            AclFormat::Nchw => "ACL_FORMAT_NCHW",
            AclFormat::Nhwc => "ACL_FORMAT_NHWC",
            AclFormat::Nd => "ACL_FORMAT_ND",
            AclFormat::Nc1hwc0 => "ACL_FORMAT_NC1HWC0",
            AclFormat::FractalZ => "ACL_FORMAT_FRACTAL_Z",
            AclFormat::Nc1hwc0C04 => "ACL_FORMAT_NC1HWC0_C04",
            AclFormat::Hwcn => "ACL_FORMAT_HWCN",
            AclFormat::Ndhwc => "ACL_FORMAT_NDHWC",
            AclFormat::FractalNz => "ACL_FORMAT_FRACTAL_NZ",
            AclFormat::Ncdhw => "ACL_FORMAT_NCDHW",
            AclFormat::Ndc1hwc0 => "ACL_FORMAT_NDC1HWC0",
            AclFormat::FractalZ3d => "ACL_FRACTAL_Z_3D",
        };
        f.write_str(name)
    }
}

/// Engine the operator compiler targets (`aclopEngineType`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AclEngineType {
    /// Let the runtime pick
    #[default]
    Sys = 0,
    AiCore = 1,
    Vector = 2,
}

/// Operator compile mode (`aclopCompileType`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AclCompileType {
    /// Compile against the operators registered with the runtime
    #[default]
    Sys = 0,
    Unregistered = 1,
}

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonNull<c_void>);

        impl $name {
            /// Wrap a raw pointer returned by the runtime; `None` if null
            pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
                NonNull::new(ptr).map(Self)
            }

            pub fn as_ptr(self) -> *mut c_void {
                self.0.as_ptr()
            }
        }
    };
}

opaque_handle!(
    /// `aclTensorDesc*`
    TensorDescHandle
);
opaque_handle!(
    /// `aclDataBuffer*`
    DataBufferHandle
);
opaque_handle!(
    /// `aclopAttr*`
    OpAttrHandle
);

/// `aclrtStream`. Null selects the device's default stream.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(*mut c_void);

impl StreamHandle {
    pub const DEFAULT: StreamHandle = StreamHandle(ptr::null_mut());

    pub fn from_raw(ptr: *mut c_void) -> Self {
        StreamHandle(ptr)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_default(self) -> bool {
        self.0.is_null()
    }
}

impl Default for StreamHandle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything one `aclopCompileAndExecute` call consumes.
///
/// Descriptor and buffer slices are parallel: entry `i` of each describes
/// the same tensor.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteRequest<'r> {
    pub op_type: &'r str,
    pub input_descs: &'r [TensorDescHandle],
    pub input_buffers: &'r [DataBufferHandle],
    pub output_descs: &'r [TensorDescHandle],
    pub output_buffers: &'r [DataBufferHandle],
    pub attr: OpAttrHandle,
    pub engine_type: AclEngineType,
    pub compile_type: AclCompileType,
    pub stream: StreamHandle,
}
