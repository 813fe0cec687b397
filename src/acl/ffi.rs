//! ACL FFI bindings
//!
//! Declarations are bound to `acl/acl.h`, `acl/acl_op.h` and
//! `acl/acl_op_compiler.h`. Descriptor, buffer and attribute types are
//! opaque on the Rust side and passed as `c_void` pointers.

use std::ffi::{c_char, c_int, c_void};

#[link(name = "ascendcl")]
#[allow(dead_code)]
extern "C" {
    pub fn aclCreateTensorDesc(
        dataType: i32,
        numDims: c_int,
        dims: *const i64,
        format: i32,
    ) -> *mut c_void;
    pub fn aclDestroyTensorDesc(desc: *const c_void);
    pub fn aclCreateDataBuffer(data: *mut c_void, size: usize) -> *mut c_void;
    pub fn aclDestroyDataBuffer(dataBuffer: *const c_void) -> i32;
    pub fn aclopCreateAttr() -> *mut c_void;
    pub fn aclopDestroyAttr(attr: *const c_void);
    pub fn aclopSetAttrInt(attr: *mut c_void, attrName: *const c_char, attrValue: i64) -> i32;
    pub fn aclopSetAttrFloat(attr: *mut c_void, attrName: *const c_char, attrValue: f32) -> i32;
    pub fn aclopSetAttrBool(attr: *mut c_void, attrName: *const c_char, attrValue: u8) -> i32;
    pub fn aclopSetAttrString(
        attr: *mut c_void,
        attrName: *const c_char,
        attrValue: *const c_char,
    ) -> i32;
    pub fn aclopSetAttrListInt(
        attr: *mut c_void,
        attrName: *const c_char,
        numValues: c_int,
        values: *const i64,
    ) -> i32;
    pub fn aclGetRecentErrMsg() -> *const c_char;
}

#[link(name = "acl_op_compiler")]
#[allow(dead_code)]
extern "C" {
    pub fn aclopCompileAndExecute(
        opType: *const c_char,
        numInputs: c_int,
        inputDesc: *const *const c_void,
        inputs: *const *const c_void,
        numOutputs: c_int,
        outputDesc: *const *const c_void,
        outputs: *const *mut c_void,
        attr: *const c_void,
        engineType: i32,
        compileFlag: i32,
        opPath: *const c_char,
        stream: *mut c_void,
    ) -> i32;
}
