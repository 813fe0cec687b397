//! Host-only [`AclRuntime`] that records every call
//!
//! Handles are synthetic addresses; nothing is compiled or executed. Used
//! for dry runs on machines without an NPU and as the test double for the
//! runner. Live-handle accounting catches leaks and double releases.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::{AclError, AclResult};
use super::runtime::AclRuntime;
use super::types::{
    AclCompileType, AclDataType, AclEngineType, AclFormat, DataBufferHandle, ExecuteRequest,
    OpAttrHandle, TensorDescHandle,
};
use crate::runner::AttrValue;

/// `ACL_ERROR_INVALID_PARAM`
pub const ACL_ERROR_INVALID_PARAM: i32 = 100000;

const HANDLE_BASE: usize = 0x1000;
const HANDLE_STRIDE: usize = 0x10;

/// Metadata a tensor descriptor was created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescRecord {
    pub dtype: AclDataType,
    pub dims: Vec<i64>,
    pub format: AclFormat,
}

/// Address and length a data buffer was created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRecord {
    pub addr: usize,
    pub size: usize,
}

/// One `compile_and_execute` request as the runtime saw it
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub op_type: String,
    pub inputs: Vec<(DescRecord, BufferRecord)>,
    pub outputs: Vec<(DescRecord, BufferRecord)>,
    pub attrs: Vec<(String, AttrValue)>,
    pub engine_type: AclEngineType,
    pub compile_type: AclCompileType,
    pub stream: usize,
}

/// Call log entry
#[derive(Debug, Clone, PartialEq)]
pub enum AclCall {
    CreateTensorDesc(usize),
    DestroyTensorDesc(usize),
    CreateDataBuffer(usize),
    DestroyDataBuffer(usize),
    CreateAttr(usize),
    DestroyAttr(usize),
    SetAttr {
        attr: usize,
        name: String,
        value: AttrValue,
    },
    CompileAndExecute(String),
}

#[derive(Debug, Default)]
struct RecordingState {
    next_handle: usize,
    descs: HashMap<usize, DescRecord>,
    buffers: HashMap<usize, BufferRecord>,
    attrs: HashMap<usize, Vec<(String, AttrValue)>>,
    calls: Vec<AclCall>,
    executions: Vec<ExecutionRecord>,
    double_releases: usize,
    execute_failure: Option<(i32, String)>,
    attr_failure: Option<i32>,
    last_error: String,
}

impl RecordingState {
    fn allocate(&mut self) -> usize {
        let addr = HANDLE_BASE + self.next_handle * HANDLE_STRIDE;
        self.next_handle += 1;
        addr
    }

    fn set_attr(&mut self, attr: OpAttrHandle, name: &str, value: AttrValue) -> AclResult<()> {
        let key = attr.as_ptr() as usize;
        self.calls.push(AclCall::SetAttr {
            attr: key,
            name: name.to_string(),
            value: value.clone(),
        });
        if let Some(code) = self.attr_failure {
            self.last_error = format!("attribute {} rejected", name);
            return Err(AclError::CallFailed {
                call: "aclopSetAttr",
                code,
            });
        }
        let Some(entries) = self.attrs.get_mut(&key) else {
            return Err(AclError::CallFailed {
                call: "aclopSetAttr",
                code: ACL_ERROR_INVALID_PARAM,
            });
        };
        // Later values for the same name replace earlier ones
        match entries.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = value,
            None => entries.push((name.to_string(), value)),
        }
        Ok(())
    }

    fn tensor_records(
        &self,
        descs: &[TensorDescHandle],
        buffers: &[DataBufferHandle],
    ) -> Option<Vec<(DescRecord, BufferRecord)>> {
        if descs.len() != buffers.len() {
            return None;
        }
        descs
            .iter()
            .zip(buffers)
            .map(|(desc, buffer)| {
                let desc = self.descs.get(&(desc.as_ptr() as usize))?;
                let buffer = self.buffers.get(&(buffer.as_ptr() as usize))?;
                Some((desc.clone(), *buffer))
            })
            .collect()
    }
}

/// See the module documentation
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    state: Mutex<RecordingState>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following execution fail with `code`, reporting `message`
    /// through [`AclRuntime::recent_error_message`]
    pub fn fail_executions_with(&self, code: i32, message: impl Into<String>) {
        self.state().execute_failure = Some((code, message.into()));
    }

    /// Make every following attribute setter fail with `code`
    pub fn fail_attr_setters_with(&self, code: i32) {
        self.state().attr_failure = Some(code);
    }

    /// Clear any injected failure
    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.execute_failure = None;
        state.attr_failure = None;
    }

    pub fn calls(&self) -> Vec<AclCall> {
        self.state().calls.clone()
    }

    pub fn executions(&self) -> Vec<ExecutionRecord> {
        self.state().executions.clone()
    }

    pub fn last_execution(&self) -> Option<ExecutionRecord> {
        self.state().executions.last().cloned()
    }

    /// Descriptors created and not yet destroyed
    pub fn live_descs(&self) -> usize {
        self.state().descs.len()
    }

    /// Data buffers created and not yet destroyed
    pub fn live_buffers(&self) -> usize {
        self.state().buffers.len()
    }

    /// Attribute sets created and not yet destroyed
    pub fn live_attrs(&self) -> usize {
        self.state().attrs.len()
    }

    /// Destroy calls on handles that were never live
    pub fn double_releases(&self) -> usize {
        self.state().double_releases
    }

    /// Count calls matching `pred`
    pub fn count_calls(&self, pred: impl Fn(&AclCall) -> bool) -> usize {
        self.state().calls.iter().filter(|call| pred(call)).count()
    }
}

impl AclRuntime for RecordingRuntime {
    fn create_tensor_desc(
        &self,
        dtype: AclDataType,
        dims: &[i64],
        format: AclFormat,
    ) -> AclResult<TensorDescHandle> {
        let mut state = self.state();
        let addr = state.allocate();
        state.descs.insert(
            addr,
            DescRecord {
                dtype,
                dims: dims.to_vec(),
                format,
            },
        );
        state.calls.push(AclCall::CreateTensorDesc(addr));
        TensorDescHandle::from_raw(addr as *mut c_void)
            .ok_or(AclError::NullHandle("aclCreateTensorDesc"))
    }

    fn destroy_tensor_desc(&self, desc: TensorDescHandle) {
        let mut state = self.state();
        let addr = desc.as_ptr() as usize;
        state.calls.push(AclCall::DestroyTensorDesc(addr));
        if state.descs.remove(&addr).is_none() {
            state.double_releases += 1;
        }
    }

    fn create_data_buffer(&self, data: *mut c_void, size: usize) -> AclResult<DataBufferHandle> {
        let mut state = self.state();
        let addr = state.allocate();
        state.buffers.insert(
            addr,
            BufferRecord {
                addr: data as usize,
                size,
            },
        );
        state.calls.push(AclCall::CreateDataBuffer(addr));
        DataBufferHandle::from_raw(addr as *mut c_void)
            .ok_or(AclError::NullHandle("aclCreateDataBuffer"))
    }

    fn destroy_data_buffer(&self, buffer: DataBufferHandle) -> AclResult<()> {
        let mut state = self.state();
        let addr = buffer.as_ptr() as usize;
        state.calls.push(AclCall::DestroyDataBuffer(addr));
        if state.buffers.remove(&addr).is_none() {
            state.double_releases += 1;
            return Err(AclError::CallFailed {
                call: "aclDestroyDataBuffer",
                code: ACL_ERROR_INVALID_PARAM,
            });
        }
        Ok(())
    }

    fn create_attr(&self) -> AclResult<OpAttrHandle> {
        let mut state = self.state();
        let addr = state.allocate();
        state.attrs.insert(addr, Vec::new());
        state.calls.push(AclCall::CreateAttr(addr));
        OpAttrHandle::from_raw(addr as *mut c_void).ok_or(AclError::NullHandle("aclopCreateAttr"))
    }

    fn destroy_attr(&self, attr: OpAttrHandle) {
        let mut state = self.state();
        let addr = attr.as_ptr() as usize;
        state.calls.push(AclCall::DestroyAttr(addr));
        if state.attrs.remove(&addr).is_none() {
            state.double_releases += 1;
        }
    }

    fn set_attr_int(&self, attr: OpAttrHandle, name: &str, value: i64) -> AclResult<()> {
        self.state().set_attr(attr, name, AttrValue::Int(value))
    }

    fn set_attr_float(&self, attr: OpAttrHandle, name: &str, value: f32) -> AclResult<()> {
        self.state().set_attr(attr, name, AttrValue::Float(value))
    }

    fn set_attr_bool(&self, attr: OpAttrHandle, name: &str, value: bool) -> AclResult<()> {
        self.state().set_attr(attr, name, AttrValue::Bool(value))
    }

    fn set_attr_string(&self, attr: OpAttrHandle, name: &str, value: &str) -> AclResult<()> {
        self.state()
            .set_attr(attr, name, AttrValue::Str(value.to_string()))
    }

    fn set_attr_list_int(&self, attr: OpAttrHandle, name: &str, values: &[i64]) -> AclResult<()> {
        self.state()
            .set_attr(attr, name, AttrValue::ListInt(values.to_vec()))
    }

    fn compile_and_execute(&self, request: &ExecuteRequest<'_>) -> AclResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(AclCall::CompileAndExecute(request.op_type.to_string()));

        let inputs = state.tensor_records(request.input_descs, request.input_buffers);
        let outputs = state.tensor_records(request.output_descs, request.output_buffers);
        let attrs = state.attrs.get(&(request.attr.as_ptr() as usize)).cloned();
        let (Some(inputs), Some(outputs), Some(attrs)) = (inputs, outputs, attrs) else {
            state.last_error = format!("{}: request references released handles", request.op_type);
            return Err(AclError::CallFailed {
                call: "aclopCompileAndExecute",
                code: ACL_ERROR_INVALID_PARAM,
            });
        };

        state.executions.push(ExecutionRecord {
            op_type: request.op_type.to_string(),
            inputs,
            outputs,
            attrs,
            engine_type: request.engine_type,
            compile_type: request.compile_type,
            stream: request.stream.as_ptr() as usize,
        });

        if let Some((code, message)) = state.execute_failure.clone() {
            state.last_error = message;
            return Err(AclError::CallFailed {
                call: "aclopCompileAndExecute",
                code,
            });
        }
        Ok(())
    }

    fn recent_error_message(&self) -> String {
        std::mem::take(&mut self.state().last_error)
    }
}
