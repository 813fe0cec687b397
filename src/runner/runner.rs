//! The operator invocation builder

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;

use super::attr::AttrValue;
use super::mapping::{DefaultMapping, TensorMapping};
use super::slots::{SlotKind, SlotTable, TensorSlot};
use crate::acl::{
    AclCompileType, AclEngineType, AclFormat, AclRuntime, ExecuteRequest, OpAttrHandle,
};
use crate::config::RunnerConfig;
use crate::diopi::{DiopiContext, DiopiTensor};
use crate::error::{AscendError, AscendResult};

/// Slot count of [`OpRunner`]
pub const DEFAULT_SLOT_CAPACITY: usize = 8;

/// Runner with the default capacity and mapping
pub type OpRunner<'a, R> =
    AclOpRunner<'a, R, { DEFAULT_SLOT_CAPACITY }, { DEFAULT_SLOT_CAPACITY }, DefaultMapping>;

/// Builds and runs one ACL operator.
///
/// Inputs, outputs and attributes are collected in any order, then
/// [`run`](AclOpRunner::run) compiles and enqueues the operator. The runner
/// owns every descriptor, data buffer and the attribute set it creates and
/// releases them on drop. Tensor memory is borrowed for `'a` and never
/// freed here.
///
/// ```ignore
/// let rt = RecordingRuntime::new();
/// let mut runner = OpRunner::new(&rt, "Add")?;
/// runner
///     .add_inputs([&a, &b])?
///     .add_output(&out)?
///     .set_attr("alpha", 1.0f32)?;
/// let report = runner.run(&ctx)?;
/// ```
pub struct AclOpRunner<
    'a,
    R: AclRuntime + ?Sized,
    const IN: usize = { DEFAULT_SLOT_CAPACITY },
    const OUT: usize = { DEFAULT_SLOT_CAPACITY },
    M: TensorMapping = DefaultMapping,
> {
    runtime: &'a R,
    op_name: String,
    attr: OpAttrHandle,
    attrs: Vec<(String, AttrValue)>,
    inputs: SlotTable<IN>,
    outputs: SlotTable<OUT>,
    mapping: M,
    config: RunnerConfig,
    runs: usize,
    _tensors: PhantomData<&'a ()>,
}

/// What one successful [`AclOpRunner::run`] submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub op_name: String,
    pub inputs: usize,
    pub outputs: usize,
    pub engine_type: AclEngineType,
    pub compile_type: AclCompileType,
}

impl<'a, R: AclRuntime + ?Sized, const IN: usize, const OUT: usize>
    AclOpRunner<'a, R, IN, OUT, DefaultMapping>
{
    /// Create a runner for `op_name`.
    ///
    /// The config starts from [`RunnerConfig::from_env`].
    pub fn new(runtime: &'a R, op_name: impl Into<String>) -> AscendResult<Self> {
        Self::with_mapping(runtime, op_name, DefaultMapping)
    }
}

impl<'a, R: AclRuntime + ?Sized, const IN: usize, const OUT: usize, M: TensorMapping>
    AclOpRunner<'a, R, IN, OUT, M>
{
    /// Create a runner whose dtype/format derivation is `mapping`
    pub fn with_mapping(runtime: &'a R, op_name: impl Into<String>, mapping: M) -> AscendResult<Self> {
        let op_name = op_name.into();
        let attr = runtime
            .create_attr()
            .map_err(|source| AscendError::AttrCreationFailed {
                op: op_name.clone(),
                source,
            })?;
        tracing::debug!("AclOpRunner::new: op={} attr={:?}", op_name, attr);

        Ok(AclOpRunner {
            runtime,
            op_name,
            attr,
            attrs: Vec::new(),
            inputs: SlotTable::new(SlotKind::Input),
            outputs: SlotTable::new(SlotKind::Output),
            mapping,
            config: RunnerConfig::from_env(),
            runs: 0,
            _tensors: PhantomData,
        })
    }

    /// Replace the runner's configuration
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn op_name(&self) -> &str {
        &self.op_name
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Filled input slots
    pub fn input_count(&self) -> usize {
        self.inputs.occupied()
    }

    /// Filled output slots
    pub fn output_count(&self) -> usize {
        self.outputs.occupied()
    }

    pub fn input_slot(&self, position: usize) -> Option<&TensorSlot> {
        self.inputs.get(position)
    }

    pub fn output_slot(&self, position: usize) -> Option<&TensorSlot> {
        self.outputs.get(position)
    }

    /// Attributes accepted so far, in the order they were set
    pub fn attrs(&self) -> &[(String, AttrValue)] {
        &self.attrs
    }

    /// Times [`run`](Self::run) reached the runtime
    pub fn runs(&self) -> usize {
        self.runs
    }

    // ========== Inputs ==========

    /// Fill the first free input slot
    pub fn add_input<T: DiopiTensor + ?Sized>(&mut self, tensor: &'a T) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Input, None, tensor, None)?;
        Ok(self)
    }

    /// Fill input slot `position`, replacing whatever is there
    pub fn add_input_at<T: DiopiTensor + ?Sized>(
        &mut self,
        position: usize,
        tensor: &'a T,
    ) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Input, Some(position), tensor, None)?;
        Ok(self)
    }

    /// Fill the first free input slot with an explicit layout tag
    pub fn add_input_with_format<T: DiopiTensor + ?Sized>(
        &mut self,
        tensor: &'a T,
        format: AclFormat,
    ) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Input, None, tensor, Some(format))?;
        Ok(self)
    }

    pub fn add_input_at_with_format<T: DiopiTensor + ?Sized>(
        &mut self,
        position: usize,
        tensor: &'a T,
        format: AclFormat,
    ) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Input, Some(position), tensor, Some(format))?;
        Ok(self)
    }

    /// Fill free input slots left to right
    pub fn add_inputs<I, T>(&mut self, tensors: I) -> AscendResult<&mut Self>
    where
        I: IntoIterator<Item = &'a T>,
        T: DiopiTensor + ?Sized + 'a,
    {
        for tensor in tensors {
            self.add_slot(SlotKind::Input, None, tensor, None)?;
        }
        Ok(self)
    }

    // ========== Outputs ==========

    /// Fill the first free output slot
    pub fn add_output<T: DiopiTensor + ?Sized>(&mut self, tensor: &'a T) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Output, None, tensor, None)?;
        Ok(self)
    }

    /// Fill output slot `position`, replacing whatever is there
    pub fn add_output_at<T: DiopiTensor + ?Sized>(
        &mut self,
        position: usize,
        tensor: &'a T,
    ) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Output, Some(position), tensor, None)?;
        Ok(self)
    }

    pub fn add_output_with_format<T: DiopiTensor + ?Sized>(
        &mut self,
        tensor: &'a T,
        format: AclFormat,
    ) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Output, None, tensor, Some(format))?;
        Ok(self)
    }

    pub fn add_output_at_with_format<T: DiopiTensor + ?Sized>(
        &mut self,
        position: usize,
        tensor: &'a T,
        format: AclFormat,
    ) -> AscendResult<&mut Self> {
        self.add_slot(SlotKind::Output, Some(position), tensor, Some(format))?;
        Ok(self)
    }

    /// Fill free output slots left to right
    pub fn add_outputs<I, T>(&mut self, tensors: I) -> AscendResult<&mut Self>
    where
        I: IntoIterator<Item = &'a T>,
        T: DiopiTensor + ?Sized + 'a,
    {
        for tensor in tensors {
            self.add_slot(SlotKind::Output, None, tensor, None)?;
        }
        Ok(self)
    }

    fn add_slot<T: DiopiTensor + ?Sized>(
        &mut self,
        kind: SlotKind,
        position: Option<usize>,
        tensor: &T,
        format: Option<AclFormat>,
    ) -> AscendResult<usize> {
        let position = match kind {
            SlotKind::Input => self.inputs.resolve(position)?,
            SlotKind::Output => self.outputs.resolve(position)?,
        };

        let numel = tensor.numel();
        let elem_size = tensor.elem_size();
        if numel < 0 || elem_size < 0 {
            return Err(AscendError::InvalidTensor(format!(
                "numel={} elem_size={}",
                numel, elem_size
            )));
        }
        let byte_len = (numel as usize)
            .checked_mul(elem_size as usize)
            .ok_or_else(|| {
                AscendError::InvalidTensor(format!(
                    "byte length overflows: numel={} elem_size={}",
                    numel, elem_size
                ))
            })?;

        let mut dims = tensor.shape().to_vec();
        if dims.is_empty() && numel == 1 {
            dims.push(1);
        }

        let dtype = self.mapping.acl_dtype(tensor)?;
        let format = format.unwrap_or_else(|| self.mapping.acl_format(tensor));
        // ACL takes a mutable pointer for inputs too; it only reads them
        let data: *mut c_void = match kind {
            SlotKind::Input => tensor.data() as *mut c_void,
            SlotKind::Output => tensor.data_mut(),
        };

        let desc = self
            .runtime
            .create_tensor_desc(dtype, &dims, format)
            .map_err(|source| AscendError::DescriptorCreationFailed {
                op: self.op_name.clone(),
                source,
            })?;
        let buffer = match self.runtime.create_data_buffer(data, byte_len) {
            Ok(buffer) => buffer,
            Err(source) => {
                self.runtime.destroy_tensor_desc(desc);
                return Err(AscendError::BufferCreationFailed {
                    op: self.op_name.clone(),
                    source,
                });
            }
        };

        tracing::debug!(
            "{}: {} slot {} <- dtype={} format={} dims={:?} bytes={}",
            self.op_name,
            kind,
            position,
            dtype,
            format,
            dims,
            byte_len
        );

        let slot = TensorSlot {
            desc,
            buffer,
            dtype,
            format,
            dims,
            byte_len,
        };
        let previous = match kind {
            SlotKind::Input => self.inputs.insert(position, slot),
            SlotKind::Output => self.outputs.insert(position, slot),
        };
        if let Some(previous) = previous {
            release_slot(self.runtime, &self.op_name, previous);
        }
        Ok(position)
    }

    // ========== Attributes ==========

    /// Set attribute `name`, dispatching on the value's kind
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) -> AscendResult<&mut Self> {
        let value = value.into();
        let result = match &value {
            AttrValue::Int(v) => self.runtime.set_attr_int(self.attr, name, *v),
            AttrValue::Float(v) => self.runtime.set_attr_float(self.attr, name, *v),
            AttrValue::Bool(v) => self.runtime.set_attr_bool(self.attr, name, *v),
            AttrValue::Str(v) => self.runtime.set_attr_string(self.attr, name, v),
            AttrValue::ListInt(v) => self.runtime.set_attr_list_int(self.attr, name, v),
        };
        if let Err(source) = result {
            tracing::warn!(
                "{}: setting {} attribute {} failed: {}",
                self.op_name,
                value.kind(),
                name,
                source
            );
            return Err(AscendError::AttrRejected {
                op: self.op_name.clone(),
                name: name.to_string(),
                source,
            });
        }

        match self.attrs.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
        Ok(self)
    }

    /// Set a list-of-int attribute from any integral sequence
    pub fn set_attr_list<I, T>(&mut self, name: &str, values: I) -> AscendResult<&mut Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        let values: Vec<i64> = values.into_iter().map(Into::into).collect();
        self.set_attr(name, AttrValue::ListInt(values))
    }

    // ========== Execution ==========

    /// Compile and enqueue the operator on the context's stream using the
    /// configured engine and compile mode
    pub fn run<C: DiopiContext + ?Sized>(&mut self, ctx: &C) -> AscendResult<RunReport> {
        self.run_with(ctx, self.config.engine_type, self.config.compile_type)
    }

    /// [`run`](Self::run) with an explicit engine and compile mode.
    ///
    /// A non-success status is logged with the runtime's recent error
    /// message and returned as [`AscendError::ExecutionFailed`]. The debug
    /// trace is emitted either way. Completion is only observable through
    /// the stream.
    pub fn run_with<C: DiopiContext + ?Sized>(
        &mut self,
        ctx: &C,
        engine_type: AclEngineType,
        compile_type: AclCompileType,
    ) -> AscendResult<RunReport> {
        let stream = ctx.stream()?;
        let inputs = self.inputs.contiguous_len()?;
        let outputs = self.outputs.contiguous_len()?;
        let (input_descs, input_buffers) = self.inputs.handles(inputs);
        let (output_descs, output_buffers) = self.outputs.handles(outputs);

        let request = ExecuteRequest {
            op_type: &self.op_name,
            input_descs: &input_descs,
            input_buffers: &input_buffers,
            output_descs: &output_descs,
            output_buffers: &output_buffers,
            attr: self.attr,
            engine_type,
            compile_type,
            stream,
        };
        let status = self.runtime.compile_and_execute(&request);
        self.runs += 1;

        let failure = status.err().map(|err| {
            let message = self.runtime.recent_error_message();
            tracing::warn!("{}: {} ({})", self.dump_info(), message, err);
            (err.code(), message)
        });

        if self.config.debug_trace {
            tracing::info!("{}", self.dump_info());
        }

        if let Some((code, message)) = failure {
            return Err(AscendError::ExecutionFailed {
                op: self.op_name.clone(),
                inputs,
                outputs,
                code,
                message,
            });
        }

        Ok(RunReport {
            op_name: self.op_name.clone(),
            inputs,
            outputs,
            engine_type,
            compile_type,
        })
    }

    /// One-line summary used in warnings and the debug trace
    pub fn dump_info(&self) -> String {
        format!(
            "opname:{},ins.size:{},outs.size:{}",
            self.op_name,
            self.inputs.occupied(),
            self.outputs.occupied()
        )
    }
}

fn release_slot<R: AclRuntime + ?Sized>(runtime: &R, op_name: &str, slot: TensorSlot) {
    runtime.destroy_tensor_desc(slot.desc);
    if let Err(err) = runtime.destroy_data_buffer(slot.buffer) {
        tracing::warn!("{}: releasing data buffer failed: {}", op_name, err);
    }
}

impl<'a, R: AclRuntime + ?Sized, const IN: usize, const OUT: usize, M: TensorMapping> Drop
    for AclOpRunner<'a, R, IN, OUT, M>
{
    fn drop(&mut self) {
        let runtime = self.runtime;
        for slot in self.inputs.drain().chain(self.outputs.drain()) {
            release_slot(runtime, &self.op_name, slot);
        }
        runtime.destroy_attr(self.attr);
    }
}

impl<'a, R: AclRuntime + ?Sized, const IN: usize, const OUT: usize, M: TensorMapping> fmt::Debug
    for AclOpRunner<'a, R, IN, OUT, M>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AclOpRunner")
            .field("op_name", &self.op_name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("attrs", &self.attrs)
            .field("config", &self.config)
            .field("runs", &self.runs)
            .finish()
    }
}
