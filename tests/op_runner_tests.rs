//! Operator runner behavior against the recording runtime

mod common;

use common::*;
use diopi_ascend::acl::{
    AclCompileType, AclDataType, AclEngineType, AclFormat, RecordingRuntime, StreamHandle,
};
use diopi_ascend::runner::{AclOpRunner, SlotKind};
use diopi_ascend::{AscendError, AttrValue, DiopiDtype, DiopiTensor, OpRunner, RunnerConfig, TensorView};

fn quiet() -> RunnerConfig {
    RunnerConfig::new()
}

#[test]
fn add_two_inputs_one_output_and_run() {
    let rt = RecordingRuntime::new();
    let a = HostTensor::f32(&[2, 3]);
    let b = HostTensor::f32(&[2, 3]);
    let out = HostTensor::f32(&[2, 3]);

    let mut runner = OpRunner::new(&rt, "Add").unwrap().with_config(quiet());
    runner
        .add_input(&a.view)
        .unwrap()
        .add_input(&b.view)
        .unwrap()
        .add_output(&out.view)
        .unwrap()
        .set_attr("alpha", 1.0f32)
        .unwrap();

    let report = runner.run(&test_stream()).unwrap();
    assert_eq!(report.op_name, "Add");
    assert_eq!(report.inputs, 2);
    assert_eq!(report.outputs, 1);

    let exec = rt.last_execution().unwrap();
    assert_eq!(exec.op_type, "Add");
    assert_eq!(exec.inputs.len(), 2);
    assert_eq!(exec.outputs.len(), 1);
    assert_eq!(exec.inputs[0].1.addr, a.addr());
    assert_eq!(exec.inputs[1].1.addr, b.addr());
    assert_eq!(exec.outputs[0].1.addr, out.addr());
    assert_eq!(exec.outputs[0].1.size, out.byte_len());
    assert_eq!(exec.inputs[0].0.dims, vec![2, 3]);
    assert_eq!(exec.inputs[0].0.dtype, AclDataType::Float);
    assert_eq!(exec.attrs, vec![("alpha".to_string(), AttrValue::Float(1.0))]);
    assert_eq!(exec.stream, 0xABC0);
    assert_eq!(exec.engine_type, AclEngineType::Sys);
    assert_eq!(exec.compile_type, AclCompileType::Sys);
}

fn run_two_in_one_out<const IN: usize, const OUT: usize>() {
    let rt = RecordingRuntime::new();
    let x = HostTensor::f32(&[4]);
    let y = HostTensor::f32(&[4]);
    let z = HostTensor::f32(&[4]);

    let mut runner: AclOpRunner<'_, RecordingRuntime, IN, OUT> =
        AclOpRunner::new(&rt, "Mul").unwrap();
    runner
        .add_inputs([&x.view, &y.view])
        .unwrap()
        .add_output(&z.view)
        .unwrap();
    let report = runner.run(&StreamHandle::DEFAULT).unwrap();

    assert_eq!(report.inputs, 2, "capacity {}/{}", IN, OUT);
    assert_eq!(report.outputs, 1, "capacity {}/{}", IN, OUT);
    let exec = rt.last_execution().unwrap();
    assert_eq!(exec.inputs.len(), 2);
    assert_eq!(exec.outputs.len(), 1);
}

#[test]
fn slot_counts_do_not_depend_on_capacity() {
    run_two_in_one_out::<2, 1>();
    run_two_in_one_out::<3, 3>();
    run_two_in_one_out::<8, 8>();
    run_two_in_one_out::<16, 4>();
}

#[test]
fn zero_dim_single_element_becomes_length_one() {
    let rt = RecordingRuntime::new();
    let scalar = HostTensor::f32(&[]);
    let out = HostTensor::f32(&[1]);

    let mut runner = OpRunner::new(&rt, "Muls").unwrap();
    runner.add_input(&scalar.view).unwrap().add_output(&out.view).unwrap();
    runner.run(&StreamHandle::DEFAULT).unwrap();

    let exec = rt.last_execution().unwrap();
    assert_eq!(exec.inputs[0].0.dims, vec![1]);
    assert_eq!(exec.inputs[0].1.size, 4);
}

#[test]
fn ninth_input_is_rejected() {
    let rt = RecordingRuntime::new();
    let t = HostTensor::f32(&[1]);
    let mut runner = OpRunner::new(&rt, "ConcatD").unwrap();
    for _ in 0..8 {
        runner.add_input(&t.view).unwrap();
    }
    let creates_before = count_desc_creates(&rt);

    let err = runner.add_input(&t.view).unwrap_err();
    assert!(matches!(
        err,
        AscendError::SlotsExhausted {
            kind: SlotKind::Input,
            capacity: 8
        }
    ));
    assert!(err.is_contract_violation());
    assert_eq!(runner.input_count(), 8);
    assert_eq!(count_desc_creates(&rt), creates_before);
}

#[test]
fn explicit_position_out_of_range_is_rejected() {
    let rt = RecordingRuntime::new();
    let t = HostTensor::f32(&[1]);
    let mut runner = OpRunner::new(&rt, "Add").unwrap();
    let err = runner.add_output_at(8, &t.view).unwrap_err();
    assert!(matches!(
        err,
        AscendError::SlotOutOfRange {
            kind: SlotKind::Output,
            position: 8,
            capacity: 8
        }
    ));
}

#[test]
fn drop_after_partial_population_releases_only_filled_slots() {
    let rt = RecordingRuntime::new();
    let t = HostTensor::f32(&[3]);
    {
        let mut runner = OpRunner::new(&rt, "Abs").unwrap();
        runner.add_input(&t.view).unwrap();
    }
    assert_eq!(count_desc_destroys(&rt), 1);
    assert_eq!(count_buffer_destroys(&rt), 1);
    assert_eq!(count_attr_destroys(&rt), 1);
    assert_eq!(rt.live_descs(), 0);
    assert_eq!(rt.live_buffers(), 0);
    assert_eq!(rt.live_attrs(), 0);
    assert_eq!(rt.double_releases(), 0);
}

#[test]
fn drop_after_run_releases_everything_once() {
    let rt = RecordingRuntime::new();
    let a = HostTensor::f32(&[2]);
    let out = HostTensor::f32(&[2]);
    {
        let mut runner = OpRunner::new(&rt, "Neg").unwrap();
        runner.add_input(&a.view).unwrap().add_output(&out.view).unwrap();
        runner.run(&StreamHandle::DEFAULT).unwrap();
        runner.run(&StreamHandle::DEFAULT).unwrap();
        assert_eq!(runner.runs(), 2);
    }
    assert_eq!(rt.executions().len(), 2);
    assert_eq!(count_desc_destroys(&rt), 2);
    assert_eq!(count_buffer_destroys(&rt), 2);
    assert_eq!(rt.double_releases(), 0);
}

#[test]
fn scalar_attrs_reach_matching_setter_once() {
    let rt = RecordingRuntime::new();
    let mut runner = OpRunner::new(&rt, "Custom").unwrap();
    runner
        .set_attr("axis", 3i64)
        .unwrap()
        .set_attr("eps", 1e-5f32)
        .unwrap()
        .set_attr("keep_dims", true)
        .unwrap()
        .set_attr("padding", "SAME")
        .unwrap();

    assert_eq!(
        attr_calls(&rt),
        vec![
            ("axis".to_string(), AttrValue::Int(3)),
            ("eps".to_string(), AttrValue::Float(1e-5)),
            ("keep_dims".to_string(), AttrValue::Bool(true)),
            ("padding".to_string(), AttrValue::Str("SAME".to_string())),
        ]
    );
}

#[test]
fn list_attrs_are_widened_to_i64() {
    let rt = RecordingRuntime::new();
    let mut runner = OpRunner::new(&rt, "Transpose").unwrap();
    runner
        .set_attr("perm", vec![0i32, 2, 1])
        .unwrap()
        .set_attr_list("strides", [1u16, 2, 2, 1])
        .unwrap();

    assert_eq!(
        attr_calls(&rt),
        vec![
            ("perm".to_string(), AttrValue::ListInt(vec![0, 2, 1])),
            ("strides".to_string(), AttrValue::ListInt(vec![1, 2, 2, 1])),
        ]
    );
}

#[test]
fn rejected_attr_is_reported_and_not_recorded() {
    let rt = RecordingRuntime::new();
    rt.fail_attr_setters_with(100000);
    let mut runner = OpRunner::new(&rt, "Cast").unwrap();
    let err = runner.set_attr("dst_type", 1i32).unwrap_err();
    assert!(matches!(err, AscendError::AttrRejected { ref name, .. } if name == "dst_type"));
    assert!(runner.attrs().is_empty());
}

#[test]
fn execution_failure_is_returned_with_vendor_message() {
    let rt = RecordingRuntime::new();
    rt.fail_executions_with(500002, "EZ3002: Optype [Foo] is not found");
    let a = HostTensor::f32(&[2]);
    let out = HostTensor::f32(&[2]);

    let mut runner = OpRunner::new(&rt, "Foo").unwrap();
    runner.add_input(&a.view).unwrap().add_output(&out.view).unwrap();
    let err = runner.run(&StreamHandle::DEFAULT).unwrap_err();

    match err {
        AscendError::ExecutionFailed {
            ref op,
            inputs,
            outputs,
            code,
            ref message,
        } => {
            assert_eq!(op, "Foo");
            assert_eq!(inputs, 1);
            assert_eq!(outputs, 1);
            assert_eq!(code, Some(500002));
            assert_eq!(message, "EZ3002: Optype [Foo] is not found");
        }
        ref other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_vendor_failure());

    // The runner stays usable after a failed run
    rt.clear_failures();
    assert!(runner.run(&StreamHandle::DEFAULT).is_ok());
}

#[test]
fn sparse_slots_are_rejected_at_run() {
    let rt = RecordingRuntime::new();
    let a = HostTensor::f32(&[2]);
    let out = HostTensor::f32(&[2]);

    let mut runner = OpRunner::new(&rt, "Add").unwrap();
    runner.add_input_at(0, &a.view).unwrap();
    runner.add_input_at(2, &a.view).unwrap();
    runner.add_output(&out.view).unwrap();

    let err = runner.run(&StreamHandle::DEFAULT).unwrap_err();
    assert!(matches!(
        err,
        AscendError::NonContiguousSlots {
            kind: SlotKind::Input,
            empty: 1,
            filled: 2
        }
    ));
    assert!(rt.executions().is_empty());

    // Filling the gap makes the prefix contiguous again
    runner.add_input(&a.view).unwrap();
    assert_eq!(runner.run(&StreamHandle::DEFAULT).unwrap().inputs, 3);
}

#[test]
fn rank_four_defaults_to_nchw_unless_overridden() {
    let rt = RecordingRuntime::new();
    let x = HostTensor::f32(&[1, 3, 8, 8]);
    let y = HostTensor::f32(&[1, 8, 8, 3]);
    let out = HostTensor::f32(&[1, 3, 8, 8]);

    let mut runner = OpRunner::new(&rt, "Conv2D").unwrap();
    runner
        .add_input(&x.view)
        .unwrap()
        .add_input_with_format(&y.view, AclFormat::Nhwc)
        .unwrap()
        .add_output(&out.view)
        .unwrap();

    assert_eq!(runner.input_slot(0).unwrap().format(), AclFormat::Nchw);
    assert_eq!(runner.input_slot(1).unwrap().format(), AclFormat::Nhwc);
    assert_eq!(runner.output_slot(0).unwrap().format(), AclFormat::Nchw);
}

#[test]
fn in_place_op_uses_same_tensor_for_input_and_output() {
    let rt = RecordingRuntime::new();
    let t = HostTensor::f32(&[5]);
    let mut runner = OpRunner::new(&rt, "Relu").unwrap();
    runner.add_input(&t.view).unwrap().add_output(&t.view).unwrap();
    runner.run(&StreamHandle::DEFAULT).unwrap();

    let exec = rt.last_execution().unwrap();
    assert_eq!(exec.inputs[0].1.addr, exec.outputs[0].1.addr);
}

#[test]
fn heterogeneous_tensors_through_trait_objects() {
    let rt = RecordingRuntime::new();
    let host = HostTensor::new(DiopiDtype::Int32, &[2, 2]);
    let view = TensorView::new(DiopiDtype::Int32, &[2, 2]);
    let tensors: [&dyn DiopiTensor; 2] = [&host.view, &view];

    let mut runner = OpRunner::new(&rt, "Equal").unwrap();
    runner.add_inputs(tensors).unwrap();
    assert_eq!(runner.input_count(), 2);
    assert_eq!(runner.input_slot(1).unwrap().dtype(), AclDataType::Int32);
}

#[test]
fn run_with_overrides_engine_and_compile_mode() {
    let rt = RecordingRuntime::new();
    let t = HostTensor::f32(&[1]);
    let mut runner = OpRunner::new(&rt, "Sqrt").unwrap();
    runner.add_input(&t.view).unwrap().add_output(&t.view).unwrap();
    runner
        .run_with(&StreamHandle::DEFAULT, AclEngineType::Vector, AclCompileType::Unregistered)
        .unwrap();

    let exec = rt.last_execution().unwrap();
    assert_eq!(exec.engine_type, AclEngineType::Vector);
    assert_eq!(exec.compile_type, AclCompileType::Unregistered);
}

#[test]
fn runner_over_dyn_runtime() {
    let rt = RecordingRuntime::new();
    let dyn_rt: &dyn diopi_ascend::AclRuntime = &rt;
    let t = HostTensor::f32(&[1]);
    let mut runner = OpRunner::new(dyn_rt, "Exp").unwrap();
    runner.add_input(&t.view).unwrap().add_output(&t.view).unwrap();
    runner.run(&StreamHandle::DEFAULT).unwrap();
    assert_eq!(rt.executions().len(), 1);
}

#[test]
fn builder_chain_with_question_mark() -> anyhow::Result<()> {
    let rt = RecordingRuntime::new();
    let x = HostTensor::new(DiopiDtype::Int64, &[3]);
    let out = HostTensor::new(DiopiDtype::Int64, &[3]);

    let mut runner = OpRunner::new(&rt, "ReduceSum")?.with_config(quiet());
    runner
        .add_input(&x.view)?
        .add_output(&out.view)?
        .set_attr("axes", [0i64])?
        .set_attr("keep_dims", false)?;
    let report = runner.run(&test_stream())?;

    assert_eq!(report.inputs + report.outputs, 2);
    assert_eq!(runner.attrs().len(), 2);
    assert_eq!(rt.last_execution().map(|e| e.attrs.len()), Some(2));
    Ok(())
}

fn run_abs(rt: &RecordingRuntime, config: RunnerConfig) -> diopi_ascend::AscendResult<()> {
    let a = HostTensor::f32(&[2, 2]);
    let out = HostTensor::f32(&[2, 2]);
    let mut runner = OpRunner::new(rt, "Abs")?.with_config(config);
    runner.add_input(&a.view)?.add_output(&out.view)?;
    runner.run(&test_stream()).map(|_| ())
}

#[test]
fn trace_line_emitted_when_enabled() {
    let rt = RecordingRuntime::new();
    let (result, logs) = capture_logs(|| run_abs(&rt, RunnerConfig::new().with_debug_trace(true)));
    assert!(result.is_ok());

    let lines = logs.lines_with("opname:Abs,ins.size:1,outs.size:1");
    assert_eq!(lines.len(), 1, "{}", logs.contents());
    assert!(lines[0].contains("INFO"));
}

#[test]
fn no_trace_line_when_disabled() {
    let rt = RecordingRuntime::new();
    let (result, logs) = capture_logs(|| run_abs(&rt, RunnerConfig::new().with_debug_trace(false)));
    assert!(result.is_ok());
    assert!(logs.lines_with("opname:Abs").is_empty(), "{}", logs.contents());
}

#[test]
fn failed_run_warns_with_op_counts_and_vendor_message() {
    let rt = RecordingRuntime::new();
    rt.fail_executions_with(500002, "EZ9999: Inner Error");
    let (result, logs) = capture_logs(|| run_abs(&rt, RunnerConfig::new().with_debug_trace(false)));
    assert!(matches!(result, Err(AscendError::ExecutionFailed { .. })));

    let warnings: Vec<String> = logs
        .lines_with("WARN")
        .into_iter()
        .filter(|line| line.contains("EZ9999: Inner Error"))
        .collect();
    assert_eq!(warnings.len(), 1, "{}", logs.contents());
    assert!(warnings[0].contains("opname:Abs,ins.size:1,outs.size:1"));
}

#[test]
fn trace_line_follows_warning_on_failure() {
    let rt = RecordingRuntime::new();
    rt.fail_executions_with(500002, "EZ9999: Inner Error");
    let (result, logs) = capture_logs(|| run_abs(&rt, RunnerConfig::new().with_debug_trace(true)));
    assert!(result.is_err());

    let lines = logs.lines_with("opname:Abs,ins.size:1,outs.size:1");
    assert_eq!(lines.len(), 2, "{}", logs.contents());
    assert!(lines[0].contains("WARN"));
    assert!(lines[1].contains("INFO"));
    assert!(!lines[1].contains("EZ9999"));
}
