#![allow(dead_code)]
use graft_tensorflow::prelude::*;
use graft_tensorflow::tfpb;
use graft_tensorflow::tfpb::tensorflow::op_def::AttrDef;
use graft_tensorflow::tfpb::tensorflow::{self as pb, DataType, GraphDef, NodeDef};

pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("GRAFT_LOG").try_init();
}

pub fn def(name: &str, ty: &str) -> AttrDef {
    AttrDef { name: name.to_string(), r#type: ty.to_string(), ..AttrDef::default() }
}

/// Decodes a single `(declared type, value)` pair.
pub fn decode_one<V: Into<pb::AttrValue>>(
    ty: &str,
    value: V,
) -> GraftResult<Option<AttrValue<GraphDef>>> {
    let d = def("attr", ty);
    let v = value.into();
    TfAttribute::new(&d, &v).decode(&NativeSubgraphs)
}

/// A few real TensorFlow op definitions, enough to exercise the registry.
pub fn op_defs() -> OpDefRegistry {
    let mut ops = OpDefRegistry::default();
    ops.insert(
        tfpb::op_def("Conv2D")
            .attr("T", "type")
            .attr("strides", "list(int)")
            .attr_with_default("use_cudnn_on_gpu", "bool", true)
            .attr("padding", "string")
            .attr_with_default("explicit_paddings", "list(int)", Vec::<i64>::new())
            .attr_with_default("data_format", "string", "NHWC")
            .attr_with_default("dilations", "list(int)", vec![1i64, 1, 1, 1]),
    );
    ops.insert(
        tfpb::op_def("Placeholder")
            .attr("dtype", "type")
            .attr_with_default("shape", "shape", tfpb::unknown_shape()),
    );
    ops.insert(tfpb::op_def("Const").attr("value", "tensor").attr("dtype", "type"));
    ops.insert(
        tfpb::op_def("If")
            .attr("Tcond", "type")
            .attr("Tin", "list(type)")
            .attr("Tout", "list(type)")
            .attr("then_branch", "func")
            .attr("else_branch", "func")
            .attr_with_default("output_shapes", "list(shape)", Vec::<i64>::new()),
    );
    ops
}

pub fn placeholder(name: &str, dt: DataType) -> NodeDef {
    tfpb::node().name(name).op("Placeholder").attr("dtype", dt)
}
