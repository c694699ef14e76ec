//! # Graft ONNX module
//!
//! Reads the attributes of ONNX `NodeProto`s through the graft-ir attribute
//! contract. Unlike TensorFlow, ONNX attributes may hold sub-graphs (`If`,
//! `Loop`, `Scan` bodies): they are handed to a
//! [`SubgraphImporter`](graft_ir::attribute::SubgraphImporter).

#[macro_use]
extern crate derive_new;
#[allow(unused_imports)]
#[macro_use]
extern crate log;

pub mod attribute;
pub mod model;
pub mod pb {
    include!("prost/onnx.rs");
}
pub mod tensor;

pub use model::Onnx;

pub fn onnx() -> Onnx {
    Onnx::default()
}

pub use graft_ir;
pub mod prelude {
    pub use crate::attribute::{OnnxAttribute, classify};
    pub use crate::model::{DecodedGraph, DecodedNode, node_attributes};
    pub use crate::onnx;
    pub use crate::tensor::{OnnxDataType, OnnxTensor};
    pub use graft_ir::prelude::*;
}

#[cfg(test)]
#[allow(dead_code)]
pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("GRAFT_LOG").try_init();
}
