#![allow(clippy::len_zero)]
//! # Graft TensorFlow module
//!
//! Reads the attributes of TensorFlow `NodeDef`s through the graft-ir
//! attribute contract.
//!
//! A node only holds the attributes that were set explicitly: their declared
//! types and defaults come from the `OpDef` of the node's op, so attribute
//! decoding needs an [`OpDefRegistry`](model::OpDefRegistry).
//!
//! ```
//! # extern crate graft_tensorflow;
//! # fn main() {
//! use graft_tensorflow::prelude::*;
//! use graft_tensorflow::tfpb;
//!
//! let mut op_defs = OpDefRegistry::default();
//! op_defs.insert(
//!     tfpb::op_def("Squeeze")
//!         .attr("T", "type")
//!         .attr_with_default("squeeze_dims", "list(int)", Vec::<i64>::new()),
//! );
//! let tf = tensorflow().with_op_defs(op_defs);
//!
//! let node = tfpb::node()
//!     .name("squeeze")
//!     .op("Squeeze")
//!     .attr("T", tfpb::tensorflow::DataType::DtFloat)
//!     .attr("squeeze_dims", vec![0i64, 2]);
//!
//! let attributes = tf.decode_node_attributes(&node).unwrap().into_map().unwrap();
//! assert_eq!(attributes.get_datum_type("T").unwrap(), DatumType::F32);
//! assert_eq!(attributes.get_ints("squeeze_dims").unwrap(), &[0, 2]);
//! # }
//! ```

#[macro_use]
extern crate derive_new;
#[allow(unused_imports)]
#[macro_use]
extern crate log;

pub mod attribute;
pub mod model;
pub mod tensor;
pub mod tfpb;

pub use model::Tensorflow;

pub fn tensorflow() -> Tensorflow {
    Tensorflow::default()
}

pub use graft_ir;
pub mod prelude {
    pub use crate::attribute::{TfAttribute, classify};
    pub use crate::model::OpDefRegistry;
    pub use crate::tensor::{TfDataType, TfTensor};
    pub use crate::tensorflow;
    pub use graft_ir::prelude::*;
}

#[cfg(test)]
#[allow(dead_code)]
pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("GRAFT_LOG").try_init();
}
