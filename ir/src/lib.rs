//! # Graft IR
//!
//! A framework-agnostic view over the attributes attached to the nodes of an
//! external graph (TensorFlow `NodeDef`, ONNX `NodeProto`, ...).
//!
//! Each framework crate wraps one `(definition, value)` pair in an adapter
//! implementing [`IrAttribute`](attribute::IrAttribute). The adapter reports
//! the attribute [kind](kind::AttributeValueKind) and exposes one checked
//! accessor per kind. Consumers either branch on `kind()` and call the
//! matching accessor, or let [`decode`](attribute::IrAttribute::decode)
//! produce a canonical [`AttrValue`](value::AttrValue) in one go.
//!
//! ```
//! use graft_ir::prelude::*;
//!
//! let value: AttrValue<()> = AttrValue::ListInt(vec![1, 2, 3]);
//! assert_eq!(value.kind(), AttributeValueKind::ListInt);
//! assert_eq!(value.as_shape().unwrap(), &[1, 2, 3]);
//! assert!(value.as_float().is_err());
//! ```

#[allow(unused_imports)]
#[macro_use]
extern crate log;

pub mod attribute;
pub mod errors;
pub mod import;
pub mod kind;
pub mod tensor;
pub mod value;

pub use tract_data;

pub type GraftError = anyhow::Error;
pub type GraftResult<T> = anyhow::Result<T>;

pub mod prelude {
    pub use crate::attribute::{IrAttribute, NativeSubgraphs, SubgraphImporter};
    pub use crate::errors::AttrError;
    pub use crate::import::{
        AttributeMap, DecodedAttributes, ImportConfig, InvalidAttributePolicy, decode_attributes,
    };
    pub use crate::kind::AttributeValueKind;
    pub use crate::tensor::{IrDataType, IrTensor};
    pub use crate::value::AttrValue;
    pub use crate::{GraftError, GraftResult};
    pub use tract_data::prelude::{
        Blob, Datum, DatumType, TVec, Tensor, tensor0, tensor1, tensor2, tvec,
    };
}

pub mod internal {
    pub use crate::prelude::*;
    pub use anyhow::{Context as GraftErrorContext, bail, ensure, format_err};
    pub use tract_data::internal::tract_ndarray;
}

#[cfg(test)]
#[allow(dead_code)]
pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("GRAFT_LOG").try_init();
}
