use std::borrow::Cow;
use std::fmt::Debug;

use crate::errors::AttrError;
use crate::kind::AttributeValueKind as K;
use crate::kind::AttributeValueKind;
use crate::tensor::{IrDataType, IrTensor};
use crate::value::AttrValue;
use crate::{GraftError, GraftResult};
use tract_data::prelude::TVec;

/// Turns the native sub-graph record of an attribute into whatever graph
/// representation the consumer works with.
pub trait SubgraphImporter<G> {
    type Output;

    fn import_subgraph(&self, graph: &G) -> GraftResult<Self::Output>;
}

/// Hands sub-graphs over as clones of their native record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSubgraphs;

impl<G: Clone> SubgraphImporter<G> for NativeSubgraphs {
    type Output = G;

    fn import_subgraph(&self, graph: &G) -> GraftResult<G> {
        Ok(graph.clone())
    }
}

/// One attribute of one node of an external graph: a definition paired with
/// a value, both borrowed from the decoded native graph.
///
/// Typed accessors check the requested kind against `kind()` and fail with
/// [`AttrError::KindMismatch`] rather than reading a defaulted field. The
/// shape and list-of-int accessors are interchangeable.
pub trait IrAttribute<'a>: Debug {
    type Def: ?Sized;
    type Value: ?Sized;
    type Tensor: IrTensor<'a>;
    type DataType: IrDataType;
    type Graph;

    fn framework(&self) -> &'static str;
    fn name(&self) -> &'a str;
    /// The type identifier the definition declares, as the framework spells it.
    fn declared_type(&self) -> Cow<'a, str>;
    fn kind(&self) -> AttributeValueKind;

    fn float_value(&self) -> GraftResult<f32>;
    fn list_float_value(&self) -> GraftResult<Vec<f32>>;
    fn int_value(&self) -> GraftResult<i64>;
    fn list_int_value(&self) -> GraftResult<Vec<i64>>;
    fn bool_value(&self) -> GraftResult<bool>;
    fn list_bool_value(&self) -> GraftResult<Vec<bool>>;
    fn string_value(&self) -> GraftResult<String>;
    fn list_string_value(&self) -> GraftResult<Vec<String>>;
    fn shape_value(&self) -> GraftResult<TVec<i64>>;
    fn tensor_value(&self) -> GraftResult<Self::Tensor>;
    fn list_tensor_value(&self) -> GraftResult<Vec<Self::Tensor>>;
    fn data_type_value(&self) -> GraftResult<Self::DataType>;
    fn list_data_type_value(&self) -> GraftResult<Vec<Self::DataType>>;
    fn graph_value<R>(&self, registry: &R) -> GraftResult<R::Output>
    where
        R: SubgraphImporter<Self::Graph>;
    fn list_graph_value<R>(&self, registry: &R) -> GraftResult<Vec<R::Output>>
    where
        R: SubgraphImporter<Self::Graph>;

    fn native_def(&self) -> &'a Self::Def;
    fn native_value(&self) -> &'a Self::Value;

    fn expect_kind(&self, requested: AttributeValueKind) -> GraftResult<()> {
        if self.kind().reads_as(requested) {
            Ok(())
        } else {
            Err(self.mismatch(requested, self.kind()))
        }
    }

    fn mismatch(&self, expected: AttributeValueKind, found: AttributeValueKind) -> GraftError {
        AttrError::KindMismatch { attribute: Some(self.name().to_string()), expected, found }
            .into()
    }

    fn unsupported(&self, capability: &'static str) -> GraftError {
        AttrError::UnsupportedCapability {
            framework: self.framework(),
            attribute: self.name().to_string(),
            capability,
        }
        .into()
    }

    /// Reads the attribute through the accessor matching its kind.
    ///
    /// Returns `None` for `Invalid` attributes. Tensors and data types are
    /// converted to their canonical form, sub-graphs go through `registry`.
    fn decode<R>(&self, registry: &R) -> GraftResult<Option<AttrValue<R::Output>>>
    where
        R: SubgraphImporter<Self::Graph>,
    {
        let value = match self.kind() {
            K::ScalarFloat => AttrValue::Float(self.float_value()?),
            K::ScalarInt => AttrValue::Int(self.int_value()?),
            K::ScalarBool => AttrValue::Bool(self.bool_value()?),
            K::ScalarString => AttrValue::String(self.string_value()?),
            K::Shape => AttrValue::Shape(self.shape_value()?),
            K::Tensor => AttrValue::Tensor(self.tensor_value()?.to_tensor()?),
            K::DataType => AttrValue::DataType(self.data_type_value()?.datum_type()?),
            K::ListFloat => AttrValue::ListFloat(self.list_float_value()?),
            K::ListInt => AttrValue::ListInt(self.list_int_value()?),
            K::ListBool => AttrValue::ListBool(self.list_bool_value()?),
            K::ListString => AttrValue::ListString(self.list_string_value()?),
            K::ListTensor => AttrValue::ListTensor(
                self.list_tensor_value()?
                    .iter()
                    .map(|t| t.to_tensor())
                    .collect::<GraftResult<_>>()?,
            ),
            K::ListDataType => AttrValue::ListDataType(
                self.list_data_type_value()?
                    .iter()
                    .map(|dt| dt.datum_type())
                    .collect::<GraftResult<_>>()?,
            ),
            K::Graph => AttrValue::Graph(self.graph_value(registry)?),
            K::ListGraph => AttrValue::ListGraph(self.list_graph_value(registry)?),
            K::Invalid => {
                trace!(
                    "{} attribute '{}' has unknown type {:?}",
                    self.framework(),
                    self.name(),
                    self.declared_type()
                );
                return Ok(None);
            }
        };
        Ok(Some(value))
    }
}
