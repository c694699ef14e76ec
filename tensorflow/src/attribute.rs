use std::borrow::Cow;

use graft_ir::errors::AttrError;
use graft_ir::internal::*;
use graft_ir::kind::AttributeValueKind as K;

use crate::tensor::{TfDataType, TfTensor, dim_sizes};
use crate::tfpb::tensorflow::attr_value::{ListValue, Value};
use crate::tfpb::tensorflow::op_def::AttrDef;
use crate::tfpb::tensorflow::{AttrValue, GraphDef};

/// Kind of an attribute from the type its `OpDef` declares.
///
/// `func`, `list(func)`, `list(shape)` and anything unknown are `Invalid`.
pub fn classify(declared: &str) -> AttributeValueKind {
    match declared {
        "float" => K::ScalarFloat,
        "int" => K::ScalarInt,
        "bool" => K::ScalarBool,
        "string" => K::ScalarString,
        "shape" => K::Shape,
        "tensor" => K::Tensor,
        "type" => K::DataType,
        "list(float)" => K::ListFloat,
        "list(int)" => K::ListInt,
        "list(bool)" => K::ListBool,
        "list(string)" => K::ListString,
        "list(tensor)" => K::ListTensor,
        "list(type)" => K::ListDataType,
        _ => K::Invalid,
    }
}

/// Kind of the payload actually present in an `AttrValue`.
fn value_kind(value: &Value) -> AttributeValueKind {
    match value {
        Value::S(_) => K::ScalarString,
        Value::I(_) => K::ScalarInt,
        Value::F(_) => K::ScalarFloat,
        Value::B(_) => K::ScalarBool,
        Value::Type(_) => K::DataType,
        Value::Shape(_) => K::Shape,
        Value::Tensor(_) => K::Tensor,
        Value::List(l) => list_kind(l),
        Value::Func(_) | Value::Placeholder(_) => K::Invalid,
    }
}

fn list_kind(l: &ListValue) -> AttributeValueKind {
    if !l.s.is_empty() {
        K::ListString
    } else if !l.i.is_empty() {
        K::ListInt
    } else if !l.f.is_empty() {
        K::ListFloat
    } else if !l.b.is_empty() {
        K::ListBool
    } else if !l.r#type.is_empty() {
        K::ListDataType
    } else if !l.tensor.is_empty() {
        K::ListTensor
    } else {
        K::Invalid
    }
}

fn utf8(bytes: &[u8]) -> GraftResult<String> {
    Ok(std::str::from_utf8(bytes)?.to_string())
}

/// One attribute of a TensorFlow `NodeDef`: the `OpDef` attribute definition
/// and the value the node (or the definition default) provides.
#[derive(Clone, Copy, Debug, new)]
pub struct TfAttribute<'a> {
    def: &'a AttrDef,
    value: &'a AttrValue,
}

impl<'a> TfAttribute<'a> {
    fn payload(&self, expected: AttributeValueKind) -> GraftResult<&'a Value> {
        self.expect_kind(expected)?;
        let value: &'a AttrValue = self.value;
        value.value.as_ref().ok_or_else(|| {
            AttrError::MissingValue { attribute: self.def.name.clone(), expected }.into()
        })
    }

    /// The list payload, `None` when the value record is empty. A list holding
    /// elements of another kind is a mismatch.
    fn list(&self, expected: AttributeValueKind) -> GraftResult<Option<&'a ListValue>> {
        self.expect_kind(expected)?;
        let value: &'a AttrValue = self.value;
        match &value.value {
            None => Ok(None),
            Some(Value::List(l)) => match list_kind(l) {
                found if found == expected => Ok(Some(l)),
                K::Invalid if l.shape.is_empty() && l.func.is_empty() => Ok(Some(l)),
                found => Err(self.mismatch(expected, found)),
            },
            Some(other) => Err(self.mismatch(expected, value_kind(other))),
        }
    }

    fn wrong_payload(&self, expected: AttributeValueKind, value: &Value) -> GraftError {
        self.mismatch(expected, value_kind(value))
    }
}

impl<'a> IrAttribute<'a> for TfAttribute<'a> {
    type Def = AttrDef;
    type Value = AttrValue;
    type Tensor = TfTensor<'a>;
    type DataType = TfDataType;
    type Graph = GraphDef;

    fn framework(&self) -> &'static str {
        "tensorflow"
    }

    fn name(&self) -> &'a str {
        let def: &'a AttrDef = self.def;
        &def.name
    }

    fn declared_type(&self) -> Cow<'a, str> {
        let def: &'a AttrDef = self.def;
        Cow::Borrowed(&def.r#type)
    }

    fn kind(&self) -> AttributeValueKind {
        classify(&self.def.r#type)
    }

    fn float_value(&self) -> GraftResult<f32> {
        match self.payload(K::ScalarFloat)? {
            Value::F(f) => Ok(*f),
            other => Err(self.wrong_payload(K::ScalarFloat, other)),
        }
    }

    fn list_float_value(&self) -> GraftResult<Vec<f32>> {
        Ok(self.list(K::ListFloat)?.map(|l| l.f.clone()).unwrap_or_default())
    }

    fn int_value(&self) -> GraftResult<i64> {
        match self.payload(K::ScalarInt)? {
            Value::I(i) => Ok(*i),
            other => Err(self.wrong_payload(K::ScalarInt, other)),
        }
    }

    fn list_int_value(&self) -> GraftResult<Vec<i64>> {
        if self.kind() == K::Shape {
            return Ok(self.shape_value()?.into_vec());
        }
        Ok(self.list(K::ListInt)?.map(|l| l.i.clone()).unwrap_or_default())
    }

    fn bool_value(&self) -> GraftResult<bool> {
        match self.payload(K::ScalarBool)? {
            Value::B(b) => Ok(*b),
            other => Err(self.wrong_payload(K::ScalarBool, other)),
        }
    }

    fn list_bool_value(&self) -> GraftResult<Vec<bool>> {
        Ok(self.list(K::ListBool)?.map(|l| l.b.clone()).unwrap_or_default())
    }

    fn string_value(&self) -> GraftResult<String> {
        match self.payload(K::ScalarString)? {
            Value::S(bytes) => utf8(bytes)
                .with_context(|| format!("Decoding string attribute '{}'", self.def.name)),
            other => Err(self.wrong_payload(K::ScalarString, other)),
        }
    }

    fn list_string_value(&self) -> GraftResult<Vec<String>> {
        let Some(l) = self.list(K::ListString)? else { return Ok(vec![]) };
        l.s.iter()
            .map(|s| utf8(s))
            .collect::<GraftResult<Vec<String>>>()
            .with_context(|| format!("Decoding string list attribute '{}'", self.def.name))
    }

    fn shape_value(&self) -> GraftResult<TVec<i64>> {
        if self.kind() == K::ListInt {
            return Ok(self.list_int_value()?.into_iter().collect());
        }
        match self.payload(K::Shape)? {
            Value::Shape(shape) => Ok(dim_sizes(shape)),
            other => Err(self.wrong_payload(K::Shape, other)),
        }
    }

    fn tensor_value(&self) -> GraftResult<TfTensor<'a>> {
        match self.payload(K::Tensor)? {
            Value::Tensor(t) => Ok(TfTensor::new(t)),
            other => Err(self.wrong_payload(K::Tensor, other)),
        }
    }

    fn list_tensor_value(&self) -> GraftResult<Vec<TfTensor<'a>>> {
        Ok(self
            .list(K::ListTensor)?
            .map(|l| l.tensor.iter().map(TfTensor::new).collect())
            .unwrap_or_default())
    }

    fn data_type_value(&self) -> GraftResult<TfDataType> {
        match self.payload(K::DataType)? {
            Value::Type(code) => Ok(TfDataType::new(*code)),
            other => Err(self.wrong_payload(K::DataType, other)),
        }
    }

    fn list_data_type_value(&self) -> GraftResult<Vec<TfDataType>> {
        Ok(self
            .list(K::ListDataType)?
            .map(|l| l.r#type.iter().map(|&code| TfDataType::new(code)).collect())
            .unwrap_or_default())
    }

    fn graph_value<R>(&self, _registry: &R) -> GraftResult<R::Output>
    where
        R: SubgraphImporter<Self::Graph>,
    {
        Err(self.unsupported("sub-graph attributes"))
    }

    fn list_graph_value<R>(&self, _registry: &R) -> GraftResult<Vec<R::Output>>
    where
        R: SubgraphImporter<Self::Graph>,
    {
        Err(self.unsupported("sub-graph attributes"))
    }

    fn native_def(&self) -> &'a AttrDef {
        self.def
    }

    fn native_value(&self) -> &'a AttrValue {
        self.value
    }
}
