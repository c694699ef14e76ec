use std::borrow::Cow;

use graft_ir::errors::AttrError;
use graft_ir::internal::*;
use graft_ir::kind::AttributeValueKind as K;

use crate::pb::attribute_proto::AttributeType;
use crate::pb::{AttributeProto, GraphProto};
use crate::tensor::{OnnxDataType, OnnxTensor};

/// Kind of an attribute from its `AttributeType` code.
///
/// Sparse tensors, type protos and unknown codes are `Invalid`. ONNX has no
/// dedicated bool, shape or data type attributes: those travel as `INT` or
/// `INTS` and the matching accessors read them from there.
pub fn classify(code: i32) -> AttributeValueKind {
    match AttributeType::from_i32(code) {
        Some(AttributeType::Float) => K::ScalarFloat,
        Some(AttributeType::Int) => K::ScalarInt,
        Some(AttributeType::String) => K::ScalarString,
        Some(AttributeType::Tensor) => K::Tensor,
        Some(AttributeType::Graph) => K::Graph,
        Some(AttributeType::Floats) => K::ListFloat,
        Some(AttributeType::Ints) => K::ListInt,
        Some(AttributeType::Strings) => K::ListString,
        Some(AttributeType::Tensors) => K::ListTensor,
        Some(AttributeType::Graphs) => K::ListGraph,
        _ => K::Invalid,
    }
}

fn utf8(bytes: &[u8]) -> GraftResult<String> {
    Ok(std::str::from_utf8(bytes)?.to_string())
}

/// One attribute of an ONNX `NodeProto`.
///
/// ONNX carries the declaration and the value in the same `AttributeProto`,
/// so `def` and `value` usually point to the same record.
#[derive(Clone, Copy, Debug, new)]
pub struct OnnxAttribute<'a> {
    def: &'a AttributeProto,
    value: &'a AttributeProto,
}

impl<'a> OnnxAttribute<'a> {
    pub fn from_proto(attr: &'a AttributeProto) -> OnnxAttribute<'a> {
        OnnxAttribute::new(attr, attr)
    }

    /// The value record, once the requested kind is checked against both
    /// the definition and the value type tag.
    fn checked(&self, expected: AttributeValueKind) -> GraftResult<&'a AttributeProto> {
        self.expect_kind(expected)?;
        self.value_record()
    }

    fn value_record(&self) -> GraftResult<&'a AttributeProto> {
        if self.value.r#type != AttributeType::Undefined as i32
            && self.value.r#type != self.def.r#type
        {
            return Err(self.mismatch(self.kind(), classify(self.value.r#type)));
        }
        Ok(self.value)
    }

    /// `INT` attributes standing for something else (bools, data types).
    fn int_standing_for(&self, expected: AttributeValueKind) -> GraftResult<i64> {
        match self.kind() {
            K::ScalarInt => Ok(self.value_record()?.i),
            found => Err(self.mismatch(expected, found)),
        }
    }

    fn ints_standing_for(&self, expected: AttributeValueKind) -> GraftResult<&'a [i64]> {
        match self.kind() {
            K::ListInt => Ok(&self.value_record()?.ints),
            found => Err(self.mismatch(expected, found)),
        }
    }
}

fn int_to_bool(i: i64) -> GraftResult<bool> {
    match i {
        0 => Ok(false),
        1 => Ok(true),
        _ => bail!("{} is not a boolean", i),
    }
}

fn int_to_data_type(i: i64) -> GraftResult<OnnxDataType> {
    let code = i32::try_from(i).with_context(|| format!("{} is not a data type code", i))?;
    Ok(OnnxDataType::new(code))
}

impl<'a> IrAttribute<'a> for OnnxAttribute<'a> {
    type Def = AttributeProto;
    type Value = AttributeProto;
    type Tensor = OnnxTensor<'a>;
    type DataType = OnnxDataType;
    type Graph = GraphProto;

    fn framework(&self) -> &'static str {
        "onnx"
    }

    fn name(&self) -> &'a str {
        let def: &'a AttributeProto = self.def;
        &def.name
    }

    fn declared_type(&self) -> Cow<'a, str> {
        match AttributeType::from_i32(self.def.r#type) {
            Some(t) => Cow::Borrowed(t.as_str_name()),
            None => Cow::Owned(format!("attribute type {}", self.def.r#type)),
        }
    }

    /// Attributes referencing a parent function attribute carry no value
    /// and are `Invalid`.
    fn kind(&self) -> AttributeValueKind {
        if !self.def.ref_attr_name.is_empty() {
            return K::Invalid;
        }
        classify(self.def.r#type)
    }

    fn float_value(&self) -> GraftResult<f32> {
        Ok(self.checked(K::ScalarFloat)?.f)
    }

    fn list_float_value(&self) -> GraftResult<Vec<f32>> {
        Ok(self.checked(K::ListFloat)?.floats.clone())
    }

    fn int_value(&self) -> GraftResult<i64> {
        Ok(self.checked(K::ScalarInt)?.i)
    }

    fn list_int_value(&self) -> GraftResult<Vec<i64>> {
        Ok(self.checked(K::ListInt)?.ints.clone())
    }

    fn bool_value(&self) -> GraftResult<bool> {
        int_to_bool(self.int_standing_for(K::ScalarBool)?)
            .with_context(|| format!("Reading attribute '{}' as a bool", self.def.name))
    }

    fn list_bool_value(&self) -> GraftResult<Vec<bool>> {
        self.ints_standing_for(K::ListBool)?
            .iter()
            .map(|&i| int_to_bool(i))
            .collect::<GraftResult<Vec<bool>>>()
            .with_context(|| format!("Reading attribute '{}' as a list of bools", self.def.name))
    }

    fn string_value(&self) -> GraftResult<String> {
        utf8(&self.checked(K::ScalarString)?.s)
            .with_context(|| format!("Decoding string attribute '{}'", self.def.name))
    }

    fn list_string_value(&self) -> GraftResult<Vec<String>> {
        self.checked(K::ListString)?
            .strings
            .iter()
            .map(|s| utf8(s))
            .collect::<GraftResult<Vec<String>>>()
            .with_context(|| format!("Decoding string list attribute '{}'", self.def.name))
    }

    fn shape_value(&self) -> GraftResult<TVec<i64>> {
        Ok(self.ints_standing_for(K::Shape)?.iter().copied().collect())
    }

    fn tensor_value(&self) -> GraftResult<OnnxTensor<'a>> {
        let value = self.checked(K::Tensor)?;
        let t = value.t.as_ref().ok_or_else(|| AttrError::MissingValue {
            attribute: self.def.name.clone(),
            expected: K::Tensor,
        })?;
        Ok(OnnxTensor::new(t))
    }

    fn list_tensor_value(&self) -> GraftResult<Vec<OnnxTensor<'a>>> {
        Ok(self.checked(K::ListTensor)?.tensors.iter().map(OnnxTensor::new).collect())
    }

    fn data_type_value(&self) -> GraftResult<OnnxDataType> {
        int_to_data_type(self.int_standing_for(K::DataType)?)
    }

    fn list_data_type_value(&self) -> GraftResult<Vec<OnnxDataType>> {
        self.ints_standing_for(K::ListDataType)?.iter().map(|&i| int_to_data_type(i)).collect()
    }

    fn graph_value<R>(&self, registry: &R) -> GraftResult<R::Output>
    where
        R: SubgraphImporter<Self::Graph>,
    {
        let value = self.checked(K::Graph)?;
        let g = value.g.as_ref().ok_or_else(|| AttrError::MissingValue {
            attribute: self.def.name.clone(),
            expected: K::Graph,
        })?;
        registry
            .import_subgraph(g)
            .with_context(|| format!("Importing sub-graph of attribute '{}'", self.def.name))
    }

    fn list_graph_value<R>(&self, registry: &R) -> GraftResult<Vec<R::Output>>
    where
        R: SubgraphImporter<Self::Graph>,
    {
        self.checked(K::ListGraph)?
            .graphs
            .iter()
            .enumerate()
            .map(|(ix, g)| {
                registry.import_subgraph(g).with_context(|| {
                    format!("Importing sub-graph #{} of attribute '{}'", ix, self.def.name)
                })
            })
            .collect()
    }

    fn native_def(&self) -> &'a AttributeProto {
        self.def
    }

    fn native_value(&self) -> &'a AttributeProto {
        self.value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ints(name: &str, ints: &[i64]) -> AttributeProto {
        AttributeProto {
            name: name.into(),
            r#type: AttributeType::Ints as i32,
            ints: ints.to_vec(),
            ..AttributeProto::default()
        }
    }

    fn int(name: &str, i: i64) -> AttributeProto {
        AttributeProto {
            name: name.into(),
            r#type: AttributeType::Int as i32,
            i,
            ..AttributeProto::default()
        }
    }

    #[test]
    fn bool_from_int() {
        let t = int("keepdims", 1);
        let f = int("keepdims", 0);
        let two = int("keepdims", 2);
        assert!(OnnxAttribute::from_proto(&t).bool_value().unwrap());
        assert!(!OnnxAttribute::from_proto(&f).bool_value().unwrap());
        assert!(OnnxAttribute::from_proto(&two).bool_value().is_err());
    }

    #[test]
    fn bools_from_ints() {
        let a = ints("flags", &[1, 0, 1]);
        let flags = OnnxAttribute::from_proto(&a).list_bool_value().unwrap();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn data_type_from_int() {
        let to = int("to", 7);
        let dt = OnnxAttribute::from_proto(&to).data_type_value().unwrap();
        assert_eq!(dt.datum_type().unwrap(), DatumType::I64);
    }

    #[test]
    fn shape_from_ints() {
        let a = ints("kernel_shape", &[3, 3]);
        let attr = OnnxAttribute::from_proto(&a);
        assert_eq!(&*attr.shape_value().unwrap(), &[3, 3]);
        assert_eq!(attr.list_int_value().unwrap(), vec![3, 3]);
    }

    #[test]
    fn value_record_of_another_type() {
        let def = int("axis", 0);
        let value = AttributeProto {
            name: "axis".into(),
            r#type: AttributeType::Float as i32,
            f: 1.0,
            ..AttributeProto::default()
        };
        let err = OnnxAttribute::new(&def, &value).int_value().unwrap_err();
        assert_eq!(
            err.downcast_ref::<AttrError>(),
            Some(&AttrError::KindMismatch {
                attribute: Some("axis".into()),
                expected: K::ScalarInt,
                found: K::ScalarFloat
            })
        );
    }

    #[test]
    fn reference_attribute_is_invalid() {
        let mut a = int("axis", 0);
        a.ref_attr_name = "outer_axis".into();
        let attr = OnnxAttribute::from_proto(&a);
        assert_eq!(attr.kind(), K::Invalid);
        assert_eq!(attr.declared_type(), "INT");
    }

    #[test]
    fn unknown_type_code() {
        let a = AttributeProto { name: "x".into(), r#type: 42, ..AttributeProto::default() };
        let attr = OnnxAttribute::from_proto(&a);
        assert_eq!(attr.kind(), K::Invalid);
        assert_eq!(attr.declared_type(), "attribute type 42");
    }
}
