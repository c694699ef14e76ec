use std::collections::HashMap;
use std::fs;

pub mod tensorflow {
    include!("prost/tensorflow.rs");
}

use self::tensorflow::attr_value::{ListValue, Value};
use self::tensorflow::op_def::AttrDef;
use self::tensorflow::tensor_shape_proto::Dim;
use self::tensorflow::{
    AttrValue, DataType, GraphDef, NodeDef, OpDef, OpList, TensorProto, TensorShapeProto,
};

use graft_ir::internal::*;

pub fn graph() -> GraphDef {
    GraphDef::default()
}

pub fn node() -> NodeDef {
    NodeDef::default()
}

pub fn op_def<S: ToString>(name: S) -> OpDef {
    OpDef { name: name.to_string(), ..OpDef::default() }
}

pub fn shape(dims: &[i64]) -> TensorShapeProto {
    TensorShapeProto {
        dim: dims.iter().map(|&size| Dim { size, name: String::new() }).collect(),
        unknown_rank: false,
    }
}

pub fn unknown_shape() -> TensorShapeProto {
    TensorShapeProto { dim: vec![], unknown_rank: true }
}

impl GraphDef {
    pub fn node(mut self, n: NodeDef) -> Self {
        self.node.push(n);
        self
    }

    pub fn write_to_bytes(&self) -> GraftResult<Vec<u8>> {
        use prost::Message;
        let mut buf = vec![];
        self.encode(&mut buf).context("Prost/Protobuf encoding error")?;
        Ok(buf)
    }

    pub fn save_to<P: AsRef<::std::path::Path>>(self, p: P) -> GraftResult<()> {
        let buf = self.write_to_bytes()?;
        fs::write(p, &buf)?;
        Ok(())
    }
}

impl NodeDef {
    pub fn name<S: ToString>(mut self, n: S) -> NodeDef {
        self.name = n.to_string();
        self
    }

    pub fn op<S: ToString>(mut self, n: S) -> NodeDef {
        self.op = n.to_string();
        self
    }

    pub fn input<S: ToString>(mut self, n: S) -> NodeDef {
        self.input.push(n.to_string());
        self
    }

    pub fn attr<S: ToString, V: Into<AttrValue>>(mut self, n: S, v: V) -> NodeDef {
        self.attr.insert(n.to_string(), v.into());
        self
    }
}

impl OpDef {
    pub fn attr<S: ToString, T: ToString>(mut self, name: S, ty: T) -> OpDef {
        self.attr.push(AttrDef {
            name: name.to_string(),
            r#type: ty.to_string(),
            ..AttrDef::default()
        });
        self
    }

    pub fn attr_with_default<S: ToString, T: ToString, V: Into<AttrValue>>(
        mut self,
        name: S,
        ty: T,
        default: V,
    ) -> OpDef {
        self.attr.push(AttrDef {
            name: name.to_string(),
            r#type: ty.to_string(),
            default_value: Some(default.into()),
            ..AttrDef::default()
        });
        self
    }

    pub fn get_attr_def(&self, name: &str) -> Option<&AttrDef> {
        self.attr.iter().find(|a| a.name == name)
    }
}

impl OpList {
    pub fn by_name(self) -> HashMap<String, OpDef> {
        self.op.into_iter().map(|op| (op.name.clone(), op)).collect()
    }
}

fn list(l: ListValue) -> AttrValue {
    AttrValue { value: Some(Value::List(l)) }
}

impl From<DataType> for AttrValue {
    fn from(t: DataType) -> AttrValue {
        AttrValue { value: Some(Value::Type(t.into())) }
    }
}

impl<'a> From<&'a str> for AttrValue {
    fn from(t: &'a str) -> AttrValue {
        AttrValue { value: Some(Value::S(t.as_bytes().to_vec())) }
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(t: Vec<u8>) -> AttrValue {
        AttrValue { value: Some(Value::S(t)) }
    }
}

impl From<bool> for AttrValue {
    fn from(t: bool) -> AttrValue {
        AttrValue { value: Some(Value::B(t)) }
    }
}

impl From<i32> for AttrValue {
    fn from(t: i32) -> AttrValue {
        AttrValue::from(t as i64)
    }
}

impl From<i64> for AttrValue {
    fn from(t: i64) -> AttrValue {
        AttrValue { value: Some(Value::I(t)) }
    }
}

impl From<f32> for AttrValue {
    fn from(t: f32) -> AttrValue {
        AttrValue { value: Some(Value::F(t)) }
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(t: Vec<i64>) -> AttrValue {
        list(ListValue { i: t, ..ListValue::default() })
    }
}

impl From<Vec<f32>> for AttrValue {
    fn from(t: Vec<f32>) -> AttrValue {
        list(ListValue { f: t, ..ListValue::default() })
    }
}

impl From<Vec<bool>> for AttrValue {
    fn from(t: Vec<bool>) -> AttrValue {
        list(ListValue { b: t, ..ListValue::default() })
    }
}

impl<'a> From<Vec<&'a str>> for AttrValue {
    fn from(t: Vec<&'a str>) -> AttrValue {
        let s = t.iter().map(|s| s.as_bytes().to_vec()).collect();
        list(ListValue { s, ..ListValue::default() })
    }
}

impl From<Vec<DataType>> for AttrValue {
    fn from(t: Vec<DataType>) -> AttrValue {
        let r#type = t.into_iter().map(|dt| dt.into()).collect();
        list(ListValue { r#type, ..ListValue::default() })
    }
}

impl From<Vec<TensorProto>> for AttrValue {
    fn from(t: Vec<TensorProto>) -> AttrValue {
        list(ListValue { tensor: t, ..ListValue::default() })
    }
}

impl From<TensorProto> for AttrValue {
    fn from(t: TensorProto) -> AttrValue {
        AttrValue { value: Some(Value::Tensor(t)) }
    }
}

impl From<TensorShapeProto> for AttrValue {
    fn from(t: TensorShapeProto) -> AttrValue {
        AttrValue { value: Some(Value::Shape(t)) }
    }
}
