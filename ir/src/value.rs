use crate::errors::AttrError;
use crate::kind::AttributeValueKind as K;
use crate::kind::AttributeValueKind;
use tract_data::prelude::{DatumType, TVec, Tensor};

/// A decoded attribute value, one variant per valid kind.
///
/// `G` is whatever the sub-graph importer produced for graph attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue<G> {
    Float(f32),
    Int(i64),
    Bool(bool),
    String(String),
    Shape(TVec<i64>),
    Tensor(Tensor),
    DataType(DatumType),
    ListFloat(Vec<f32>),
    ListInt(Vec<i64>),
    ListBool(Vec<bool>),
    ListString(Vec<String>),
    ListTensor(Vec<Tensor>),
    ListDataType(Vec<DatumType>),
    Graph(G),
    ListGraph(Vec<G>),
}

impl<G> AttrValue<G> {
    pub fn kind(&self) -> AttributeValueKind {
        match self {
            AttrValue::Float(_) => K::ScalarFloat,
            AttrValue::Int(_) => K::ScalarInt,
            AttrValue::Bool(_) => K::ScalarBool,
            AttrValue::String(_) => K::ScalarString,
            AttrValue::Shape(_) => K::Shape,
            AttrValue::Tensor(_) => K::Tensor,
            AttrValue::DataType(_) => K::DataType,
            AttrValue::ListFloat(_) => K::ListFloat,
            AttrValue::ListInt(_) => K::ListInt,
            AttrValue::ListBool(_) => K::ListBool,
            AttrValue::ListString(_) => K::ListString,
            AttrValue::ListTensor(_) => K::ListTensor,
            AttrValue::ListDataType(_) => K::ListDataType,
            AttrValue::Graph(_) => K::Graph,
            AttrValue::ListGraph(_) => K::ListGraph,
        }
    }

    fn mismatch(&self, expected: AttributeValueKind) -> AttrError {
        AttrError::KindMismatch { attribute: None, expected, found: self.kind() }
    }

    pub fn as_float(&self) -> Result<f32, AttrError> {
        match self {
            AttrValue::Float(f) => Ok(*f),
            _ => Err(self.mismatch(K::ScalarFloat)),
        }
    }

    pub fn as_int(&self) -> Result<i64, AttrError> {
        match self {
            AttrValue::Int(i) => Ok(*i),
            _ => Err(self.mismatch(K::ScalarInt)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, AttrError> {
        match self {
            AttrValue::Bool(b) => Ok(*b),
            _ => Err(self.mismatch(K::ScalarBool)),
        }
    }

    pub fn as_str(&self) -> Result<&str, AttrError> {
        match self {
            AttrValue::String(s) => Ok(s.as_str()),
            _ => Err(self.mismatch(K::ScalarString)),
        }
    }

    /// Dimension sizes. A list of ints is accepted as a shape.
    pub fn as_shape(&self) -> Result<&[i64], AttrError> {
        match self {
            AttrValue::Shape(shape) => Ok(&shape[..]),
            AttrValue::ListInt(ints) => Ok(&ints[..]),
            _ => Err(self.mismatch(K::Shape)),
        }
    }

    pub fn as_tensor(&self) -> Result<&Tensor, AttrError> {
        match self {
            AttrValue::Tensor(t) => Ok(t),
            _ => Err(self.mismatch(K::Tensor)),
        }
    }

    pub fn as_datum_type(&self) -> Result<DatumType, AttrError> {
        match self {
            AttrValue::DataType(dt) => Ok(*dt),
            _ => Err(self.mismatch(K::DataType)),
        }
    }

    pub fn as_floats(&self) -> Result<&[f32], AttrError> {
        match self {
            AttrValue::ListFloat(fs) => Ok(&fs[..]),
            _ => Err(self.mismatch(K::ListFloat)),
        }
    }

    /// List of ints. A shape is accepted as a list of its dimension sizes.
    pub fn as_ints(&self) -> Result<&[i64], AttrError> {
        match self {
            AttrValue::ListInt(ints) => Ok(&ints[..]),
            AttrValue::Shape(shape) => Ok(&shape[..]),
            _ => Err(self.mismatch(K::ListInt)),
        }
    }

    pub fn as_bools(&self) -> Result<&[bool], AttrError> {
        match self {
            AttrValue::ListBool(bs) => Ok(&bs[..]),
            _ => Err(self.mismatch(K::ListBool)),
        }
    }

    pub fn as_strings(&self) -> Result<&[String], AttrError> {
        match self {
            AttrValue::ListString(ss) => Ok(&ss[..]),
            _ => Err(self.mismatch(K::ListString)),
        }
    }

    pub fn as_tensors(&self) -> Result<&[Tensor], AttrError> {
        match self {
            AttrValue::ListTensor(ts) => Ok(&ts[..]),
            _ => Err(self.mismatch(K::ListTensor)),
        }
    }

    pub fn as_datum_types(&self) -> Result<&[DatumType], AttrError> {
        match self {
            AttrValue::ListDataType(dts) => Ok(&dts[..]),
            _ => Err(self.mismatch(K::ListDataType)),
        }
    }

    pub fn as_graph(&self) -> Result<&G, AttrError> {
        match self {
            AttrValue::Graph(g) => Ok(g),
            _ => Err(self.mismatch(K::Graph)),
        }
    }

    pub fn as_graphs(&self) -> Result<&[G], AttrError> {
        match self {
            AttrValue::ListGraph(gs) => Ok(&gs[..]),
            _ => Err(self.mismatch(K::ListGraph)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tract_data::prelude::{tensor1, tvec};

    #[test]
    fn wrong_accessor_is_an_error() {
        let v: AttrValue<()> = AttrValue::Int(0);
        assert_eq!(v.as_int(), Ok(0));
        assert_eq!(
            v.as_float(),
            Err(AttrError::KindMismatch {
                attribute: None,
                expected: K::ScalarFloat,
                found: K::ScalarInt
            })
        );
        assert!(v.as_bool().is_err());
        assert!(v.as_ints().is_err());
    }

    #[test]
    fn shape_reads_as_ints_and_back() {
        let shape: AttrValue<()> = AttrValue::Shape(tvec!(4, 8, 1));
        let ints: AttrValue<()> = AttrValue::ListInt(vec![4, 8, 1]);
        assert_eq!(shape.as_ints().unwrap(), ints.as_ints().unwrap());
        assert_eq!(shape.as_shape().unwrap(), ints.as_shape().unwrap());
    }

    #[test]
    fn kinds_match_variants() {
        let values: Vec<AttrValue<&str>> = vec![
            AttrValue::Float(1.0),
            AttrValue::String("SAME".into()),
            AttrValue::Tensor(tensor1(&[1f32, 2.0])),
            AttrValue::DataType(DatumType::F32),
            AttrValue::ListBool(vec![]),
            AttrValue::ListGraph(vec!["then", "else"]),
        ];
        let kinds: Vec<_> = values.iter().map(|v| v.kind()).collect();
        assert_eq!(
            kinds,
            vec![K::ScalarFloat, K::ScalarString, K::Tensor, K::DataType, K::ListBool, K::ListGraph]
        );
        assert_eq!(values[5].as_graphs().unwrap(), &["then", "else"]);
    }

    proptest::proptest! {
        #[test]
        fn shape_and_ints_agree(dims in proptest::collection::vec(-1i64..1024, 0..8)) {
            crate::setup_test_logger();
            let shape: AttrValue<()> = AttrValue::Shape(dims.iter().copied().collect());
            let ints: AttrValue<()> = AttrValue::ListInt(dims.clone());
            proptest::prop_assert_eq!(shape.as_ints().unwrap(), &*dims);
            proptest::prop_assert_eq!(ints.as_shape().unwrap(), &*dims);
            proptest::prop_assert!(shape.as_floats().is_err());
        }
    }
}
