use graft_ir::internal::*;

use crate::pb::TensorProto;
use crate::pb::tensor_proto::{DataLocation, DataType};

impl TryFrom<DataType> for DatumType {
    type Error = GraftError;
    fn try_from(t: DataType) -> GraftResult<DatumType> {
        match t {
            DataType::Bool => Ok(DatumType::Bool),
            DataType::Uint8 => Ok(DatumType::U8),
            DataType::Uint16 => Ok(DatumType::U16),
            DataType::Uint32 => Ok(DatumType::U32),
            DataType::Uint64 => Ok(DatumType::U64),
            DataType::Int8 => Ok(DatumType::I8),
            DataType::Int16 => Ok(DatumType::I16),
            DataType::Int32 => Ok(DatumType::I32),
            DataType::Int64 => Ok(DatumType::I64),
            DataType::Float16 => Ok(DatumType::F16),
            DataType::Float => Ok(DatumType::F32),
            DataType::Double => Ok(DatumType::F64),
            DataType::String => Ok(DatumType::String),
            _ => bail!("Unknown DatumType {:?}", t),
        }
    }
}

pub fn data_type_from_i32(code: i32) -> GraftResult<DataType> {
    DataType::from_i32(code).ok_or_else(|| format_err!("Unknown ONNX DataType code {}", code))
}

fn create_tensor(shape: &[usize], dt: DatumType, data: &[u8]) -> GraftResult<Tensor> {
    let expected = shape
        .iter()
        .try_fold(dt.size_of(), |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| format_err!("{:?} tensor of shape {:?} is too big", dt, shape))?;
    ensure!(
        data.len() == expected,
        "raw_data holds {} bytes, {:?} tensor of shape {:?} needs {}",
        data.len(),
        dt,
        shape,
        expected
    );
    unsafe {
        match dt {
            DatumType::U8 => Tensor::from_raw::<u8>(shape, data),
            DatumType::U16 => Tensor::from_raw::<u16>(shape, data),
            DatumType::U32 => Tensor::from_raw::<u32>(shape, data),
            DatumType::U64 => Tensor::from_raw::<u64>(shape, data),
            DatumType::I8 => Tensor::from_raw::<i8>(shape, data),
            DatumType::I16 => Tensor::from_raw::<i16>(shape, data),
            DatumType::I32 => Tensor::from_raw::<i32>(shape, data),
            DatumType::I64 => Tensor::from_raw::<i64>(shape, data),
            DatumType::F32 => Tensor::from_raw::<f32>(shape, data),
            DatumType::F64 => Tensor::from_raw::<f64>(shape, data),
            DatumType::Bool => Ok(Tensor::from_raw::<u8>(shape, data)?
                .into_array::<u8>()?
                .mapv(|x| x != 0)
                .into()),
            _ => bail!("Unsupported type for raw_data: {:?}", dt),
        }
    }
}

impl TryFrom<&TensorProto> for Tensor {
    type Error = GraftError;
    fn try_from(t: &TensorProto) -> GraftResult<Tensor> {
        let dt: DatumType = data_type_from_i32(t.data_type)?.try_into()?;
        let shape: Vec<usize> = t
            .dims
            .iter()
            .map(|&d| {
                ensure!(d >= 0, "Negative dimension in tensor {:?}: {}", t.name, d);
                Ok(d as usize)
            })
            .collect::<GraftResult<_>>()?;
        if t.data_location == Some(DataLocation::External as i32) {
            bail!("Tensor {:?} stores its data in an external file, which is not supported", t.name)
        }
        if !t.raw_data.is_empty() {
            return create_tensor(&shape, dt, &t.raw_data);
        }
        use tract_ndarray::Array;
        let it = match dt {
            DatumType::Bool => {
                Array::from_shape_vec(&*shape, t.int32_data.iter().map(|&x| x != 0).collect())?
                    .into()
            }
            DatumType::U8 => {
                Array::from_shape_vec(&*shape, t.int32_data.iter().map(|&x| x as u8).collect())?
                    .into()
            }
            DatumType::U16 => {
                Array::from_shape_vec(&*shape, t.int32_data.iter().map(|&x| x as u16).collect())?
                    .into()
            }
            DatumType::U32 => Array::from_shape_vec(
                &*shape,
                t.uint64_data.iter().map(|&x| x as u32).collect(),
            )?
            .into(),
            DatumType::U64 => Array::from_shape_vec(&*shape, t.uint64_data.to_vec())?.into(),
            DatumType::I8 => {
                Array::from_shape_vec(&*shape, t.int32_data.iter().map(|&x| x as i8).collect())?
                    .into()
            }
            DatumType::I16 => {
                Array::from_shape_vec(&*shape, t.int32_data.iter().map(|&x| x as i16).collect())?
                    .into()
            }
            DatumType::I32 => Array::from_shape_vec(&*shape, t.int32_data.to_vec())?.into(),
            DatumType::I64 => Array::from_shape_vec(&*shape, t.int64_data.to_vec())?.into(),
            DatumType::F32 => Array::from_shape_vec(&*shape, t.float_data.to_vec())?.into(),
            DatumType::F64 => Array::from_shape_vec(&*shape, t.double_data.to_vec())?.into(),
            DatumType::String => {
                let strings = t
                    .string_data
                    .iter()
                    .cloned()
                    .map(String::from_utf8)
                    .collect::<Result<Vec<String>, _>>()
                    .context("Invalid UTF8 buffer")?;
                Array::from_shape_vec(&*shape, strings)?.into()
            }
            _ => bail!("Unsupported type for typed data fields: {:?}", dt),
        };
        Ok(it)
    }
}

/// An ONNX `TensorProto` seen as a canonical tensor.
#[derive(Clone, Copy, Debug, new)]
pub struct OnnxTensor<'a> {
    proto: &'a TensorProto,
}

impl<'a> IrTensor<'a> for OnnxTensor<'a> {
    type Native = TensorProto;

    fn native(&self) -> &'a TensorProto {
        self.proto
    }

    fn datum_type(&self) -> GraftResult<DatumType> {
        data_type_from_i32(self.proto.data_type)?.try_into()
    }

    fn shape(&self) -> TVec<i64> {
        self.proto.dims.iter().copied().collect()
    }

    fn to_tensor(&self) -> GraftResult<Tensor> {
        Tensor::try_from(self.proto)
    }
}

/// An ONNX `TensorProto.DataType` code, as found in `Cast`'s `to` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct OnnxDataType {
    code: i32,
}

impl OnnxDataType {
    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_i32(self.code)
    }
}

impl IrDataType for OnnxDataType {
    type Native = i32;

    fn native(&self) -> i32 {
        self.code
    }

    fn datum_type(&self) -> GraftResult<DatumType> {
        data_type_from_i32(self.code)?.try_into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn proto(dt: DataType, dims: &[i64]) -> TensorProto {
        TensorProto { data_type: dt as i32, dims: dims.to_vec(), ..TensorProto::default() }
    }

    #[test]
    fn typed_fields() -> GraftResult<()> {
        crate::setup_test_logger();
        let t = TensorProto { int64_data: vec![1, 2, 3, 4], ..proto(DataType::Int64, &[2, 2]) };
        assert_eq!(Tensor::try_from(&t)?, tensor2(&[[1i64, 2], [3, 4]]));
        Ok(())
    }

    #[test]
    fn raw_data() -> GraftResult<()> {
        let raw = [0.5f32, -1.0].iter().flat_map(|x| x.to_le_bytes()).collect();
        let t = TensorProto { raw_data: raw, ..proto(DataType::Float, &[2]) };
        assert_eq!(Tensor::try_from(&t)?, tensor1(&[0.5f32, -1.0]));
        Ok(())
    }

    #[test]
    fn raw_bools() -> GraftResult<()> {
        let t = TensorProto { raw_data: vec![0, 1], ..proto(DataType::Bool, &[2]) };
        assert_eq!(Tensor::try_from(&t)?, tensor1(&[false, true]));
        Ok(())
    }

    #[test]
    fn raw_data_of_wrong_length() {
        let t = TensorProto { raw_data: vec![0; 3], ..proto(DataType::Int32, &[1]) };
        assert!(Tensor::try_from(&t).is_err());
    }

    #[test]
    fn oversized_shape_is_an_error() {
        let big = 1i64 << 33;
        let t = TensorProto { raw_data: vec![0; 4], ..proto(DataType::Float, &[big, big]) };
        let err = Tensor::try_from(&t).unwrap_err();
        assert!(err.to_string().contains("too big"), "{err:?}");
        let t = TensorProto { raw_data: vec![0; 8], ..proto(DataType::Int64, &[1 << 61]) };
        assert!(Tensor::try_from(&t).is_err());
        let t = TensorProto { float_data: vec![1.0], ..proto(DataType::Float, &[big, big]) };
        assert!(Tensor::try_from(&t).is_err());
    }

    #[test]
    fn scalar() -> GraftResult<()> {
        let t = TensorProto { float_data: vec![3.0], ..proto(DataType::Float, &[]) };
        assert_eq!(Tensor::try_from(&t)?, tensor0(3.0f32));
        Ok(())
    }

    #[test]
    fn strings() -> GraftResult<()> {
        let t = TensorProto {
            string_data: vec![b"a".to_vec(), "é".as_bytes().to_vec()],
            ..proto(DataType::String, &[2])
        };
        assert_eq!(Tensor::try_from(&t)?, tensor1(&["a".to_string(), "é".to_string()]));
        Ok(())
    }

    #[test]
    fn external_data_is_refused() {
        let t = TensorProto {
            data_location: Some(DataLocation::External as i32),
            ..proto(DataType::Float, &[4])
        };
        assert!(Tensor::try_from(&t).is_err());
    }

    #[test]
    fn data_type_codes() {
        assert_eq!(OnnxDataType::new(1).datum_type().unwrap(), DatumType::F32);
        assert_eq!(OnnxDataType::new(7).datum_type().unwrap(), DatumType::I64);
        assert_eq!(OnnxDataType::new(7).data_type(), Some(DataType::Int64));
        assert!(OnnxDataType::new(16).datum_type().is_err());
        assert!(OnnxDataType::new(99).datum_type().is_err());
    }
}
