use graft_ir::internal::*;

use crate::tfpb::tensorflow::tensor_shape_proto::Dim;
use crate::tfpb::tensorflow::{DataType, TensorProto, TensorShapeProto};

impl TryFrom<DataType> for DatumType {
    type Error = GraftError;
    fn try_from(t: DataType) -> GraftResult<DatumType> {
        match t {
            DataType::DtBool => Ok(DatumType::Bool),
            DataType::DtUint8 => Ok(DatumType::U8),
            DataType::DtUint16 => Ok(DatumType::U16),
            DataType::DtUint32 => Ok(DatumType::U32),
            DataType::DtUint64 => Ok(DatumType::U64),
            DataType::DtInt8 => Ok(DatumType::I8),
            DataType::DtInt16 => Ok(DatumType::I16),
            DataType::DtInt32 => Ok(DatumType::I32),
            DataType::DtInt64 => Ok(DatumType::I64),
            DataType::DtHalf => Ok(DatumType::F16),
            DataType::DtFloat => Ok(DatumType::F32),
            DataType::DtDouble => Ok(DatumType::F64),
            DataType::DtString => Ok(DatumType::Blob),
            _ => bail!("Unknown DatumType {:?}", t),
        }
    }
}

impl TryFrom<DatumType> for DataType {
    type Error = GraftError;
    fn try_from(dt: DatumType) -> GraftResult<DataType> {
        match dt {
            DatumType::Bool => Ok(DataType::DtBool),
            DatumType::U8 => Ok(DataType::DtUint8),
            DatumType::U16 => Ok(DataType::DtUint16),
            DatumType::U32 => Ok(DataType::DtUint32),
            DatumType::U64 => Ok(DataType::DtUint64),
            DatumType::I8 => Ok(DataType::DtInt8),
            DatumType::I16 => Ok(DataType::DtInt16),
            DatumType::I32 => Ok(DataType::DtInt32),
            DatumType::I64 => Ok(DataType::DtInt64),
            DatumType::F16 => Ok(DataType::DtHalf),
            DatumType::F32 => Ok(DataType::DtFloat),
            DatumType::F64 => Ok(DataType::DtDouble),
            DatumType::Blob => Ok(DataType::DtString),
            DatumType::String => Ok(DataType::DtString),
            _ => bail!("DatumType {:?} is not translatable in protobuf", dt),
        }
    }
}

pub fn data_type_from_i32(code: i32) -> GraftResult<DataType> {
    DataType::from_i32(code).ok_or_else(|| format_err!("Unknown TensorFlow DataType code {}", code))
}

/// Dimension sizes of a shape, names dropped. An unknown rank gives an
/// empty list, unknown dimensions stay at -1.
pub fn dim_sizes(shape: &TensorShapeProto) -> TVec<i64> {
    if shape.unknown_rank {
        trace!("Shape of unknown rank read as an empty list of dimensions");
    }
    shape.dim.iter().map(|d| d.size).collect()
}

fn concrete_dims(t: &TensorProto) -> GraftResult<TVec<usize>> {
    let shape = t.tensor_shape.as_ref().context("TensorProto without tensor_shape")?;
    ensure!(!shape.unknown_rank, "Can not build a tensor of unknown rank");
    shape
        .dim
        .iter()
        .map(|d| {
            ensure!(d.size >= 0, "Can not build a tensor with unknown dimension ({})", d.size);
            Ok(d.size as usize)
        })
        .collect()
}

fn element_count(shape: &[usize]) -> GraftResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| format_err!("Tensor of shape {:?} is too big", shape))
}

// Repeated fields shorter than the tensor are padded with their last value.
fn tensor_from_repeated_field<T: Datum>(shape: &[usize], mut data: Vec<T>) -> GraftResult<Tensor> {
    let len = element_count(shape)?;
    if data.len() < len {
        let fill = data.last().cloned().unwrap_or_default();
        data.resize(len, fill);
    }
    Ok(tract_ndarray::ArrayD::from_shape_vec(shape, data)?.into())
}

fn tensor_from_content<T: Datum + Copy>(shape: &[usize], content: &[u8]) -> GraftResult<Tensor> {
    let expected = element_count(shape)?
        .checked_mul(std::mem::size_of::<T>())
        .ok_or_else(|| format_err!("Tensor of shape {:?} is too big", shape))?;
    ensure!(
        content.len() == expected,
        "tensor_content holds {} bytes, {:?} tensor of shape {:?} needs {}",
        content.len(),
        T::datum_type(),
        shape,
        expected
    );
    unsafe { Tensor::from_raw::<T>(shape, content) }
}

impl TryFrom<&TensorProto> for Tensor {
    type Error = GraftError;
    fn try_from(t: &TensorProto) -> GraftResult<Tensor> {
        let dims = concrete_dims(t)?;
        let content = &t.tensor_content;
        let dtype = data_type_from_i32(t.dtype)?;
        let mat: Tensor = if !content.is_empty() {
            match dtype {
                DataType::DtBool => tensor_from_content::<u8>(&dims, content)?
                    .into_array::<u8>()?
                    .mapv(|x| x != 0)
                    .into(),
                DataType::DtUint8 => tensor_from_content::<u8>(&dims, content)?,
                DataType::DtUint16 => tensor_from_content::<u16>(&dims, content)?,
                DataType::DtUint32 => tensor_from_content::<u32>(&dims, content)?,
                DataType::DtUint64 => tensor_from_content::<u64>(&dims, content)?,
                DataType::DtInt8 => tensor_from_content::<i8>(&dims, content)?,
                DataType::DtInt16 => tensor_from_content::<i16>(&dims, content)?,
                DataType::DtInt32 => tensor_from_content::<i32>(&dims, content)?,
                DataType::DtInt64 => tensor_from_content::<i64>(&dims, content)?,
                DataType::DtFloat => tensor_from_content::<f32>(&dims, content)?,
                DataType::DtDouble => tensor_from_content::<f64>(&dims, content)?,
                _ => bail!("Unsupported type for tensor_content: {:?}", dtype),
            }
        } else {
            match dtype {
                DataType::DtBool => tensor_from_repeated_field(&dims, t.bool_val.to_vec())?,
                DataType::DtUint8 => tensor_from_repeated_field(
                    &dims,
                    t.int_val.iter().map(|&x| x as u8).collect(),
                )?,
                DataType::DtUint16 => tensor_from_repeated_field(
                    &dims,
                    t.int_val.iter().map(|&x| x as u16).collect(),
                )?,
                DataType::DtInt8 => tensor_from_repeated_field(
                    &dims,
                    t.int_val.iter().map(|&x| x as i8).collect(),
                )?,
                DataType::DtInt16 => tensor_from_repeated_field(
                    &dims,
                    t.int_val.iter().map(|&x| x as i16).collect(),
                )?,
                DataType::DtInt32 => tensor_from_repeated_field(&dims, t.int_val.to_vec())?,
                DataType::DtUint32 => tensor_from_repeated_field(&dims, t.uint32_val.to_vec())?,
                DataType::DtInt64 => tensor_from_repeated_field(&dims, t.int64_val.to_vec())?,
                DataType::DtUint64 => tensor_from_repeated_field(&dims, t.uint64_val.to_vec())?,
                DataType::DtFloat => tensor_from_repeated_field(&dims, t.float_val.to_vec())?,
                DataType::DtDouble => tensor_from_repeated_field(&dims, t.double_val.to_vec())?,
                DataType::DtString => {
                    let strings = t
                        .string_val
                        .iter()
                        .map(|s| Ok(Blob::try_from(&**s)?))
                        .collect::<GraftResult<Vec<Blob>>>()?;
                    tensor_from_repeated_field(&dims, strings)?
                }
                _ => bail!("Unsupported type for repeated values: {:?}", dtype),
            }
        };
        ensure!(mat.shape() == &*dims);
        Ok(mat)
    }
}

impl TryFrom<&Tensor> for TensorProto {
    type Error = GraftError;
    fn try_from(from: &Tensor) -> GraftResult<TensorProto> {
        let mut tensor = TensorProto {
            tensor_shape: Some(TensorShapeProto {
                dim: from
                    .shape()
                    .iter()
                    .map(|d| Dim { size: *d as _, name: String::new() })
                    .collect(),
                unknown_rank: false,
            }),
            dtype: DataType::try_from(from.datum_type())?.into(),
            ..TensorProto::default()
        };
        match from.datum_type() {
            DatumType::Bool => tensor.bool_val = from.as_slice::<bool>()?.to_vec(),
            DatumType::F32 => tensor.float_val = from.as_slice::<f32>()?.to_vec(),
            DatumType::F64 => tensor.double_val = from.as_slice::<f64>()?.to_vec(),
            DatumType::I32 => tensor.int_val = from.as_slice::<i32>()?.to_vec(),
            DatumType::I64 => tensor.int64_val = from.as_slice::<i64>()?.to_vec(),
            DatumType::U32 => tensor.uint32_val = from.as_slice::<u32>()?.to_vec(),
            DatumType::U64 => tensor.uint64_val = from.as_slice::<u64>()?.to_vec(),
            dt => bail!("Can not serialize {:?} tensor to TensorProto", dt),
        }
        Ok(tensor)
    }
}

/// A `TensorProto` seen as a canonical tensor.
#[derive(Clone, Copy, Debug, new)]
pub struct TfTensor<'a> {
    proto: &'a TensorProto,
}

impl<'a> IrTensor<'a> for TfTensor<'a> {
    type Native = TensorProto;

    fn native(&self) -> &'a TensorProto {
        self.proto
    }

    fn datum_type(&self) -> GraftResult<DatumType> {
        DatumType::try_from(data_type_from_i32(self.proto.dtype)?)
    }

    fn shape(&self) -> TVec<i64> {
        self.proto.tensor_shape.as_ref().map(dim_sizes).unwrap_or_default()
    }

    fn to_tensor(&self) -> GraftResult<Tensor> {
        Tensor::try_from(self.proto)
    }
}

/// A TensorFlow `DataType` code seen as a canonical datum type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct TfDataType {
    code: i32,
}

impl TfDataType {
    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_i32(self.code)
    }
}

impl IrDataType for TfDataType {
    type Native = i32;

    fn native(&self) -> i32 {
        self.code
    }

    fn datum_type(&self) -> GraftResult<DatumType> {
        DatumType::try_from(data_type_from_i32(self.code)?)
    }
}
