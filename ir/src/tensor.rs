use std::fmt::Debug;

use crate::GraftResult;
use tract_data::prelude::{DatumType, TVec, Tensor};

/// A framework-native tensor, seen through the canonical model.
///
/// Implementations borrow the native record; conversion only happens in
/// `to_tensor`.
pub trait IrTensor<'a>: Debug {
    type Native: ?Sized;

    fn native(&self) -> &'a Self::Native;
    fn datum_type(&self) -> GraftResult<DatumType>;
    /// Dimension sizes as declared by the native record.
    fn shape(&self) -> TVec<i64>;
    fn to_tensor(&self) -> GraftResult<Tensor>;
}

/// A framework-native data type code, seen through the canonical model.
pub trait IrDataType: Debug {
    type Native;

    fn native(&self) -> Self::Native;
    fn datum_type(&self) -> GraftResult<DatumType>;
}
