mod utils;

use graft_tensorflow::graft_ir::errors::AttrError;
use graft_tensorflow::prelude::*;
use graft_tensorflow::tfpb;
use graft_tensorflow::tfpb::tensorflow as pb;
use proptest::collection::vec;
use proptest::prelude::*;
use utils::*;

fn dims() -> impl Strategy<Value = Vec<i64>> {
    vec(prop_oneof![Just(-1i64), 0i64..4096], 0..8)
}

proptest! {
    #[test]
    fn shape_reads_the_same_both_ways(dims in dims()) {
        let d = def("shape", "shape");
        let v = tfpb::shape(&dims).into();
        let attr = TfAttribute::new(&d, &v);
        let as_shape = attr.shape_value().unwrap();
        let as_ints = attr.list_int_value().unwrap();
        prop_assert_eq!(&*as_shape, &*as_ints);
        prop_assert_eq!(as_ints, dims);
    }

    #[test]
    fn int_lists_keep_order_and_length(ints in vec(any::<i64>(), 0..32)) {
        let decoded = decode_one("list(int)", ints.clone()).unwrap().unwrap();
        prop_assert_eq!(decoded.as_ints().unwrap(), &*ints);
        prop_assert_eq!(decoded.as_shape().unwrap(), &*ints);
    }

    #[test]
    fn float_lists_keep_order_and_length(floats in vec(-1e6f32..1e6, 0..32)) {
        let decoded = decode_one("list(float)", floats.clone()).unwrap().unwrap();
        prop_assert_eq!(decoded.as_floats().unwrap(), &*floats);
    }

    #[test]
    fn strings_decode_to_their_chars(s in "\\PC{0,24}") {
        let d = def("s", "string");
        let v = pb::AttrValue::from(s.as_bytes().to_vec());
        let decoded = TfAttribute::new(&d, &v).string_value().unwrap();
        prop_assert_eq!(decoded.chars().count(), s.chars().count());
        prop_assert_eq!(decoded, s);
    }

    #[test]
    fn graphs_are_never_supported(ty in "[a-z()]{0,12}", i in any::<i64>()) {
        let d = def("body", &ty);
        let v = pb::AttrValue::from(i);
        let attr = TfAttribute::new(&d, &v);
        let err = attr.graph_value(&NativeSubgraphs).unwrap_err();
        prop_assert!(AttrError::is_unsupported_capability(&err));
        let err = attr.list_graph_value(&NativeSubgraphs).unwrap_err();
        prop_assert!(AttrError::is_unsupported_capability(&err));
    }
}
