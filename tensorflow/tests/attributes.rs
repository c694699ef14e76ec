mod utils;

use graft_tensorflow::graft_ir::errors::AttrError;
use graft_tensorflow::prelude::*;
use graft_tensorflow::tfpb;
use graft_tensorflow::tfpb::tensorflow::{self as pb, DataType, TensorProto};
use utils::*;

use AttributeValueKind as K;

#[test]
fn classifier_table() {
    let table = [
        ("float", K::ScalarFloat),
        ("int", K::ScalarInt),
        ("bool", K::ScalarBool),
        ("string", K::ScalarString),
        ("shape", K::Shape),
        ("tensor", K::Tensor),
        ("type", K::DataType),
        ("list(float)", K::ListFloat),
        ("list(int)", K::ListInt),
        ("list(bool)", K::ListBool),
        ("list(string)", K::ListString),
        ("list(tensor)", K::ListTensor),
        ("list(type)", K::ListDataType),
    ];
    for (tag, kind) in table {
        assert_eq!(classify(tag), kind, "{tag}");
    }
    let invalid =
        ["func", "list(func)", "list(shape)", "", "Int", "list(int", "int64", "placeholder"];
    for tag in invalid {
        assert_eq!(classify(tag), K::Invalid, "{tag:?}");
    }
}

#[test]
fn bool_attribute() {
    let d = def("transpose_a", "bool");
    let v = true.into();
    let attr = TfAttribute::new(&d, &v);
    assert_eq!(attr.kind(), K::ScalarBool);
    assert!(attr.bool_value().unwrap());
    assert_eq!(attr.name(), "transpose_a");
    assert_eq!(attr.framework(), "tensorflow");
}

#[test]
fn list_int_attribute() {
    let d = def("strides", "list(int)");
    let v = vec![1i64, 2, 3].into();
    let attr = TfAttribute::new(&d, &v);
    assert_eq!(attr.list_int_value().unwrap(), vec![1, 2, 3]);
    assert_eq!(&*attr.shape_value().unwrap(), &[1, 2, 3]);
}

#[test]
fn shape_attribute_both_paths() {
    let d = def("shape", "shape");
    let v = tfpb::shape(&[4, 8, 1]).into();
    let attr = TfAttribute::new(&d, &v);
    assert_eq!(attr.kind(), K::Shape);
    assert_eq!(&*attr.shape_value().unwrap(), &[4, 8, 1]);
    assert_eq!(attr.list_int_value().unwrap(), vec![4, 8, 1]);
}

#[test]
fn shape_dimension_names_are_dropped() {
    let mut shape = tfpb::shape(&[2, -1]);
    shape.dim[0].name = "batch".into();
    let d = def("shape", "shape");
    let v = shape.into();
    assert_eq!(&*TfAttribute::new(&d, &v).shape_value().unwrap(), &[2, -1]);
}

#[test]
fn unknown_rank_shape_is_empty() {
    let d = def("shape", "shape");
    let v = tfpb::unknown_shape().into();
    assert!(TfAttribute::new(&d, &v).shape_value().unwrap().is_empty());
}

#[test]
fn empty_lists() {
    for (ty, value) in [
        ("list(int)", pb::AttrValue::from(Vec::<i64>::new())),
        ("list(float)", pb::AttrValue::from(Vec::<f32>::new())),
        ("list(bool)", pb::AttrValue::from(Vec::<bool>::new())),
        ("list(string)", pb::AttrValue::from(Vec::<&str>::new())),
        ("list(type)", pb::AttrValue::from(Vec::<DataType>::new())),
        ("list(tensor)", pb::AttrValue::from(Vec::<TensorProto>::new())),
    ] {
        let d = def("l", ty);
        let attr = TfAttribute::new(&d, &value);
        let decoded = attr.decode(&NativeSubgraphs).unwrap().unwrap();
        assert_eq!(decoded.kind(), classify(ty));
        match decoded {
            AttrValue::ListInt(l) => assert!(l.is_empty()),
            AttrValue::ListFloat(l) => assert!(l.is_empty()),
            AttrValue::ListBool(l) => assert!(l.is_empty()),
            AttrValue::ListString(l) => assert!(l.is_empty()),
            AttrValue::ListDataType(l) => assert!(l.is_empty()),
            AttrValue::ListTensor(l) => assert!(l.is_empty()),
            other => panic!("{ty} decoded as {other:?}"),
        }
    }
}

#[test]
fn string_is_counted_in_chars() {
    let d = def("data_format", "string");
    let v = "ÑHWČ→".into();
    let s = TfAttribute::new(&d, &v).string_value().unwrap();
    assert_eq!(s, "ÑHWČ→");
    assert_eq!(s.chars().count(), 5);
    assert!(s.len() > 5);
}

#[test]
fn list_string_keeps_order() {
    let d = def("names", "list(string)");
    let v = vec!["b", "a", "c"].into();
    assert_eq!(TfAttribute::new(&d, &v).list_string_value().unwrap(), vec!["b", "a", "c"]);
}

#[test]
fn graph_accessors_are_unsupported() {
    for (ty, value) in [
        ("func", pb::AttrValue::default()),
        ("list(int)", vec![1i64].into()),
        ("bool", false.into()),
        ("tensor", pb::AttrValue::default()),
    ] {
        let d = def("body", ty);
        let attr = TfAttribute::new(&d, &value);
        let err = attr.graph_value(&NativeSubgraphs).unwrap_err();
        assert!(AttrError::is_unsupported_capability(&err), "{err:?}");
        let err = attr.list_graph_value(&NativeSubgraphs).unwrap_err();
        assert!(AttrError::is_unsupported_capability(&err), "{err:?}");
    }
}

#[test]
fn wrong_accessor_is_a_mismatch() {
    let d = def("axis", "int");
    let v = 3i64.into();
    let attr = TfAttribute::new(&d, &v);
    assert_eq!(attr.int_value().unwrap(), 3);
    let err = attr.float_value().unwrap_err();
    assert!(AttrError::is_kind_mismatch(&err));
    assert_eq!(err.to_string(), "Attribute 'axis': expected float, found int");
    assert!(attr.list_int_value().is_err());
    assert!(attr.shape_value().is_err());
}

#[test]
fn tensor_attribute() -> GraftResult<()> {
    let t = TensorProto::try_from(&tensor2(&[[1i32, 2], [3, 4]]))?;
    let d = def("value", "tensor");
    let v = t.into();
    let attr = TfAttribute::new(&d, &v);
    let tensor = attr.tensor_value()?;
    assert_eq!(tensor.shape(), tvec!(2, 2));
    assert_eq!(tensor.datum_type()?, DatumType::I32);
    assert_eq!(tensor.to_tensor()?, tensor2(&[[1i32, 2], [3, 4]]));
    Ok(())
}

#[test]
fn decode_data_types() -> GraftResult<()> {
    assert_eq!(decode_one("type", DataType::DtDouble)?, Some(AttrValue::DataType(DatumType::F64)));
    assert_eq!(
        decode_one("list(type)", vec![DataType::DtBool, DataType::DtUint8])?,
        Some(AttrValue::ListDataType(vec![DatumType::Bool, DatumType::U8]))
    );
    assert!(decode_one("type", DataType::DtVariant).is_err());
    Ok(())
}

#[test]
fn registry_falls_back_to_defaults() -> GraftResult<()> {
    setup_test_logger();
    let ops = op_defs();
    let node = tfpb::node()
        .name("conv")
        .op("Conv2D")
        .attr("T", DataType::DtFloat)
        .attr("strides", vec![1i64, 2, 2, 1])
        .attr("padding", "SAME")
        .attr("_class", "ignored");
    let attrs = ops.attributes(&node)?;
    let names: Vec<&str> = attrs.iter().map(|a| a.name()).collect();
    assert_eq!(
        names,
        vec![
            "T",
            "strides",
            "use_cudnn_on_gpu",
            "padding",
            "explicit_paddings",
            "data_format",
            "dilations"
        ]
    );
    let by_name = |n: &str| attrs.iter().find(|a| a.name() == n).unwrap();
    assert_eq!(by_name("dilations").list_int_value()?, vec![1, 1, 1, 1]);
    assert_eq!(by_name("data_format").string_value()?, "NHWC");
    assert!(by_name("use_cudnn_on_gpu").bool_value()?);
    assert!(by_name("explicit_paddings").list_int_value()?.is_empty());
    Ok(())
}

#[test]
fn registry_skips_attributes_without_value() -> GraftResult<()> {
    let ops = op_defs();
    let node = tfpb::node().name("conv").op("Conv2D").attr("T", DataType::DtFloat);
    let names: Vec<String> =
        ops.attributes(&node)?.iter().map(|a| a.name().to_string()).collect();
    assert!(!names.contains(&"strides".to_string()));
    assert!(!names.contains(&"padding".to_string()));
    assert!(names.contains(&"dilations".to_string()));
    Ok(())
}

#[test]
fn float_list_attributes() -> GraftResult<()> {
    let mut ops = OpDefRegistry::default();
    ops.insert(
        tfpb::op_def("FractionalMaxPool")
            .attr("pooling_ratio", "list(float)")
            .attr_with_default("pseudo_random", "bool", false)
            .attr_with_default("overlapping", "bool", false)
            .attr("T", "type"),
    );
    let tf = tensorflow().with_op_defs(ops);
    let node = tfpb::node()
        .name("pool")
        .op("FractionalMaxPool")
        .attr("pooling_ratio", vec![1.0f32, 1.44, 1.73, 1.0])
        .attr("overlapping", true)
        .attr("T", DataType::DtFloat);
    let map = tf.decode_node_attributes(&node)?.into_map().unwrap();
    assert_eq!(map.get_floats("pooling_ratio")?, &[1.0, 1.44, 1.73, 1.0]);
    assert!(map.get_bool("overlapping")?);
    assert!(!map.get_bool("pseudo_random")?);
    let err = map.get_floats("overlapping").unwrap_err();
    assert!(AttrError::is_kind_mismatch(&err));
    Ok(())
}

#[test]
fn unknown_op_is_an_error() {
    let node = tfpb::node().name("x").op("NotAnOp");
    assert!(op_defs().attributes(&node).is_err());
}

#[test]
fn decode_node_with_invalid_attributes() -> GraftResult<()> {
    setup_test_logger();
    let tf = tensorflow().with_op_defs(op_defs());
    let node = tfpb::node()
        .name("cond")
        .op("If")
        .attr("Tcond", DataType::DtBool)
        .attr("Tin", vec![DataType::DtFloat])
        .attr("Tout", vec![DataType::DtFloat, DataType::DtInt64]);
    let map = tf.decode_node_attributes(&node)?.into_map().unwrap();
    assert_eq!(map.names().collect::<Vec<_>>(), vec!["Tcond", "Tin", "Tout"]);
    assert_eq!(map.get_datum_type("Tcond")?, DatumType::Bool);

    let strict = tensorflow().with_op_defs(op_defs()).with_config(
        ImportConfig::default()
            .with_invalid_policy(InvalidAttributePolicy::SkipOperation)
            .with_required(&["then_branch"]),
    );
    let node = node.attr("then_branch", pb::AttrValue::default());
    assert!(strict.decode_node_attributes(&node)?.is_skipped());
    Ok(())
}

#[test]
fn placeholder_shape_default() -> GraftResult<()> {
    let tf = tensorflow().with_op_defs(op_defs());
    let node = placeholder("input", DataType::DtFloat);
    let map = tf.decode_node_attributes(&node)?.into_map().unwrap();
    assert_eq!(map.get_datum_type("dtype")?, DatumType::F32);
    assert!(map.get_shape("shape")?.is_empty());

    let node = node.attr("shape", tfpb::shape(&[1, 224, 224, 3]));
    let map = tf.decode_node_attributes(&node)?.into_map().unwrap();
    assert_eq!(map.get_shape("shape")?, &[1, 224, 224, 3]);
    assert_eq!(map.get_ints("shape")?, &[1, 224, 224, 3]);
    Ok(())
}

#[test]
fn natives_are_the_wrapped_records() {
    let node = placeholder("input", DataType::DtInt32);
    let ops = op_defs();
    let attrs = ops.attributes(&node).unwrap();
    let dtype = attrs.iter().find(|a| a.name() == "dtype").unwrap();
    assert!(std::ptr::eq(dtype.native_value(), &node.attr["dtype"]));
    assert_eq!(dtype.native_def().r#type, "type");
    assert_eq!(dtype.data_type_value().unwrap().data_type(), Some(DataType::DtInt32));
}
