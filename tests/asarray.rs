mod common;

use arrow_schema::DataType;
use common::{Liar, ROWS, catalog, catalog_batch};
use fileview::{ConversionError, DType, FileError, FileView, Slice};

#[test]
fn same_typed_scalars_stack_into_columns() {
    let (file, _) = catalog();
    let view = file.select(&["ra", "dec", "z"]).unwrap();
    let flat = view.asarray().unwrap();
    assert_eq!(flat.dtype(), &DType::Scalar(DataType::Float32));
    assert_eq!(flat.shape(), vec![ROWS, view.ncol()]);
    assert_eq!(flat.columns(), view.columns());
    assert_eq!(flat.size(), view.size());
    assert!(flat.base().is_some());

    let array = flat.rows(..).unwrap().into_array().unwrap();
    for (i, name) in view.columns().into_iter().enumerate() {
        let by_position = array.index_axis(&i.into()).unwrap();
        let by_name = file.column(name).unwrap().rows(..).unwrap().into_array().unwrap();
        assert_eq!(by_position, by_name, "column {name}");
    }
}

#[test]
fn single_vector_field_keeps_subshape() {
    let (file, log) = catalog();
    let pos = file.column("pos").unwrap();
    assert_eq!(pos.shape(), vec![ROWS, 3]);
    assert_eq!(pos.columns(), vec!["pos"]);
    assert_eq!(pos.to_string(), "<Catalog with 1 column(s) and shape (10, 3)>");

    let rows = pos.rows(2..4).unwrap().into_array().unwrap();
    assert_eq!(rows.shape(), &[2, 3]);
    assert_eq!(rows.to_vec::<f32>().unwrap(), vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);

    let y = pos.rows((.., 1)).unwrap().into_array().unwrap();
    let expected: Vec<f32> = (0..ROWS).map(|i| (3 * i + 1) as f32).collect();
    assert_eq!(y.to_vec::<f32>().unwrap(), expected);

    let calls = log.lock().unwrap().clone();
    assert!(calls.iter().all(|c| c.columns == vec!["pos".to_string()]));
}

#[test]
fn flattening_twice_is_rejected() {
    let (file, _) = catalog();
    let flat = file.column("ra").unwrap();
    assert!(matches!(
        flat.asarray(),
        Err(FileError::Conversion(ConversionError::NoNamedFields))
    ));
}

#[test]
fn mixed_base_types_are_rejected() {
    let (file, _) = catalog();
    let view = file.select(&["ra", "id"]).unwrap();
    match view.asarray() {
        Err(FileError::Conversion(ConversionError::MixedBaseTypes {
            column,
            expected,
            found,
        })) => {
            assert_eq!(column, "id");
            assert_eq!(expected, DataType::Float32);
            assert_eq!(found, DataType::Int64);
        }
        other => panic!("expected mixed types error, got {other:?}"),
    }
}

#[test]
fn vector_with_scalar_is_rejected() {
    let (file, _) = catalog();
    let view = file.select(&["ra", "pos"]).unwrap();
    match view.asarray() {
        Err(FileError::Conversion(ConversionError::MultipleVectorFields { column, shape })) => {
            assert_eq!(column, "pos");
            assert_eq!(shape, vec![3]);
        }
        other => panic!("expected vector fields error, got {other:?}"),
    }
    let err = view.asarray().unwrap_err();
    assert!(
        err.to_string().starts_with("cannot convert multiple vector data types"),
        "{err}"
    );
}

#[test]
fn reinterpretation_failure_wraps_cause() {
    let file = FileView::new(Liar(catalog_batch())).unwrap();
    let flat = file.column("ra").unwrap();
    match flat.rows(..3) {
        Err(FileError::Reinterpret { message }) => {
            assert!(message.contains("cannot view column 'id'"), "{message}");
        }
        other => panic!("expected reinterpret error, got {other:?}"),
    }
}

#[test]
fn flattened_views_reverse_whole_rows() {
    let (file, log) = catalog();
    let pos = file.column("pos").unwrap();
    let rows = pos
        .rows(Slice::new(Some(3), None, Some(-2)))
        .unwrap()
        .into_array()
        .unwrap();
    assert_eq!(rows.shape(), &[2, 3]);
    assert_eq!(rows.to_vec::<f32>().unwrap(), vec![9.0, 10.0, 11.0, 3.0, 4.0, 5.0]);

    let pair = file.select(&["dec", "ra"]).unwrap();
    let flat = pair.asarray().unwrap();
    let reversed = flat
        .rows(Slice::full().with_step(-4))
        .unwrap()
        .into_array()
        .unwrap();
    assert_eq!(reversed.shape(), &[3, 2]);
    assert_eq!(
        reversed.to_vec::<f32>().unwrap(),
        vec![109.0, 9.0, 105.0, 5.0, 101.0, 1.0]
    );
    let forward = flat
        .rows(Slice::new(Some(1), None, Some(4)))
        .unwrap()
        .into_array()
        .unwrap();
    assert_eq!(forward.reverse_rows().unwrap(), reversed);

    let call = log.lock().unwrap().last().cloned().unwrap();
    assert_eq!((call.start, call.stop, call.step), (1, 10, 4));
}
