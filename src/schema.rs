//! Element types of file views.
//!
//! A structured dtype is an ordered list of Arrow fields. Each field holds a
//! primitive scalar type, optionally wrapped in one or more `FixedSizeList`
//! layers that encode a fixed vector sub-shape (`FixedSizeList(Float32, 3)` is
//! a `Float32` field of shape `(3,)`). A flat dtype is a bare primitive type.

use std::{collections::HashSet, fmt, sync::Arc};

use arrow_schema::{DataType, Field, FieldRef, Fields, Schema};

use crate::error::SchemaError;

/// Element type of a file view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DType {
    /// Named fields, each a scalar with an optional fixed sub-shape.
    Struct(Fields),
    /// A single unstructured scalar type.
    Scalar(DataType),
}

impl DType {
    /// Field names in order, or `None` for a flat dtype.
    pub fn names(&self) -> Option<Vec<&str>> {
        self.fields()
            .map(|fields| fields.iter().map(|f| f.name().as_str()).collect())
    }

    /// The named fields, or `None` for a flat dtype.
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            DType::Struct(fields) => Some(fields),
            DType::Scalar(_) => None,
        }
    }

    /// Look up a named field.
    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.fields()
            .and_then(|fields| fields.find(name))
            .map(|(_, f)| f)
    }

    /// Number of named fields; zero for a flat dtype.
    pub fn len(&self) -> usize {
        self.fields().map_or(0, |fields| fields.len())
    }

    /// Returns `true` when there are no named fields.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for a dtype with named fields.
    pub fn is_structured(&self) -> bool {
        matches!(self, DType::Struct(_))
    }

    /// Build a structured dtype holding `names` in the given order.
    ///
    /// Returns `None` if the dtype is flat or a name is missing.
    pub fn project(&self, names: &[&str]) -> Option<DType> {
        let mut projected = Vec::with_capacity(names.len());
        for name in names {
            projected.push(Arc::clone(self.field(name)?));
        }
        Some(DType::Struct(Fields::from(projected)))
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Scalar(dt) => write!(f, "{dt}"),
            DType::Struct(fields) => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name(), base_type(field.data_type()))?;
                    let shape = subshape(field.data_type());
                    if !shape.is_empty() {
                        write!(f, "{shape:?}")?;
                    }
                }
                f.write_str("}")
            }
        }
    }
}

/// Scalar type underneath any fixed-size list layers.
pub fn base_type(data_type: &DataType) -> &DataType {
    match data_type {
        DataType::FixedSizeList(item, _) => base_type(item.data_type()),
        other => other,
    }
}

/// Fixed vector sub-shape encoded by nested fixed-size lists; empty for scalars.
pub fn subshape(data_type: &DataType) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut current = data_type;
    while let DataType::FixedSizeList(item, len) = current {
        shape.push(usize::try_from(*len).unwrap_or(0));
        current = item.data_type();
    }
    shape
}

/// Data type of a field with scalar type `base` and sub-shape `shape`.
///
/// The inverse of [`base_type`] and [`subshape`].
pub fn vector_type(base: DataType, shape: &[usize]) -> DataType {
    shape.iter().rev().fold(base, |inner, &len| {
        let len = i32::try_from(len).unwrap_or(i32::MAX);
        DataType::FixedSizeList(Arc::new(Field::new("item", inner, false)), len)
    })
}

/// Number of scalars per row for a field of this type.
pub(crate) fn row_width(data_type: &DataType) -> usize {
    subshape(data_type).iter().product()
}

/// Check that a backend schema can back a file view.
pub(crate) fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    if schema.fields().is_empty() {
        return Err(SchemaError::Empty);
    }
    let mut seen = HashSet::with_capacity(schema.fields().len());
    for field in schema.fields() {
        if !seen.insert(field.name().as_str()) {
            return Err(SchemaError::DuplicateField {
                field_name: field.name().clone(),
            });
        }
        if !base_type(field.data_type()).is_primitive() {
            return Err(SchemaError::unsupported(
                field.name(),
                field.data_type().clone(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DType {
        DType::Struct(Fields::from(vec![
            Field::new("x", DataType::Float32, false),
            Field::new("pos", vector_type(DataType::Float32, &[3]), false),
            Field::new("id", DataType::Int64, false),
        ]))
    }

    #[test]
    fn vector_type_round_trips_shape() {
        let dt = vector_type(DataType::Float64, &[2, 3]);
        assert_eq!(base_type(&dt), &DataType::Float64);
        assert_eq!(subshape(&dt), vec![2, 3]);
        assert_eq!(row_width(&dt), 6);
        assert!(subshape(&DataType::Int8).is_empty());
        assert_eq!(row_width(&DataType::Int8), 1);
    }

    #[test]
    fn project_reorders_and_rejects_missing() {
        let dtype = sample();
        let projected = dtype.project(&["id", "x"]).unwrap();
        assert_eq!(projected.names().unwrap(), vec!["id", "x"]);
        assert!(dtype.project(&["nope"]).is_none());
        assert!(DType::Scalar(DataType::Float32).project(&["x"]).is_none());
    }

    #[test]
    fn flat_dtype_has_no_names() {
        let dtype = DType::Scalar(DataType::Float32);
        assert!(dtype.names().is_none());
        assert_eq!(dtype.len(), 0);
        assert!(dtype.is_empty());
        assert!(!dtype.is_structured());
    }

    #[test]
    fn display_lists_fields_with_shapes() {
        assert_eq!(
            sample().to_string(),
            "{x: Float32, pos: Float32[3], id: Int64}"
        );
        assert_eq!(DType::Scalar(DataType::Float64).to_string(), "Float64");
    }

    #[test]
    fn validate_rejects_bad_schemas() {
        let empty = Schema::empty();
        assert!(matches!(validate_schema(&empty), Err(SchemaError::Empty)));

        let dup = Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("a", DataType::Int32, false),
        ]);
        assert!(matches!(
            validate_schema(&dup),
            Err(SchemaError::DuplicateField { field_name }) if field_name == "a"
        ));

        let strings = Schema::new(vec![Field::new("name", DataType::Utf8, false)]);
        assert!(matches!(
            validate_schema(&strings),
            Err(SchemaError::UnsupportedType { .. })
        ));

        let ok = Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("v", vector_type(DataType::Float32, &[3]), false),
        ]);
        assert!(validate_schema(&ok).is_ok());
    }
}
