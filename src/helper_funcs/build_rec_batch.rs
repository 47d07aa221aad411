use crate::prelude::*;

/// Returns a copy of `batch` with extra columns appended on the right.
pub fn append_columns(
    batch: &RecordBatch,
    extra: Vec<(Field, ArrayRef)>,
) -> CubeResult<RecordBatch> {
    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    for (field, array) in extra {
        if array.len() != batch.num_rows() {
            return Err(CubeError::SchemaError {
                message: format!(
                    "Column '{}' has {} values but the batch has {} rows",
                    field.name(),
                    array.len(),
                    batch.num_rows()
                ),
                schema: Some(batch.schema().to_string()),
                suggestion: "💡 Derived columns must be built from the same batch".to_string(),
            });
        }
        fields.push(field);
        columns.push(array);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Appends a dense 1-based ordinal column that runs across all batches in
/// their current order.
pub fn number_rows(batches: &[RecordBatch], column_name: &str) -> CubeResult<Vec<RecordBatch>> {
    let mut next: i64 = 1;
    let mut numbered = Vec::with_capacity(batches.len());

    for batch in batches {
        let rows = batch.num_rows() as i64;
        let ordinals: ArrayRef = Arc::new(Int64Array::from_iter_values(next..next + rows));
        next += rows;
        numbered.push(append_columns(
            batch,
            vec![(Field::new(column_name, ArrowDataType::Int64, false), ordinals)],
        )?);
    }

    Ok(numbered)
}

/// Schema of `base` with the given non-null Int64 columns added, for empty
/// inputs where there is no batch to derive it from.
pub fn extend_schema_with_int64(base: &SchemaRef, names: &[&str]) -> SchemaRef {
    let mut fields: Vec<Field> = base.fields().iter().map(|f| f.as_ref().clone()).collect();
    for name in names {
        fields.push(Field::new(*name, ArrowDataType::Int64, false));
    }
    Arc::new(Schema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_of(values: Vec<&str>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("product", ArrowDataType::Utf8, true)]));
        RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values))]).unwrap()
    }

    #[test]
    fn test_number_rows_spans_batches() {
        let batches = vec![batch_of(vec!["a", "b"]), batch_of(vec!["c"])];
        let numbered = number_rows(&batches, "line_no").unwrap();

        let first = numbered[0].column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        let second = numbered[1].column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(first.values().to_vec(), vec![1, 2]);
        assert_eq!(second.values().to_vec(), vec![3]);
        assert_eq!(numbered[1].schema().field(1).name(), "line_no");
    }

    #[test]
    fn test_append_rejects_length_mismatch() {
        let batch = batch_of(vec!["a", "b"]);
        let short: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        let result = append_columns(&batch, vec![(Field::new("x", ArrowDataType::Int64, false), short)]);
        assert!(matches!(result, Err(CubeError::SchemaError { .. })));
    }
}
