use crate::prelude::*;

fn column_by_name<'a>(batch: &'a RecordBatch, column_name: &str) -> CubeResult<&'a ArrayRef> {
    let schema = batch.schema();
    let index = schema.index_of(column_name).map_err(|_| CubeError::MissingColumn {
        column: column_name.to_string(),
        available_columns: schema.fields().iter().map(|f| f.name().to_string()).collect(),
    })?;
    Ok(batch.column(index))
}

fn cast_column(batch: &RecordBatch, column_name: &str, to_type: &ArrowDataType) -> CubeResult<ArrayRef> {
    let array = column_by_name(batch, column_name)?;
    Ok(compute::cast(array.as_ref(), to_type)?)
}

fn downcast_failure(column_name: &str, target: &str) -> CubeError {
    CubeError::Custom(format!("Failed to downcast column '{}' to {}", column_name, target))
}

/// Column values rendered as text; nulls become `None`.
pub fn optional_string_column(batch: &RecordBatch, column_name: &str) -> CubeResult<Vec<Option<String>>> {
    let casted = cast_column(batch, column_name, &ArrowDataType::Utf8)?;
    let array = casted.as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| downcast_failure(column_name, "StringArray"))?;

    Ok((0..array.len())
        .map(|i| if array.is_null(i) { None } else { Some(array.value(i).to_string()) })
        .collect())
}

/// Column values rendered as text; nulls become empty strings.
pub fn string_column(batch: &RecordBatch, column_name: &str) -> CubeResult<Vec<String>> {
    Ok(optional_string_column(batch, column_name)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

pub fn i64_column(batch: &RecordBatch, column_name: &str) -> CubeResult<Vec<i64>> {
    let casted = cast_column(batch, column_name, &ArrowDataType::Int64)?;
    let array = casted.as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| downcast_failure(column_name, "Int64Array"))?;

    Ok((0..array.len())
        .map(|i| if array.is_null(i) { 0 } else { array.value(i) })
        .collect())
}

pub fn f64_column(batch: &RecordBatch, column_name: &str) -> CubeResult<Vec<f64>> {
    let casted = cast_column(batch, column_name, &ArrowDataType::Float64)?;
    let array = casted.as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| downcast_failure(column_name, "Float64Array"))?;

    Ok((0..array.len())
        .map(|i| if array.is_null(i) { 0.0 } else { array.value(i) })
        .collect())
}

pub fn date_column(batch: &RecordBatch, column_name: &str) -> CubeResult<Vec<Option<NaiveDate>>> {
    let casted = cast_column(batch, column_name, &ArrowDataType::Date32)?;
    let array = casted.as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| downcast_failure(column_name, "Date32Array"))?;

    Ok((0..array.len())
        .map(|i| if array.is_null(i) { None } else { array.value_as_date(i) })
        .collect())
}

/// Applies `extract` to each batch and concatenates the results.
pub fn rows_from_batches<T, F>(batches: &[RecordBatch], mut extract: F) -> CubeResult<Vec<T>>
where
    F: FnMut(&RecordBatch) -> CubeResult<Vec<T>>,
{
    let mut rows = Vec::new();
    for batch in batches {
        rows.extend(extract(batch)?);
    }
    Ok(rows)
}
