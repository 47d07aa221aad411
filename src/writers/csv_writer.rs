use crate::prelude::*;

/// Creates the parent directory of `path` when it is missing.
pub fn ensure_parent_dir(path: &Path) -> CubeResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| CubeError::WriteError {
                path: parent.display().to_string(),
                operation: "create_directory".to_string(),
                reason: e.to_string(),
                suggestion: "💡 Check if you have permissions to create directories".to_string(),
            })?;
        }
    }
    Ok(())
}

/// Removes a previous output file so the new one fully replaces it.
fn remove_existing(path: &Path) -> CubeResult<()> {
    if fs::metadata(path).is_ok() {
        fs::remove_file(path).map_err(|e| CubeError::WriteError {
            path: path.display().to_string(),
            operation: "overwrite".to_string(),
            reason: format!("Failed to delete existing file: {}", e),
            suggestion: "💡 Check file permissions and ensure no other process is using the file".to_string(),
        })?;
    }
    Ok(())
}

fn create_file(path: &Path) -> CubeResult<BufWriter<File>> {
    ensure_parent_dir(path)?;
    remove_existing(path)?;

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| CubeError::WriteError {
            path: path.display().to_string(),
            operation: "file_create".to_string(),
            reason: e.to_string(),
            suggestion: "💡 Check file permissions and path validity".to_string(),
        })?;

    Ok(BufWriter::new(file))
}

/// Writes Arrow batches as comma-separated text with a header row, replacing
/// any existing file. With no rows only the header is written.
pub fn write_batches_to_csv(
    path: &Path,
    schema: SchemaRef,
    batches: &[RecordBatch],
) -> CubeResult<usize> {
    if !path.to_string_lossy().ends_with(".csv") {
        return Err(CubeError::Custom(
            "❌ Invalid file extension. CSV files must end with '.csv'".to_string()
        ));
    }

    let writer = create_file(path)?;
    let mut csv_writer = WriterBuilder::new()
        .with_header(true)
        .build(writer);

    let empty = RecordBatch::new_empty(schema);
    let to_write: Vec<&RecordBatch> = if batches.iter().all(|b| b.num_rows() == 0) {
        vec![&empty]
    } else {
        batches.iter().collect()
    };

    let mut rows = 0;
    for batch in to_write {
        csv_writer.write(batch).map_err(|e| CubeError::WriteError {
            path: path.display().to_string(),
            operation: "write_data".to_string(),
            reason: e.to_string(),
            suggestion: "💡 Failed to write data batch".to_string(),
        })?;
        rows += batch.num_rows();
    }

    csv_writer.into_inner().flush().map_err(|e| CubeError::WriteError {
        path: path.display().to_string(),
        operation: "flush".to_string(),
        reason: e.to_string(),
        suggestion: "💡 Failed to flush data to file".to_string(),
    })?;

    debug!(path = %path.display(), rows, "wrote csv");
    Ok(rows)
}

/// Serializes typed records through the `csv` crate, header taken from the
/// field names.
pub fn write_records_to_csv<T: Serialize>(path: &Path, records: &[T]) -> CubeResult<usize> {
    let writer = create_file(path)?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    for record in records {
        csv_writer.serialize(record)?;
    }

    csv_writer.flush().map_err(|e| CubeError::WriteError {
        path: path.display().to_string(),
        operation: "flush".to_string(),
        reason: e.to_string(),
        suggestion: "💡 Failed to flush data to file".to_string(),
    })?;

    debug!(path = %path.display(), rows = records.len(), "wrote csv records");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn region_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("region_name", ArrowDataType::Utf8, true),
            Field::new("total_revenue", ArrowDataType::Float64, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Norte", "Sur"])),
                Arc::new(Float64Array::from(vec![760.0, 310.5])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_write_batches_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("regions.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale content that is longer than the new file\n".repeat(20)).unwrap();

        let batch = region_batch();
        let rows = write_batches_to_csv(&path, batch.schema(), &[batch]).unwrap();
        assert_eq!(rows, 2);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("region_name,total_revenue\n"));
        assert!(content.contains("Norte,760"));
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_empty_input_still_writes_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");
        let schema = region_batch().schema();

        let rows = write_batches_to_csv(&path, schema, &[]).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "region_name,total_revenue");
    }

    #[test]
    fn test_rejects_non_csv_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("facts.txt");
        let schema = region_batch().schema();
        assert!(write_batches_to_csv(&path, schema, &[]).is_err());
    }

    #[test]
    fn test_write_records_uses_serde_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("regions.csv");
        let regions = vec![RegionEntry {
            region_code: 1,
            region_name: "Norte".to_string(),
            zone: "Nacional".to_string(),
        }];

        write_records_to_csv(&path, &regions).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "region_code,region_name,zone\n1,Norte,Nacional\n");
    }
}
