use futures::future::BoxFuture;

use crate::prelude::*;
use crate::datatypes::datatypes::{catalog_schema, regions_schema, sales_schema};
use crate::helper_funcs::build_rec_batch::{extend_schema_with_int64, number_rows};
use crate::helper_funcs::display::print_heading;
use crate::helper_funcs::registertable::register_batches;

/// Name of the hidden file-order column added to the sales table.
pub const LINE_NO_COLUMN: &str = "line_no";

pub trait CsvLoader {
    fn load<'a>(
        &'a self,
        schema: SchemaRef,
        alias: &'a str,
    ) -> BoxFuture<'a, CubeResult<AliasedDataFrame>>;
}

impl CsvLoader for Path {
    fn load<'a>(
        &'a self,
        schema: SchemaRef,
        alias: &'a str,
    ) -> BoxFuture<'a, CubeResult<AliasedDataFrame>> {
        Box::pin(async move {
            let batches = read_csv_batches(self, &schema).await?;
            let ctx = SessionContext::new();
            register_batches(&ctx, alias, schema, batches)?;
            let df = ctx.table(alias).await?;
            Ok(AliasedDataFrame::new(df, alias))
        })
    }
}

async fn read_csv_batches(path: &Path, schema: &SchemaRef) -> CubeResult<Vec<RecordBatch>> {
    if !path.is_file() {
        return Err(CubeError::ReadError {
            path: path.display().to_string(),
            reason: "File not found".to_string(),
            suggestion: "💡 Generate the source files first or check the data directory".to_string(),
        });
    }

    let path_str = path.to_string_lossy();
    let ctx = SessionContext::new();
    let df = ctx
        .read_csv(
            path_str.as_ref(),
            CsvReadOptions::new()
                .schema(schema.as_ref())
                .has_header(true)
                .file_extension(".csv"),
        )
        .await
        .map_err(|e| read_error(path, e))?;

    let batches = df.collect().await.map_err(|e| read_error(path, e))?;
    debug!(
        path = %path.display(),
        rows = batches.iter().map(|b| b.num_rows()).sum::<usize>(),
        "read csv"
    );
    Ok(batches)
}

fn read_error(path: &Path, e: DataFusionError) -> CubeError {
    CubeError::ReadError {
        path: path.display().to_string(),
        reason: e.to_string(),
        suggestion: "💡 Check that the file is comma-delimited with a header row matching the expected columns".to_string(),
    }
}

/// Loads a CSV file with an explicit schema and registers it under `alias`.
pub async fn load_csv_with_schema(
    path: &Path,
    schema: SchemaRef,
    alias: &str,
) -> CubeResult<AliasedDataFrame> {
    path.load(schema, alias).await
}

/// Like [`load_csv_with_schema`], plus a [`LINE_NO_COLUMN`] ordinal in file order.
pub async fn load_csv_with_line_numbers(
    path: &Path,
    schema: SchemaRef,
    alias: &str,
) -> CubeResult<AliasedDataFrame> {
    let batches = read_csv_batches(path, &schema).await?;
    let numbered = number_rows(&batches, LINE_NO_COLUMN)?;
    let numbered_schema = match numbered.first() {
        Some(batch) => batch.schema(),
        None => extend_schema_with_int64(&schema, &[LINE_NO_COLUMN]),
    };

    let ctx = SessionContext::new();
    register_batches(&ctx, alias, numbered_schema, numbered)?;
    let df = ctx.table(alias).await?;
    Ok(AliasedDataFrame::new(df, alias))
}

/// Raw tables read by the extract stage. A table that failed to load is `None`.
#[derive(Debug, Clone)]
pub struct ExtractedTables {
    pub sales: Option<AliasedDataFrame>,
    pub catalog: Option<AliasedDataFrame>,
    pub regions: Option<AliasedDataFrame>,
}

impl ExtractedTables {
    pub fn is_complete(&self) -> bool {
        self.sales.is_some() && self.catalog.is_some() && self.regions.is_some()
    }
}

async fn extract_one<F>(label: &str, path: &Path, load: F) -> Option<AliasedDataFrame>
where
    F: std::future::Future<Output = CubeResult<AliasedDataFrame>>,
{
    match load.await {
        Ok(frame) => {
            match frame.row_count().await {
                Ok(rows) => println!("✅ {} loaded: {} rows", label, rows),
                Err(e) => warn!(table = label, error = %e, "row count unavailable"),
            }
            Some(frame)
        }
        Err(e) => {
            error!(table = label, path = %path.display(), error = %e, "extraction failed");
            println!("❌ Error loading {}: {}", label, e);
            None
        }
    }
}

/// Reads the three source files. Failures are reported and leave the
/// corresponding table empty; they do not stop the run.
pub async fn extract_sources(config: &PipelineConfig) -> ExtractedTables {
    print_heading("📥 Extracting source data...");

    let sales_path = config.sales_path();
    let catalog_path = config.catalog_path();
    let regions_path = config.regions_path();

    let sales = extract_one(
        "sales",
        &sales_path,
        load_csv_with_line_numbers(&sales_path, sales_schema(), "sales"),
    )
    .await;
    let catalog = extract_one(
        "catalog",
        &catalog_path,
        load_csv_with_schema(&catalog_path, catalog_schema(), "catalog"),
    )
    .await;
    let regions = extract_one(
        "regions",
        &regions_path,
        load_csv_with_schema(&regions_path, regions_schema(), "regions"),
    )
    .await;

    ExtractedTables { sales, catalog, regions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_funcs::extract_columns::{i64_column, string_column};
    use crate::source_gen::generator::write_source_files;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extract_generated_sources() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::with_data_dir(temp_dir.path());
        write_source_files(&config).unwrap();

        let tables = extract_sources(&config).await;
        assert!(tables.is_complete());

        let sales = tables.sales.unwrap();
        assert_eq!(sales.alias, "sales");
        assert!(sales.has_column(LINE_NO_COLUMN));

        let batches = sales.collect().await.unwrap();
        let lines: Vec<i64> = batches.iter().flat_map(|b| i64_column(b, LINE_NO_COLUMN).unwrap()).collect();
        assert_eq!(lines, (1..=8).collect::<Vec<i64>>());

        let products: Vec<String> = batches.iter().flat_map(|b| string_column(b, "product").unwrap()).collect();
        assert_eq!(products[2], "Monitor 24\"");

        assert_eq!(tables.catalog.unwrap().row_count().await.unwrap(), 5);
        assert_eq!(tables.regions.unwrap().row_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::with_data_dir(temp_dir.path());
        write_source_files(&config).unwrap();
        fs::remove_file(config.regions_path()).unwrap();

        let tables = extract_sources(&config).await;
        assert!(tables.sales.is_some());
        assert!(tables.catalog.is_some());
        assert!(tables.regions.is_none());
        assert!(!tables.is_complete());
    }

    #[tokio::test]
    async fn test_missing_file_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.csv");
        let result = load_csv_with_schema(&path, regions_schema(), "regions").await;
        assert!(matches!(result, Err(CubeError::ReadError { .. })));
    }
}
