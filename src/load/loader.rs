use crate::prelude::*;
use crate::helper_funcs::display::print_heading;
use crate::helper_funcs::registertable::query_frame_as;
use crate::normalizers::normalize::quote_ident;
use crate::sqlbuilder::sqlbuild::SqlBuilder;
use crate::writers::csv_writer::write_batches_to_csv;

pub const FACT_ALIAS: &str = "facts";

/// The projected fact table, kept in memory for the reporting stage.
#[derive(Debug, Clone)]
pub struct LoadedFacts {
    pub frame: AliasedDataFrame,
    pub batches: Vec<RecordBatch>,
    pub rows: Vec<FactSalesRow>,
    pub path: PathBuf,
}

impl LoadedFacts {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Fails with `MissingColumn` on the first fact column the joined table lacks.
pub fn check_fact_columns(joined: &AliasedDataFrame) -> CubeResult<()> {
    let available = joined.column_names();
    match FACT_COLUMNS.iter().find(|c| !available.iter().any(|a| a == *c)) {
        Some(missing) => Err(CubeError::MissingColumn {
            column: missing.to_string(),
            available_columns: available,
        }),
        None => Ok(()),
    }
}

/// Projects the joined table onto the fact columns and writes it to `path`,
/// replacing any previous file.
pub async fn load_fact_table(joined: &AliasedDataFrame, path: &Path) -> CubeResult<LoadedFacts> {
    print_heading("💾 Loading fact table...");
    check_fact_columns(joined)?;

    let columns: Vec<String> = FACT_COLUMNS.iter().map(|c| quote_ident(c)).collect();
    let sql = SqlBuilder::with_capacity(256)
        .select(&columns)
        .from_table(&joined.alias, None)
        .order_by(&[(quote_ident("row_id"), true)])
        .build();

    let projected = query_frame_as(joined, &sql, FACT_ALIAS).await?;
    let batches = projected.collect().await?;
    let schema: SchemaRef = match batches.first() {
        Some(batch) => batch.schema(),
        None => projected.dataframe.schema().inner().clone(),
    };

    let written = write_batches_to_csv(path, schema, &batches)?;
    let rows = FactSalesRow::from_batches(&batches)?;

    println!("✅ Fact table saved to {} ({} rows)", path.display(), written);
    info!(path = %path.display(), rows = written, "fact table written");

    Ok(LoadedFacts {
        frame: projected,
        batches,
        rows,
        path: path.to_path_buf(),
    })
}
