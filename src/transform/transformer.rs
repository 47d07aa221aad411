use crate::prelude::*;
use crate::aggregation_builder::aggregation::AggregationBuilder;
use crate::helper_funcs::display::print_heading;
use crate::helper_funcs::extract_columns::i64_column;
use crate::helper_funcs::registertable::{register_df_as_table, run_sql};
use crate::loaders::csv_loader::{ExtractedTables, LINE_NO_COLUMN};
use crate::normalizers::normalize::{aliased, product_key_expr, qualified, quote_ident, sql_literal};
use crate::sqlbuilder::sqlbuild::{JoinClause, SqlBuilder};

const JOINED_TABLE: &str = "joined_sales";

/// Nulls found in one column of the joined table.
#[derive(Debug, Clone, PartialEq)]
pub struct NullCount {
    pub column_name: String,
    pub total_rows: i64,
    pub null_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NullAnalysis {
    pub counts: Vec<NullCount>,
}

impl NullAnalysis {
    pub fn has_nulls(&self) -> bool {
        self.counts.iter().any(|c| c.null_count > 0)
    }

    pub fn null_count(&self, column: &str) -> i64 {
        self.counts
            .iter()
            .find(|c| c.column_name == column)
            .map(|c| c.null_count)
            .unwrap_or(0)
    }

    fn report(&self) {
        if !self.has_nulls() {
            println!("✅ No null values after joins");
            return;
        }
        println!("⚠️  Null values after joins:");
        for count in self.counts.iter().filter(|c| c.null_count > 0) {
            println!("   {}: {} of {} rows", count.column_name, count.null_count, count.total_rows);
            warn!(column = %count.column_name, nulls = count.null_count, "null values after join");
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub joined: AliasedDataFrame,
    pub null_analysis: NullAnalysis,
}

/// Select items of the join, in output order. Columns of a missing lookup
/// table are left out.
fn joined_select(sales: &str, catalog: Option<&str>, regions: Option<&str>) -> Vec<String> {
    let mut parts = vec![
        qualified(sales, LINE_NO_COLUMN),
        qualified(sales, "date"),
        aliased(&product_key_expr(&qualified(sales, "product")), "product"),
    ];
    if let Some(c) = catalog {
        parts.push(qualified(c, "category"));
        parts.push(qualified(c, "supplier"));
        parts.push(qualified(c, "reference_price"));
    }
    parts.push(qualified(sales, "quantity"));
    parts.push(qualified(sales, "unit_price"));
    parts.push(aliased(
        &format!("CAST({} AS DOUBLE) * {}", qualified(sales, "quantity"), qualified(sales, "unit_price")),
        "total_amount",
    ));
    if let Some(r) = regions {
        parts.push(qualified(r, "region_name"));
        parts.push(qualified(r, "zone"));
    }
    parts.push(qualified(sales, "region_code"));
    parts
}

fn join_sql(sales: &str, catalog: Option<&str>, regions: Option<&str>) -> String {
    let mut joins = Vec::new();
    if let Some(c) = catalog {
        joins.push(JoinClause::left(
            c,
            &quote_ident(c),
            format!(
                "{} = {}",
                product_key_expr(&qualified(sales, "product")),
                qualified(c, "product")
            ),
        ));
    }
    if let Some(r) = regions {
        joins.push(JoinClause::left(
            r,
            &quote_ident(r),
            format!("{} = {}", qualified(sales, "region_code"), qualified(r, "region_code")),
        ));
    }

    SqlBuilder::with_capacity(512)
        .select(&joined_select(sales, catalog, regions))
        .from_table(sales, Some(&quote_ident(sales)))
        .joins(&joins)
        .build()
}

async fn count_nulls(ctx: &SessionContext, columns: &[String]) -> CubeResult<NullAnalysis> {
    let mut parts = vec![AggregationBuilder::count_rows().alias("total_rows").build_sql()];
    for column in columns {
        parts.push(aliased(
            &format!("COUNT(*) - COUNT({})", quote_ident(column)),
            column,
        ));
    }

    let sql = SqlBuilder::with_capacity(256)
        .select(&parts)
        .from_table(JOINED_TABLE, None)
        .build();
    let batches = run_sql(ctx, &sql).await?;

    let mut counts = Vec::with_capacity(columns.len());
    if let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) {
        let total_rows = i64_column(batch, "total_rows")?[0];
        for column in columns {
            counts.push(NullCount {
                column_name: column.clone(),
                total_rows,
                null_count: i64_column(batch, column)?[0],
            });
        }
    }
    Ok(NullAnalysis { counts })
}

/// Joins sales to the catalog and region lookup, derives `total_amount`,
/// fills missing categorical values and numbers the rows in sales order.
pub async fn transform(
    tables: &ExtractedTables,
    defaults: &NullDefaults,
) -> CubeResult<TransformOutput> {
    print_heading("🔄 Transforming data...");

    let sales = tables.sales.as_ref().ok_or_else(|| CubeError::InvalidOperation {
        operation: "Transform".to_string(),
        reason: "Sales table was not extracted".to_string(),
        suggestion: "💡 Check that the sales file exists and is readable".to_string(),
    })?;

    let ctx = SessionContext::new();
    register_df_as_table(&ctx, &sales.alias, &sales.dataframe).await?;
    for lookup in [&tables.catalog, &tables.regions].into_iter().flatten() {
        register_df_as_table(&ctx, &lookup.alias, &lookup.dataframe).await?;
    }
    if tables.catalog.is_none() {
        warn!("catalog table missing, product attributes will not be joined");
    }
    if tables.regions.is_none() {
        warn!("regions table missing, region attributes will not be joined");
    }

    let catalog_alias = tables.catalog.as_ref().map(|f| f.alias.as_str());
    let regions_alias = tables.regions.as_ref().map(|f| f.alias.as_str());
    let joined = ctx.sql(&join_sql(&sales.alias, catalog_alias, regions_alias)).await?;
    register_df_as_table(&ctx, JOINED_TABLE, &joined).await?;

    let output_columns: Vec<String> = joined
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .filter(|name| name != LINE_NO_COLUMN)
        .collect();

    let null_analysis = count_nulls(&ctx, &output_columns).await?;
    null_analysis.report();

    let mut parts = vec![aliased(
        &format!("CAST(ROW_NUMBER() OVER (ORDER BY {}) AS BIGINT)", quote_ident(LINE_NO_COLUMN)),
        "row_id",
    )];
    for column in &output_columns {
        match defaults.for_column(column) {
            Some(default) => parts.push(aliased(
                &format!("COALESCE({}, {})", quote_ident(column), sql_literal(default)),
                column,
            )),
            None => parts.push(quote_ident(column)),
        }
    }

    let sql = SqlBuilder::with_capacity(512)
        .select(&parts)
        .from_table(JOINED_TABLE, None)
        .order_by(&[(quote_ident("row_id"), true)])
        .build();
    debug!(%sql, "final transform");
    let df = ctx.sql(&sql).await?;

    let joined = AliasedDataFrame::new(df, "facts_joined");
    println!("✅ Joined table: {} rows, {} columns", joined.row_count().await?, output_columns.len() + 1);

    Ok(TransformOutput { joined, null_analysis })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_funcs::extract_columns::{f64_column, rows_from_batches, string_column};
    use crate::loaders::csv_loader::extract_sources;
    use crate::source_gen::generator::{write_source_files, SourceTables};
    use crate::writers::csv_writer::write_records_to_csv;
    use tempfile::TempDir;

    async fn joined_batches(config: &PipelineConfig) -> (TransformOutput, Vec<RecordBatch>) {
        let tables = extract_sources(config).await;
        let output = transform(&tables, &config.null_defaults).await.unwrap();
        let batches = output.joined.collect().await.unwrap();
        (output, batches)
    }

    #[test]
    fn test_join_sql_shape() {
        let sql = join_sql("sales", Some("catalog"), None);
        assert!(sql.contains("LEFT JOIN \"catalog\" AS \"catalog\" ON lower(trim(\"sales\".\"product\")) = \"catalog\".\"product\""));
        assert!(!sql.contains("region_name"));
        assert!(sql.contains("CAST(\"sales\".\"quantity\" AS DOUBLE) * \"sales\".\"unit_price\" AS \"total_amount\""));
    }

    #[tokio::test]
    async fn test_transform_generated_sources() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::with_data_dir(temp_dir.path());
        write_source_files(&config).unwrap();

        let (output, batches) = joined_batches(&config).await;
        assert!(!output.null_analysis.has_nulls());

        let row_ids = rows_from_batches(&batches, |b| i64_column(b, "row_id")).unwrap();
        assert_eq!(row_ids, (1..=8).collect::<Vec<i64>>());

        let products = rows_from_batches(&batches, |b| string_column(b, "product")).unwrap();
        assert_eq!(products[0], "teclado mecanico");
        assert_eq!(products[2], "monitor 24\"");

        let totals = rows_from_batches(&batches, |b| f64_column(b, "total_amount")).unwrap();
        assert_eq!(totals, vec![160.0, 75.0, 300.0, 80.0, 100.0, 300.0, 600.0, 135.0]);
        assert!(!output.joined.has_column(LINE_NO_COLUMN));
    }

    #[tokio::test]
    async fn test_unmatched_product_gets_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::with_data_dir(temp_dir.path());
        let mut tables = SourceTables::sample().unwrap();
        tables.catalog.retain(|c| c.product_name != "tablet");
        write_records_to_csv(&config.sales_path(), &tables.sales).unwrap();
        write_records_to_csv(&config.catalog_path(), &tables.catalog).unwrap();
        write_records_to_csv(&config.regions_path(), &tables.regions).unwrap();

        let (output, batches) = joined_batches(&config).await;
        assert_eq!(output.null_analysis.null_count("category"), 1);
        assert_eq!(output.null_analysis.null_count("supplier"), 1);

        let categories = rows_from_batches(&batches, |b| string_column(b, "category")).unwrap();
        let suppliers = rows_from_batches(&batches, |b| string_column(b, "supplier")).unwrap();
        assert_eq!(categories[5], "Uncategorized");
        assert_eq!(suppliers[5], "Unknown");
        assert_eq!(categories.iter().filter(|c| *c == "Uncategorized").count(), 1);
    }

    #[tokio::test]
    async fn test_missing_sales_is_an_error() {
        let tables = ExtractedTables { sales: None, catalog: None, regions: None };
        let result = transform(&tables, &NullDefaults::default()).await;
        assert!(matches!(result, Err(CubeError::InvalidOperation { .. })));
    }
}
