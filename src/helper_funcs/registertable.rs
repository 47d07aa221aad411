use crate::prelude::*;

pub async fn register_df_as_table(
        ctx: &SessionContext,
        table_name: &str,
        df: &DataFrame,
    ) -> CubeResult<()> {
        let batches = df.clone().collect().await
        .map_err(|e| CubeError::InvalidOperation {
            operation: "Data Collection".to_string(),
            reason: format!("Failed to collect DataFrame: {}", e),
            suggestion: "💡 Check if DataFrame contains valid data".to_string()
        })?;

        // collected batches may differ from the logical schema in nullability
        let schema: SchemaRef = match batches.first() {
            Some(batch) => batch.schema(),
            None => df.schema().inner().clone(),
        };

        register_batches(ctx, table_name, schema, batches)
    }

pub fn register_batches(
        ctx: &SessionContext,
        table_name: &str,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> CubeResult<()> {
        let mem_table = MemTable::try_new(schema.clone(), vec![batches])
        .map_err(|e| CubeError::SchemaError {
            message: format!("Failed to create in-memory table: {}", e),
            schema: Some(schema.to_string()),
            suggestion: "💡 Verify schema compatibility and data types".to_string()
        })?;

        ctx.deregister_table(table_name)?;
        ctx.register_table(table_name, Arc::new(mem_table))
        .map_err(|e| CubeError::InvalidOperation {
            operation: "Table Registration".to_string(),
            reason: format!("Failed to register table '{}': {}", table_name, e),
            suggestion: "💡 Check if table name is unique and valid".to_string()
        })?;

        Ok(())
    }

/// Runs a statement and collects every batch.
pub async fn run_sql(ctx: &SessionContext, sql: &str) -> CubeResult<Vec<RecordBatch>> {
    debug!(%sql, "executing");
    let df = ctx.sql(sql).await?;
    let batches = df.collect().await?;
    Ok(batches)
}

/// Registers `frame` in a fresh context under its alias and runs `sql` against it.
pub async fn query_frame(frame: &AliasedDataFrame, sql: &str) -> CubeResult<Vec<RecordBatch>> {
    let ctx = SessionContext::new();
    register_df_as_table(&ctx, &frame.alias, &frame.dataframe).await?;
    run_sql(&ctx, sql).await
}

/// Like [`query_frame`] but keeps the result as a lazily evaluated frame.
pub async fn query_frame_as(
    frame: &AliasedDataFrame,
    sql: &str,
    alias: &str,
) -> CubeResult<AliasedDataFrame> {
    let ctx = SessionContext::new();
    register_df_as_table(&ctx, &frame.alias, &frame.dataframe).await?;
    debug!(%sql, alias, "planning");
    let df = ctx.sql(sql).await?;
    Ok(AliasedDataFrame::new(df, alias))
}
