use crate::prelude::*;
use crate::helper_funcs::build_rec_batch::append_columns;
use crate::helper_funcs::extract_columns::date_column;
use crate::helper_funcs::registertable::register_batches;

pub const MONTH_COLUMN: &str = "month";
pub const WEEK_COLUMN: &str = "week";

/// Month number and ISO week number of a day.
pub fn month_and_week(date: NaiveDate) -> (i64, i64) {
    (date.month() as i64, date.iso_week().week() as i64)
}

fn calendar_columns(batch: &RecordBatch) -> CubeResult<RecordBatch> {
    let dates = date_column(batch, "date")?;
    let (months, weeks): (Vec<Option<i64>>, Vec<Option<i64>>) = dates
        .iter()
        .map(|d| match d {
            Some(date) => {
                let (month, week) = month_and_week(*date);
                (Some(month), Some(week))
            }
            None => (None, None),
        })
        .unzip();

    append_columns(
        batch,
        vec![
            (Field::new(MONTH_COLUMN, ArrowDataType::Int64, true), Arc::new(Int64Array::from(months)) as ArrayRef),
            (Field::new(WEEK_COLUMN, ArrowDataType::Int64, true), Arc::new(Int64Array::from(weeks)) as ArrayRef),
        ],
    )
}

/// The fact table with `month` and `week` columns derived from `date`.
/// Rows without a date get nulls in both.
pub async fn with_calendar(facts: &AliasedDataFrame) -> CubeResult<AliasedDataFrame> {
    let batches = facts.collect().await?;
    let enriched = batches
        .iter()
        .map(calendar_columns)
        .collect::<CubeResult<Vec<_>>>()?;

    let schema = match enriched.first() {
        Some(batch) => batch.schema(),
        None => {
            let base = facts.dataframe.schema().inner().clone();
            calendar_columns(&RecordBatch::new_empty(base))?.schema()
        }
    };

    let ctx = SessionContext::new();
    register_batches(&ctx, &facts.alias, schema, enriched)?;
    let df = ctx.table(facts.alias.as_str()).await?;
    debug!(alias = %facts.alias, "calendar columns added");
    Ok(AliasedDataFrame::new(df, &facts.alias))
}
