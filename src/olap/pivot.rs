use crate::prelude::*;
use crate::aggregation_builder::aggregation::AggregationBuilder;
use crate::helper_funcs::extract_columns::{f64_column, i64_column, rows_from_batches, string_column};
use crate::helper_funcs::registertable::query_frame;
use crate::normalizers::normalize::{aliased, quote_ident};
use crate::olap::calendar::MONTH_COLUMN;
use crate::sqlbuilder::sqlbuild::SqlBuilder;
use crate::writers::csv_writer::write_batches_to_csv;

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub region: String,
    pub category: String,
    /// One value per entry of [`PivotTable::months`].
    pub values: Vec<f64>,
}

/// Revenue by (region, category) across months.
#[derive(Debug, Clone)]
pub struct PivotTable {
    pub months: Vec<i64>,
    pub rows: Vec<PivotRow>,
    pub batches: Vec<RecordBatch>,
}

impl PivotTable {
    pub fn month_column(month: i64) -> String {
        format!("month_{}", month)
    }

    /// Cell value, 0 for combinations without sales.
    pub fn value(&self, region: &str, category: &str, month: i64) -> f64 {
        let Some(index) = self.months.iter().position(|m| *m == month) else {
            return 0.0;
        };
        self.rows
            .iter()
            .find(|r| r.region == region && r.category == category)
            .map(|r| r.values[index])
            .unwrap_or(0.0)
    }

    pub fn write_csv(&self, path: &Path) -> CubeResult<usize> {
        let schema = self.schema();
        write_batches_to_csv(path, schema, &self.batches)
    }

    fn schema(&self) -> SchemaRef {
        match self.batches.first() {
            Some(batch) => batch.schema(),
            None => {
                let mut fields = vec![
                    Field::new("region", ArrowDataType::Utf8, true),
                    Field::new("category", ArrowDataType::Utf8, true),
                ];
                fields.extend(
                    self.months
                        .iter()
                        .map(|m| Field::new(Self::month_column(*m), ArrowDataType::Float64, true)),
                );
                Arc::new(Schema::new(fields))
            }
        }
    }
}

fn pivot_filters() -> Vec<String> {
    vec![
        format!("{} IS NOT NULL", quote_ident("region_name")),
        format!("{} IS NOT NULL", quote_ident("category")),
    ]
}

/// Months with at least one pivotable row.
async fn distinct_months(facts: &AliasedDataFrame) -> CubeResult<Vec<i64>> {
    let month = quote_ident(MONTH_COLUMN);
    let mut filters = pivot_filters();
    filters.push(format!("{} IS NOT NULL", month));
    let sql = SqlBuilder::with_capacity(192)
        .select_distinct(&[month.clone()])
        .from_table(&facts.alias, None)
        .where_clause(&filters)
        .order_by(&[(month, true)])
        .build();
    let batches = query_frame(facts, &sql).await?;
    rows_from_batches(&batches, |b| i64_column(b, MONTH_COLUMN))
}

/// Builds the region × category by month pivot over a calendar-enriched
/// fact table. Rows with a null region or category are not pivoted.
pub async fn build_pivot(facts: &AliasedDataFrame) -> CubeResult<PivotTable> {
    let months = distinct_months(facts).await?;

    let region = quote_ident("region_name");
    let category = quote_ident("category");
    let mut select = vec![aliased(&region, "region"), category.clone()];
    for month in &months {
        select.push(
            AggregationBuilder::new("total_amount")
                .sum_where(format!("{} = {}", quote_ident(MONTH_COLUMN), month))
                .round(2)
                .alias(&PivotTable::month_column(*month))
                .build_sql(),
        );
    }

    let sql = SqlBuilder::with_capacity(512)
        .select(&select)
        .from_table(&facts.alias, None)
        .where_clause(&pivot_filters())
        .group_by(&[region, category.clone()])
        .order_by(&[(quote_ident("region"), true), (category, true)])
        .build();

    let batches = query_frame(facts, &sql).await?;
    let rows = rows_from_batches(&batches, |batch| {
        let regions = string_column(batch, "region")?;
        let categories = string_column(batch, "category")?;
        let mut columns = Vec::with_capacity(months.len());
        for month in &months {
            columns.push(f64_column(batch, &PivotTable::month_column(*month))?);
        }
        Ok((0..batch.num_rows())
            .map(|i| PivotRow {
                region: regions[i].clone(),
                category: categories[i].clone(),
                values: columns.iter().map(|c| c[i]).collect(),
            })
            .collect())
    })?;

    debug!(months = months.len(), rows = rows.len(), "pivot built");
    Ok(PivotTable { months, rows, batches })
}
