use crate::prelude::*;
use crate::aggregation_builder::aggregation::AggregationBuilder;
use crate::datatypes::datatypes::SQLDataType;
use crate::helper_funcs::display::{print_banner, print_batches, print_heading};
use crate::helper_funcs::extract_columns::{date_column, f64_column, i64_column};
use crate::helper_funcs::money::{format_currency, round2};
use crate::helper_funcs::registertable::query_frame;
use crate::normalizers::normalize::{aliased, quote_ident};
use crate::sqlbuilder::sqlbuild::SqlBuilder;

/// Headline numbers of a loaded fact table.
#[derive(Debug, Clone, PartialEq)]
pub struct FactSummary {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub records: i64,
    pub total_revenue: f64,
    pub total_units: i64,
    pub unique_products: i64,
    pub regions_with_sales: i64,
}

impl FactSummary {
    pub fn period(&self) -> String {
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "n/a".to_string(),
        }
    }
}

pub async fn fact_summary(facts: &AliasedDataFrame) -> CubeResult<FactSummary> {
    let select = vec![
        AggregationBuilder::new("date").min().alias("first_date").build_sql(),
        AggregationBuilder::new("date").max().alias("last_date").build_sql(),
        AggregationBuilder::count_rows().cast(SQLDataType::BigInt).alias("records").build_sql(),
        aliased(
            &format!("ROUND(COALESCE(SUM({}), 0), 2)", quote_ident("total_amount")),
            "total_revenue",
        ),
        aliased(
            &format!("CAST(COALESCE(SUM({}), 0) AS BIGINT)", quote_ident("quantity")),
            "total_units",
        ),
        AggregationBuilder::new("product").count_distinct().cast(SQLDataType::BigInt).alias("unique_products").build_sql(),
        AggregationBuilder::new("region_name").count_distinct().cast(SQLDataType::BigInt).alias("regions_with_sales").build_sql(),
    ];

    let sql = SqlBuilder::with_capacity(512)
        .select(&select)
        .from_table(&facts.alias, None)
        .build();
    let batches = query_frame(facts, &sql).await?;

    let batch = batches
        .iter()
        .find(|b| b.num_rows() > 0)
        .ok_or_else(|| CubeError::Custom("Summary query returned no rows".to_string()))?;

    Ok(FactSummary {
        first_date: date_column(batch, "first_date")?[0],
        last_date: date_column(batch, "last_date")?[0],
        records: i64_column(batch, "records")?[0],
        total_revenue: f64_column(batch, "total_revenue")?[0],
        total_units: i64_column(batch, "total_units")?[0],
        unique_products: i64_column(batch, "unique_products")?[0],
        regions_with_sales: i64_column(batch, "regions_with_sales")?[0],
    })
}

/// First `limit` fact rows in row order.
pub async fn preview_rows(facts: &AliasedDataFrame, limit: u64) -> CubeResult<Vec<RecordBatch>> {
    let order = if facts.has_column("row_id") { "row_id" } else { "date" };
    let sql = SqlBuilder::with_capacity(128)
        .select(&[])
        .from_table(&facts.alias, None)
        .order_by(&[(quote_ident(order), true)])
        .limit(Some(limit))
        .build();
    query_frame(facts, &sql).await
}

pub async fn print_fact_summary(facts: &AliasedDataFrame, preview: u64) -> CubeResult<FactSummary> {
    let summary = fact_summary(facts).await?;

    print_heading("📊 Fact table summary");
    println!("   Period:        {}", summary.period());
    println!("   Records:       {}", summary.records);
    println!("   Total revenue: {}", format_currency(summary.total_revenue));
    println!("   Units sold:    {}", summary.total_units);

    print_heading(&format!("🔍 First {} rows", preview));
    print_batches(&preview_rows(facts, preview).await?)?;

    Ok(summary)
}

/// What one ETL run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub executed_at: chrono::DateTime<Local>,
    pub records: i64,
    pub revenue: f64,
    pub unique_products: i64,
    pub regions_with_sales: i64,
    pub files_generated: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new(summary: &FactSummary, files_generated: Vec<PathBuf>) -> Self {
        RunSummary {
            executed_at: Local::now(),
            records: summary.records,
            revenue: round2(summary.total_revenue),
            unique_products: summary.unique_products,
            regions_with_sales: summary.regions_with_sales,
            files_generated,
        }
    }

    pub fn print(&self) {
        print_banner("📋 ETL RUN SUMMARY");
        println!("   Executed at:        {}", self.executed_at.format("%Y-%m-%d %H:%M:%S"));
        println!("   Records processed:  {}", self.records);
        println!("   Revenue processed:  {}", format_currency(self.revenue));
        println!("   Unique products:    {}", self.unique_products);
        println!("   Regions with sales: {}", self.regions_with_sales);
        println!("   Files generated:");
        for file in &self.files_generated {
            println!("     - {}", file.display());
        }
    }
}
