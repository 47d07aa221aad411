use crate::prelude::*;
use crate::aggregation_builder::aggregation::{standard_measures, AggregationBuilder};
use crate::datatypes::datatypes::SQLDataType;
use crate::helper_funcs::display::{print_batches, print_heading};
use crate::helper_funcs::extract_columns::{f64_column, i64_column, rows_from_batches, string_column};
use crate::helper_funcs::registertable::query_frame;
use crate::normalizers::normalize::quote_ident;
use crate::sqlbuilder::sqlbuild::SqlBuilder;

/// Quantity, revenue and row count for one group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotals {
    pub key: String,
    pub quantity: i64,
    pub revenue: f64,
    pub transactions: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionEfficiency {
    pub region: String,
    pub revenue: f64,
    pub average_ticket: f64,
    pub transactions: i64,
}

/// Typed rows of a report together with the batches they were read from.
#[derive(Debug, Clone)]
pub struct Report<T> {
    pub rows: Vec<T>,
    pub batches: Vec<RecordBatch>,
}

impl<T> Report<T> {
    pub fn print(&self, title: &str) -> CubeResult<()> {
        print_heading(title);
        print_batches(&self.batches)
    }
}

/// `(column, ascending)` order keys.
pub(crate) type OrderKeys<'a> = &'a [(&'a str, bool)];

/// Groups `facts` by `key` with the standard measures. `filters` are extra
/// WHERE conditions; rows with a null key are left out.
pub(crate) async fn grouped_totals(
    facts: &AliasedDataFrame,
    key: &str,
    filters: &[String],
    order: OrderKeys<'_>,
    limit: Option<u64>,
) -> CubeResult<Report<GroupTotals>> {
    let mut select = vec![quote_ident(key)];
    select.extend(standard_measures());

    let mut conditions = vec![format!("{} IS NOT NULL", quote_ident(key))];
    conditions.extend(filters.iter().cloned());

    let order: Vec<(String, bool)> = order.iter().map(|(c, asc)| (quote_ident(c), *asc)).collect();
    let sql = SqlBuilder::with_capacity(256)
        .select(&select)
        .from_table(&facts.alias, None)
        .where_clause(&conditions)
        .group_by(&[quote_ident(key)])
        .order_by(&order)
        .limit(limit)
        .build();

    let batches = query_frame(facts, &sql).await?;
    let rows = rows_from_batches(&batches, |batch| {
        let keys = string_column(batch, key)?;
        let quantities = i64_column(batch, "total_quantity")?;
        let revenues = f64_column(batch, "total_revenue")?;
        let transactions = i64_column(batch, "transactions")?;
        Ok((0..batch.num_rows())
            .map(|i| GroupTotals {
                key: keys[i].clone(),
                quantity: quantities[i],
                revenue: revenues[i],
                transactions: transactions[i],
            })
            .collect())
    })?;

    Ok(Report { rows, batches })
}

/// Totals per category, largest quantity first.
pub async fn category_totals(facts: &AliasedDataFrame) -> CubeResult<Report<GroupTotals>> {
    grouped_totals(facts, "category", &[], &[("total_quantity", false), ("category", true)], None).await
}

/// Totals per region, largest revenue first.
pub async fn region_totals(facts: &AliasedDataFrame) -> CubeResult<Report<GroupTotals>> {
    grouped_totals(facts, "region_name", &[], &[("total_revenue", false), ("region_name", true)], None).await
}

/// Totals per day in date order. Keys are `YYYY-MM-DD`.
pub async fn date_totals(facts: &AliasedDataFrame) -> CubeResult<Report<GroupTotals>> {
    grouped_totals(facts, "date", &[], &[("date", true)], None).await
}

/// The `n` best selling products by revenue; ties go to the smaller name.
pub async fn top_products(facts: &AliasedDataFrame, n: u64) -> CubeResult<Report<GroupTotals>> {
    grouped_totals(facts, "product", &[], &[("total_revenue", false), ("product", true)], Some(n)).await
}

/// Average ticket per region, best first.
pub async fn region_efficiency(facts: &AliasedDataFrame) -> CubeResult<Report<RegionEfficiency>> {
    let region = quote_ident("region_name");
    let select = vec![
        region.clone(),
        AggregationBuilder::new("total_amount").sum().round(2).alias("total_revenue").build_sql(),
        AggregationBuilder::new("total_amount").avg().round(2).alias("average_ticket").build_sql(),
        AggregationBuilder::count_rows().cast(SQLDataType::BigInt).alias("transactions").build_sql(),
    ];

    let sql = SqlBuilder::with_capacity(256)
        .select(&select)
        .from_table(&facts.alias, None)
        .where_clause(&[format!("{} IS NOT NULL", region)])
        .group_by(&[region.clone()])
        .order_by(&[(quote_ident("average_ticket"), false), (region, true)])
        .build();

    let batches = query_frame(facts, &sql).await?;
    let rows = rows_from_batches(&batches, |batch| {
        let regions = string_column(batch, "region_name")?;
        let revenues = f64_column(batch, "total_revenue")?;
        let averages = f64_column(batch, "average_ticket")?;
        let transactions = i64_column(batch, "transactions")?;
        Ok((0..batch.num_rows())
            .map(|i| RegionEfficiency {
                region: regions[i].clone(),
                revenue: revenues[i],
                average_ticket: averages[i],
                transactions: transactions[i],
            })
            .collect())
    })?;

    Ok(Report { rows, batches })
}

/// All aggregate views the reporting stage prints.
#[derive(Debug, Clone)]
pub struct AggregateReports {
    pub by_category: Report<GroupTotals>,
    pub by_region: Report<GroupTotals>,
    pub by_date: Report<GroupTotals>,
    pub top_products: Report<GroupTotals>,
    pub efficiency: Report<RegionEfficiency>,
}

pub async fn run_aggregate_reports(facts: &AliasedDataFrame, top_n: u64) -> CubeResult<AggregateReports> {
    let reports = AggregateReports {
        by_category: category_totals(facts).await?,
        by_region: region_totals(facts).await?,
        by_date: date_totals(facts).await?,
        top_products: top_products(facts, top_n).await?,
        efficiency: region_efficiency(facts).await?,
    };

    reports.by_category.print("📦 Sales by category")?;
    reports.by_region.print("🌎 Sales by region")?;
    reports.by_date.print("📅 Sales by date")?;
    reports.top_products.print(&format!("🏆 Top {} products", top_n))?;
    reports.efficiency.print("🎯 Region efficiency (average ticket)")?;

    debug!(
        categories = reports.by_category.rows.len(),
        regions = reports.by_region.rows.len(),
        "aggregate reports computed"
    );
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_funcs::registertable::register_batches;

    async fn facts_from(rows: &[(&str, &str, &str, &str, i64, f64)]) -> AliasedDataFrame {
        // (date, product, category, region, quantity, unit_price)
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", ArrowDataType::Utf8, true),
            Field::new("product", ArrowDataType::Utf8, true),
            Field::new("category", ArrowDataType::Utf8, true),
            Field::new("region_name", ArrowDataType::Utf8, true),
            Field::new("quantity", ArrowDataType::Int64, true),
            Field::new("total_amount", ArrowDataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(rows.iter().map(|r| r.0).collect::<Vec<_>>())),
                Arc::new(StringArray::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
                Arc::new(StringArray::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
                Arc::new(StringArray::from(rows.iter().map(|r| r.3).collect::<Vec<_>>())),
                Arc::new(Int64Array::from(rows.iter().map(|r| r.4).collect::<Vec<_>>())),
                Arc::new(Float64Array::from(rows.iter().map(|r| r.4 as f64 * r.5).collect::<Vec<_>>())),
            ],
        )
        .unwrap();

        let ctx = SessionContext::new();
        register_batches(&ctx, "facts", schema, vec![batch]).unwrap();
        AliasedDataFrame::new(ctx.table("facts").await.unwrap(), "facts")
    }

    #[tokio::test]
    async fn test_category_quantity_and_count() {
        let facts = facts_from(&[
            ("2025-01-15", "teclado mecanico", "Perifericos", "Norte", 2, 80.0),
            ("2025-01-15", "mouse inalambrico", "Perifericos", "Sur", 3, 25.0),
            ("2025-01-16", "monitor 24\"", "Monitores", "Norte", 1, 300.0),
        ])
        .await;

        let report = category_totals(&facts).await.unwrap();
        assert_eq!(report.rows[0].key, "Perifericos");
        assert_eq!(report.rows[0].quantity, 5);
        assert_eq!(report.rows[0].transactions, 2);
        assert_eq!(report.rows[0].revenue, 235.0);
        assert_eq!(report.rows[1].key, "Monitores");
    }

    #[tokio::test]
    async fn test_top_products_break_ties_by_name() {
        let facts = facts_from(&[
            ("2025-01-15", "tablet", "Dispositivos Moviles", "Norte", 2, 150.0),
            ("2025-01-16", "monitor 24\"", "Monitores", "Norte", 1, 300.0),
            ("2025-01-16", "auriculares", "Audio", "Sur", 1, 45.0),
        ])
        .await;

        let report = top_products(&facts, 2).await.unwrap();
        let keys: Vec<&str> = report.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["monitor 24\"", "tablet"]);
    }

    #[tokio::test]
    async fn test_region_efficiency_order() {
        let facts = facts_from(&[
            ("2025-01-15", "a", "X", "Norte", 1, 100.0),
            ("2025-01-15", "b", "X", "Norte", 1, 50.0),
            ("2025-01-15", "c", "X", "Sur", 1, 90.0),
            ("2025-01-15", "d", "X", "Este", 1, 75.0),
        ])
        .await;

        let report = region_efficiency(&facts).await.unwrap();
        let regions: Vec<&str> = report.rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, vec!["Sur", "Este", "Norte"]);
        assert_eq!(report.rows[2].average_ticket, 75.0);
        assert_eq!(report.rows[2].transactions, 2);
    }

    #[tokio::test]
    async fn test_empty_facts_give_empty_reports() {
        let facts = facts_from(&[]).await;
        let reports = run_aggregate_reports(&facts, 5).await.unwrap();
        assert!(reports.by_category.rows.is_empty());
        assert!(reports.by_date.rows.is_empty());
        assert!(reports.efficiency.rows.is_empty());
    }
}
