use crate::prelude::*;
use crate::aggregation_builder::aggregation::AggregationBuilder;
use crate::datatypes::datatypes::SQLDataType;
use crate::helper_funcs::extract_columns::{f64_column, i64_column, rows_from_batches};
use crate::helper_funcs::registertable::query_frame;
use crate::normalizers::normalize::{quote_ident, sql_literal};
use crate::olap::calendar::{MONTH_COLUMN, WEEK_COLUMN};
use crate::reporting::aggregates::{grouped_totals, GroupTotals, Report};
use crate::sqlbuilder::sqlbuild::SqlBuilder;

/// One (month, week) cell of the drill-down.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillCell {
    pub month: i64,
    pub week: i64,
    pub quantity: i64,
    pub revenue: f64,
}

/// Month → ISO week totals. Expects the calendar columns to be present.
pub async fn drill_down(facts: &AliasedDataFrame) -> CubeResult<Report<DrillCell>> {
    let month = quote_ident(MONTH_COLUMN);
    let week = quote_ident(WEEK_COLUMN);
    let select = vec![
        month.clone(),
        week.clone(),
        AggregationBuilder::new("quantity").sum().cast(SQLDataType::BigInt).alias("total_quantity").build_sql(),
        AggregationBuilder::new("total_amount").sum().round(2).alias("total_revenue").build_sql(),
    ];

    let sql = SqlBuilder::with_capacity(256)
        .select(&select)
        .from_table(&facts.alias, None)
        .where_clause(&[format!("{} IS NOT NULL", month), format!("{} IS NOT NULL", week)])
        .group_by(&[month.clone(), week.clone()])
        .order_by(&[(month, true), (week, true)])
        .build();

    let batches = query_frame(facts, &sql).await?;
    let rows = rows_from_batches(&batches, |batch| {
        let months = i64_column(batch, MONTH_COLUMN)?;
        let weeks = i64_column(batch, WEEK_COLUMN)?;
        let quantities = i64_column(batch, "total_quantity")?;
        let revenues = f64_column(batch, "total_revenue")?;
        Ok((0..batch.num_rows())
            .map(|i| DrillCell {
                month: months[i],
                week: weeks[i],
                quantity: quantities[i],
                revenue: revenues[i],
            })
            .collect())
    })?;

    Ok(Report { rows, batches })
}

/// Fixes `region_name` and groups what is left by category, in category order.
pub async fn slice_by_region(facts: &AliasedDataFrame, region: &str) -> CubeResult<Report<GroupTotals>> {
    let filter = format!("{} = {}", quote_ident("region_name"), sql_literal(region));
    grouped_totals(
        facts,
        "category",
        &[filter],
        &[("category", true)],
        None,
    )
    .await
}

/// Fixes `category` and groups what is left by region, in region order.
pub async fn slice_by_category(facts: &AliasedDataFrame, category: &str) -> CubeResult<Report<GroupTotals>> {
    let filter = format!("{} = {}", quote_ident("category"), sql_literal(category));
    grouped_totals(
        facts,
        "region_name",
        &[filter],
        &[("region_name", true)],
        None,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_funcs::registertable::register_batches;
    use crate::loaders::fact_source::{sample_fact_batch, FactSource};
    use crate::olap::calendar::with_calendar;

    async fn fixture_cube() -> AliasedDataFrame {
        let facts = FactSource::Fixture.load("facts").await.unwrap();
        with_calendar(&facts).await.unwrap()
    }

    #[tokio::test]
    async fn test_drill_down_single_week() {
        let cube = fixture_cube().await;
        let report = drill_down(&cube).await.unwrap();
        assert_eq!(
            report.rows,
            vec![DrillCell { month: 1, week: 3, quantity: 9, revenue: 915.0 }]
        );
    }

    #[tokio::test]
    async fn test_region_slice() {
        let cube = fixture_cube().await;
        let report = slice_by_region(&cube, "Norte").await.unwrap();
        let keys: Vec<(&str, f64)> = report.rows.iter().map(|r| (r.key.as_str(), r.revenue)).collect();
        assert_eq!(keys, vec![("Dispositivos Moviles", 300.0), ("Monitores", 300.0), ("Perifericos", 160.0)]);
    }

    #[tokio::test]
    async fn test_category_slice() {
        let cube = fixture_cube().await;
        let report = slice_by_category(&cube, "Perifericos").await.unwrap();
        let keys: Vec<&str> = report.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Este", "Norte", "Sur"]);
        assert_eq!(report.rows.iter().map(|r| r.quantity).sum::<i64>(), 6);
    }

    #[tokio::test]
    async fn test_slice_with_unknown_value_is_empty() {
        let cube = fixture_cube().await;
        let report = slice_by_region(&cube, "Atlantida").await.unwrap();
        assert!(report.rows.is_empty());
    }

    #[tokio::test]
    async fn test_drill_down_splits_weeks_and_months() {
        let batch = sample_fact_batch(&[
            ((2025, 1, 15), "teclado mecanico", "Perifericos", 2, 80.0, "Norte"),
            ((2025, 2, 3), "tablet", "Dispositivos Moviles", 1, 150.0, "Sur"),
            ((2025, 1, 20), "cable usb", "Uncategorized", 1, 10.0, "Norte"),
            ((2025, 1, 17), "mouse inalambrico", "Perifericos", 1, 25.0, "Sur"),
        ])
        .unwrap();
        let ctx = SessionContext::new();
        register_batches(&ctx, "facts", batch.schema(), vec![batch]).unwrap();
        let facts = AliasedDataFrame::new(ctx.table("facts").await.unwrap(), "facts");
        let cube = with_calendar(&facts).await.unwrap();

        let report = drill_down(&cube).await.unwrap();
        assert_eq!(
            report.rows,
            vec![
                DrillCell { month: 1, week: 3, quantity: 3, revenue: 185.0 },
                DrillCell { month: 1, week: 4, quantity: 1, revenue: 10.0 },
                DrillCell { month: 2, week: 6, quantity: 1, revenue: 150.0 },
            ]
        );
    }
}
