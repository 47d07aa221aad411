use crate::prelude::*;
use crate::aggregation_builder::aggregation::AggregationBuilder;
use crate::datatypes::datatypes::SQLDataType;
use crate::helper_funcs::extract_columns::{f64_column, i64_column};
use crate::helper_funcs::money::{format_currency, round2};
use crate::helper_funcs::registertable::query_frame;
use crate::normalizers::normalize::{aliased, quote_ident};
use crate::reporting::aggregates::{region_totals, top_products, GroupTotals};
use crate::sqlbuilder::sqlbuild::SqlBuilder;
use crate::writers::text_writer::write_text_file;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineMetrics {
    pub top_product: String,
    pub top_product_amount: f64,
    pub top_region: String,
    pub top_region_amount: f64,
    pub total_revenue: f64,
    pub transactions: i64,
    pub average_ticket: f64,
}

fn first_or_empty(rows: &[GroupTotals], operation: &str) -> CubeResult<GroupTotals> {
    rows.first().cloned().ok_or_else(|| CubeError::EmptyFactTable {
        operation: operation.to_string(),
    })
}

/// Top product, top region, revenue, transaction count and average ticket.
/// Ties on the top entries go to the alphabetically smaller name.
pub async fn headline_metrics(facts: &AliasedDataFrame) -> CubeResult<HeadlineMetrics> {
    let select = vec![
        aliased(
            &format!("COALESCE(SUM({}), 0)", quote_ident("total_amount")),
            "total_revenue",
        ),
        AggregationBuilder::count_rows().cast(SQLDataType::BigInt).alias("transactions").build_sql(),
    ];
    let sql = SqlBuilder::with_capacity(128)
        .select(&select)
        .from_table(&facts.alias, None)
        .build();
    let batches = query_frame(facts, &sql).await?;

    let (total_revenue, transactions) = match batches.iter().find(|b| b.num_rows() > 0) {
        Some(batch) => (
            f64_column(batch, "total_revenue")?[0],
            i64_column(batch, "transactions")?[0],
        ),
        None => (0.0, 0),
    };

    if transactions == 0 {
        return Err(CubeError::EmptyFactTable {
            operation: "Headline Metrics".to_string(),
        });
    }

    let product = first_or_empty(&top_products(facts, 1).await?.rows, "Top Product")?;
    let region = first_or_empty(&region_totals(facts).await?.rows, "Top Region")?;

    Ok(HeadlineMetrics {
        top_product: product.key,
        top_product_amount: product.revenue,
        top_region: region.key,
        top_region_amount: region.revenue,
        total_revenue: round2(total_revenue),
        transactions,
        average_ticket: round2(total_revenue / transactions as f64),
    })
}

/// Narrative text built from the headline metrics.
pub fn conclusions_text(metrics: &HeadlineMetrics) -> String {
    let mut lines = Vec::with_capacity(8);
    lines.push("OLAP CONCLUSIONS".to_string());
    lines.push("=".repeat(40));
    lines.push(format!(
        "1. The best selling product is '{}' with {} in revenue.",
        metrics.top_product,
        format_currency(metrics.top_product_amount)
    ));
    lines.push(format!(
        "2. The most profitable region is '{}' with {}.",
        metrics.top_region,
        format_currency(metrics.top_region_amount)
    ));
    lines.push(format!(
        "3. Total revenue was {} across {} transactions.",
        format_currency(metrics.total_revenue),
        metrics.transactions
    ));
    lines.push(format!(
        "4. The average ticket per transaction was {}.",
        format_currency(metrics.average_ticket)
    ));
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Prints the conclusions and writes them to `path`.
pub fn write_conclusions(metrics: &HeadlineMetrics, path: &Path) -> CubeResult<String> {
    let text = conclusions_text(metrics);
    println!("\n{}", text);
    write_text_file(path, &text)?;
    println!("✅ Conclusions saved to {}", path.display());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::datatypes::fallback_fact_schema;
    use crate::helper_funcs::registertable::register_batches;
    use crate::loaders::fact_source::{sample_fact_batch, FactSource};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fixture_headline_metrics() {
        let facts = FactSource::Fixture.load("facts").await.unwrap();
        let metrics = headline_metrics(&facts).await.unwrap();

        // tablet and monitor 24" both reach 300; the smaller name wins
        assert_eq!(metrics.top_product, "monitor 24\"");
        assert_eq!(metrics.top_product_amount, 300.0);
        assert_eq!(metrics.top_region, "Norte");
        assert_eq!(metrics.top_region_amount, 760.0);
        assert_eq!(metrics.total_revenue, 915.0);
        assert_eq!(metrics.transactions, 5);
        assert_eq!(metrics.average_ticket, 183.0);
    }

    #[tokio::test]
    async fn test_average_ticket_over_three_sales() {
        let batch = sample_fact_batch(&[
            ((2025, 1, 15), "teclado mecanico", "Perifericos", 2, 80.0, "Norte"),
            ((2025, 1, 16), "monitor 24\"", "Monitores", 2, 300.0, "Norte"),
            ((2025, 1, 17), "tablet", "Dispositivos Moviles", 1, 155.0, "Sur"),
        ])
        .unwrap();
        let ctx = SessionContext::new();
        register_batches(&ctx, "facts", batch.schema(), vec![batch]).unwrap();
        let facts = AliasedDataFrame::new(ctx.table("facts").await.unwrap(), "facts");

        let metrics = headline_metrics(&facts).await.unwrap();
        assert_eq!(metrics.total_revenue, 915.0);
        assert_eq!(metrics.transactions, 3);
        assert_eq!(metrics.average_ticket, 305.0);
        assert_eq!(metrics.top_product, "monitor 24\"");
        assert_eq!(metrics.top_product_amount, 600.0);
        assert_eq!(metrics.top_region, "Norte");
        assert_eq!(metrics.top_region_amount, 760.0);
    }

    #[tokio::test]
    async fn test_empty_table_is_reported() {
        let ctx = SessionContext::new();
        register_batches(&ctx, "facts", fallback_fact_schema(), vec![]).unwrap();
        let facts = AliasedDataFrame::new(ctx.table("facts").await.unwrap(), "facts");

        match headline_metrics(&facts).await {
            Err(CubeError::EmptyFactTable { operation }) => assert_eq!(operation, "Headline Metrics"),
            other => panic!("expected EmptyFactTable, got {:?}", other),
        }
    }

    #[test]
    fn test_conclusions_written() {
        let metrics = HeadlineMetrics {
            top_product: "monitor 24\"".to_string(),
            top_product_amount: 900.0,
            top_region: "Norte".to_string(),
            top_region_amount: 760.0,
            total_revenue: 915.0,
            transactions: 3,
            average_ticket: 305.0,
        };

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("olap_conclusions.txt");
        let text = write_conclusions(&metrics, &path).unwrap();

        assert!(text.contains("$305.00"));
        assert!(text.contains("'Norte' with $760.00"));
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }
}
