use crate::datatypes::datatypes::SQLDataType;
use crate::normalizers::normalize::{aliased, quote_ident};

/// Builds one aggregate select item, e.g.
/// `CAST(SUM("quantity") AS BIGINT) AS "total_quantity"`.
pub struct AggregationBuilder {
    column: Option<String>,
    pub agg_alias: Option<String>,
    agg_fn: Option<Box<dyn Fn(String) -> String>>,
    round_to: Option<u32>,
    cast_to: Option<SQLDataType>,
}

impl AggregationBuilder {
    pub fn new(column: &str) -> Self {
        Self {
            column: Some(column.to_string()),
            agg_alias: None,
            agg_fn: None,
            round_to: None,
            cast_to: None,
        }
    }

    /// `COUNT(*)`, independent of any column.
    pub fn count_rows() -> Self {
        Self {
            column: None,
            agg_alias: None,
            agg_fn: Some(Box::new(|_| "COUNT(*)".to_string())),
            round_to: None,
            cast_to: None,
        }
    }

    pub fn build_sql(&self) -> String {
        let target = self
            .column
            .as_deref()
            .map(quote_ident)
            .unwrap_or_else(|| "*".to_string());

        let mut expr = match &self.agg_fn {
            Some(agg_fn) => agg_fn(target),
            None => target,
        };

        if let Some(decimals) = self.round_to {
            expr = format!("ROUND({}, {})", expr, decimals);
        }
        if let Some(sql_type) = self.cast_to {
            expr = format!("CAST({} AS {})", expr, sql_type.sql_name());
        }

        match &self.agg_alias {
            Some(alias) => aliased(&expr, alias),
            None => expr,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.agg_alias = Some(alias.to_string());
        self
    }

    pub fn round(mut self, decimals: u32) -> Self {
        self.round_to = Some(decimals);
        self
    }

    pub fn cast(mut self, sql_type: SQLDataType) -> Self {
        self.cast_to = Some(sql_type);
        self
    }

    pub fn sum(mut self) -> Self {
        self.agg_fn = Some(Box::new(|expr| format!("SUM({})", expr)));
        self
    }

    pub fn avg(mut self) -> Self {
        self.agg_fn = Some(Box::new(|expr| format!("AVG({})", expr)));
        self
    }

    pub fn min(mut self) -> Self {
        self.agg_fn = Some(Box::new(|expr| format!("MIN({})", expr)));
        self
    }

    pub fn max(mut self) -> Self {
        self.agg_fn = Some(Box::new(|expr| format!("MAX({})", expr)));
        self
    }

    pub fn count_distinct(mut self) -> Self {
        self.agg_fn = Some(Box::new(|expr| format!("COUNT(DISTINCT {})", expr)));
        self
    }

    /// Sum of `column` restricted to rows where `condition` holds, 0 when none do.
    pub fn sum_where(mut self, condition: String) -> Self {
        self.agg_fn = Some(Box::new(move |expr| {
            format!("COALESCE(SUM(CASE WHEN {} THEN {} END), 0)", condition, expr)
        }));
        self
    }
}

impl From<&str> for AggregationBuilder {
    fn from(column: &str) -> Self {
        AggregationBuilder::new(column)
    }
}

/// The three measures every grouped report carries.
pub fn standard_measures() -> Vec<String> {
    vec![
        AggregationBuilder::new("quantity").sum().cast(SQLDataType::BigInt).alias("total_quantity").build_sql(),
        AggregationBuilder::new("total_amount").sum().round(2).alias("total_revenue").build_sql(),
        AggregationBuilder::count_rows().cast(SQLDataType::BigInt).alias("transactions").build_sql(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_with_cast_and_alias() {
        let sql = AggregationBuilder::new("quantity")
            .sum()
            .cast(SQLDataType::BigInt)
            .alias("total_quantity")
            .build_sql();
        assert_eq!(sql, "CAST(SUM(\"quantity\") AS BIGINT) AS \"total_quantity\"");
    }

    #[test]
    fn test_round_and_count_rows() {
        assert_eq!(
            AggregationBuilder::new("total_amount").avg().round(2).alias("average_ticket").build_sql(),
            "ROUND(AVG(\"total_amount\"), 2) AS \"average_ticket\""
        );
        assert_eq!(AggregationBuilder::count_rows().build_sql(), "COUNT(*)");
        assert_eq!(AggregationBuilder::from("product").count_distinct().build_sql(), "COUNT(DISTINCT \"product\")");
    }

    #[test]
    fn test_conditional_sum() {
        let sql = AggregationBuilder::new("total_amount")
            .sum_where("\"month\" = 1".to_string())
            .round(2)
            .alias("month_1")
            .build_sql();
        assert_eq!(
            sql,
            "ROUND(COALESCE(SUM(CASE WHEN \"month\" = 1 THEN \"total_amount\" END), 0), 2) AS \"month_1\""
        );
    }
}
