use std::fmt::Write;

use crate::normalizers::normalize::quote_ident;

/// A LEFT/INNER join step: `{join_type} JOIN "table" AS alias ON condition`.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub join_type: String,
    pub table: String,
    pub alias: String,
    pub condition: String,
}

impl JoinClause {
    pub fn left(table: &str, alias: &str, condition: String) -> Self {
        JoinClause {
            join_type: "LEFT".to_string(),
            table: table.to_string(),
            alias: alias.to_string(),
            condition,
        }
    }
}

/// SELECT statement builder over a pre-allocated buffer.
pub struct SqlBuilder {
    pub buffer: String,
}

impl SqlBuilder {

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity)
        }
    }

    pub fn select(&mut self, parts: &[String]) -> &mut Self {
        self.buffer.push_str("SELECT ");
        if parts.is_empty() {
            self.buffer.push('*');
        } else {
            self.join_items(parts, ", ");
        }
        self
    }

    pub fn select_distinct(&mut self, parts: &[String]) -> &mut Self {
        self.buffer.push_str("SELECT DISTINCT ");
        self.join_items(parts, ", ");
        self
    }

    pub fn from_table(&mut self, table: &str, alias: Option<&str>) -> &mut Self {
        self.buffer.push_str(" FROM ");

        if table.starts_with('(') && table.ends_with(')') {
            // subquery
            self.buffer.push_str(table);
        } else {
            self.buffer.push_str(&quote_ident(table));
            if let Some(alias) = alias {
                let _ = write!(self.buffer, " AS {}", alias);
            }
        }
        self
    }

    pub fn joins(&mut self, joins: &[JoinClause]) -> &mut Self {
        for join in joins {
            let _ = write!(self.buffer, " {} JOIN {} AS {} ON {}",
                join.join_type,
                quote_ident(&join.table),
                join.alias,
                join.condition
            );
        }
        self
    }

    pub fn where_clause(&mut self, conditions: &[String]) -> &mut Self {
        if !conditions.is_empty() {
            self.buffer.push_str(" WHERE ");
            self.join_items(conditions, " AND ");
        }
        self
    }

    pub fn group_by(&mut self, columns: &[String]) -> &mut Self {
        if !columns.is_empty() {
            self.buffer.push_str(" GROUP BY ");
            self.join_items(columns, ", ");
        }
        self
    }

    /// `(expression, ascending)` pairs.
    pub fn order_by(&mut self, orders: &[(String, bool)]) -> &mut Self {
        if !orders.is_empty() {
            self.buffer.push_str(" ORDER BY ");
            for (i, (col, asc)) in orders.iter().enumerate() {
                if i > 0 {
                    self.buffer.push_str(", ");
                }
                self.buffer.push_str(col);
                self.buffer.push_str(if *asc { " ASC" } else { " DESC" });
            }
        }
        self
    }

    pub fn limit(&mut self, limit: Option<u64>) -> &mut Self {
        if let Some(limit) = limit {
            let _ = write!(self.buffer, " LIMIT {}", limit);
        }
        self
    }

    fn join_items(&mut self, items: &[String], separator: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.buffer.push_str(separator);
            }
            self.buffer.push_str(item);
        }
    }

    pub fn build(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_select() {
        let sql = SqlBuilder::with_capacity(128)
            .select(&["\"category\"".to_string(), "SUM(\"quantity\") AS \"total_quantity\"".to_string()])
            .from_table("facts", None)
            .where_clause(&["\"category\" IS NOT NULL".to_string()])
            .group_by(&["\"category\"".to_string()])
            .order_by(&[("\"total_quantity\"".to_string(), false), ("\"category\"".to_string(), true)])
            .limit(Some(5))
            .build();

        assert_eq!(
            sql,
            "SELECT \"category\", SUM(\"quantity\") AS \"total_quantity\" FROM \"facts\" \
             WHERE \"category\" IS NOT NULL GROUP BY \"category\" \
             ORDER BY \"total_quantity\" DESC, \"category\" ASC LIMIT 5"
        );
    }

    #[test]
    fn test_left_joins() {
        let sql = SqlBuilder::with_capacity(128)
            .select(&[])
            .from_table("sales", Some("s"))
            .joins(&[JoinClause::left("catalog", "c", "s.k = c.k".to_string())])
            .build();

        assert_eq!(sql, "SELECT * FROM \"sales\" AS s LEFT JOIN \"catalog\" AS c ON s.k = c.k");
    }
}
