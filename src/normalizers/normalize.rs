/// Wraps an identifier in double quotes, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.trim().replace('"', "\"\""))
}

/// `"table"."column"`
pub fn qualified(table: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(table), quote_ident(column))
}

/// `expr AS "alias"`
pub fn aliased(expr: &str, alias: &str) -> String {
    format!("{} AS {}", expr, quote_ident(alias))
}

/// Single-quoted SQL string literal.
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Join key form of a free-text product name.
pub fn product_key_expr(column_expr: &str) -> String {
    format!("lower(trim({}))", column_expr)
}

/// Rust-side twin of [`product_key_expr`].
pub fn normalize_product_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("region_name"), "\"region_name\"");
        assert_eq!(quote_ident("monitor 24\""), "\"monitor 24\"\"\"");
        assert_eq!(qualified("s", "product"), "\"s\".\"product\"");
        assert_eq!(aliased("SUM(\"quantity\")", "total_quantity"), "SUM(\"quantity\") AS \"total_quantity\"");
    }

    #[test]
    fn test_sql_literal_escapes_apostrophes() {
        assert_eq!(sql_literal("Norte"), "'Norte'");
        assert_eq!(sql_literal("O'Higgins"), "'O''Higgins'");
    }

    #[test]
    fn test_product_key() {
        assert_eq!(normalize_product_key("  Teclado Mecanico "), "teclado mecanico");
        assert_eq!(product_key_expr("\"s\".\"product\""), "lower(trim(\"s\".\"product\"))");
    }
}
