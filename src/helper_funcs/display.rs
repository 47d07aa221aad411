use crate::prelude::*;
use crate::datatypes::datatypes::SQLDataType;

pub fn print_banner(title: &str) {
    println!("\n{}", title);
    println!("{}", "=".repeat(50));
}

pub fn print_heading(title: &str) {
    println!("\n{}", title);
}

/// Pretty prints batches as a table, or a placeholder when there are no rows.
pub fn print_batches(batches: &[RecordBatch]) -> CubeResult<()> {
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    if rows == 0 {
        println!("(no rows)");
        return Ok(());
    }
    println!("{}", pretty_format_batches(batches)?);
    Ok(())
}

/// Compact schema view, column names with their SQL types.
pub fn print_schema(alias: &str, schema: &Schema) {
    println!("📋 Schema - table alias: '{}'", alias);
    for (index, field) in schema.fields().iter().enumerate() {
        let type_name = SQLDataType::try_from(field.data_type().clone())
            .map(|t| t.sql_name())
            .unwrap_or("OTHER");
        println!("{:2}. {} ({})", index + 1, field.name(), type_name);
    }
}
