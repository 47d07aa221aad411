use crate::prelude::*;
use crate::helper_funcs::extract_columns::{
    f64_column, i64_column, optional_string_column, string_column,
};

/// Ordered column set of the consolidated fact table.
pub const FACT_COLUMNS: [&str; 11] = [
    "row_id",
    "date",
    "product",
    "category",
    "supplier",
    "quantity",
    "unit_price",
    "total_amount",
    "region_name",
    "zone",
    "region_code",
];

/// One daily sales transaction as written by the source generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    #[serde(rename = "product")]
    pub product_name: String,
    pub quantity: i64,
    pub region_code: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "product")]
    pub product_name: String,
    pub category: String,
    pub reference_price: f64,
    pub supplier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub region_code: i64,
    pub region_name: String,
    pub zone: String,
}

/// A consolidated row of the fact table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSalesRow {
    pub row_id: i64,
    pub date: NaiveDate,
    #[serde(rename = "product")]
    pub product_name: String,
    pub category: String,
    pub supplier: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub region_name: Option<String>,
    pub zone: Option<String>,
    pub region_code: i64,
}

impl FactSalesRow {
    /// Reads typed rows out of batches that carry the full fact column set.
    pub fn from_batches(batches: &[RecordBatch]) -> CubeResult<Vec<FactSalesRow>> {
        let mut rows = Vec::new();

        for batch in batches {
            let row_ids = i64_column(batch, "row_id")?;
            let dates = string_column(batch, "date")?;
            let products = string_column(batch, "product")?;
            let categories = string_column(batch, "category")?;
            let suppliers = string_column(batch, "supplier")?;
            let quantities = i64_column(batch, "quantity")?;
            let prices = f64_column(batch, "unit_price")?;
            let totals = f64_column(batch, "total_amount")?;
            let regions = optional_string_column(batch, "region_name")?;
            let zones = optional_string_column(batch, "zone")?;
            let codes = i64_column(batch, "region_code")?;

            for i in 0..batch.num_rows() {
                let date = NaiveDate::parse_from_str(&dates[i], "%Y-%m-%d").map_err(|e| {
                    CubeError::InvalidOperation {
                        operation: "Fact Row Extraction".to_string(),
                        reason: format!("Invalid date '{}' in row {}: {}", dates[i], row_ids[i], e),
                        suggestion: "💡 Dates must use the YYYY-MM-DD format".to_string(),
                    }
                })?;

                rows.push(FactSalesRow {
                    row_id: row_ids[i],
                    date,
                    product_name: products[i].clone(),
                    category: categories[i].clone(),
                    supplier: suppliers[i].clone(),
                    quantity: quantities[i],
                    unit_price: prices[i],
                    total_amount: totals[i],
                    region_name: regions[i].clone(),
                    zone: zones[i].clone(),
                    region_code: codes[i],
                });
            }
        }

        Ok(rows)
    }
}

/// Maps a handful of SQL type names onto Arrow types, used when casting in
/// generated statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SQLDataType {
    Varchar,
    BigInt,
    Double,
    Date,
}

impl SQLDataType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            SQLDataType::Varchar => "VARCHAR",
            SQLDataType::BigInt => "BIGINT",
            SQLDataType::Double => "DOUBLE",
            SQLDataType::Date => "DATE",
        }
    }
}

impl From<SQLDataType> for ArrowDataType {
    fn from(sql_type: SQLDataType) -> Self {
        match sql_type {
            SQLDataType::Varchar => ArrowDataType::Utf8,
            SQLDataType::BigInt => ArrowDataType::Int64,
            SQLDataType::Double => ArrowDataType::Float64,
            SQLDataType::Date => ArrowDataType::Date32,
        }
    }
}

impl TryFrom<ArrowDataType> for SQLDataType {
    type Error = CubeError;

    fn try_from(arrow_type: ArrowDataType) -> CubeResult<Self> {
        match arrow_type {
            ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 => Ok(SQLDataType::Varchar),
            ArrowDataType::Int8
            | ArrowDataType::Int16
            | ArrowDataType::Int32
            | ArrowDataType::Int64 => Ok(SQLDataType::BigInt),
            ArrowDataType::Float32 | ArrowDataType::Float64 => Ok(SQLDataType::Double),
            ArrowDataType::Date32 | ArrowDataType::Date64 => Ok(SQLDataType::Date),
            other => Err(CubeError::Custom(format!(
                "Unsupported column type for the sales cube: {:?}",
                other
            ))),
        }
    }
}

/// Builds an Arrow schema from `(name, type)` pairs. Every field is nullable
/// so that malformed or empty cells surface as nulls rather than read errors.
pub fn schema_from_columns(columns: &[(&str, SQLDataType)]) -> SchemaRef {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, sql_type)| Field::new(*name, ArrowDataType::from(*sql_type), true))
        .collect();
    Arc::new(Schema::new(fields))
}

pub fn sales_schema() -> SchemaRef {
    schema_from_columns(&[
        ("date", SQLDataType::Date),
        ("product", SQLDataType::Varchar),
        ("quantity", SQLDataType::BigInt),
        ("region_code", SQLDataType::BigInt),
        ("unit_price", SQLDataType::Double),
    ])
}

pub fn catalog_schema() -> SchemaRef {
    schema_from_columns(&[
        ("product", SQLDataType::Varchar),
        ("category", SQLDataType::Varchar),
        ("reference_price", SQLDataType::Double),
        ("supplier", SQLDataType::Varchar),
    ])
}

pub fn regions_schema() -> SchemaRef {
    schema_from_columns(&[
        ("region_code", SQLDataType::BigInt),
        ("region_name", SQLDataType::Varchar),
        ("zone", SQLDataType::Varchar),
    ])
}

pub fn fact_schema() -> SchemaRef {
    schema_from_columns(&[
        ("row_id", SQLDataType::BigInt),
        ("date", SQLDataType::Date),
        ("product", SQLDataType::Varchar),
        ("category", SQLDataType::Varchar),
        ("supplier", SQLDataType::Varchar),
        ("quantity", SQLDataType::BigInt),
        ("unit_price", SQLDataType::Double),
        ("total_amount", SQLDataType::Double),
        ("region_name", SQLDataType::Varchar),
        ("zone", SQLDataType::Varchar),
        ("region_code", SQLDataType::BigInt),
    ])
}

/// Columns of the embedded fallback fact sample. It carries only what the
/// OLAP queries read.
pub fn fallback_fact_schema() -> SchemaRef {
    schema_from_columns(&[
        ("date", SQLDataType::Date),
        ("product", SQLDataType::Varchar),
        ("category", SQLDataType::Varchar),
        ("quantity", SQLDataType::BigInt),
        ("unit_price", SQLDataType::Double),
        ("total_amount", SQLDataType::Double),
        ("region_name", SQLDataType::Varchar),
    ])
}
