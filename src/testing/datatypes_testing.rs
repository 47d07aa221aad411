use crate::prelude::*;
use crate::datatypes::datatypes::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_to_arrow_mapping() {
        assert_eq!(ArrowDataType::from(SQLDataType::Varchar), ArrowDataType::Utf8);
        assert_eq!(ArrowDataType::from(SQLDataType::BigInt), ArrowDataType::Int64);
        assert_eq!(ArrowDataType::from(SQLDataType::Double), ArrowDataType::Float64);
        assert_eq!(ArrowDataType::from(SQLDataType::Date), ArrowDataType::Date32);
    }

    #[test]
    fn test_arrow_to_sql_mapping() {
        assert_eq!(SQLDataType::try_from(ArrowDataType::LargeUtf8).unwrap(), SQLDataType::Varchar);
        assert_eq!(SQLDataType::try_from(ArrowDataType::Int32).unwrap(), SQLDataType::BigInt);
        assert_eq!(SQLDataType::try_from(ArrowDataType::Date64).unwrap(), SQLDataType::Date);
        assert!(SQLDataType::try_from(ArrowDataType::Boolean).is_err());
    }

    #[test]
    fn test_fact_schema_matches_fact_columns() {
        let names: Vec<String> = fact_schema().fields().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, FACT_COLUMNS.to_vec());
        assert!(fact_schema().fields().iter().all(|f| f.is_nullable()));
    }

    #[test]
    fn test_fact_rows_from_batches() {
        let batch = crate::loaders::fact_source::fallback_fact_batch().unwrap();
        // the sample lacks the identifier and lookup columns
        match FactSalesRow::from_batches(&[batch]) {
            Err(CubeError::MissingColumn { column, .. }) => assert_eq!(column, "row_id"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
