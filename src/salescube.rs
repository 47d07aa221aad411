pub mod prelude;
pub mod config;
pub mod datatypes;
pub mod source_gen;
pub mod loaders;
pub mod transform;
pub mod load;
pub mod reporting;
pub mod olap;
pub mod pipeline;
pub mod features;
mod custom_error;
mod helper_funcs;
mod normalizers;
mod sqlbuilder;
mod aggregation_builder;
mod writers;
#[cfg(test)]
mod testing;

use crate::prelude::*;

pub use crate::custom_error::cust_error::{CubeError, CubeResult};
pub use crate::loaders::fact_source::FactSource;
pub use crate::pipeline::orchestrate::{run_all, run_etl, run_olap, EtlOutcome, OlapOutcome};

/// A DataFusion frame together with the table name it is registered under
/// whenever a stage runs SQL against it.
#[derive(Clone)]
pub struct AliasedDataFrame {
    pub dataframe: DataFrame,
    pub alias: String,
}

impl AliasedDataFrame {
    pub fn new(dataframe: DataFrame, alias: &str) -> Self {
        AliasedDataFrame {
            dataframe,
            alias: alias.to_string(),
        }
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.dataframe
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.dataframe
            .schema()
            .fields()
            .iter()
            .any(|f| f.name() == column)
    }

    pub async fn collect(&self) -> CubeResult<Vec<RecordBatch>> {
        self.dataframe.clone().collect().await.map_err(|e| CubeError::InvalidOperation {
            operation: "Data Collection".to_string(),
            reason: format!("Failed to collect table '{}': {}", self.alias, e),
            suggestion: "💡 Check if the table contains valid data".to_string(),
        })
    }

    pub async fn row_count(&self) -> CubeResult<usize> {
        let batches = self.collect().await?;
        Ok(batches.iter().map(|b| b.num_rows()).sum())
    }
}

impl fmt::Debug for AliasedDataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasedDataFrame")
            .field("alias", &self.alias)
            .field("columns", &self.column_names())
            .finish()
    }
}
