use crate::prelude::*;
use crate::datatypes::datatypes::{fact_schema, fallback_fact_schema};
use crate::helper_funcs::registertable::register_batches;
use crate::loaders::csv_loader::load_csv_with_schema;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Where the OLAP stage gets its fact table from.
#[derive(Debug, Clone, PartialEq)]
pub enum FactSource {
    /// The fact table CSV persisted by the load stage.
    File(PathBuf),
    /// A small embedded sample for runs where the ETL stage has not run.
    Fixture,
}

impl FactSource {
    /// `File` when `path` exists, otherwise `Fixture` with a warning.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.is_file() {
            FactSource::File(path.to_path_buf())
        } else {
            warn!(path = %path.display(), "fact table not found, using embedded sample");
            println!("⚠️  {} not found. Run the ETL stage first; using sample data.", path.display());
            FactSource::Fixture
        }
    }

    pub fn is_fixture(&self) -> bool {
        matches!(self, FactSource::Fixture)
    }

    pub async fn load(&self, alias: &str) -> CubeResult<AliasedDataFrame> {
        match self {
            FactSource::File(path) => load_csv_with_schema(path, fact_schema(), alias).await,
            FactSource::Fixture => {
                let batch = fallback_fact_batch()?;
                let ctx = SessionContext::new();
                register_batches(&ctx, alias, batch.schema(), vec![batch])?;
                let df = ctx.table(alias).await?;
                Ok(AliasedDataFrame::new(df, alias))
            }
        }
    }
}

fn epoch_days(year: i32, month: u32, day: u32) -> CubeResult<i32> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.num_days_from_ce() - UNIX_EPOCH_FROM_CE)
        .ok_or_else(|| CubeError::Custom(format!("Invalid sample date {}-{}-{}", year, month, day)))
}

/// `(date, product, category, quantity, unit_price, region_name)`.
pub(crate) type SampleFact<'a> = ((i32, u32, u32), &'a str, &'a str, i64, f64, &'a str);

/// Builds a fact batch in the fixture layout, `total_amount` included.
pub(crate) fn sample_fact_batch(rows: &[SampleFact<'_>]) -> CubeResult<RecordBatch> {
    let dates = rows
        .iter()
        .map(|((year, month, day), ..)| epoch_days(*year, *month, *day))
        .collect::<CubeResult<Vec<i32>>>()?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(dates)),
        Arc::new(StringArray::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.3).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.4).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.3 as f64 * r.4).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.5).collect::<Vec<_>>())),
    ];

    Ok(RecordBatch::try_new(fallback_fact_schema(), columns)?)
}

/// The five-row sample fact table.
pub fn fallback_fact_batch() -> CubeResult<RecordBatch> {
    sample_fact_batch(&[
        ((2025, 1, 15), "teclado mecanico", "Perifericos", 2, 80.0, "Norte"),
        ((2025, 1, 15), "mouse inalambrico", "Perifericos", 3, 25.0, "Sur"),
        ((2025, 1, 16), "monitor 24\"", "Monitores", 1, 300.0, "Norte"),
        ((2025, 1, 16), "teclado mecanico", "Perifericos", 1, 80.0, "Este"),
        ((2025, 1, 17), "tablet", "Dispositivos Moviles", 2, 150.0, "Norte"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_funcs::extract_columns::{date_column, f64_column};
    use tempfile::TempDir;

    #[test]
    fn test_for_path_selects_fixture_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("consolidated_sales_facts.csv");
        assert_eq!(FactSource::for_path(&path), FactSource::Fixture);

        fs::write(&path, "row_id\n").unwrap();
        assert_eq!(FactSource::for_path(&path), FactSource::File(path.clone()));
    }

    #[test]
    fn test_fixture_batch_contents() {
        let batch = fallback_fact_batch().unwrap();
        assert_eq!(batch.num_rows(), 5);

        let totals = f64_column(&batch, "total_amount").unwrap();
        assert_eq!(totals, vec![160.0, 75.0, 300.0, 80.0, 300.0]);
        assert_eq!(totals.iter().sum::<f64>(), 915.0);

        let dates = date_column(&batch, "date").unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(dates[4], NaiveDate::from_ymd_opt(2025, 1, 17));
    }

    #[tokio::test]
    async fn test_fixture_loads_as_table() {
        let frame = FactSource::Fixture.load("facts").await.unwrap();
        assert_eq!(frame.alias, "facts");
        assert_eq!(frame.row_count().await.unwrap(), 5);
        assert!(frame.has_column("region_name"));
        assert!(!frame.has_column("zone"));
    }
}
