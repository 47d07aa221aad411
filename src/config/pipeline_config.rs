use crate::prelude::*;

/// Values substituted for nulls left behind by the left joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullDefaults {
    pub category: String,
    pub supplier: String,
}

impl Default for NullDefaults {
    fn default() -> Self {
        NullDefaults {
            category: "Uncategorized".to_string(),
            supplier: "Unknown".to_string(),
        }
    }
}

impl NullDefaults {
    /// Default for a fact column, if that column is defaulted at all.
    pub fn for_column(&self, column: &str) -> Option<&str> {
        match column {
            "category" => Some(&self.category),
            "supplier" => Some(&self.supplier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub sales_file: String,
    pub catalog_file: String,
    pub regions_file: String,
    pub fact_file: String,
    pub pivot_file: String,
    pub conclusions_file: String,
    pub chart_file: String,
    pub null_defaults: NullDefaults,
    pub slice_region: String,
    pub slice_category: String,
    pub top_n: u64,
    pub preview_rows: u64,
    pub render_chart: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_dir: PathBuf::from("."),
            sales_file: "sales_daily.csv".to_string(),
            catalog_file: "product_catalog.csv".to_string(),
            regions_file: "regions.csv".to_string(),
            fact_file: "consolidated_sales_facts.csv".to_string(),
            pivot_file: "olap_pivot_table.csv".to_string(),
            conclusions_file: "olap_conclusions.txt".to_string(),
            chart_file: "olap_summary_chart.html".to_string(),
            null_defaults: NullDefaults::default(),
            slice_region: "Norte".to_string(),
            slice_category: "Perifericos".to_string(),
            top_n: 5,
            preview_rows: 10,
            render_chart: false,
        }
    }
}

impl PipelineConfig {
    /// Default configuration rooted at `data_dir`.
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        PipelineConfig {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Loads a JSON configuration file. Missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CubeResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CubeError::ReadError {
            path: path.display().to_string(),
            reason: e.to_string(),
            suggestion: "💡 Check that the configuration file exists".to_string(),
        })?;

        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded pipeline configuration");
        Ok(config)
    }

    pub fn validate(&self) -> CubeResult<()> {
        if self.top_n == 0 {
            return Err(CubeError::InvalidOperation {
                operation: "Configuration".to_string(),
                reason: "top_n must be at least 1".to_string(),
                suggestion: "💡 Use the default of 5 or any positive value".to_string(),
            });
        }

        let csv_files = [
            &self.sales_file,
            &self.catalog_file,
            &self.regions_file,
            &self.fact_file,
            &self.pivot_file,
        ];
        if let Some(bad) = csv_files.iter().find(|name| !name.ends_with(".csv")) {
            return Err(CubeError::InvalidOperation {
                operation: "Configuration".to_string(),
                reason: format!("'{}' is not a .csv file name", bad),
                suggestion: "💡 Tabular files must end with '.csv'".to_string(),
            });
        }

        Ok(())
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    pub fn sales_path(&self) -> PathBuf {
        self.path_for(&self.sales_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.path_for(&self.catalog_file)
    }

    pub fn regions_path(&self) -> PathBuf {
        self.path_for(&self.regions_file)
    }

    pub fn fact_path(&self) -> PathBuf {
        self.path_for(&self.fact_file)
    }

    pub fn pivot_path(&self) -> PathBuf {
        self.path_for(&self.pivot_file)
    }

    pub fn conclusions_path(&self) -> PathBuf {
        self.path_for(&self.conclusions_file)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.path_for(&self.chart_file)
    }
}
