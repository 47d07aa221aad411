use crate::prelude::*;
use crate::helper_funcs::display::print_heading;
use crate::normalizers::normalize::normalize_product_key;
use crate::writers::csv_writer::write_records_to_csv;

/// The three reference datasets the pipeline starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTables {
    pub sales: Vec<SalesRecord>,
    pub catalog: Vec<CatalogEntry>,
    pub regions: Vec<RegionEntry>,
}

fn sample_date(year: i32, month: u32, day: u32) -> CubeResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CubeError::Custom(format!("Invalid sample date {}-{}-{}", year, month, day)))
}

fn sale(day: u32, product: &str, quantity: i64, region_code: i64, unit_price: f64) -> CubeResult<SalesRecord> {
    Ok(SalesRecord {
        date: sample_date(2025, 1, day)?,
        product_name: product.to_string(),
        quantity,
        region_code,
        unit_price,
    })
}

fn catalog_entry(product: &str, category: &str, reference_price: f64, supplier: &str) -> CatalogEntry {
    CatalogEntry {
        product_name: normalize_product_key(product),
        category: category.to_string(),
        reference_price,
        supplier: supplier.to_string(),
    }
}

fn region(region_code: i64, region_name: &str) -> RegionEntry {
    RegionEntry {
        region_code,
        region_name: region_name.to_string(),
        zone: "Nacional".to_string(),
    }
}

impl SourceTables {
    /// Fixed sample content: 8 sales, 5 catalog entries, 4 regions.
    pub fn sample() -> CubeResult<Self> {
        let sales = [
            sale(15, "Teclado Mecanico", 2, 1, 80.0),
            sale(15, "Mouse Inalambrico", 3, 2, 25.0),
            sale(16, "Monitor 24\"", 1, 1, 300.0),
            sale(16, "Teclado Mecanico", 1, 3, 80.0),
            sale(17, "Mouse Inalambrico", 4, 2, 25.0),
            sale(17, "Tablet", 2, 1, 150.0),
            sale(18, "Monitor 24\"", 2, 4, 300.0),
            sale(18, "Auriculares", 3, 2, 45.0),
        ]
        .into_iter()
        .collect::<CubeResult<Vec<_>>>()?;

        Ok(SourceTables {
            sales,
            catalog: vec![
                catalog_entry("Teclado Mecanico", "Perifericos", 80.0, "TechCorp"),
                catalog_entry("Mouse Inalambrico", "Perifericos", 25.0, "ConnectPlus"),
                catalog_entry("Monitor 24\"", "Monitores", 300.0, "ViewMaster"),
                catalog_entry("Tablet", "Dispositivos Moviles", 150.0, "MobileTech"),
                catalog_entry("Auriculares", "Audio", 45.0, "SoundMax"),
            ],
            regions: vec![
                region(1, "Norte"),
                region(2, "Sur"),
                region(3, "Este"),
                region(4, "Oeste"),
            ],
        })
    }

    /// Writes the three tables to their configured paths, replacing old files.
    pub fn write(&self, config: &PipelineConfig) -> CubeResult<Vec<PathBuf>> {
        print_heading("📂 Generating source data...");

        let outputs = [
            (config.sales_path(), write_records_to_csv(&config.sales_path(), &self.sales)?),
            (config.catalog_path(), write_records_to_csv(&config.catalog_path(), &self.catalog)?),
            (config.regions_path(), write_records_to_csv(&config.regions_path(), &self.regions)?),
        ];

        let mut written = Vec::with_capacity(outputs.len());
        for (path, rows) in outputs {
            println!("✅ {} written ({} rows)", path.display(), rows);
            info!(path = %path.display(), rows, "source file generated");
            written.push(path);
        }

        Ok(written)
    }
}

/// Generates the sample sources under `config.data_dir`.
pub fn write_source_files(config: &PipelineConfig) -> CubeResult<Vec<PathBuf>> {
    SourceTables::sample()?.write(config)
}
