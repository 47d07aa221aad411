pub mod csv_loader;
pub mod fact_source;
