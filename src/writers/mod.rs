pub mod csv_writer;
pub mod text_writer;
