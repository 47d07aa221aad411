pub mod registertable;
pub mod extract_columns;
pub mod build_rec_batch;
pub mod display;
pub mod money;
