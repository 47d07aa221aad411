pub mod aggregates;
pub mod summary;
