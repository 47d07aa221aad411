pub mod calendar;
pub mod cube;
pub mod pivot;
pub mod conclusions;
