pub mod datatypes;
