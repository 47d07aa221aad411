pub mod orchestrate;
