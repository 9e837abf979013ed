//! Pure data types and string scanners shared by the pipeline stages.

pub mod maps;
pub mod text;
