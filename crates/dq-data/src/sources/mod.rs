//! Dataset sources
//!
//! One uploaded file becomes one dataset; a new upload replaces the
//! dataset wholesale.

pub mod csv;

pub use csv::CsvSource;
