//! Utility helpers: output file writing.
pub mod files;

pub use files::write_output;
