//! Reading stock exports and writing result files.

pub mod loader;
pub mod tables;
pub mod writer;
