pub mod category;
pub mod classification;
pub mod consolidation;
