pub mod config;
pub mod error;
pub mod location;
pub mod product;
pub mod stock_row;
pub mod transfer;
