pub mod allocation;
pub mod pipeline;
pub mod summary;
