//! Synthetic data for stress testing the rebalancing pipeline.

pub mod snapshot_generator;
