//! Shared utilities for bond-rs
//!
//! This crate provides common functionality used across the bond-rs
//! workspace: logging setup and dataset-path configuration.

pub mod config;
pub mod logging;

pub use config::DataConfig;
pub use logging::init_tracing;
