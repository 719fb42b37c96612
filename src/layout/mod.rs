// src/layout/mod.rs

pub mod config;
pub mod types;

pub use config::LayoutConfig;
pub use types::{ColumnLayout, SOURCE_COLUMNS, TARGET_COLUMNS};
