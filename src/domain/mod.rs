//! Core domain types and logic.

pub mod family;
pub mod contract;
pub mod spread;
pub mod stats;
pub mod ols;
pub mod mackinnon;
pub mod adf;
pub mod stationarity;
pub mod batch;
pub mod summary;
pub mod config_validation;
pub mod error;
