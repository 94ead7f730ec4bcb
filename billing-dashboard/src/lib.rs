//! HandyWorks billing dashboard.
//!
//! Loads account billing records from the document store, derives a payment
//! status for each account, and serves the filtered table, summary counters
//! and CSV export. The `handyworks-import` binary feeds the same collection
//! from the MS Access and sales exports.

pub mod config;
pub mod dtos;
pub mod engine;
pub mod handlers;
pub mod import;
pub mod models;
pub mod report;
pub mod services;
pub mod startup;
