//! Lead Importer - bulk lead import from CSV files into the CRM
//!
//! The pipeline: [`services::csv_parser`] turns an upload into a table,
//! [`services::field_mapper`] binds its columns to lead fields,
//! [`services::executor`] creates one lead per row through a
//! [`services::record_creator::RecordCreator`], and
//! [`services::wizard`] sequences the steps for an operator.

pub mod config;
pub mod defaults;
pub mod error;
pub mod services;
pub mod types;
