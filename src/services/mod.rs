//! Import pipeline services

pub mod csv_parser;
pub mod executor;
pub mod field_mapper;
pub mod record_creator;
pub mod report;
pub mod session;
pub mod wizard;
