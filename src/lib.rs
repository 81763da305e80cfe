//! LeafScan — stateless plant-disease diagnosis backend.
//!
//! Two request handlers share no state: `/predict` turns an uploaded photo
//! into a normalized three-field diagnosis via a hosted multimodal model,
//! and `/generate_pdf` renders such a record into a branded PDF report.
//! The client carries the record between the two; nothing is persisted.

pub mod api;
pub mod config;
pub mod diagnosis;
pub mod provider;
pub mod report;
