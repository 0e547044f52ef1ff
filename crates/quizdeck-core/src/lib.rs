//! quizdeck-core: Quiz model, grading engine, and store traits.
//!
//! This crate defines the data model, the answer grading and scoring rules,
//! access control, and the service layer that the server and CLI build on.

pub mod access;
pub mod accounts;
pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod service;
pub mod statistics;
pub mod traits;
pub mod validation;
