//! Configuration and validation engine for coffee quality templates.
//!
//! A quality template bundles the grading rules a laboratory applies to a sample: screen-size
//! distribution constraints, weighted physical defects, visual aspect scales, taint and fault
//! catalogues, and cupping attributes. This crate models those rules and checks a template for
//! internal consistency before it is persisted or applied.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod templates;
