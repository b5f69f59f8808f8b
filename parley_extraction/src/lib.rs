#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Schema-driven extraction of user info from free-form chat text.
//!
//! The model is forced to call `extract_user_info`; its arguments are parsed,
//! normalized against a fixed five-field schema and checked for format.

mod error;
pub mod parse;
mod pipeline;
pub mod schema;
mod validator;

pub use error::ExtractionError;
pub use parse::{RawFields, parse_function_call_response};
pub use pipeline::{
    AGE_RETRY_INSTRUCTION, EXTRACTION_INSTRUCTION, ExtractionConfig, ExtractionOutcome,
    ExtractionPipeline, ExtractionStage,
};
pub use schema::{EXTRACT_FUNCTION_NAME, Field, FieldKind, extract_function};
pub use validator::{Validation, ValidationIssue, validate_extraction};
