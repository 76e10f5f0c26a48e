//! Core admission and status functionality
//!
//! This library provides:
//! - Admission validation for VSphereDistributedNetwork objects
//! - Condition bookkeeping for controllers writing status
//! - Scheme-aware decoding of wire objects

pub mod conditions;
pub mod decode;
pub mod error;
pub mod field;
pub mod validation;

pub use conditions::Observation;
pub use decode::decode_network;
pub use error::{CoreError, Result};
pub use field::{FieldError, FieldErrors, FieldPath};
