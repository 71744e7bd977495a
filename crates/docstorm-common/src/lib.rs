//! Common utilities for docstorm
//!
//! This crate provides the error type shared by the docstorm crates.

pub mod error;

pub use error::{StormError, Result};
