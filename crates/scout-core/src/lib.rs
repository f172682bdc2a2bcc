//! # Scout Core
//!
//! Data model and scoring engine for Token Scout.
//!
//! This crate holds the pure part of the system: token records, the three
//! signals gathered per token, and the weighted composite scorer. Nothing in
//! here performs I/O or logs; callers decide how to recover from errors.

pub mod error;
pub mod models;
pub mod scoring;

pub use error::*;
pub use models::*;
pub use scoring::*;
