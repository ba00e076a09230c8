//! Vidwatch Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and utilities for the vidwatch workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all vidwatch
//! workspace members:
//!
//! - **Logging**: Centralized tracing setup (console/file targets, text/JSON
//!   formats, environment-based configuration)
//! - **Types**: Shared domain types, most importantly [`VideoSummary`]

pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::VideoSummary;
