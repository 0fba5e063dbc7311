//! Shared utilities for redline.
//!
//! This crate provides common utilities used across the redline workspace:
//! - ULID-based identifier generation
//! - Logging setup with tracing

pub mod id;
pub mod log;

pub use id::Identifier;
