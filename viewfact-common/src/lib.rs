//! # viewfact Common Library
//!
//! Shared code for the viewfact pipeline crates including:
//! - Error type and result alias
//! - Configuration loading and data directory layout
//! - Timestamp parsing and canonical formatting
//! - SQLite initialization for the star schema

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
