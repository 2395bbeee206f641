//! Core library for uvm
//!
//! This crate provides:
//! - The error taxonomy shared by every uvm crate
//! - Settings and their hierarchical loader
//! - The resolved filesystem layout passed to the update pipeline
//! - Release manifest types and the version ordering policy

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
