//! Common test infrastructure for uvm-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Version strings, URLs and archive contents
//! - `builders`: Manifest JSON and archive builders
//! - `fakes`: In-memory transport and scripted prompt
//! - `fixtures`: Temporary deployment directory wired to a pipeline
//! - `mock_server`: Wiremock setup helpers for HTTP transport tests

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fakes;
pub mod fixtures;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use fakes::*;
pub use fixtures::*;
pub use mock_server::*;
