//! CLI command implementations

pub mod clean;
pub mod current;
pub mod generate;
pub mod hash;
pub mod info;
pub mod install;
pub mod list;
pub mod list_remote;
pub mod self_update;
pub mod switch;
pub mod update;
