//! CLI subcommands

pub mod catalog;
pub mod clusters;
pub mod estimate;
pub mod scenarios;
