//! CLI Commands

pub mod build;
pub mod lint;
pub mod package;
pub mod qunit;
pub mod serve;
pub mod tasks;
